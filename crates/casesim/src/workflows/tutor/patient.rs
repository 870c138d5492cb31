use serde::{Deserialize, Serialize};

use crate::llm::{ChatMessage, LlmError, TextGenerator};
use crate::scenario::Scenario;
use crate::workflows::assessment::{ChatTurn, Speaker};

pub const EMPTY_REPLY_FALLBACK: &str = "I'm not sure how to respond to that.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientChatRequest {
    pub scenario_id: String,
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientReply {
    pub message: String,
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Role-play instructions for the scripted patient.
pub fn persona_prompt(scenario: &Scenario) -> String {
    let persona = &scenario.patient_persona;
    let instructions = &scenario.ai_instructions;

    format!(
        "You are a fictional patient in a medical training simulator.\n\
         Your name is {name}, age {age}, gender {gender}.\n\
         Chief complaint: {complaint}.\n\
         Background: {background}.\n\
         Vital signs: {vitals}.\n\
         \n\
         {style}\n\
         \n\
         CRITICAL RULES:\n\
         {rules}\n\
         \n\
         DO NOT reveal directly:\n\
         {hidden}\n\
         \n\
         Key history points you know (reveal only if asked specifically):\n\
         {history}\n\
         \n\
         Answer ONLY as the patient in first person. Keep responses short and conversational, \
         like a real patient would speak. Do NOT give medical advice or diagnoses.",
        name = persona.name,
        age = persona.age,
        gender = persona.gender,
        complaint = persona.chief_complaint,
        background = persona.background,
        vitals = persona.vitals.summary(),
        style = instructions.patient_style,
        rules = bullets(&instructions.behavior_rules),
        hidden = bullets(&instructions.do_not_reveal_directly),
        history = bullets(&persona.key_history_points),
    )
}

/// System prompt, then the interview with doctor lines as `user` and patient lines as `assistant`.
pub fn conversation(scenario: &Scenario, turns: &[ChatTurn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatMessage::system(persona_prompt(scenario)));
    messages.extend(turns.iter().map(|turn| match turn.role {
        Speaker::Doctor => ChatMessage::user(turn.content.clone()),
        Speaker::Patient => ChatMessage::assistant(turn.content.clone()),
    }));
    messages
}

pub async fn reply<G: TextGenerator>(
    generator: &G,
    scenario: &Scenario,
    turns: &[ChatTurn],
) -> Result<PatientReply, LlmError> {
    let text = generator.chat(conversation(scenario, turns)).await?;
    let message = if text.trim().is_empty() {
        EMPTY_REPLY_FALLBACK.to_string()
    } else {
        text
    };
    Ok(PatientReply { message })
}
