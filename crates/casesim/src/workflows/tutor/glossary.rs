use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::llm::{parse_first_object, ChatMessage, LlmError, TextGenerator};

const ADVICE_PATTERNS: [&str; 7] = [
    "what should i do",
    "how do i treat",
    "should i take",
    "can you help me",
    "what medicine",
    "dose",
    "dosing",
];

const SYSTEM_PROMPT: &str = r#"You are a medical education assistant for high school students.
The user highlighted a term or phrase from a simulated medical case.
You MUST use the provided context text to infer the meaning in that situation.

CRITICAL RULES:
- Use the context text to understand how the term is used in this specific case
- If the term is medical, give a clear definition
- If it's used as a clinical adjective (like "tachycardic"), explain what it indicates in that context (e.g., "fast heart rate")
- Do NOT give medical advice, treatment instructions, dosing, or personal guidance
- Keep it accurate, concrete, and student-friendly
- If the phrase is not medical, explain it as general English
- Always emphasize that this is educational, not medical advice

Return ONLY valid JSON with this exact structure (no markdown, no extra text):
{
  "term": "the exact term or phrase as highlighted",
  "definitionSimple": "plain English explanation for high school students, using context when helpful",
  "definitionClinical": "more technical medical definition",
  "whyItMatters": "brief explanation of why this term is important medically",
  "whyItMattersHere": "specific explanation of why this matters in the context provided (reference the context)",
  "example": "a simple example sentence using the term",
  "exampleFromContext": "a short rephrased example based on the provided context (not a generic placeholder)",
  "synonymsOrRelated": ["synonym1", "related term2"]
}

The "whyItMattersHere" field MUST explicitly reference what the context suggests.
The "exampleFromContext" should be a short rephrased example based on the provided context."#;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioMeta {
    pub scenario_title: Option<String>,
    pub chief_complaint: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRequest {
    #[serde(default)]
    pub selected_text: String,
    #[serde(default)]
    pub context_text: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub scenario_meta: Option<ScenarioMeta>,
    #[serde(default)]
    pub view_mode: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExplanationSource {
    Ai,
    SafetyGuard,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermExplanation {
    pub term: String,
    pub definition_simple: String,
    pub definition_clinical: String,
    pub why_it_matters: String,
    pub why_it_matters_here: String,
    pub example: String,
    pub example_from_context: String,
    pub synonyms_or_related: Vec<String>,
    pub source: ExplanationSource,
}

/// Case-insensitive match against phrasing that asks for personal medical advice.
pub fn is_advice_request(text: &str) -> bool {
    let lower = text.to_lowercase();
    ADVICE_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}

pub fn advice_refusal(term: &str) -> TermExplanation {
    let why = "Medical advice requires a proper evaluation by a qualified healthcare provider.";
    let example = "This is for educational purposes only.";
    TermExplanation {
        term: term.to_string(),
        definition_simple: "I can explain medical terms, but I can't give personal medical advice. \
             If you have health concerns, please see a licensed healthcare professional."
            .to_string(),
        definition_clinical: "This appears to be a request for medical advice, which cannot be \
             provided. Consult a licensed healthcare professional for personal medical concerns."
            .to_string(),
        why_it_matters: why.to_string(),
        why_it_matters_here: why.to_string(),
        example: example.to_string(),
        example_from_context: example.to_string(),
        synonyms_or_related: Vec::new(),
        source: ExplanationSource::SafetyGuard,
    }
}

/// Generic explanation used when the model reply is unusable.
pub fn fallback_explanation(term: &str, context: Option<&str>) -> TermExplanation {
    let general = "Understanding medical terminology helps in learning about healthcare.";
    let context = context.map(str::trim).filter(|c| !c.is_empty());
    TermExplanation {
        term: term.to_string(),
        definition_simple: format!(
            "The term \"{term}\" is used in medical contexts. This is a general term that may \
             need context to fully understand."
        ),
        definition_clinical: format!(
            "The term \"{term}\" may refer to a medical concept, condition, or procedure. \
             Consult medical resources for specific definitions."
        ),
        why_it_matters: general.to_string(),
        why_it_matters_here: match context {
            Some(context) => {
                let excerpt: String = context.chars().take(100).collect();
                format!("In this case: {excerpt}...")
            }
            None => general.to_string(),
        },
        example: format!("Example usage of \"{term}\"."),
        example_from_context: match context {
            Some(_) => format!("In this case: {term} appears in the context provided."),
            None => format!("Example usage of \"{term}\"."),
        },
        synonyms_or_related: Vec::new(),
        source: ExplanationSource::Fallback,
    }
}

fn user_prompt(term: &str, request: &TermRequest) -> String {
    let mut prompt = format!("Explain this term or phrase: \"{term}\"\n");
    if let Some(context) = request.context_text.as_deref().filter(|c| !c.trim().is_empty()) {
        let source = request.source_type.as_deref().unwrap_or("the case");
        prompt.push_str(&format!("\n\nContext from {source}:\n{context}"));
    }
    if let Some(meta) = &request.scenario_meta {
        prompt.push_str(&format!(
            "\n\nScenario: {}\nChief Complaint: {}\nSpecialty: {}",
            meta.scenario_title.as_deref().unwrap_or_default(),
            meta.chief_complaint.as_deref().unwrap_or_default(),
            meta.specialty.as_deref().unwrap_or_default(),
        ));
    }
    prompt.push_str(
        "\n\nProvide both simple (for high school students) and clinical definitions.\n\
         Use the context to understand how this term is being used in this specific case.\n\
         If the term is used as a clinical descriptor (like \"tachycardic\" meaning \"having a \
         fast heart rate\"), explain what it indicates in this context.",
    );
    prompt
}

fn text_field<'m>(map: &'m Map<String, Value>, key: &str) -> Option<&'m str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Fill gaps in a model reply; `None` when `term` or `definitionSimple` is missing.
pub fn explanation_from_reply(reply: &str, term: &str) -> Option<TermExplanation> {
    let map = parse_first_object(reply).ok()?;
    let reply_term = text_field(&map, "term")?;
    let simple = text_field(&map, "definitionSimple")?;

    let why = text_field(&map, "whyItMatters");
    let example = text_field(&map, "example");

    Some(TermExplanation {
        term: reply_term.to_string(),
        definition_simple: simple.to_string(),
        definition_clinical: text_field(&map, "definitionClinical")
            .unwrap_or(simple)
            .to_string(),
        why_it_matters: why
            .unwrap_or("This is an important medical term to understand.")
            .to_string(),
        why_it_matters_here: text_field(&map, "whyItMattersHere")
            .or(why)
            .unwrap_or_default()
            .to_string(),
        example: example
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("Example: The term \"{term}\" is used in medical contexts.")
            }),
        example_from_context: text_field(&map, "exampleFromContext")
            .or(example)
            .unwrap_or_default()
            .to_string(),
        synonyms_or_related: map
            .get("synonymsOrRelated")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        source: ExplanationSource::Ai,
    })
}

/// Explain a highlighted term. `selected_text` must already be non-blank.
pub async fn explain<G: TextGenerator>(
    generator: &G,
    request: &TermRequest,
) -> Result<TermExplanation, LlmError> {
    let term = request.selected_text.trim();
    if is_advice_request(term) {
        tracing::info!("term lookup matched advice guard");
        return Ok(advice_refusal(term));
    }

    let messages = vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt(term, request)),
    ];
    let reply = generator.chat(messages).await?;

    Ok(explanation_from_reply(&reply, term).unwrap_or_else(|| {
        tracing::warn!(term, "model reply unusable, returning fallback explanation");
        fallback_explanation(term, request.context_text.as_deref())
    }))
}
