use std::fmt::Display;

use super::domain::{AssessmentRequest, RankMove, Speaker};
use crate::catalog::DiagnosisCatalog;
use crate::scenario::Scenario;
use crate::workflows::differential::Confidence;
use crate::workflows::resolution::Resolver;

pub(crate) const INSTRUCTOR_PROMPT: &str = r#"You are an instructor in a fictional diagnostic reasoning simulator for students.
You will be given comprehensive workflow data from a 12-step diagnostic process:
- Safety check and triage
- Chief complaint and history (HPI with OPQRST)
- Medical background
- Problem representation
- Physical exam findings
- Differential diagnosis (ranked)
- Test selection
- Clinical reasoning updates
- Final diagnosis with confidence
- Patient communication
- Plan and disposition

Give a structured, supportive educational assessment with scores (0-5) for each category.
Do NOT give real-world medical advice. Do NOT tell the user what they personally should do in real life.
Focus only on how well they handled this fictional case.

Output your assessment as a JSON object with this exact structure:
{
  "overallRating": "Excellent" | "Good" | "Needs Improvement" | "Poor",
  "summary": "A short paragraph summarizing their overall performance.",
  "strengths": ["item1", "item2", "item3"],
  "areasForImprovement": ["item1", "item2", "item3"],
  "diagnosisFeedback": "Comment on: (1) whether the differential included the must-not-miss diagnoses, (2) whether the ranking made sense, (3) whether the final diagnosis fits the key data, (4) whether too many irrelevant diagnoses were listed, (5) the quality of any reasoning notes.",
  "missedKeyHistoryPoints": ["item1", "item2"],
  "testSelectionFeedback": "Comment on: (1) high-yield tests chosen, (2) unnecessary or inappropriate tests, (3) critical tests missed, (4) focused versus shotgun ordering.",
  "sectionRatings": {
    "history": "Excellent" | "Good" | "Needs Improvement" | "Poor",
    "exam": "Excellent" | "Good" | "Needs Improvement" | "Poor",
    "tests": "Excellent" | "Good" | "Needs Improvement" | "Poor",
    "diagnosis": "Excellent" | "Good" | "Needs Improvement" | "Poor",
    "communication": "Excellent" | "Good" | "Needs Improvement" | "Poor"
  },
  "totalScore": number,
  "scoreBreakdown": {
    "history": number,
    "exam": number,
    "tests": number,
    "diagnosis": number,
    "communication": number
  }
}

Be constructive and educational. Point out what they did well and what they could improve."#;

/// Everything the transcript needs besides the request itself.
pub(crate) struct TranscriptContext<'a> {
    pub scenario: &'a Scenario,
    pub diagnoses: &'a DiagnosisCatalog,
    pub resolver: Resolver<'a>,
    pub missing_must_not_miss: &'a [String],
    pub max_recommended_differential: usize,
}

fn or_default<'s>(value: Option<&'s str>, fallback: &'s str) -> &'s str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
}

fn joined(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn line(out: &mut String, text: impl Display) {
    out.push_str(&text.to_string());
    out.push('\n');
}

/// Deterministic rendering of the case ground truth and the student's workflow.
pub(crate) fn build_transcript(ctx: &TranscriptContext<'_>, request: &AssessmentRequest) -> String {
    let scenario = ctx.scenario;
    let persona = &scenario.patient_persona;
    let dx_name = |id: &str| -> String {
        ctx.diagnoses
            .get(id)
            .map(|dx| dx.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    let mut out = String::new();

    line(&mut out, format_args!("SCENARIO: {}", scenario.title));
    line(
        &mut out,
        format_args!("Description: {}", scenario.description),
    );
    out.push('\n');
    line(&mut out, "PATIENT:");
    line(
        &mut out,
        format_args!(
            "Name: {}, Age: {}, Gender: {}",
            persona.name, persona.age, persona.gender
        ),
    );
    line(
        &mut out,
        format_args!("Chief Complaint: {}", persona.chief_complaint),
    );
    line(&mut out, format_args!("Background: {}", persona.background));
    line(
        &mut out,
        format_args!("Vital Signs: {}", persona.vitals.summary()),
    );
    out.push('\n');
    line(
        &mut out,
        "KEY HISTORY POINTS (that a good doctor should find):",
    );
    line(&mut out, bullets(&persona.key_history_points));
    out.push('\n');
    line(&mut out, "RED FLAGS:");
    line(&mut out, bullets(&persona.red_flags));
    out.push('\n');

    let correct = scenario
        .final_dx_id
        .as_deref()
        .map(dx_name)
        .unwrap_or_else(|| "Not specified".to_string());
    line(&mut out, format_args!("CORRECT DIAGNOSIS: {correct}"));
    for authored in scenario.dx_overrides() {
        line(
            &mut out,
            format_args!(
                "- {} ({}): {}",
                dx_name(&authored.dx_id),
                authored.dx_yield.label(),
                authored.explanation
            ),
        );
    }
    if !scenario.required_must_not_miss.is_empty() {
        let names: Vec<String> = scenario
            .required_must_not_miss
            .iter()
            .map(|id| dx_name(id))
            .collect();
        line(
            &mut out,
            format_args!("MUST-NOT-MISS: {}", names.join(", ")),
        );
    }
    out.push('\n');

    line(&mut out, "STUDENT'S PERFORMANCE:");
    out.push('\n');

    line(&mut out, "Step 0 - Safety Check:");
    line(
        &mut out,
        format_args!(
            "Stability Assessment: {}",
            request.stability.map_or("Not completed", |s| s.label())
        ),
    );
    line(
        &mut out,
        format_args!(
            "Red Flags Identified: {}",
            joined(&request.red_flags_found, "None")
        ),
    );
    out.push('\n');

    line(&mut out, "Step 1 - Chief Complaint:");
    line(
        &mut out,
        or_default(request.chief_complaint.as_deref(), "Not recorded"),
    );
    out.push('\n');

    line(&mut out, "Step 2 - History (HPI):");
    match &request.hpi {
        Some(hpi) => {
            let asked = |answer: Option<&str>| or_default(answer, "Not asked").to_string();
            line(
                &mut out,
                format_args!("Onset: {}", asked(hpi.onset.as_deref())),
            );
            line(
                &mut out,
                format_args!("Provocation: {}", asked(hpi.provocation.as_deref())),
            );
            line(
                &mut out,
                format_args!("Quality: {}", asked(hpi.quality.as_deref())),
            );
            line(
                &mut out,
                format_args!("Radiation: {}", asked(hpi.radiation.as_deref())),
            );
            let severity = hpi
                .severity
                .map_or_else(|| "Not asked".to_string(), |s| format!("{s}/10"));
            line(&mut out, format_args!("Severity: {severity}"));
            line(
                &mut out,
                format_args!("Timing: {}", asked(hpi.timing.as_deref())),
            );
            line(
                &mut out,
                format_args!(
                    "Associated Symptoms: {}",
                    joined(&hpi.associated_symptoms, "None")
                ),
            );
            line(
                &mut out,
                format_args!(
                    "Pertinent Positives: {}",
                    joined(&hpi.pertinent_positives, "None")
                ),
            );
            line(
                &mut out,
                format_args!(
                    "Pertinent Negatives: {}",
                    joined(&hpi.pertinent_negatives, "None")
                ),
            );
        }
        None => line(&mut out, "Not completed"),
    }
    out.push('\n');

    line(&mut out, "Chat Transcript:");
    if request.chat.is_empty() {
        line(&mut out, "No conversation");
    }
    for turn in &request.chat {
        let speaker = match turn.role {
            Speaker::Doctor => "Doctor",
            Speaker::Patient => "Patient",
        };
        line(&mut out, format_args!("{speaker}: {}", turn.content));
    }
    out.push('\n');

    line(&mut out, "Step 3 - Medical Background:");
    match &request.background {
        Some(background) => {
            let allergies: Vec<String> = background
                .allergies
                .iter()
                .map(|a| format!("{} ({})", a.allergen, a.reaction))
                .collect();
            let social: Vec<String> = background
                .social_history
                .as_ref()
                .map(|social| {
                    social
                        .entries()
                        .into_iter()
                        .map(|(label, value)| format!("{label}: {value}"))
                        .collect()
                })
                .unwrap_or_default();

            for (label, items) in [
                ("PMH", &background.past_medical_history),
                ("Meds", &background.medications),
                ("Allergies", &allergies),
                ("Family History", &background.family_history),
                ("Social", &social),
            ] {
                line(&mut out, format_args!("{label}: {}", joined(items, "None")));
            }
        }
        None => line(&mut out, "Not completed"),
    }
    out.push('\n');

    line(&mut out, "Step 4 - Problem Representation:");
    let problem_rep = request.problem_rep.as_ref().map(|p| p.summary.as_str());
    line(&mut out, or_default(problem_rep, "Not completed"));
    out.push('\n');

    line(&mut out, "Step 5 - Physical Exam:");
    line(
        &mut out,
        format_args!(
            "Exam Sections Viewed: {}",
            joined(&request.viewed_exam_sections, "None")
        ),
    );
    out.push('\n');

    let differential = &request.scoring.differential_detailed;
    line(&mut out, "Step 6 - Differential Diagnosis:");
    if differential.is_empty() {
        line(&mut out, "None");
    }
    for entry in differential.entries() {
        let note = entry
            .note
            .as_deref()
            .map(|note| format!(" - Note: {note}"))
            .unwrap_or_default();
        line(
            &mut out,
            format_args!(
                "#{} {} ({} confidence){note}",
                entry.rank,
                dx_name(&entry.dx_id),
                entry.confidence.label()
            ),
        );
    }
    if !ctx.missing_must_not_miss.is_empty() {
        let names: Vec<String> = ctx
            .missing_must_not_miss
            .iter()
            .map(|id| dx_name(id))
            .collect();
        line(
            &mut out,
            format_args!(
                "MISSING MUST-NOT-MISS DIAGNOSES: {} - Penalty applies",
                names.join(", ")
            ),
        );
    }
    if !differential.is_empty() {
        let over_limit = if differential.len() > ctx.max_recommended_differential {
            " (over recommended limit, efficiency penalty applies)"
        } else {
            ""
        };
        line(
            &mut out,
            format_args!("Efficiency: {} diagnoses{over_limit}", differential.len()),
        );
    }
    out.push('\n');

    let ordered = &request.scoring.ordered_tests;
    line(&mut out, "Step 7 - Tests:");
    line(
        &mut out,
        format_args!("Tests Ordered: {}", joined(ordered, "None")),
    );
    if !ordered.is_empty() {
        line(&mut out, "Test Details:");
        for test_id in ordered {
            match ctx.resolver.resolve_test(scenario, test_id) {
                Ok(resolved) => line(
                    &mut out,
                    format_args!(
                        "- {}: {} yield, Result: {}",
                        resolved.test.name,
                        resolved.test_yield.label(),
                        resolved.result
                    ),
                ),
                Err(_) => line(&mut out, format_args!("- {test_id}: Error resolving test")),
            }
        }
    }
    out.push('\n');

    line(&mut out, "Step 8 - Clinical Reasoning:");
    if request.reasoning_updates.is_empty() {
        line(&mut out, "No reasoning updates");
    }
    for update in &request.reasoning_updates {
        let direction = match update.moved {
            RankMove::Up => "up",
            RankMove::Down => "down",
        };
        line(
            &mut out,
            format_args!(
                "- {}: Moved {direction} - {}",
                dx_name(&update.id),
                update.reasoning
            ),
        );
    }
    out.push('\n');

    let final_dx = request
        .scoring
        .final_dx_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    line(&mut out, "Step 9 - Final Diagnosis:");
    let selected = final_dx.map_or_else(|| "None".to_string(), dx_name);
    line(&mut out, format_args!("Selected: {selected}"));
    if let (Some(chosen), Some(correct)) = (final_dx, scenario.final_dx_id.as_deref()) {
        let verdict = if chosen == correct {
            "CORRECT"
        } else {
            "INCORRECT"
        };
        line(&mut out, format_args!("Correct Answer: {verdict}"));
    }
    let confidence = request.final_confidence.or_else(|| {
        final_dx.and_then(|id| {
            differential
                .entries()
                .iter()
                .find(|entry| entry.dx_id == id)
                .map(|entry| entry.confidence)
        })
    });
    line(
        &mut out,
        format_args!(
            "Confidence: {}",
            confidence.map_or("Not specified", |c| c.label())
        ),
    );
    if request.final_confidence == Some(Confidence::Low) {
        let next_steps = or_default(request.final_next_steps.as_deref(), "None");
        line(&mut out, format_args!("Next Steps: {next_steps}"));
    }
    out.push('\n');

    line(&mut out, "Step 10 - Patient Communication:");
    let explanation = or_default(request.patient_explanation.as_deref(), "Not provided");
    line(&mut out, format_args!("Explanation: {explanation}"));
    out.push('\n');

    line(&mut out, "Step 11 - Plan & Disposition:");
    match &request.plan {
        Some(plan) => {
            let details = or_default(Some(plan.plan_details.as_str()), "Not provided");
            line(
                &mut out,
                format_args!("Disposition: {}", plan.disposition.label()),
            );
            line(&mut out, format_args!("Plan: {details}"));
            line(
                &mut out,
                format_args!("Consultations: {}", joined(&plan.consultations, "None")),
            );
            line(
                &mut out,
                format_args!("Monitoring: {}", joined(&plan.monitoring, "None")),
            );
        }
        None => {
            line(&mut out, "Disposition: Not selected");
            line(&mut out, "Plan: Not provided");
        }
    }
    out.push('\n');

    line(&mut out, "TEACHING POINTS:");
    line(&mut out, bullets(&scenario.teaching_points));
    out.push('\n');
    out.push_str("Provide your comprehensive assessment as JSON with scores for each category.");

    out
}
