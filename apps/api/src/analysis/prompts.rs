// All LLM prompt constants for the analysis module.
// Reuses cross-cutting fragments from llm_client::prompts.
// Templates carry `{placeholders}` replaced by the call site before sending.

/// Requirement extraction. Replace `{instruction}` and `{jd_text}`.
pub const EXTRACT_REQUIREMENTS_PROMPT: &str = r#"Extract the JOB REQUIREMENTS from the job description below.

Include:
- Skills
- Tools / technologies
- Experience requirements (years, speed, accuracy, volume, environment)
- Process knowledge (Kaizen, 5S, compliance, safety, etc.)

{instruction}

Return a JSON object with this EXACT schema:
{"requirements": ["<requirement>", "..."]}

JOB DESCRIPTION:
{jd_text}"#;

pub const EXTRACT_REQUIREMENTS_SYSTEM: &str =
    "You are a job description analyst extracting explicit job requirements. \
    You MUST respond with valid JSON only.";

/// Evidence extraction. Replace `{instruction}` and `{resume_text}`.
pub const EXTRACT_EVIDENCE_PROMPT: &str = r#"Extract the skills, tools, technologies, and experience EXPLICITLY mentioned in the resume below.

{instruction}

Return a JSON object with this EXACT schema:
{"evidence": ["<evidence>", "..."]}

RESUME:
{resume_text}"#;

pub const EXTRACT_EVIDENCE_SYSTEM: &str =
    "You are a resume analyst extracting explicit candidate evidence. \
    You MUST respond with valid JSON only.";

/// Requirement classification. Replace `{requirements}` and `{resume_text}`.
pub const CLASSIFY_PROMPT: &str = r#"Compare the JOB REQUIREMENTS against the RESUME and judge each requirement:
- met: clearly demonstrated
- partially_met: mentioned but proficiency unclear
- missing: no convincing evidence

Rules:
- Do NOT assume proficiency unless evidence exists
- Projects, tools, and applied usage count as evidence
- Certifications and degrees count as supporting evidence
- Copy each requirement string EXACTLY as given

Return a JSON object with this EXACT schema:
{
  "met": [{"requirement": "<requirement>", "reason": "<short justification>"}],
  "partially_met": [{"requirement": "<requirement>", "reason": "<why partial>"}],
  "missing": [{"requirement": "<requirement>", "reason": "<why missing>"}]
}

JOB REQUIREMENTS:
{requirements}

RESUME:
{resume_text}"#;

pub const CLASSIFY_SYSTEM: &str =
    "You are a strict, conservative but fair skill-evaluation agent. \
    You MUST respond with valid JSON only.";

/// Learning recommendations. Replace `{role}` and `{missing}`.
pub const RECOMMEND_PROMPT: &str = r#"Given the missing job requirements below, create a learning plan.

For EACH missing requirement provide:
- why it matters
- priority: High / Medium / Low
- 2-3 learning resources
- 2-3 practice activities

Return a JSON object with this EXACT schema:
{
  "recommendations": [
    {
      "skill": "",
      "priority": "High",
      "justification": "",
      "learning_resources": [],
      "learning_activities": []
    }
  ]
}

TARGET ROLE:
{role}

MISSING REQUIREMENTS:
{missing}"#;

pub const RECOMMEND_SYSTEM: &str =
    "You are a career mentor producing concrete learning plans. \
    You MUST respond with valid JSON only.";

/// Recruiter-side Q&A. Replace `{requirements}`, `{evidence}`, `{matched}`,
/// `{missing}`, `{confidence}` and `{question}`.
pub const ANSWER_PROMPT: &str = r#"You are an automated resume evaluation assistant used by a company during candidate screening.
Speak from the company's perspective. Do not coach the applicant or suggest improvements.

Job requirements:
{requirements}

Resume evidence:
{evidence}

Requirements met:
{matched}

Requirements missing:
{missing}

Overall match confidence: {confidence}%

Question:
{question}

Answer concisely and neutrally, grounded only in the context above. If asked whether the
resume is acceptable, state Suitable / Borderline / Not Suitable."#;

pub const ANSWER_SYSTEM: &str =
    "You are a neutral, evidence-based hiring assistant. Answer in plain prose.";

/// Planner instruction. Replace `{actions}` and `{state}`.
pub const PLANNER_PROMPT: &str = r#"You are the ORCHESTRATOR of a resume vs job description skill gap analyzer.
Observe the CURRENT STATE and decide the single NEXT ACTION. You do not execute steps.

Actions:
- extract-requirements: extract job requirements from the job description
- extract-evidence: extract skills, tools and evidence from the resume
- infer-skills: infer high-level skills from low-level resume evidence
- match-gaps: compute semantic matches and missing requirements
- classify-requirements: explain why each requirement is met, partial or missing
- recommend: suggest learning paths for missing requirements
- answer-question: answer the pending chat_question using the current analysis
- HUMAN: ask the user for clarification (ambiguous evidence, confidence 40-60%, unclear requirements)
- DONE: stop when gaps are identified, reasoning is complete and needed recommendations exist

Rules:
- Do not assume a fixed order
- Do not repeat a step whose output already exists and is sufficient
- Choose answer-question only when a chat_question exists that answered_question does not match

Return a JSON object with this EXACT schema:
{
  "next_action": "<one of {actions}>",
  "reason": "<why this action>",
  "rejected_actions": {"<action>": "<why not>"}
}

CURRENT STATE:
{state}"#;
