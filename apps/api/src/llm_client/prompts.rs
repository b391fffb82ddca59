// Shared prompt constants and prompt-building utilities.
// Each module that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a strict, deterministic assistant. \
    Follow instructions exactly. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every extraction prompt.
pub const NO_INFERENCE_INSTRUCTION: &str = "\
    CRITICAL: Extract ONLY what is explicitly stated. \
    Do NOT infer, guess, generalize, summarize, or merge items. \
    Write each item as a short, explicit phrase.";
