// Feedback generation flow.
// All LLM calls go through the `llm` module — no direct provider calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;
