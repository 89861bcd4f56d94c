//! Prompt construction for the structured feedback call.

/// Fixed system instruction framing the model as an interviewer.
pub const FEEDBACK_SYSTEM: &str = "You are a professional interviewer.";

/// The assessment categories the model must score. The order here is the
/// order expected back in `categoryScores`.
pub const FEEDBACK_CATEGORIES: &[&str] = &[
    "Communication Skills",
    "Technical Knowledge",
    "Problem Solving",
    "Cultural Fit",
    "Confidence and Clarity",
];

/// Builds the assessment prompt around an already-formatted transcript.
/// The schema section pins the JSON shape the flow deserializes.
pub fn feedback_prompt(formatted_transcript: &str) -> String {
    let categories = FEEDBACK_CATEGORIES.join(", ");
    format!(
        "You are an AI interviewer. I will provide the transcript of a technical \
         interview between a candidate and an interviewer. Your task is to assess \
         the candidate's performance based on their responses.\n\
         \n\
         Respond with a single JSON object of this exact shape:\n\
         {{\n\
           \"totalScore\": <0-100>,\n\
           \"categoryScores\": [{{\"name\": <category>, \"score\": <0-100>, \"comment\": <string>}}],\n\
           \"strengths\": [<string>],\n\
           \"areasForImprovement\": [<string>],\n\
           \"finalAssessment\": <string>\n\
         }}\n\
         \n\
         Score exactly these categories, in order: {categories}.\n\
         \n\
         Transcript:\n\
         \"\"\"\n\
         {formatted_transcript}\
         \"\"\""
    )
}
