//! Prompt construction for interview question generation.

/// Builds the single natural-language prompt sent to the generation model.
/// The output contract is one question per line, nothing else, because the
/// questions are read aloud by the voice assistant.
pub fn question_generation_prompt(
    role: &str,
    level: &str,
    techstack: &str,
    focus: &str,
    amount: i64,
) -> String {
    format!(
        "Prepare questions for a job interview.\n\
         The job role is {role}.\n\
         The job experience level is {level}.\n\
         The job techstack is {techstack}.\n\
         The focus between behavioural and technical questions is lean towards: {focus}.\n\
         The amount of questions required is {amount}.\n\
         Please return only the questions, without any additional text.\n\
         The questions are going to be read by a voice assistant, so please make sure \
         they are clear and easy to understand.\n\
         Thank You!"
    )
}
