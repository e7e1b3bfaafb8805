//! Grading prompt construction.

use crate::rubric::Rubric;

/// Builds the prompt asking the model to judge one response against a rubric.
///
/// The student's text goes in verbatim between triple-quote delimiters, the
/// rubric is rendered as its numbered list, and the model is told to answer
/// with a JSON array of the satisfied criterion ids (an empty array when
/// none are).
pub fn grading_prompt(rubric: &Rubric, response: &str) -> String {
    format!(
        "The student responded to the question with the following text, \
         delimited by triple quotes:\n\
         \n\
         \"\"\"\n\
         {response}\n\
         \"\"\"\n\
         \n\
         Please assess which of the numbered criteria below are met by the \
         student's response:\n\
         \n\
         {rubric}\n\
         Your response should be a JSON array containing integers, where each \
         integer corresponds to a criterion in the list which has been \
         satisfied. If no criteria are satisfied, respond with an empty array.\n"
    )
}
