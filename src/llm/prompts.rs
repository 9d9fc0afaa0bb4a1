//! Prompt templates for problem/solution extraction.
//!
//! The hosted provider gets a system/user message pair and is asked for a JSON
//! array; the local provider gets one composed prompt asking for an object
//! with a `results` array. The normalizer accepts both shapes.

/// System message sent to the hosted provider.
pub const HOSTED_SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes chat conversations and extracts problems and their solutions. Your output should be a valid JSON array of objects, where each object has 'problem' and 'solution' fields.";

/// Instruction preceding the transcript in the hosted user message.
const HOSTED_USER_INSTRUCTION: &str = "Extract problems and their solutions from this chat conversation. Return your analysis as a JSON array of objects with 'problem' and 'solution' fields:";

/// Instructions and formatting example for the local provider.
const LOCAL_PROMPT_PREAMBLE: &str = r#"You are a helpful assistant that analyzes chat conversations and extracts problems and their solutions.

I will provide you with a chat conversation.
Your task is to extract problems and their solutions discussed in the chat.

Format your response as a valid JSON object with a "results" property containing an array of objects,
where each object has "problem" and "solution" fields.

Example format:
{
  "results": [
    {
      "problem": "Description of the first problem",
      "solution": "Description of the solution to the first problem"
    },
    {
      "problem": "Description of the second problem",
      "solution": "Description of the solution to the second problem"
    }
  ]
}

Only respond with valid JSON. Do not include any other text before or after the JSON.

Here is the chat conversation to analyze:"#;

/// Builds the hosted user message.
#[must_use]
pub fn hosted_user_prompt(chat_text: &str) -> String {
    format!("{HOSTED_USER_INSTRUCTION}\n\n{chat_text}")
}

/// Builds the single prompt sent to the local provider.
///
/// The transcript is appended verbatim.
#[must_use]
pub fn local_prompt(chat_text: &str) -> String {
    format!("{LOCAL_PROMPT_PREAMBLE}\n\n{chat_text}\n")
}
