// Chat wire models
// Gemini request/response shapes plus the OpenAI-compatible shape used by OpenRouter

use serde::{Deserialize, Serialize};

/// One text fragment of a turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub text: String,
}

/// One conversation turn in the Gemini shape
///
/// Roles are `"user"` and `"model"` from the widget; anything else is
/// forwarded untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub parts: Vec<Part>,
}

/// The steering prompt applied before the conversation turns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

/// Request body accepted from the widget frontend
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatTurn>,
    #[serde(rename = "systemInstruction")]
    pub system_instruction: SystemInstruction,
}

impl ChatRequest {
    /// Reject empty `parts` arrays before anything leaves the proxy.
    /// The first part carries the turn text, so an empty array has nothing to forward.
    pub fn validate(&self) -> Result<(), String> {
        if self.system_instruction.parts.is_empty() {
            return Err("systemInstruction.parts must not be empty".to_string());
        }
        for (i, turn) in self.messages.iter().enumerate() {
            if turn.parts.is_empty() {
                return Err(format!("messages[{}].parts must not be empty", i));
            }
        }
        Ok(())
    }
}

/// Response envelope returned to the widget (Gemini shape, regardless of provider)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub content: CandidateContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateContent {
    pub parts: Vec<Part>,
}

/// One message in the OpenAI-compatible shape (OpenRouter)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionMessage {
    pub role: String,
    pub content: String,
}

/// Success body of an OpenAI-compatible chat completion
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
}
