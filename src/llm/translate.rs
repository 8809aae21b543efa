// Wire-format reshaping between the Gemini and OpenAI-compatible chat shapes

use crate::models::{
    Candidate, CandidateContent, ChatCompletionMessage, ChatResponse, ChatTurn, Part,
    SystemInstruction,
};

/// Translate a Gemini-shape conversation into the OpenAI-compatible message list.
///
/// The system instruction becomes the leading `system` message, then one
/// message per turn in conversation order. Role `model` maps to `assistant`;
/// any other role is carried through unchanged.
pub fn to_chat_completion_messages(
    system_instruction: &SystemInstruction,
    turns: &[ChatTurn],
) -> Vec<ChatCompletionMessage> {
    let mut messages = Vec::with_capacity(turns.len() + 1);

    messages.push(ChatCompletionMessage {
        role: "system".to_string(),
        content: first_text(&system_instruction.parts),
    });

    for turn in turns {
        let role = if turn.role == "model" {
            "assistant".to_string()
        } else {
            turn.role.clone()
        };
        messages.push(ChatCompletionMessage {
            role,
            content: first_text(&turn.parts),
        });
    }

    messages
}

/// Wrap a plain reply text into the Gemini response envelope the widget expects.
pub fn wrap_reply(text: String) -> ChatResponse {
    ChatResponse {
        candidates: vec![Candidate {
            content: CandidateContent {
                parts: vec![Part { text }],
            },
        }],
    }
}

/// Text of the first part. Request validation guarantees at least one part,
/// so the fallback never shows up in practice.
fn first_text(parts: &[Part]) -> String {
    parts.first().map(|p| p.text.clone()).unwrap_or_default()
}
