// Models module

pub mod chat;

pub use chat::{
    Candidate, CandidateContent, ChatCompletionChoice, ChatCompletionMessage,
    ChatCompletionResponse, ChatRequest, ChatResponse, ChatTurn, Part, SystemInstruction,
};
