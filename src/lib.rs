pub mod config;
pub mod conversation;
pub mod error;
pub mod orchestrator;
pub mod persona;
pub mod server;
pub(crate) mod utils;

pub use error::AtomlinkError;
pub use orchestrator::{GenerationResult, Orchestrator, SpeechAudio};
