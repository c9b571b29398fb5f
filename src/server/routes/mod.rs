mod generate;
mod meta;
mod speech;

pub use generate::{GenerateBody, generate_handler};
pub use meta::{health_handler, modes_handler};
pub use speech::{SpeechBody, speech_handler};
