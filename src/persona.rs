//! Chat modes and the assistant persona they are layered on.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are Atom AI, a highly advanced, intelligent, and friendly AI assistant.
You are witty, concise, and extremely knowledgeable.
When in STUDY mode, break down complex topics into simple terms.
When analyzing images, look for text, diagrams, or objects and explain them clearly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    #[default]
    #[serde(alias = "General Helper")]
    General,
    #[serde(alias = "Study Partner")]
    Study,
    #[serde(alias = "Coding Assistant")]
    Coding,
    #[serde(alias = "Creative Writer")]
    Creative,
}

impl ChatMode {
    pub const ALL: [ChatMode; 4] = [
        ChatMode::General,
        ChatMode::Study,
        ChatMode::Coding,
        ChatMode::Creative,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChatMode::General => "General Helper",
            ChatMode::Study => "Study Partner",
            ChatMode::Coding => "Coding Assistant",
            ChatMode::Creative => "Creative Writer",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            ChatMode::General => "You are a helpful general assistant.",
            ChatMode::Study => {
                "You are an expert academic tutor. Explain concepts clearly, step-by-step."
            }
            ChatMode::Coding => {
                "You are a senior software engineer. Provide clean, efficient code."
            }
            ChatMode::Creative => "You are a creative writer. Use evocative language.",
        }
    }

    /// Persona followed by a `MODE:` line for this mode.
    pub fn system_instruction(self) -> String {
        format!("{DEFAULT_SYSTEM_INSTRUCTION}\nMODE: {}", self.prompt())
    }
}

/// Catalog entry served to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeDescriptor {
    pub id: ChatMode,
    pub label: &'static str,
    pub prompt: &'static str,
}

pub fn mode_catalog() -> Vec<ModeDescriptor> {
    ChatMode::ALL
        .into_iter()
        .map(|mode| ModeDescriptor {
            id: mode,
            label: mode.label(),
            prompt: mode.prompt(),
        })
        .collect()
}
