// Prompt assembly for the chat assistant
//
// Combines the user's message with an optional now-playing snippet into
// the final prompt text. Pure string work: the snippet has already been
// fetched by the caller, nothing here does I/O.

use serde::{Deserialize, Serialize};

/// Short description of what the user is listening to right now.
/// Zero or one per chat turn; absence simply means no context line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnippet {
    pub track_name: String,
    pub artist_names: Vec<String>,
}

impl ContextSnippet {
    fn context_line(&self) -> String {
        format!(
            "[Context: User is currently listening to '{}' by '{}']",
            self.track_name,
            self.artist_names.join(", ")
        )
    }
}

pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the prompt sent to the LLM gateway.
    pub fn assemble(user_message: &str, now_playing: Option<&ContextSnippet>) -> String {
        match now_playing {
            Some(snippet) => format!(
                "{}\nUser: {}\nAssistant:",
                snippet.context_line(),
                user_message
            ),
            None => format!("User: {}\nAssistant:", user_message),
        }
    }
}
