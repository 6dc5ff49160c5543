pub mod chat;
pub mod config;
pub mod gemini;
pub mod meme;
pub mod persona;
pub mod response;

#[cfg(test)]
mod test_http;

// Re-exports
pub use chat::{ChatBackend, ChatEntry, ChatRole, ChatSession, DemoBackend, Turn, Workspace};
pub use config::{BonkConfig, KeyChain, KeySource, ResolvedKey};
pub use gemini::{GeminiClient, GeminiError};
pub use meme::{DataUrl, DataUrlError, MemeFactory, MemeImage, MemeStyle};
pub use response::{CODE_PLACEHOLDER, ParsedResponse, parse};
