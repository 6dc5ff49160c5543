use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gemini::{GeminiClient, GeminiError};
use crate::persona::{self, CHAIN_ERROR, EMPTY_REPLY, GREETING, RESET_GREETING};
use crate::response::ParsedResponse;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One displayed message. Model entries hold the narrative, not the raw reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upgrades: Vec<String>,
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            upgrades: Vec::new(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            upgrades: Vec::new(),
        }
    }
}

/// Something that answers a chat turn given the conversation so far.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_message(
        &self,
        message: &str,
        history: &[ChatEntry],
    ) -> Result<String, GeminiError>;

    /// Short label for logs and the status line.
    fn label(&self) -> String;
}

#[async_trait::async_trait]
impl ChatBackend for GeminiClient {
    async fn send_message(
        &self,
        message: &str,
        history: &[ChatEntry],
    ) -> Result<String, GeminiError> {
        GeminiClient::send_message(self, message, history).await
    }

    fn label(&self) -> String {
        self.model().to_string()
    }
}

/// Offline stand-in used when no API key is configured.
pub struct DemoBackend {
    delay: Duration,
}

impl DemoBackend {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_millis(1500),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChatBackend for DemoBackend {
    async fn send_message(
        &self,
        _message: &str,
        _history: &[ChatEntry],
    ) -> Result<String, GeminiError> {
        let reply = persona::demo_reply(&mut rand::rng());
        tokio::time::sleep(self.delay).await;
        Ok(reply)
    }

    fn label(&self) -> String {
        "demo".to_string()
    }
}

/// The latest extracted code block.
#[derive(Clone, Debug, PartialEq)]
pub struct Workspace {
    pub code: String,
    /// Bumped on every replacement.
    pub revision: u64,
}

/// Result of one submitted message.
#[derive(Clone, Debug, PartialEq)]
pub struct Turn {
    pub reply: ParsedResponse,
    /// The backend call failed and the reply is the canned error text.
    pub failed: bool,
}

/// Append-only conversation plus the workspace it feeds.
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    log: Vec<ChatEntry>,
    workspace: Option<Workspace>,
    revisions: u64,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            log: vec![ChatEntry::model(GREETING)],
            workspace: None,
            revisions: 0,
        }
    }

    pub fn backend_label(&self) -> String {
        self.backend.label()
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.log
    }

    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    /// Send `input` and record the reply. Blank input is ignored.
    pub async fn submit(&mut self, input: &str) -> Option<Turn> {
        if input.trim().is_empty() {
            return None;
        }

        // History is the log as it stood before this message.
        let history = self.log.clone();
        self.log.push(ChatEntry::user(input));

        let turn = match self.backend.send_message(input, &history).await {
            Ok(raw) => {
                let raw = if raw.trim().is_empty() {
                    tracing::warn!("Model returned empty response");
                    EMPTY_REPLY.to_string()
                } else {
                    raw
                };
                Turn {
                    reply: ParsedResponse::parse(&raw),
                    failed: false,
                }
            }
            Err(e) => {
                tracing::error!("Chat turn failed via {}: {e}", self.backend.label());
                Turn {
                    reply: ParsedResponse::parse(CHAIN_ERROR),
                    failed: true,
                }
            }
        };

        self.log.push(ChatEntry {
            role: ChatRole::Model,
            text: turn.reply.narrative.clone(),
            upgrades: turn.reply.upgrades.clone(),
        });

        if let Some(code) = &turn.reply.code {
            self.revisions += 1;
            self.workspace = Some(Workspace {
                code: code.clone(),
                revision: self.revisions,
            });
        }

        Some(turn)
    }

    /// Forget the conversation and the workspace.
    pub fn reset(&mut self) {
        self.log = vec![ChatEntry::model(RESET_GREETING)];
        self.workspace = None;
    }
}
