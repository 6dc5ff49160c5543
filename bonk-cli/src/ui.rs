use std::path::Path;

use bonk_core::{ChatEntry, ChatRole, Turn};

// ── Palette ────────────────────────────────────────────────────────
pub const BONK_ORANGE: &str = "\x1b[38;2;247;147;26m"; // #f7931a
pub const CHALK: &str = "\x1b[38;2;232;228;208m"; // #e8e4d0
pub const ASH_TEXT: &str = "\x1b[38;2;90;90;80m"; // #5a5a50
pub const LICHEN: &str = "\x1b[38;2;138;158;108m"; // #8a9e6c
pub const ERR: &str = "\x1b[38;2;204;68;68m"; // #c44
pub const BOLD: &str = "\x1b[1m";
pub const RESET: &str = "\x1b[0m";

pub const PROMPT_CHAR: &str = "❯";
pub const UPGRADE_BULLET: &str = "🚀";

/// ANSI painter that can be switched off (`--no-color`, non-tty output).
#[derive(Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn prompt(&self) -> String {
        format!("{} ", self.bold(BONK_ORANGE, PROMPT_CHAR))
    }

    /// A log entry as it appears in the transcript.
    pub fn entry(&self, entry: &ChatEntry) -> String {
        let mut out = match entry.role {
            ChatRole::User => format!("{} {}", self.paint(ASH_TEXT, "you:"), entry.text),
            ChatRole::Model => format!(
                "{}\n{}",
                self.bold(BONK_ORANGE, "Bonk GPT"),
                self.paint(CHALK, &entry.text)
            ),
        };
        let upgrades = self.upgrades(&entry.upgrades);
        if !upgrades.is_empty() {
            out.push_str("\n\n");
            out.push_str(&upgrades);
        }
        out
    }

    /// The upgrades box, empty when there are none.
    pub fn upgrades(&self, upgrades: &[String]) -> String {
        if upgrades.is_empty() {
            return String::new();
        }
        let mut lines = vec![self.bold(LICHEN, &format!("{UPGRADE_BULLET} Vibe Upgrades"))];
        lines.extend(
            upgrades
                .iter()
                .enumerate()
                .map(|(i, u)| format!("  {}. {u}", i + 1)),
        );
        lines.join("\n")
    }

    /// Reply printed after a chat turn, plus where the code went.
    pub fn turn(&self, turn: &Turn, workspace: Option<(&Path, u64)>) -> String {
        let body = if turn.failed {
            self.paint(ERR, &turn.reply.narrative)
        } else {
            self.paint(CHALK, &turn.reply.narrative)
        };
        let mut out = format!("{}\n{body}", self.bold(BONK_ORANGE, "Bonk GPT"));
        let upgrades = self.upgrades(&turn.reply.upgrades);
        if !upgrades.is_empty() {
            out.push_str("\n\n");
            out.push_str(&upgrades);
        }
        if let Some((path, revision)) = workspace {
            out.push_str("\n\n");
            out.push_str(&self.paint(
                ASH_TEXT,
                &format!("workspace r{revision} → {}", path.display()),
            ));
        }
        out
    }

    pub fn notice(&self, text: &str) -> String {
        self.paint(ASH_TEXT, text)
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(ERR, text)
    }
}
