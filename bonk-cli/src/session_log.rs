use std::io::Write;
use std::path::{Path, PathBuf};

use bonk_core::{BonkConfig, Turn};

pub fn sessions_dir() -> PathBuf {
    BonkConfig::data_dir().join("sessions")
}

/// Append-only JSONL record of one run.
pub struct SessionLogger {
    file: std::io::BufWriter<std::fs::File>,
    path: PathBuf,
    session_id: String,
}

impl SessionLogger {
    /// Start a new log under ~/.bonk/sessions.
    pub fn new(backend: &str) -> anyhow::Result<Self> {
        Self::create_in(&sessions_dir(), backend)
    }

    pub fn create_in(dir: &Path, backend: &str) -> anyhow::Result<Self> {
        std::fs::create_dir_all(dir)?;

        let now = chrono::Local::now();
        let session_id = uuid::Uuid::new_v4().to_string();
        // Suffix keeps two runs started in the same second apart.
        let filename = format!("{}_{}.jsonl", now.format("%Y%m%d_%H%M%S"), &session_id[..8]);
        let path = dir.join(filename);
        let file = std::io::BufWriter::new(std::fs::File::create(&path)?);

        let mut logger = Self {
            file,
            path,
            session_id: session_id.clone(),
        };
        logger.write_json(&serde_json::json!({
            "type": "session_start",
            "session_id": session_id,
            "ts": now.to_rfc3339(),
            "backend": backend,
            "cwd": std::env::current_dir().ok().map(|p| p.to_string_lossy().to_string()),
        }))?;

        Ok(logger)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_json(&mut self, value: &serde_json::Value) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.file, value)?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        Ok(())
    }

    fn log(&mut self, mut value: serde_json::Value) {
        if let serde_json::Value::Object(ref mut map) = value {
            map.insert(
                "ts".into(),
                serde_json::Value::String(chrono::Local::now().to_rfc3339()),
            );
            map.insert(
                "session_id".into(),
                serde_json::Value::String(self.session_id.clone()),
            );
        }
        if let Err(e) = self.write_json(&value) {
            tracing::warn!("Session log write failed: {e}");
        }
    }

    pub fn log_user_input(&mut self, input: &str) {
        self.log(serde_json::json!({
            "type": "user_input",
            "content": input,
        }));
    }

    pub fn log_reply(&mut self, turn: &Turn) {
        self.log(serde_json::json!({
            "type": "model_reply",
            "failed": turn.failed,
            "reply": turn.reply,
        }));
    }

    pub fn log_meme(&mut self, prompt: &str, style: &str, saved_to: Option<&str>) {
        self.log(serde_json::json!({
            "type": "meme",
            "prompt": prompt,
            "style": style,
            "saved_to": saved_to,
        }));
    }

    pub fn log_reset(&mut self) {
        self.log(serde_json::json!({ "type": "reset" }));
    }
}

#[cfg(test)]
mod tests {
    use bonk_core::ParsedResponse;

    use super::*;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn records_are_appended_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = SessionLogger::create_in(dir.path(), "demo").unwrap();
        logger.log_user_input("make pong");
        logger.log_reply(&Turn {
            reply: ParsedResponse::parse("ok ```html <p>pong</p> ```\nVibe Upgrades:\n- add AI"),
            failed: false,
        });
        logger.log_meme("bonk gpt", "cartoon", None);
        logger.log_reset();

        let lines = read_lines(logger.path());
        let types: Vec<&str> = lines.iter().map(|v| v["type"].as_str().unwrap()).collect();
        assert_eq!(
            types,
            vec!["session_start", "user_input", "model_reply", "meme", "reset"]
        );
        assert_eq!(lines[0]["backend"], "demo");
        assert_eq!(lines[1]["content"], "make pong");
        assert_eq!(lines[2]["reply"]["code"], "<p>pong</p>");
        assert_eq!(lines[2]["reply"]["upgrades"][0], "add AI");
        assert_eq!(lines[2]["failed"], false);
        assert!(lines[3]["saved_to"].is_null());
        assert_eq!(lines[4]["session_id"], lines[0]["session_id"]);
    }

    #[test]
    fn two_sessions_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = SessionLogger::create_in(dir.path(), "demo").unwrap();
        let b = SessionLogger::create_in(dir.path(), "demo").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
