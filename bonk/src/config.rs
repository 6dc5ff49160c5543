use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variables probed for an API key, in order. Each hosting
/// target the web build shipped to exposed the key under its own name.
pub const ENV_KEY_VARS: &[&str] = &[
    "API_KEY",
    "GEMINI_API_KEY",
    "GOOGLE_API_KEY",
    "VITE_API_KEY",
    "VITE_GEMINI_API_KEY",
    "NEXT_PUBLIC_GEMINI_API_KEY",
];

/// Stored configuration: API key plus model and style preferences.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BonkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl BonkConfig {
    /// `~/.bonk`
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bonk")
    }

    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.json")
    }

    /// Load from ~/.bonk/config.json.
    pub fn load() -> Option<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Missing or malformed files load as `None`.
    pub fn load_from(path: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Ignoring malformed config {}: {e}", path.display());
                None
            }
        }
    }

    /// Save to ~/.bonk/config.json (mode 0o600)
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, &data)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Delete ~/.bonk/config.json
    pub fn clear() -> Result<(), std::io::Error> {
        Self::clear_at(&Self::config_path())
    }

    /// A missing file is already clear.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// One place an API key may come from.
#[derive(Clone, Debug, PartialEq)]
pub enum KeySource {
    /// A value handed over directly, e.g. a command-line flag.
    Explicit { name: String, value: Option<String> },
    /// A process environment variable.
    Env(String),
    /// The `api_key` field of the stored config.
    Stored(Option<String>),
}

impl KeySource {
    pub fn name(&self) -> String {
        match self {
            KeySource::Explicit { name, .. } => name.clone(),
            KeySource::Env(var) => format!("env:{var}"),
            KeySource::Stored(_) => "config".to_string(),
        }
    }

    fn probe(&self, env: &dyn Fn(&str) -> Option<String>) -> Option<String> {
        let value = match self {
            KeySource::Explicit { value, .. } => value.clone(),
            KeySource::Env(var) => env(var.as_str()),
            KeySource::Stored(value) => value.clone(),
        }?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// A key together with the source that supplied it.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedKey {
    pub key: String,
    pub source: String,
}

/// Ordered list of key sources; the first non-empty one wins.
#[derive(Clone, Debug, Default)]
pub struct KeyChain {
    sources: Vec<KeySource>,
}

impl KeyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag value, then every [`ENV_KEY_VARS`] entry, then the stored config.
    pub fn standard(flag: Option<String>, config: Option<&BonkConfig>) -> Self {
        let mut chain = Self::new().add(KeySource::Explicit {
            name: "--api-key".into(),
            value: flag,
        });
        for var in ENV_KEY_VARS {
            chain = chain.add(KeySource::Env((*var).to_string()));
        }
        chain.add(KeySource::Stored(config.and_then(|c| c.api_key.clone())))
    }

    pub fn add(mut self, source: KeySource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources(&self) -> &[KeySource] {
        &self.sources
    }

    /// Resolve against the process environment.
    pub fn resolve(&self) -> Option<ResolvedKey> {
        self.resolve_with(&|var: &str| std::env::var(var).ok())
    }

    pub fn resolve_with(&self, env: &dyn Fn(&str) -> Option<String>) -> Option<ResolvedKey> {
        self.sources.iter().find_map(|source| {
            source.probe(env).map(|key| {
                tracing::debug!("API key resolved from {}", source.name());
                ResolvedKey {
                    key,
                    source: source.name(),
                }
            })
        })
    }
}
