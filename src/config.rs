use crate::error::{CareLabelError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// 履歴の保存スロット名
pub const HISTORY_SLOT: &str = "washing-machine-history";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    /// HTTPトランスポートのタイムアウト。ゲートウェイ自身は時間制限を持たない
    pub timeout_seconds: u64,
    pub bind: String,
    pub history_path: Option<PathBuf>,
}

// APIキーはログに出さない
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("bind", &self.bind)
            .field("history_path", &self.history_path)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
            timeout_seconds: 120,
            bind: DEFAULT_BIND.into(),
            history_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env();
        Ok(config)
    }

    /// 設定ファイルのみを読み込む（環境変数は反映しない）
    pub fn load_file() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CareLabelError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("care-label-ai").join("config.json"))
    }

    /// 環境変数を優先して反映
    fn apply_env(&mut self) {
        if let Some(key) = non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(base) = non_empty_env("GEMINI_API_BASE") {
            self.api_base = base;
        }
    }

    /// 有効なAPIキー（空文字は未設定扱い）
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history_path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| CareLabelError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data_dir.join("care-label-ai").join(format!("{}.json", HISTORY_SLOT)))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout_seconds, 120);
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = Config {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config {
            api_key: Some("secret-key-123".into()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key-123"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"model": "gemini-2.5-flash"}"#).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_explicit_history_path() {
        let config = Config {
            history_path: Some(PathBuf::from("/tmp/history.json")),
            ..Default::default()
        };
        assert_eq!(config.history_path().unwrap(), PathBuf::from("/tmp/history.json"));
    }
}
