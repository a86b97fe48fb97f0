//! Endpoint and theme configuration.
//!
//! Layers, lowest to highest precedence: built-in defaults, an optional TOML
//! file, environment variables, then whatever the caller sets on the builder
//! afterwards (CLI flags in the terminal app).

use std::{fs, path::Path};

use serde::Deserialize;
use url::Url;

use crate::{error::ConfigError, theme::Theme};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CONFIG_FILE: &str = "rag-chat.toml";
const INGEST_PATH: &str = "upload";
const QUERY_PATH: &str = "chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub ingestion_endpoint: Url,
    pub query_endpoint: Url,
    pub theme: Theme,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Both endpoints derived from a single service root, e.g. `https://host/api`.
    pub fn from_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Self::builder().base_url(base_url).build()
    }

    /// Resolves defaults, the config file and the process environment.
    ///
    /// An explicit `path` must exist; otherwise `rag-chat.toml` in the working
    /// directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<ClientConfigBuilder, ConfigError> {
        let mut builder = Self::builder();
        match path {
            Some(path) => builder = builder.merge_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.merge_file(default_path)?;
                }
            }
        }
        Ok(builder.merge_env(|key| std::env::var(key).ok()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    base_url: Option<String>,
    ingestion_endpoint: Option<String>,
    query_endpoint: Option<String>,
    theme: Option<Theme>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    ingestion_endpoint: Option<String>,
    query_endpoint: Option<String>,
    theme: Option<Theme>,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.base_url = Some(value.into());
        self
    }

    pub fn ingestion_endpoint(mut self, value: impl Into<String>) -> Self {
        self.ingestion_endpoint = Some(value.into());
        self
    }

    pub fn query_endpoint(mut self, value: impl Into<String>) -> Self {
        self.query_endpoint = Some(value.into());
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn merge_toml(mut self, raw: &str, origin: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        if let Some(v) = file.base_url {
            self.base_url = Some(v);
        }
        if let Some(v) = file.ingestion_endpoint {
            self.ingestion_endpoint = Some(v);
        }
        if let Some(v) = file.query_endpoint {
            self.query_endpoint = Some(v);
        }
        if let Some(v) = file.theme {
            self.theme = Some(v);
        }
        Ok(self)
    }

    pub fn merge_file(self, path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: origin.clone(),
            source,
        })?;
        self.merge_toml(&raw, &origin)
    }

    /// Applies `RAG_CHAT_*` variables, then their `APP__*` aliases.
    ///
    /// Unparseable themes are ignored here and left to the earlier layers.
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for key in ["RAG_CHAT_BASE_URL", "APP__BASE_URL"] {
            if let Some(v) = lookup(key) {
                self.base_url = Some(v);
            }
        }
        for key in ["RAG_CHAT_INGEST_URL", "APP__INGESTION_ENDPOINT"] {
            if let Some(v) = lookup(key) {
                self.ingestion_endpoint = Some(v);
            }
        }
        for key in ["RAG_CHAT_QUERY_URL", "APP__QUERY_ENDPOINT"] {
            if let Some(v) = lookup(key) {
                self.query_endpoint = Some(v);
            }
        }
        for key in ["RAG_CHAT_THEME", "APP__THEME"] {
            if let Some(theme) = lookup(key).and_then(|v| v.parse().ok()) {
                self.theme = Some(theme);
            }
        }
        self
    }

    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_raw = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base = parse_http_url("base", &base_with_trailing_slash(&base_raw))?;

        let ingestion_endpoint = match self.ingestion_endpoint {
            Some(raw) => parse_http_url("ingestion", &raw)?,
            None => join_endpoint(&base, INGEST_PATH),
        };
        let query_endpoint = match self.query_endpoint {
            Some(raw) => parse_http_url("query", &raw)?,
            None => join_endpoint(&base, QUERY_PATH),
        };

        Ok(ClientConfig {
            ingestion_endpoint,
            query_endpoint,
            theme: self.theme.unwrap_or_default(),
        })
    }
}

fn parse_http_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            field,
            value: raw.to_string(),
        });
    }
    Ok(url)
}

fn base_with_trailing_slash(raw: &str) -> String {
    let raw = raw.trim();
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    }
}

fn join_endpoint(base: &Url, path: &str) -> Url {
    // Relative single-segment joins onto a directory-style http url cannot fail.
    base.join(path).unwrap_or_else(|_| base.clone())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
