// ABOUTME: Persistence and scraping of the ZDF API bearer token.
// ABOUTME: The token lives in a plain text file and is refreshed from a public ZDF page.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

/// Default location of the token file, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = "tokens/api.zdf.de.txt";

static API_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""apiToken"\s*:\s*"([^"]+)""#).expect("valid token regex"));

/// A bearer token stored in a text file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored token, trimmed. Missing or unreadable files give an empty token.
    pub fn read(&self) -> String {
        match fs::read_to_string(&self.path) {
            Ok(token) => token.trim().to_string(),
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read API token");
                String::new()
            }
        }
    }

    pub fn write(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_FILE)
    }
}

/// Finds the `"apiToken": "..."` value embedded in a ZDF page.
pub fn extract_api_token(html: &str) -> Option<String> {
    API_TOKEN
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty())
}
