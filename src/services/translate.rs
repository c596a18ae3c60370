//! Client for the external translation collaborator (LibreTranslate-style
//! HTTP API). Article content is stripped of markup before it is sent;
//! failures surface to the caller, which degrades that request only.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::config::TranslationConfig;

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("markup tag pattern is valid"));

/// Remove markup tags, leaving the visible text.
#[must_use]
pub fn strip_markup(text: &str) -> String {
    MARKUP_TAG.replace_all(text, "").into_owned()
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

pub struct TranslationClient {
    client: Client,
    config: TranslationConfig,
}

impl TranslationClient {
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .context("Failed to build translation HTTP client")?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn default_target(&self) -> &str {
        &self.config.default_target
    }

    /// Translate `text` into `target`. `text` is expected to be plain text;
    /// callers strip markup first via [`strip_markup`].
    pub async fn translate(&self, text: &str, target: &str) -> Result<String> {
        if !self.config.enabled {
            anyhow::bail!("Translation service is not configured");
        }

        let url = format!("{}/translate", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "q": text,
                "source": "auto",
                "target": target,
                "format": "text",
            }))
            .send()
            .await
            .context("Translation request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Translation service returned {}", response.status());
        }

        let body: TranslateResponse = response
            .json()
            .await
            .context("Translation response was not valid JSON")?;

        Ok(body.translated_text)
    }
}
