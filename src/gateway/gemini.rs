//! Gemini API連携
//!
//! `models/{model}:generateContent` に指示文と画像を1リクエストで送る

use super::model::VisionModel;
use crate::config::Config;
use crate::error::Result;
use anyhow::Context;
use care_label_common::DataUrl;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini APIリクエスト
#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Gemini APIレスポンス
#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, api_base: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint_for_model(api_base, model),
            api_key: api_key.to_string(),
        })
    }

    /// APIキーがなければ None
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(key) = config.api_key() else {
            return Ok(None);
        };
        let client = Self::new(
            key,
            &config.model,
            &config.api_base,
            Duration::from_secs(config.timeout_seconds),
        )?;
        tracing::debug!(endpoint = client.endpoint(), "gemini client ready");
        Ok(Some(client))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn endpoint_for_model(api_base: &str, model: &str) -> String {
    let base = api_base.trim().trim_end_matches('/');
    let model = model.trim();
    let model_path = if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    };
    format!("{}/{}:generateContent", base, model_path)
}

/// 先頭候補のテキストパートを連結
fn response_text(response: GeminiResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait::async_trait]
impl VisionModel for GeminiClient {
    async fn generate(&self, instruction: &str, image: DataUrl<'_>) -> anyhow::Result<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: instruction },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type,
                            data: image.data,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig { temperature: 0.1 },
        };

        // キーはクエリではなくヘッダーで渡す（エラー表示にURLが含まれるため）
        let resp = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let preview: String = body.chars().take(300).collect();
            anyhow::bail!("Gemini API error {}: {}", status, preview);
        }

        let payload: GeminiResponse = resp.json().await.context("invalid Gemini response body")?;
        response_text(payload).ok_or_else(|| anyhow::anyhow!("Gemini returned no text"))
    }
}
