//! 解析ゲートウェイ
//!
//! 画像（Data URL）を受け取り、固定プロンプトと一緒に外部モデルへ送り、
//! 応答からJSONを取り出して AnalysisOutcome に変換する。
//! 呼び出しは毎回独立（キャッシュ・重複排除なし）、自動リトライもしない

mod error;
mod gemini;
mod model;

pub use error::AnalysisError;
pub use gemini::GeminiClient;
pub use model::VisionModel;

use crate::config::Config;
use crate::error::Result;
use care_label_common::{
    judge_reply, parse_data_url, AnalysisOutcome, CareAnalysis, ModelVerdict, CARE_LABEL_PROMPT,
};
use serde::Deserialize;
use std::sync::Arc;

/// リクエスト本文 `{ "image": "<data url>" }`
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone)]
pub struct Gateway {
    model: Option<Arc<dyn VisionModel>>,
}

impl Gateway {
    /// モデルが None の場合、すべての解析は Misconfigured になる
    pub fn new(model: Option<Arc<dyn VisionModel>>) -> Self {
        Self { model }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let model = GeminiClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn VisionModel>);
        if model.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; analyze requests will fail as misconfigured");
        }
        Ok(Self::new(model))
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// 画像を解析して統一結果を返す（失敗も Failure として返す）
    pub async fn analyze(&self, image: Option<&str>) -> AnalysisOutcome {
        match self.classify(image).await {
            Ok(analysis) => AnalysisOutcome::Success(analysis),
            Err(err) => err.into(),
        }
    }

    /// HTTP本文（JSONバイト列）から解析
    ///
    /// 設定チェックは本文の解釈より先に行う
    pub async fn analyze_body(&self, body: &[u8]) -> std::result::Result<CareAnalysis, AnalysisError> {
        let outcome = match self.model() {
            Ok(model) => run_body(model, body).await,
            Err(err) => Err(err),
        };
        log_outcome(&outcome);
        outcome
    }

    /// 画像を解析し、失敗は分類済みエラーとして返す
    pub async fn classify(&self, image: Option<&str>) -> std::result::Result<CareAnalysis, AnalysisError> {
        let outcome = match self.model() {
            Ok(model) => run(model, image).await,
            Err(err) => Err(err),
        };
        log_outcome(&outcome);
        outcome
    }

    fn model(&self) -> std::result::Result<&dyn VisionModel, AnalysisError> {
        self.model.as_deref().ok_or(AnalysisError::Misconfigured)
    }
}

async fn run_body(
    model: &dyn VisionModel,
    body: &[u8],
) -> std::result::Result<CareAnalysis, AnalysisError> {
    let request: AnalyzeRequest = serde_json::from_slice(body)
        .map_err(|e| AnalysisError::Unexpected(format!("request body: {}", e)))?;
    run(model, request.image.as_deref()).await
}

async fn run(
    model: &dyn VisionModel,
    image: Option<&str>,
) -> std::result::Result<CareAnalysis, AnalysisError> {
    let image = image
        .filter(|s| !s.is_empty())
        .ok_or(AnalysisError::MissingImage)?;
    let data_url = parse_data_url(image).map_err(|_| AnalysisError::MalformedImage)?;

    tracing::debug!(
        mime_type = data_url.mime_type,
        payload_len = data_url.data.len(),
        "sending image to model"
    );

    let reply = model
        .generate(CARE_LABEL_PROMPT, data_url)
        .await
        .map_err(|e| AnalysisError::Unexpected(format!("{:#}", e)))?;

    tracing::debug!(reply_len = reply.len(), "model replied");

    match judge_reply(&reply) {
        Ok(ModelVerdict::Usable(analysis)) => Ok(analysis),
        Ok(ModelVerdict::LowConfidence) => Err(AnalysisError::LowConfidence),
        Err(care_label_common::Error::Parse(_)) => Err(AnalysisError::UnparsableResponse),
        Err(e) => Err(AnalysisError::Unexpected(format!("model reply: {}", e))),
    }
}

fn log_outcome(outcome: &std::result::Result<CareAnalysis, AnalysisError>) {
    match outcome {
        Ok(analysis) => tracing::info!(
            detected = analysis.detected.len(),
            notes = analysis.notes.len(),
            "analysis succeeded"
        ),
        Err(AnalysisError::Unexpected(detail)) => {
            tracing::error!(kind = "unexpected", "analysis failed: {}", detail)
        }
        Err(err @ AnalysisError::Misconfigured) => {
            tracing::error!(kind = err.kind(), "analysis failed: {}", err)
        }
        Err(err) => tracing::warn!(kind = err.kind(), "analysis failed: {}", err),
    }
}
