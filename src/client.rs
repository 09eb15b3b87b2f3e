//! 起動中のゲートウェイへ解析を依頼するクライアント

use crate::error::Result;
use care_label_common::AnalysisOutcome;
use serde_json::json;
use std::time::Duration;

/// ゲートウェイに到達できなかった場合のメッセージ
pub const TRANSPORT_ERROR_MESSAGE: &str = "通信エラーが発生しました";

pub struct GatewayClient {
    http: reqwest::Client,
    url: String,
}

impl GatewayClient {
    pub fn new(server: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: format!("{}/api/analyze", server.trim_end_matches('/')),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 解析を依頼する
    ///
    /// HTTPステータスに関係なく本文を結果として扱う。
    /// 通信や本文の解釈に失敗した場合は再試行可能な Failure
    pub async fn analyze(&self, image: &str) -> AnalysisOutcome {
        match self.post(image).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(url = %self.url, "gateway request failed: {}", e);
                AnalysisOutcome::failure(TRANSPORT_ERROR_MESSAGE, true)
            }
        }
    }

    async fn post(&self, image: &str) -> Result<AnalysisOutcome> {
        let resp = self
            .http
            .post(&self.url)
            .json(&json!({ "image": image }))
            .send()
            .await?;
        tracing::debug!(status = %resp.status(), "gateway responded");
        Ok(resp.json::<AnalysisOutcome>().await?)
    }
}
