//! 解析失敗の分類
//!
//! すべての失敗はゲートウェイ境界で AnalysisOutcome::Failure に変換される。
//! Display はユーザー向けメッセージそのもの

use axum::http::StatusCode;
use care_label_common::{AnalysisFailure, AnalysisOutcome};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// APIキー未設定（運用者側の問題）
    #[error("APIキーが設定されていません")]
    Misconfigured,

    #[error("画像が送信されていません")]
    MissingImage,

    #[error("画像形式が不正です")]
    MalformedImage,

    #[error("解析結果の形式が不正です。別の画像で再度お試しください。")]
    UnparsableResponse,

    #[error("画像が不鮮明か、洗濯タグを認識できませんでした。鮮明な画像を再アップロードしてください。")]
    LowConfidence,

    /// 詳細はログにのみ出力する
    #[error("解析中にエラーが発生しました。しばらく待ってから再度お試しください。")]
    Unexpected(String),
}

impl AnalysisError {
    /// 再試行ボタンを出すべきか（設定エラーのみ false）
    pub fn should_retry(&self) -> bool {
        !matches!(self, Self::Misconfigured)
    }

    /// HTTPステータス
    ///
    /// LowConfidence は論理的な失敗だが 200 で返す（本文の success: false で判別させる）
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingImage | Self::MalformedImage => StatusCode::BAD_REQUEST,
            Self::LowConfidence => StatusCode::OK,
            Self::Misconfigured | Self::UnparsableResponse | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Misconfigured => "misconfigured",
            Self::MissingImage => "missing_image",
            Self::MalformedImage => "malformed_image",
            Self::UnparsableResponse => "unparsable_response",
            Self::LowConfidence => "low_confidence",
            Self::Unexpected(_) => "unexpected",
        }
    }

    pub fn to_failure(&self) -> AnalysisFailure {
        AnalysisFailure::new(self.to_string(), self.should_retry())
    }
}

impl From<AnalysisError> for AnalysisOutcome {
    fn from(err: AnalysisError) -> Self {
        AnalysisOutcome::Failure(err.to_failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_misconfigured_is_not_retryable() {
        assert!(!AnalysisError::Misconfigured.should_retry());
        for err in [
            AnalysisError::MissingImage,
            AnalysisError::MalformedImage,
            AnalysisError::UnparsableResponse,
            AnalysisError::LowConfidence,
            AnalysisError::Unexpected("boom".into()),
        ] {
            assert!(err.should_retry(), "{} should be retryable", err.kind());
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AnalysisError::Misconfigured.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AnalysisError::MissingImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AnalysisError::MalformedImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AnalysisError::UnparsableResponse.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AnalysisError::LowConfidence.status(), StatusCode::OK);
        assert_eq!(
            AnalysisError::Unexpected("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unexpected_hides_detail() {
        let err = AnalysisError::Unexpected("connection refused to 10.0.0.1".into());
        let failure = err.to_failure();
        assert!(!failure.error.contains("10.0.0.1"));
        assert!(failure.error.contains("しばらく待って"));
    }

    #[test]
    fn test_into_outcome() {
        let outcome: AnalysisOutcome = AnalysisError::MissingImage.into();
        assert_eq!(outcome, AnalysisOutcome::failure("画像が送信されていません", true));
    }
}
