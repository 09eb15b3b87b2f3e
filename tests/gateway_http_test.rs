//! 解析エンドポイントのHTTP契約テスト
//!
//! ルーター全体（本文の解釈、ステータス、本文の形）を
//! 固定応答のモデルで検証する

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use care_label_ai::gateway::{Gateway, VisionModel};
use care_label_ai::server::{create_router, AppState};
use care_label_common::DataUrl;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

struct FixedReply {
    text: &'static str,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl VisionModel for FixedReply {
    async fn generate(&self, _instruction: &str, _image: DataUrl<'_>) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.to_string())
    }
}

fn model(text: &'static str) -> Arc<FixedReply> {
    Arc::new(FixedReply {
        text,
        calls: AtomicUsize::new(0),
    })
}

async fn post(model: &Arc<FixedReply>, body: impl Into<Body>) -> (StatusCode, Value) {
    let gateway = Gateway::new(Some(model.clone() as Arc<dyn VisionModel>));
    let resp = create_router(AppState::new(gateway))
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/analyze")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const GOOD_REPLY: &str = r#"here you go {"confidence":"high","conclusion":"Wash on cold","notes":["a","b","c","d"],"recommendation":"use net"}"#;

/// 成功シナリオ: notesは3件に切り詰め、detected欠落は空配列
#[tokio::test]
async fn success_returns_200_with_clamped_notes() {
    let m = model(GOOD_REPLY);
    let (status, body) = post(&m, r#"{"image":"data:image/png;base64,AAAA"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "detected": [],
            "conclusion": "Wash on cold",
            "notes": ["a", "b", "c"],
            "recommendation": "use net"
        })
    );
    assert_eq!(m.calls.load(Ordering::SeqCst), 1);
}

/// スマートフォンの写真相当（数MB）の本文も統一結果で返す
#[tokio::test]
async fn large_photo_is_analyzed() {
    let m = model(GOOD_REPLY);
    let body = format!(
        r#"{{"image":"data:image/jpeg;base64,{}"}}"#,
        "A".repeat(4_000_000)
    );
    let (status, body) = post(&m, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["conclusion"], "Wash on cold");
    assert_eq!(m.calls.load(Ordering::SeqCst), 1);
}

/// 画像なし: 400、再試行可、モデルは呼ばない
#[tokio::test]
async fn missing_image_returns_400() {
    let m = model(GOOD_REPLY);
    let (status, body) = post(&m, "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "error": "画像が送信されていません", "shouldRetry": true })
    );
    assert_eq!(m.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_image_returns_400() {
    let m = model(GOOD_REPLY);
    let (status, body) = post(&m, r#"{"image":"https://example.com/tag.png"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "画像形式が不正です");
    assert_eq!(body["shouldRetry"], true);
    assert_eq!(m.calls.load(Ordering::SeqCst), 0);
}

/// 低信頼度は論理的な失敗だがステータスは200
#[tokio::test]
async fn low_confidence_returns_200_failure() {
    let m = model(r#"{"confidence":"low","conclusion":"?","notes":[],"recommendation":"?"}"#);
    let (status, body) = post(&m, r#"{"image":"data:image/jpeg;base64,/9j/"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["shouldRetry"], true);
    assert!(body.get("conclusion").is_none());
}

#[tokio::test]
async fn unparsable_reply_returns_500() {
    let m = model("Sorry, I cannot help with that.");
    let (status, body) = post(&m, r#"{"image":"data:image/png;base64,AAAA"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["shouldRetry"], true);
    assert!(body["error"].as_str().unwrap().contains("別の画像"));
}

#[tokio::test]
async fn broken_json_reply_returns_500_generic() {
    let m = model(r#"{"confidence": "high", "conclusion": }"#);
    let (status, body) = post(&m, r#"{"image":"data:image/png;base64,AAAA"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["shouldRetry"], true);
    assert!(body["error"].as_str().unwrap().contains("しばらく待って"));
}

/// 本文がJSONでない場合もフレームワークの拒否ではなく統一結果で返す
#[tokio::test]
async fn non_json_body_returns_uniform_failure() {
    let m = model(GOOD_REPLY);
    let (status, body) = post(&m, "image=abc").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["shouldRetry"], true);
}

#[tokio::test]
async fn get_on_analyze_returns_405() {
    let gateway = Gateway::new(None);
    let resp = create_router(AppState::new(gateway))
        .oneshot(
            Request::builder()
                .uri("/api/analyze")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
