use care_label_common::DataUrl;

/// 画像を読めるマルチモーダルモデル
///
/// 指示文と画像1枚を渡し、自由文の応答を受け取る。
/// 応答の解釈はゲートウェイ側で行う
#[async_trait::async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, instruction: &str, image: DataUrl<'_>) -> anyhow::Result<String>;
}
