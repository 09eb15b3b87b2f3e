//! アップロード画像をData URLに変換
//!
//! 形式判定のみ行い、リサイズ・再圧縮はしない

use crate::error::{CareLabelError, Result};
use care_label_common::build_data_url;
use image::ImageFormat;
use std::path::Path;

/// 画像ファイルを読み込み `data:<mime>;base64,<payload>` にする
///
/// MIMEタイプは内容から判定し、判定できなければ拡張子から推定する
pub fn load_data_url(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(CareLabelError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let mime_type = detect_mime_type(path, &bytes)
        .ok_or_else(|| CareLabelError::UnsupportedImage(path.display().to_string()))?;

    tracing::debug!(path = %path.display(), mime_type, size = bytes.len(), "encoded image");
    Ok(build_data_url(mime_type, &bytes))
}

fn detect_mime_type(path: &Path, bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes)
        .or_else(|_| ImageFormat::from_path(path))
        .ok()
        .map(|format| format.to_mime_type())
        .filter(|mime| mime.starts_with("image/"))
}
