//! Data URL処理
//!
//! `data:<mime-type>;base64,<payload>` 形式の文字列を分解・生成する

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // mimeは最後の ";base64," までを貪欲に取る。改行は含まない
    static ref DATA_URL_RE: Regex = Regex::new(r"^data:(.+);base64,(.+)$").unwrap();
}

/// 分解済みのData URL（元文字列を借用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub mime_type: &'a str,
    /// Base64部分（プレフィックスなし）
    pub data: &'a str,
}

/// Data URLをMIMEタイプとBase64データに分解
///
/// ペイロードのBase64としての正しさは検証しない（モデル側に委ねる）
///
/// # Examples
/// ```
/// use care_label_common::parse_data_url;
///
/// let url = parse_data_url("data:image/png;base64,AAAA").unwrap();
/// assert_eq!(url.mime_type, "image/png");
/// assert_eq!(url.data, "AAAA");
/// ```
pub fn parse_data_url(input: &str) -> Result<DataUrl<'_>> {
    let caps = DATA_URL_RE
        .captures(input)
        .ok_or_else(|| Error::InvalidDataUrl("expected data:<mime>;base64,<payload>".into()))?;

    match (caps.get(1), caps.get(2)) {
        (Some(mime), Some(data)) => Ok(DataUrl {
            mime_type: mime.as_str(),
            data: data.as_str(),
        }),
        _ => Err(Error::InvalidDataUrl("missing mime type or payload".into())),
    }
}

/// バイト列からData URLを生成
pub fn build_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}
