//! モデル応答パーサー
//!
//! 自由文の応答からJSONオブジェクトを抽出し、
//! 信頼度の判定と成功結果への変換を行う

use crate::error::{Error, Result};
use crate::types::{CareAnalysis, CareReading};
use serde_json::Value;

/// 応答の判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelVerdict {
    /// confidence が "low"。他のフィールドは破棄済み
    LowConfidence,
    /// 利用可能な解析結果（notesは3件以内）
    Usable(CareAnalysis),
}

/// 応答から最初の `{` から最後の `}` までを抽出
///
/// 文字列値に括弧が含まれていても区別しない（貪欲マッチ）
///
/// # Examples
/// ```
/// use care_label_common::extract_json;
///
/// let json = extract_json("結果: {\"confidence\": \"high\"} 以上").unwrap();
/// assert_eq!(json, "{\"confidence\": \"high\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end > start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// モデル応答を判定
///
/// # Returns
/// * `Ok(ModelVerdict)` - 低信頼度または利用可能な結果
/// * `Err(Error::Parse)` - JSONオブジェクトが見つからない
/// * `Err(Error::Json)` - JSONとして不正、または必須フィールドの型が合わない
pub fn judge_reply(response: &str) -> Result<ModelVerdict> {
    let json_str = extract_json(response)?;
    let value: Value = serde_json::from_str(json_str)?;

    // 低信頼度は他フィールドの妥当性より優先
    if value.get("confidence").and_then(Value::as_str) == Some("low") {
        return Ok(ModelVerdict::LowConfidence);
    }

    let reading: CareReading = serde_json::from_value(value)?;
    Ok(ModelVerdict::Usable(reading.into_analysis()))
}
