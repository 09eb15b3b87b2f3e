//! 解析結果の型定義
//!
//! ゲートウェイ・CLI・履歴ストアで共有される型:
//! - CareReading: モデルが返すJSONそのもの
//! - CareAnalysis: 成功時の解析結果（注意点は最大3件）
//! - AnalysisOutcome: 成功/失敗のどちらか一方だけを持つ統一結果
//! - HistoryEntry: 保存された解析結果のスナップショット

use serde::{Deserialize, Serialize};

/// 注意点（notes）の最大件数
pub const MAX_NOTES: usize = 3;

/// モデル応答から抽出したJSON
///
/// confidence は値レベルで先に判定するため保持しない（型も問わない）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareReading {
    #[serde(default)]
    pub detected: Option<Vec<String>>,    // 検出した素材・記号

    pub conclusion: String,               // 洗い方の結論

    pub notes: Vec<String>,               // 注意点

    pub recommendation: String,           // おすすめの洗濯方法
}

impl CareReading {
    /// 成功結果へ変換（notesを先頭3件に切り詰め、detected欠落は空に）
    pub fn into_analysis(self) -> CareAnalysis {
        CareAnalysis::new(
            self.detected.unwrap_or_default(),
            self.conclusion,
            self.notes,
            self.recommendation,
        )
    }
}

/// 成功時の解析結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareAnalysis {
    #[serde(default)]
    pub detected: Vec<String>,
    pub conclusion: String,
    pub notes: Vec<String>,
    pub recommendation: String,
}

impl CareAnalysis {
    pub fn new(
        detected: Vec<String>,
        conclusion: String,
        mut notes: Vec<String>,
        recommendation: String,
    ) -> Self {
        notes.truncate(MAX_NOTES);
        Self {
            detected,
            conclusion,
            notes,
            recommendation,
        }
    }
}

/// 失敗時の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisFailure {
    /// ユーザー向けメッセージ
    pub error: String,
    /// 再試行ボタンを出すかどうかのヒント（自動リトライではない）
    pub should_retry: bool,
}

impl AnalysisFailure {
    pub fn new(error: impl Into<String>, should_retry: bool) -> Self {
        Self {
            error: error.into(),
            should_retry,
        }
    }
}

/// ゲートウェイの統一結果
///
/// ワイヤ形式は `success` の真偽値で判別する:
/// - `{ "success": true, "detected": [], "conclusion": "", "notes": [], "recommendation": "" }`
/// - `{ "success": false, "error": "", "shouldRetry": true }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "OutcomeWire", try_from = "OutcomeWire")]
pub enum AnalysisOutcome {
    Success(CareAnalysis),
    Failure(AnalysisFailure),
}

impl AnalysisOutcome {
    pub fn failure(error: impl Into<String>, should_retry: bool) -> Self {
        Self::Failure(AnalysisFailure::new(error, should_retry))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn as_success(&self) -> Option<&CareAnalysis> {
        match self {
            Self::Success(analysis) => Some(analysis),
            Self::Failure(_) => None,
        }
    }
}

impl From<CareAnalysis> for AnalysisOutcome {
    fn from(analysis: CareAnalysis) -> Self {
        Self::Success(analysis)
    }
}

impl From<AnalysisFailure> for AnalysisOutcome {
    fn from(failure: AnalysisFailure) -> Self {
        Self::Failure(failure)
    }
}

/// AnalysisOutcomeのワイヤ表現
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OutcomeWire {
    success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    detected: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    conclusion: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    recommendation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    should_retry: Option<bool>,
}

impl From<AnalysisOutcome> for OutcomeWire {
    fn from(outcome: AnalysisOutcome) -> Self {
        match outcome {
            AnalysisOutcome::Success(a) => Self {
                success: true,
                detected: Some(a.detected),
                conclusion: Some(a.conclusion),
                notes: Some(a.notes),
                recommendation: Some(a.recommendation),
                error: None,
                should_retry: None,
            },
            AnalysisOutcome::Failure(f) => Self {
                success: false,
                detected: None,
                conclusion: None,
                notes: None,
                recommendation: None,
                error: Some(f.error),
                should_retry: Some(f.should_retry),
            },
        }
    }
}

impl TryFrom<OutcomeWire> for AnalysisOutcome {
    type Error = String;

    fn try_from(wire: OutcomeWire) -> std::result::Result<Self, Self::Error> {
        if wire.success {
            let conclusion = wire.conclusion.ok_or("success outcome without conclusion")?;
            let recommendation = wire
                .recommendation
                .ok_or("success outcome without recommendation")?;
            Ok(Self::Success(CareAnalysis::new(
                wire.detected.unwrap_or_default(),
                conclusion,
                wire.notes.unwrap_or_default(),
                recommendation,
            )))
        } else {
            let error = wire.error.ok_or("failure outcome without error")?;
            let should_retry = wire
                .should_retry
                .ok_or("failure outcome without shouldRetry")?;
            Ok(Self::Failure(AnalysisFailure { error, should_retry }))
        }
    }
}

/// 保存された解析結果
///
/// 作成後は変更しない。元のAnalysisOutcomeとは参照関係を持たないコピー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,

    /// 作成時刻（Unixミリ秒）
    pub timestamp: i64,

    /// 元画像のData URL（再表示用にそのまま保持）
    pub image_preview: String,

    /// 旧形式のエントリには存在しない
    #[serde(default)]
    pub detected: Vec<String>,

    pub conclusion: String,

    pub notes: Vec<String>,

    pub recommendation: String,
}

impl HistoryEntry {
    pub fn new(id: String, timestamp: i64, image_preview: String, analysis: &CareAnalysis) -> Self {
        Self {
            id,
            timestamp,
            image_preview,
            detected: analysis.detected.clone(),
            conclusion: analysis.conclusion.clone(),
            notes: analysis.notes.iter().take(MAX_NOTES).cloned().collect(),
            recommendation: analysis.recommendation.clone(),
        }
    }

    /// 履歴から選択したときの再表示用
    pub fn analysis(&self) -> CareAnalysis {
        CareAnalysis::new(
            self.detected.clone(),
            self.conclusion.clone(),
            self.notes.clone(),
            self.recommendation.clone(),
        )
    }
}
