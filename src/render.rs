//! 解析結果・履歴の端末表示

use care_label_common::{AnalysisOutcome, CareAnalysis, HistoryEntry};
use chrono::{Local, TimeZone};
use std::fmt::Write as _;

pub fn render_outcome(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Success(analysis) => render_analysis(analysis),
        AnalysisOutcome::Failure(failure) => {
            let mut out = format!("⚠ {}\n", failure.error);
            if failure.should_retry {
                out.push_str("  別の画像または時間をおいて再試行できます\n");
            }
            out
        }
    }
}

pub fn render_analysis(analysis: &CareAnalysis) -> String {
    let mut out = String::new();

    if !analysis.detected.is_empty() {
        out.push_str("■ 検出された表示\n");
        for item in &analysis.detected {
            let _ = writeln!(out, "  - {}", item);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "■ 結論\n  {}\n", analysis.conclusion);

    if !analysis.notes.is_empty() {
        out.push_str("■ 注意点\n");
        for (i, note) in analysis.notes.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, note);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "■ おすすめの洗い方\n  {}", analysis.recommendation);
    out
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "まだ履歴がありません\n".to_string();
    }

    let mut out = format!("履歴 {}件\n", entries.len());
    for entry in entries {
        let _ = writeln!(
            out,
            "  {}  {}  {}",
            format_date(entry.timestamp),
            entry.id,
            entry.conclusion
        );
    }
    out
}

/// Unixミリ秒をローカル日付に
pub fn format_date(timestamp_millis: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string())
}
