//! Care Label Common Library
//!
//! ゲートウェイ・CLI・履歴ストアで共有される型とパーサー

pub mod types;
pub mod error;
pub mod data_url;
pub mod parser;
pub mod prompts;

pub use types::{AnalysisFailure, AnalysisOutcome, CareAnalysis, CareReading, HistoryEntry};
pub use error::{Error, Result};
pub use data_url::{DataUrl, build_data_url, parse_data_url};
pub use parser::{ModelVerdict, extract_json, judge_reply};
pub use prompts::{CARE_LABEL_PROMPT, PROMPT_VERSION};
