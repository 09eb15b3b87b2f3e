use thiserror::Error;

#[derive(Error, Debug)]
pub enum CareLabelError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像ファイルではありません: {0}")]
    UnsupportedImage(String),

    #[error("履歴が見つかりません: {0}")]
    HistoryEntryNotFound(String),

    #[error("HTTP通信エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("サーバーエラー: {0}")]
    Server(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] care_label_common::Error),
}

pub type Result<T> = std::result::Result<T, CareLabelError>;
