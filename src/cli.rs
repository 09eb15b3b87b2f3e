use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "care-label")]
#[command(about = "洗濯表示（ケアラベル）AI解析ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 解析ゲートウェイ（HTTPサーバー）を起動
    Serve {
        /// 待ち受けアドレス（省略時は設定ファイルの値）
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// 洗濯タグの画像を解析
    Analyze {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 起動中のゲートウェイURL（省略時はこのプロセスで解析）
        #[arg(long)]
        server: Option<String>,

        /// 成功した結果を履歴に保存
        #[arg(long)]
        save: bool,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 解析履歴の表示/削除
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// 履歴一覧（新しい順）
    List,

    /// 保存した結果を再表示
    Show {
        /// 履歴ID
        id: String,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 履歴を削除
    Delete {
        /// 履歴ID
        id: String,

        /// 確認せずに削除
        #[arg(short, long)]
        yes: bool,
    },
}
