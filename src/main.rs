use care_label_ai::{cli, client, config, error, gateway, history, render, server, upload};
use care_label_common::AnalysisOutcome;
use clap::Parser;
use cli::{Cli, Commands, HistoryAction};
use config::Config;
use dialoguer::Confirm;
use error::{CareLabelError, Result};
use history::HistoryStore;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;
    tracing::debug!(?config, "config loaded");

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let gateway = gateway::Gateway::from_config(&config)?;
            println!("🧺 care-label - 解析ゲートウェイ ({})", bind);
            server::serve(&bind, gateway).await?;
        }

        Commands::Analyze { image, server, save, json } => {
            let data_url = upload::load_data_url(&image)?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner());
            spinner.set_message("解析中...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            // 解析中は他の操作を受け付けない（1件ずつ）
            let outcome = match server {
                Some(url) => {
                    let timeout = Duration::from_secs(config.timeout_seconds);
                    client::GatewayClient::new(&url, timeout)?.analyze(&data_url).await
                }
                None => gateway::Gateway::from_config(&config)?.analyze(Some(&data_url)).await,
            };
            spinner.finish_and_clear();

            print_outcome(&outcome, json)?;

            if save {
                match outcome.as_success() {
                    Some(analysis) => {
                        let store = HistoryStore::from_config(&config)?;
                        let current = store.load();
                        let entry = history::snapshot(analysis, &data_url, &current);
                        let id = entry.id.clone();
                        let next = HistoryStore::add(entry, &current);
                        store.persist(&next)?;
                        println!("✔ 履歴に保存しました: {}", id);
                    }
                    None => println!("解析に失敗したため履歴には保存しません"),
                }
            }
        }

        Commands::History { action } => {
            let store = HistoryStore::from_config(&config)?;
            let current = store.load();

            match action {
                HistoryAction::List => {
                    print!("{}", render::render_history(&current));
                }

                HistoryAction::Show { id, json } => {
                    let entry = HistoryStore::find(&id, &current)
                        .ok_or_else(|| CareLabelError::HistoryEntryNotFound(id.clone()))?;
                    if !json {
                        println!("{}  {}\n", render::format_date(entry.timestamp), entry.id);
                    }
                    print_outcome(&AnalysisOutcome::Success(entry.analysis()), json)?;
                }

                HistoryAction::Delete { id, yes } => {
                    let Some(entry) = HistoryStore::find(&id, &current) else {
                        println!("履歴が見つかりません: {}", id);
                        return Ok(());
                    };

                    if !yes {
                        let confirmed = Confirm::new()
                            .with_prompt(format!("「{}」を削除しますか?", entry.conclusion))
                            .default(false)
                            .interact()
                            .map_err(|e| CareLabelError::Prompt(e.to_string()))?;
                        if !confirmed {
                            println!("キャンセルしました");
                            return Ok(());
                        }
                    }

                    let next = HistoryStore::remove(&id, &current);
                    store.persist(&next)?;
                    println!("✔ 削除しました（残り{}件）", next.len());
                }
            }
        }

        Commands::Config { set_api_key, show } => {
            // 環境変数を書き戻さないよう、ファイルの内容だけを編集する
            let mut file_config = Config::load_file()?;

            if let Some(key) = set_api_key {
                file_config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                let config = Config::load()?;
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  APIベース: {}", config.api_base);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  待ち受け: {}", config.bind);
                println!("  履歴: {}", config.history_path()?.display());
                println!("  APIキー: {}", if config.api_key().is_some() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "care_label_ai=debug,tower_http=debug"
    } else {
        "care_label_ai=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_outcome(outcome: &AnalysisOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else {
        print!("{}", render::render_outcome(outcome));
    }
    Ok(())
}
