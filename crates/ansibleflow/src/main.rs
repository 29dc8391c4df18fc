mod commands;
mod console;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ansibleflow")]
#[command(about = "Run Ansible playbooks as pipeline stages", long_about = None)]
struct Cli {
    /// プラグイン設定ファイル (ansiblePath, inventory, vault)
    #[arg(short, long, global = true, env = "ANSIBLEFLOW_CONFIG")]
    config: Option<PathBuf>,

    /// ansible-playbook 実行ファイル（設定ファイルより優先）
    #[arg(long, global = true, env = "ANSIBLEFLOW_ANSIBLE_PATH")]
    ansible_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 提供するステージ種別を一覧表示
    Stages,
    /// {index, name} の JSON リストからパイプラインステージを組み立てる
    Pipeline {
        /// リクエストファイル ("-" で標準入力)
        request: PathBuf,
    },
    /// ステージが実行する ansible-playbook コマンドを表示
    Command {
        /// デプロイソースのルート
        #[arg(short, long, default_value = ".")]
        source: PathBuf,
        /// ステージ設定 JSON ファイル ("-" で標準入力)
        stage_config: PathBuf,
    },
    /// ステージを実行
    Run {
        /// デプロイソースのルート
        #[arg(short, long, default_value = ".")]
        source: PathBuf,
        /// ステージ種別
        #[arg(long, default_value = ansibleflow_core::STAGE_ANSIBLE_PLAYBOOK)]
        stage: String,
        /// ステージ結果を JSON で標準出力に出す
        #[arg(long)]
        json: bool,
        /// ステージ設定 JSON ファイル ("-" で標準入力)
        stage_config: PathBuf,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr、stdout はコマンド出力専用
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match cli.command {
        Commands::Version => {
            println!("ansibleflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Stages => {
            commands::stages::handle();
            Ok(())
        }
        Commands::Pipeline { request } => commands::pipeline::handle(&request),
        Commands::Command {
            source,
            stage_config,
        } => {
            let config = commands::load_config(cli.config.as_deref(), cli.ansible_path)?;
            commands::command::handle(&config, &source, &stage_config)
        }
        Commands::Run {
            source,
            stage,
            json,
            stage_config,
        } => {
            let config = commands::load_config(cli.config.as_deref(), cli.ansible_path)?;
            commands::run::handle(&config, &source, &stage, &stage_config, json).await
        }
    }
}
