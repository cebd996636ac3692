//! # Haptic Sync CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 清单加载与校验
//! - 模拟播放与触觉 cue 同步
//! - 优雅关闭处理

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use cli::{Cli, Commands};
use commands::{run_info, run_playback, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    observability::init_with_config(cli.observability_config())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = command_name(&cli.command),
        "haptic-sync starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => run_playback(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    result
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Run(_) => "run",
        Commands::Validate(_) => "validate",
        Commands::Info(_) => "info",
    }
}
