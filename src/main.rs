use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};

use rust_lending::app_config::log::setup_logging;
use rust_lending::app_config::{Cli, WorkflowConfig};
use rust_lending::lending::ledger::RpcLedgerClient;
use rust_lending::lending::workflow::LendingWorkflow;

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = cli.apply(WorkflowConfig::from_env()?);
    info!(
        "网络: {}, 节点: {}, 安全系数: {}, 确认数: {}",
        config.network, config.rpc_url, config.safety_margin, config.confirmations
    );

    let ledger = Arc::new(RpcLedgerClient::new(config.rpc_ledger_config()));
    let workflow = LendingWorkflow::new(config, ledger)?;

    match workflow.run().await {
        Ok(report) => {
            info!("工作流完成, 共 {} 笔交易", report.receipts.len());
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("工作流在步骤 {} 失败: {}", e.step, e.source);
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    // 设置日志
    let _guards = match setup_logging() {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("日志初始化失败: {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("启动失败: {:?}", e);
            eprintln!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}
