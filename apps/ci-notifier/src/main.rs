//! 流水线失败邮件通知。
//!
//! 读取环境变量 → 组装邮件 → 经 STARTTLS 中继投递一次 → 输出结果行。

use devkit_config::NotifierConfig;
use devkit_notify::{RelaySettings, SmtpRelay, exit_code, notify_with, report_line};
use devkit_telemetry::{init_tracing, metrics};
use std::process::ExitCode;
use tracing::{debug, error};

fn main() -> ExitCode {
    // 加载本地 .env（如存在）
    dotenvy::dotenv().ok();
    init_tracing();

    // 必填项缺失时在任何网络连接之前失败
    let config = match NotifierConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid notifier configuration");
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let result = notify_with(&config, || SmtpRelay::new(&RelaySettings::from(&config)));
    println!("{}", report_line(&result));

    debug!(metrics = ?metrics().snapshot(), "notifier finished");
    ExitCode::from(exit_code(&result, config.strict_exit))
}
