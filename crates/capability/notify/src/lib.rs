//! # 通知能力模块
//!
//! 流水线失败时发送一封纯文本邮件：
//!
//! ```text
//! NotifierConfig (环境变量)
//!       │
//!       ▼
//! Notification::from_config  ── composing
//!       │
//!       ▼
//! MailRelay::deliver         ── sending
//!       │
//!       ├── Ok(Delivery)      ── sent
//!       └── Err(DeliveryError) ── failed
//! ```
//!
//! 每次调用恰好一次投递尝试。结果如何映射到进程退出码由调用方决定，
//! 见 [`exit_code`]。

mod error;
mod message;
mod relay;

pub use error::DeliveryError;
pub use message::{FailureReport, Notification, SUBJECT_PREFIX};
pub use relay::{MailRelay, RelaySettings, SmtpRelay};

use devkit_config::NotifierConfig;
use devkit_telemetry::{
    new_run_id, record_delivery_attempt, record_delivery_failure, record_delivery_success,
};
use tracing::{error, info, info_span, warn};

/// 一次成功投递的记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub run_id: String,
    pub endpoint: String,
    pub recipient: String,
}

/// 组装并投递失败通知（单次尝试）
pub fn notify(config: &NotifierConfig, relay: &dyn MailRelay) -> Result<Delivery, DeliveryError> {
    notify_with(config, || Ok(relay))
}

/// 同 [`notify`]，中继在计数的尝试内部构建。
///
/// 中继构建失败同样计为一次失败的投递尝试。
pub fn notify_with<R, F>(config: &NotifierConfig, connect: F) -> Result<Delivery, DeliveryError>
where
    R: MailRelay,
    F: FnOnce() -> Result<R, DeliveryError>,
{
    let run_id = new_run_id();
    let span = info_span!(
        "notify",
        run_id = %run_id,
        repository = %config.repository_name
    );
    let _guard = span.enter();

    let notification = Notification::from_config(config);
    if !config.has_credentials() {
        warn!("smtp credentials incomplete, authenticating with empty values");
    }

    record_delivery_attempt();
    let relay = match connect() {
        Ok(relay) => relay,
        Err(e) => {
            let endpoint = format!("{}:{}", config.smtp_host, config.smtp_port);
            return Err(delivery_failed(&endpoint, e));
        }
    };

    let endpoint = relay.endpoint();
    info!(
        endpoint = %endpoint,
        recipient = %notification.recipient,
        subject = %notification.subject,
        "sending failure notification"
    );

    match relay.deliver(&notification) {
        Ok(()) => {
            record_delivery_success();
            info!(endpoint = %endpoint, "failure notification sent");
            Ok(Delivery {
                run_id,
                endpoint,
                recipient: notification.recipient,
            })
        }
        Err(e) => Err(delivery_failed(&endpoint, e)),
    }
}

fn delivery_failed(endpoint: &str, e: DeliveryError) -> DeliveryError {
    record_delivery_failure();
    error!(
        endpoint = %endpoint,
        kind = e.kind(),
        error = %e,
        "failure notification not delivered"
    );
    e
}

/// 将投递结果映射为进程退出码。
///
/// 非严格模式下投递失败仍返回 0，严格模式下返回 1。
pub fn exit_code(result: &Result<Delivery, DeliveryError>, strict: bool) -> u8 {
    match result {
        Err(_) if strict => 1,
        _ => 0,
    }
}

/// 人类可读的结果行（写到 stdout）
pub fn report_line(result: &Result<Delivery, DeliveryError>) -> String {
    match result {
        Ok(delivery) => format!(
            "Successfully sent email to {} via {}",
            delivery.recipient, delivery.endpoint
        ),
        Err(e) => format!("Error: unable to send email ({}): {}", e.kind(), e),
    }
}
