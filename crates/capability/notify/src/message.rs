//! 失败通知邮件组装
//!
//! ## 邮件格式
//!
//! ```text
//! From: <sender>
//! To: <RECIPIENT>
//! Subject: Gitlab pipeline FAILED: <FAILURE_SUMMARY>
//!
//! A pipeline failure was reported.
//!
//! Repository: <REPOSITORY_NAME>
//! Failure: <FAILURE_SUMMARY>
//! Time: <FAILURE_TIME>
//! Actor: <ACTOR>
//! ```

use crate::error::DeliveryError;
use devkit_config::NotifierConfig;
use lettre::Message;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;

/// 主题前缀
pub const SUBJECT_PREFIX: &str = "Gitlab pipeline FAILED: ";

/// 一次流水线失败的描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub repository_name: String,
    pub failure_summary: String,
    pub failure_time: String,
    pub actor: String,
}

impl From<&NotifierConfig> for FailureReport {
    fn from(config: &NotifierConfig) -> Self {
        Self {
            repository_name: config.repository_name.clone(),
            failure_summary: config.failure_summary.clone(),
            failure_time: config.failure_time.clone(),
            actor: config.actor.clone(),
        }
    }
}

/// 待投递的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// 按固定模板组装通知
    pub fn compose(sender: &str, recipient: &str, report: &FailureReport) -> Self {
        Self {
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            subject: format!("{}{}", SUBJECT_PREFIX, report.failure_summary),
            body: format!(
                "A pipeline failure was reported.\n\n\
                 Repository: {}\n\
                 Failure: {}\n\
                 Time: {}\n\
                 Actor: {}\n",
                report.repository_name, report.failure_summary, report.failure_time, report.actor
            ),
        }
    }

    /// 从通知配置组装
    pub fn from_config(config: &NotifierConfig) -> Self {
        Self::compose(
            &config.sender,
            &config.recipient,
            &FailureReport::from(config),
        )
    }

    /// 转换为 lettre 邮件（地址在此处解析）
    pub fn to_message(&self) -> Result<Message, DeliveryError> {
        let from: Mailbox = self
            .sender
            .parse()
            .map_err(|e| DeliveryError::Address(self.sender.clone(), format!("{}", e)))?;
        let to: Mailbox = self
            .recipient
            .parse()
            .map_err(|e| DeliveryError::Address(self.recipient.clone(), format!("{}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(self.body.clone())
            .map_err(|e| DeliveryError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> FailureReport {
        FailureReport {
            repository_name: "field-gateway".to_string(),
            failure_summary: "build step X failed".to_string(),
            failure_time: "2026-10-15T08:30:00Z".to_string(),
            actor: "jdoe".to_string(),
        }
    }

    #[test]
    fn subject_is_prefix_plus_summary() {
        let notification = Notification::compose("ci@example.com", "dev@example.com", &report());
        assert_eq!(
            notification.subject,
            "Gitlab pipeline FAILED: build step X failed"
        );
    }

    #[test]
    fn body_lists_fields_in_order_on_own_lines() {
        let notification = Notification::compose("ci@example.com", "dev@example.com", &report());
        let lines: Vec<&str> = notification.body.lines().collect();

        let position = |needle: &str| {
            lines
                .iter()
                .position(|line| line.ends_with(needle))
                .unwrap_or_else(|| panic!("missing line for {needle}"))
        };
        let repo = position("field-gateway");
        let summary = position("build step X failed");
        let time = position("2026-10-15T08:30:00Z");
        let actor = position("jdoe");
        assert!(repo < summary && summary < time && time < actor);
    }

    #[test]
    fn message_carries_headers_and_body() {
        let notification = Notification::compose("ci@example.com", "dev@example.com", &report());
        let message = notification.to_message().unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("ci@example.com"));
        assert!(raw.contains("dev@example.com"));
        assert!(raw.contains("Subject: Gitlab pipeline FAILED: build step X failed"));
        assert!(raw.contains("Repository: field-gateway"));
    }

    #[test]
    fn malformed_recipient_is_address_error() {
        let notification = Notification::compose("ci@example.com", "not an address", &report());
        let err = notification.to_message().unwrap_err();
        assert_eq!(err.kind(), "address");
    }
}
