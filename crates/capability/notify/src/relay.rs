//! 邮件中继
//!
//! [`MailRelay`] 是投递的抽象接缝，生产实现为 [`SmtpRelay`]：
//! 连接中继 → STARTTLS → PLAIN/LOGIN 认证 → 发送，一次阻塞调用完成。
//! `require_tls = false` 时跳过 STARTTLS，用于本地明文中继。

use crate::error::DeliveryError;
use crate::message::Notification;
use devkit_config::NotifierConfig;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};
use std::time::Duration;
use tracing::debug;

/// 邮件中继（单次投递，无重试）
pub trait MailRelay {
    /// 投递一封通知
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;

    /// 中继端点描述（host:port）
    fn endpoint(&self) -> String;
}

impl<T: MailRelay + ?Sized> MailRelay for &T {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        (**self).deliver(notification)
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}

/// SMTP 中继连接参数
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
    pub require_tls: bool,
}

impl From<&NotifierConfig> for RelaySettings {
    fn from(config: &NotifierConfig) -> Self {
        Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            username: config.smtp_username.clone(),
            password: config.smtp_password.clone(),
            timeout_seconds: config.smtp_timeout_seconds,
            require_tls: config.smtp_tls,
        }
    }
}

/// 基于 lettre 阻塞传输的 SMTP 中继
pub struct SmtpRelay {
    transport: SmtpTransport,
    endpoint: String,
}

impl SmtpRelay {
    /// 构建中继。凭据总会被设置，空值同样会参与认证。
    pub fn new(settings: &RelaySettings) -> Result<Self, DeliveryError> {
        let credentials = Credentials::new(settings.username.clone(), settings.password.clone());
        let builder = if settings.require_tls {
            SmtpTransport::starttls_relay(&settings.host)
                .map_err(|e| DeliveryError::Relay(e.to_string()))?
        } else {
            SmtpTransport::builder_dangerous(&settings.host)
        };
        let transport = builder
            .port(settings.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(settings.timeout_seconds)))
            .build();

        Ok(Self {
            transport,
            endpoint: format!("{}:{}", settings.host, settings.port),
        })
    }
}

impl MailRelay for SmtpRelay {
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let message = notification.to_message()?;
        let response = self
            .transport
            .send(&message)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        debug!(
            endpoint = %self.endpoint,
            code = %response.code(),
            "relay accepted message"
        );
        Ok(())
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}
