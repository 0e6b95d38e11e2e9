//! 投递错误类型定义

/// 投递失败（单一错误类别，按阶段区分种类）
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// 地址解析错误
    #[error("invalid address {0}: {1}")]
    Address(String, String),

    /// 邮件构建错误
    #[error("message build error: {0}")]
    Message(String),

    /// 中继配置错误（TLS 参数等）
    #[error("relay setup error: {0}")]
    Relay(String),

    /// 连接、加密升级、认证或发送错误
    #[error("transport error: {0}")]
    Transport(String),
}

impl DeliveryError {
    /// 失败种类名称，用于日志和输出。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Address(..) => "address",
            Self::Message(_) => "message",
            Self::Relay(_) => "relay",
            Self::Transport(_) => "transport",
        }
    }
}
