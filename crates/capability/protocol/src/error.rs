//! 协议错误类型定义

use crate::types::RegionKind;

/// 协议夹具错误
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// IO 错误（绑定端口、接受连接）
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 配置解析错误
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// 地址越界
    #[error("{region} address {address} (count {count}) out of range")]
    OutOfRange {
        region: RegionKind,
        address: u16,
        count: u16,
    },
}
