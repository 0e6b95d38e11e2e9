//! # 协议能力模块
//!
//! 提供 Modbus TCP 测试夹具，供开发期联调协议客户端：
//! - **数据区**：线圈、离散输入、保持寄存器、输入寄存器，启动时预置
//! - **夹具服务**：基于 tokio-modbus 的从站，支持常用读写功能码
//!
//! ## 架构设计
//!
//! ```text
//! RegionLayout (默认 / FIXTURE_CONFIG_JSON)
//!       │
//!       ▼
//! DataRegions ── Arc<Mutex<..>> ── 所有连接共享
//!       │
//!       ▼
//! ModbusFixtureServer
//!       │
//!       └── FixtureService (每个连接一份)
//! ```
//!
//! ## 支持的功能码
//!
//! | 功能码 | 请求 | 数据区 |
//! | --- | --- | --- |
//! | 0x01 / 0x05 / 0x0F | 读线圈 / 写单个 / 写多个 | coils |
//! | 0x02 | 读离散输入 | discrete_inputs |
//! | 0x03 / 0x06 / 0x10 / 0x17 | 读 / 写单个 / 写多个 / 读写 | holding_registers |
//! | 0x04 | 读输入寄存器 | input_registers |
//!
//! 其他功能码返回 `IllegalFunction`，越界地址返回 `IllegalDataAddress`。

mod error;
mod modbus_server;
mod regions;
mod types;

pub use error::ProtocolError;
pub use modbus_server::{FixtureService, ModbusFixtureServer};
pub use regions::DataRegions;
pub use types::*;
