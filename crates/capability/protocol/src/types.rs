//! 夹具数据区布局定义

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Modbus 数据区
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// 线圈（可读写位，0x01/0x05/0x0F）
    Coils,
    /// 离散输入（只读位，0x02）
    DiscreteInputs,
    /// 保持寄存器（可读写字，0x03/0x06/0x10/0x17）
    HoldingRegisters,
    /// 输入寄存器（只读字，0x04）
    InputRegisters,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Coils => "coils",
            Self::DiscreteInputs => "discrete_inputs",
            Self::HoldingRegisters => "holding_registers",
            Self::InputRegisters => "input_registers",
        };
        f.write_str(name)
    }
}

/// 位数据区配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitRegionSpec {
    /// 起始地址
    #[serde(default)]
    pub start: u16,
    /// 条目数
    #[serde(default = "default_region_size")]
    pub size: u16,
    /// 预置值
    #[serde(default = "default_bit_seed")]
    pub seed: bool,
}

/// 字数据区配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRegionSpec {
    /// 起始地址
    #[serde(default)]
    pub start: u16,
    /// 条目数
    #[serde(default = "default_region_size")]
    pub size: u16,
    /// 预置值
    #[serde(default = "default_register_seed")]
    pub seed: u16,
}

fn default_region_size() -> u16 {
    100
}

fn default_bit_seed() -> bool {
    true
}

fn default_register_seed() -> u16 {
    17
}

impl Default for BitRegionSpec {
    fn default() -> Self {
        Self {
            start: 0,
            size: default_region_size(),
            seed: default_bit_seed(),
        }
    }
}

impl Default for WordRegionSpec {
    fn default() -> Self {
        Self {
            start: 0,
            size: default_region_size(),
            seed: default_register_seed(),
        }
    }
}

/// 四个数据区的整体布局
///
/// ```json
/// {
///   "coils": { "start": 0, "size": 100, "seed": true },
///   "holding_registers": { "size": 200, "seed": 17 }
/// }
/// ```
///
/// 未出现的数据区使用默认值（起始 0、100 个条目）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegionLayout {
    #[serde(default)]
    pub coils: BitRegionSpec,
    #[serde(default)]
    pub discrete_inputs: BitRegionSpec,
    #[serde(default)]
    pub holding_registers: WordRegionSpec,
    #[serde(default)]
    pub input_registers: WordRegionSpec,
}

impl RegionLayout {
    /// 四个数据区同尺寸、同种子
    pub fn uniform(size: u16, bit_seed: bool, register_seed: u16) -> Self {
        let bits = BitRegionSpec {
            start: 0,
            size,
            seed: bit_seed,
        };
        let words = WordRegionSpec {
            start: 0,
            size,
            seed: register_seed,
        };
        Self {
            coils: bits,
            discrete_inputs: bits,
            holding_registers: words,
            input_registers: words,
        }
    }

    /// 从 JSON 配置字符串解析
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(|e| ProtocolError::ConfigParse(e.to_string()))
    }
}
