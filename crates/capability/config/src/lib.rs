//! 工具运行配置加载。
//!
//! 两个二进制各自一份配置：
//! - [`NotifierConfig`]：流水线失败通知（收件人、失败摘要、SMTP 中继）
//! - [`FixtureConfig`]：Modbus 测试夹具（监听地址、数据区种子值）
//!
//! 配置在启动时一次性构建，必填项缺失时汇总为一个错误，列出全部缺失字段。

use std::env;

/// 默认 SMTP 中继主机。
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
/// 默认 SMTP 提交端口（STARTTLS）。
pub const DEFAULT_SMTP_PORT: u16 = 587;
/// 默认 SMTP 阻塞 I/O 超时（秒），与 lettre 默认值一致。
pub const DEFAULT_SMTP_TIMEOUT_SECONDS: u64 = 60;
/// 默认发件人。
pub const DEFAULT_SENDER: &str = "ci-notifier@localhost";

/// 默认夹具监听地址。
pub const DEFAULT_FIXTURE_LISTEN_ADDR: &str = "0.0.0.0:5020";
/// 默认每个数据区的条目数。
pub const DEFAULT_REGION_SIZE: u16 = 100;
/// 默认寄存器种子值。
pub const DEFAULT_REGISTER_SEED: u16 = 17;

/// 通知必填环境变量（按读取顺序）。
pub const NOTIFIER_REQUIRED_ENV: [&str; 5] = [
    "RECIPIENT",
    "FAILURE_SUMMARY",
    "FAILURE_TIME",
    "ACTOR",
    "REPOSITORY_NAME",
];

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {}", .0.join(", "))]
    MissingMany(Vec<String>),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 流水线失败通知配置。
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub recipient: String,
    pub failure_summary: String,
    pub failure_time: String,
    pub actor: String,
    pub repository_name: String,
    pub sender: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_timeout_seconds: u64,
    /// 关闭时不做 STARTTLS（仅用于本地明文中继）。
    pub smtp_tls: bool,
    pub strict_exit: bool,
}

impl NotifierConfig {
    /// 从进程环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置（测试中无需改动进程环境）。
    ///
    /// 五个必填项一起校验，缺失时返回 [`ConfigError::MissingMany`]。
    /// SMTP 凭据缺失时回落为空字符串，认证仍会以空值尝试。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let required = NOTIFIER_REQUIRED_ENV.map(|key| {
            lookup(key).unwrap_or_else(|| {
                missing.push(key.to_string());
                String::new()
            })
        });
        if !missing.is_empty() {
            return Err(ConfigError::MissingMany(missing));
        }

        let sender = lookup("NOTIFIER_SENDER")
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SENDER.to_string());
        let smtp_host = lookup("NOTIFIER_SMTP_HOST")
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = read_u16_with_default(&lookup, "NOTIFIER_SMTP_PORT", DEFAULT_SMTP_PORT)?;
        let smtp_timeout_seconds = read_u64_with_default(
            &lookup,
            "NOTIFIER_SMTP_TIMEOUT_SECONDS",
            DEFAULT_SMTP_TIMEOUT_SECONDS,
        )?;
        let smtp_username = lookup("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = lookup("SMTP_PASSWORD").unwrap_or_default();
        let smtp_tls = read_bool_with_default(&lookup, "NOTIFIER_SMTP_TLS", true);
        let strict_exit = read_bool_with_default(&lookup, "NOTIFIER_STRICT_EXIT", false);

        let [recipient, failure_summary, failure_time, actor, repository_name] = required;
        Ok(Self {
            recipient,
            failure_summary,
            failure_time,
            actor,
            repository_name,
            sender,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_timeout_seconds,
            smtp_tls,
            strict_exit,
        })
    }

    /// 用户名和口令是否都已提供。
    pub fn has_credentials(&self) -> bool {
        !self.smtp_username.is_empty() && !self.smtp_password.is_empty()
    }
}

/// Modbus 测试夹具配置。
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub listen_addr: String,
    pub region_size: u16,
    pub bit_seed: bool,
    pub register_seed: u16,
    /// 内联 JSON 数据区布局，存在时覆盖上面的种子配置。
    pub layout_json: Option<String>,
}

impl FixtureConfig {
    /// 从进程环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置。全部字段都有默认值。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr = lookup("FIXTURE_LISTEN_ADDR")
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_FIXTURE_LISTEN_ADDR.to_string());
        let region_size = read_u16_with_default(&lookup, "FIXTURE_REGION_SIZE", DEFAULT_REGION_SIZE)?;
        let bit_seed = read_bool_with_default(&lookup, "FIXTURE_BIT_SEED", true);
        let register_seed =
            read_u16_with_default(&lookup, "FIXTURE_REGISTER_SEED", DEFAULT_REGISTER_SEED)?;
        let layout_json = lookup("FIXTURE_CONFIG_JSON").filter(|value| !value.trim().is_empty());

        Ok(Self {
            listen_addr,
            region_size,
            bit_seed,
            register_seed,
            layout_json,
        })
    }
}

fn read_u16_with_default<F>(lookup: &F, key: &str, default: u16) -> Result<u16, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(value) => value,
        None => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match lookup(key) {
        Some(value) => value,
        None => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_bool_with_default<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        None => default,
    }
}
