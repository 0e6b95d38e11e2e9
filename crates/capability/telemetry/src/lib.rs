//! 日志初始化、运行 ID 与进程级计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub delivery_attempts: u64,
    pub delivery_success: u64,
    pub delivery_failure: u64,
    pub fixture_connections: u64,
    pub fixture_requests: u64,
    pub fixture_exceptions: u64,
}

/// 进程级计数器。
pub struct TelemetryMetrics {
    delivery_attempts: AtomicU64,
    delivery_success: AtomicU64,
    delivery_failure: AtomicU64,
    fixture_connections: AtomicU64,
    fixture_requests: AtomicU64,
    fixture_exceptions: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            delivery_attempts: AtomicU64::new(0),
            delivery_success: AtomicU64::new(0),
            delivery_failure: AtomicU64::new(0),
            fixture_connections: AtomicU64::new(0),
            fixture_requests: AtomicU64::new(0),
            fixture_exceptions: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            delivery_attempts: self.delivery_attempts.load(Ordering::Relaxed),
            delivery_success: self.delivery_success.load(Ordering::Relaxed),
            delivery_failure: self.delivery_failure.load(Ordering::Relaxed),
            fixture_connections: self.fixture_connections.load(Ordering::Relaxed),
            fixture_requests: self.fixture_requests.load(Ordering::Relaxed),
            fixture_exceptions: self.fixture_exceptions.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 run_id（每次通知运行一个）。
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 记录一次投递尝试。
pub fn record_delivery_attempt() {
    metrics().delivery_attempts.fetch_add(1, Ordering::Relaxed);
}

/// 记录投递成功。
pub fn record_delivery_success() {
    metrics().delivery_success.fetch_add(1, Ordering::Relaxed);
}

/// 记录投递失败。
pub fn record_delivery_failure() {
    metrics().delivery_failure.fetch_add(1, Ordering::Relaxed);
}

/// 记录夹具接入的连接数。
pub fn record_fixture_connection() {
    metrics().fixture_connections.fetch_add(1, Ordering::Relaxed);
}

/// 记录夹具处理的请求数。
pub fn record_fixture_request() {
    metrics().fixture_requests.fetch_add(1, Ordering::Relaxed);
}

/// 记录夹具返回的异常响应数。
pub fn record_fixture_exception() {
    metrics().fixture_exceptions.fetch_add(1, Ordering::Relaxed);
}
