use std::str::FromStr;
use std::time::Duration;

use accrual_client::ClientConfig;

use crate::accrual::reconciler::MIN_POLL_INTERVAL;
use crate::accrual::{PollSettings, RetryPolicy};

/// 积分对账配置 - accrual worker 的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (`.env` 亦可)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | ACCRUAL_SYSTEM_ADDRESS | localhost:8081 | 积分系统地址 (缺少 scheme 时补 http://) |
/// | ACCRUAL_POLL_INTERVAL_MS | 5000 | 轮询周期(毫秒) |
/// | ACCRUAL_BATCH_LIMIT | 1000 | 每轮最多拉取的订单数 |
/// | ACCRUAL_WORKERS | 10 | 工作者数量 |
/// | ACCRUAL_QUEUE_CAPACITY | = ACCRUAL_WORKERS | 任务队列容量 |
/// | ACCRUAL_MAX_RETRIES | 3 | 每个订单的最大尝试次数 |
/// | ACCRUAL_RETRY_INTERVAL_MS | 1000 | 线性退避基数(毫秒) |
/// | ACCRUAL_REQUEST_TIMEOUT_SECS | 15 | HTTP 请求超时(秒) |
/// | LOG_LVL | info | 日志级别 |
/// | LOG_DIR | - | 日志目录 (设置后按天滚动写文件) |
/// | SEED_FILE | - | 内存存储的初始数据 (JSON) |
///
/// # 示例
///
/// ```ignore
/// ACCRUAL_SYSTEM_ADDRESS=http://localhost:8081 ACCRUAL_WORKERS=4 cargo run -p accrual-worker
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 积分系统基础地址
    pub accrual_system_address: String,
    /// 对账轮询周期 (毫秒)
    pub poll_interval_ms: u64,
    /// 每轮拉取上限
    pub batch_limit: usize,
    /// 工作者数量
    pub worker_count: usize,
    /// 任务队列容量
    pub queue_capacity: usize,
    /// 最大尝试次数
    pub max_retries: u32,
    /// 退避基数 (毫秒)
    pub retry_interval_ms: u64,
    /// HTTP 请求超时 (秒)
    pub request_timeout_secs: u64,
    /// 日志级别
    pub log_level: String,
    /// 日志目录
    pub log_dir: Option<String>,
    /// 初始数据文件
    pub seed_file: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let worker_count: usize = parsed(&lookup, "ACCRUAL_WORKERS").unwrap_or(10);

        Self {
            accrual_system_address: lookup("ACCRUAL_SYSTEM_ADDRESS")
                .unwrap_or_else(|| "localhost:8081".into()),
            poll_interval_ms: parsed(&lookup, "ACCRUAL_POLL_INTERVAL_MS").unwrap_or(5000),
            batch_limit: parsed(&lookup, "ACCRUAL_BATCH_LIMIT").unwrap_or(1000),
            worker_count,
            queue_capacity: parsed(&lookup, "ACCRUAL_QUEUE_CAPACITY").unwrap_or(worker_count),
            max_retries: parsed(&lookup, "ACCRUAL_MAX_RETRIES").unwrap_or(3),
            retry_interval_ms: parsed(&lookup, "ACCRUAL_RETRY_INTERVAL_MS").unwrap_or(1000),
            request_timeout_secs: parsed(&lookup, "ACCRUAL_REQUEST_TIMEOUT_SECS").unwrap_or(15),
            log_level: lookup("LOG_LVL").unwrap_or_else(|| "info".into()),
            log_dir: lookup("LOG_DIR").filter(|v| !v.is_empty()),
            seed_file: lookup("SEED_FILE").filter(|v| !v.is_empty()),
        }
    }

    /// Reconciliation period, never shorter than [`MIN_POLL_INTERVAL`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL)
    }

    /// Poll loop settings
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings::new(self.poll_interval(), self.batch_limit)
    }

    /// Retry/backoff policy for one order resolution
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_interval_ms),
        )
    }

    /// Accrual authority client configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.accrual_system_address).with_timeout(self.request_timeout_secs)
    }
}

/// Parse a variable, treating unset or malformed values as absent
fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
