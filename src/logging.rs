// ==========================================
// im2txt 图像描述模型 - 日志初始化
// ==========================================
// stdout 只输出配置快照，日志一律写 stderr
// 格式: 文本（默认）或 JSON（IM2TXT_LOG_FORMAT=json，便于训练集群采集）
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "IM2TXT_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// 解析格式名，无法识别时回落到文本格式
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info），例如 RUST_LOG=im2txt_config=debug
/// - IM2TXT_LOG_FORMAT: text | json
///
/// # 示例
/// ```no_run
/// use im2txt_config::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match LogFormat::from_env() {
        LogFormat::Json => builder.json().with_current_span(false).init(),
        LogFormat::Text => builder.with_line_number(true).init(),
    }
}
