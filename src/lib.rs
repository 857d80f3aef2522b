// ==========================================
// im2txt 图像描述模型 - 配置库
// ==========================================
// 职责: 模型与训练超参数的默认值、加载、校验
// 系统定位: 为外部训练/评估/推理驱动提供类型化配置
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 配置层 - 超参数与加载
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{
    ConfigError, ConfigManager, ConfigResult, EmbeddingConfig, LoadOptions, ModelConfig, RunMode,
    TrainingConfig, ValidationMode, ValidationReport,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "im2txt-config";
