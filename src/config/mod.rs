// ==========================================
// im2txt 图像描述模型 - 配置层
// ==========================================
// 职责: 默认超参数、分层加载与覆写、显式校验
// 使用方: 输入管道 / 建模 / 辅助损失 / 训练循环（均在本 crate 之外）
// ==========================================

pub mod config_manager;
pub mod discrepancy;
pub mod embedding_config;
pub mod error;
pub mod model_config;
pub mod paths;
pub mod reader_traits;
pub mod training_config;
pub mod validator;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager, LoadOptions};
pub use discrepancy::{known_discrepancies, ConfigDiscrepancy};
pub use embedding_config::EmbeddingConfig;
pub use error::{ConfigError, ConfigResult};
pub use model_config::ModelConfig;
pub use reader_traits::{
    AuxiliaryLossConfigReader, InputPipelineConfigReader, ModelBuildConfigReader,
    TrainingLoopConfigReader,
};
pub use training_config::TrainingConfig;
pub use validator::{RunMode, Severity, ValidationMode, ValidationReport, ValidationViolation};
