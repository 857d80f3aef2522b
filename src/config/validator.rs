// ==========================================
// im2txt 图像描述模型 - 配置校验器
// ==========================================
// 职责: 由使用方显式调用的配置校验（构造时从不校验）
// 输出: 违规列表（错误/警告），按校验模式决定是否返回错误
// ==========================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::config_manager::config_keys;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::model_config::ModelConfig;
use crate::config::training_config::TrainingConfig;

/// 支持的图像格式
pub const SUPPORTED_IMAGE_FORMATS: &[&str] = &["jpeg", "png"];

/// 支持的优化器名称
pub const SUPPORTED_OPTIMIZERS: &[&str] = &["SGD", "Adagrad", "Adam", "Ftrl", "Momentum", "RMSProp"];

// ==========================================
// RunMode - 运行模式
// ==========================================

/// 配置的使用场景
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// 训练；from_scratch 表示首次训练（需要 Inception 检查点）
    Train { from_scratch: bool },
    /// 评估
    Eval,
    /// 推理（生成描述）
    Inference,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Train { from_scratch: true } => write!(f, "train(from_scratch)"),
            RunMode::Train { from_scratch: false } => write!(f, "train"),
            RunMode::Eval => write!(f, "eval"),
            RunMode::Inference => write!(f, "inference"),
        }
    }
}

// ==========================================
// ValidationMode - 校验模式
// ==========================================

/// 校验模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMode {
    /// 严格模式：存在任何错误级违规即返回错误
    Strict,
    /// 宽松模式：记录告警后放行，保持“接受任何值”的默认行为
    Lenient,
}

/// 违规级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// 单项违规
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// 配置键（见 config_keys）
    pub key: String,
    pub severity: Severity,
    /// 违规原因
    pub reason: String,
}

impl ValidationViolation {
    fn error(key: &str, reason: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            severity: Severity::Error,
            reason: reason.into(),
        }
    }

    fn warning(key: &str, reason: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            severity: Severity::Warning,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
        };
        write!(f, "[{}] {}: {}", level, self.key, self.reason)
    }
}

// ==========================================
// ValidationReport - 校验报告
// ==========================================

/// 校验报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub mode: RunMode,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationReport {
    /// 没有错误级违规（警告不影响）
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
    }

    /// 是否包含指定键的违规
    pub fn has_violation(&self, key: &str) -> bool {
        self.violations.iter().any(|v| v.key == key)
    }

    /// 按校验模式转换为结果
    ///
    /// # 返回
    /// - Strict: 有错误时返回 ConfigError::Validation（只携带错误级违规）
    /// - Lenient: 记录所有违规后返回 Ok
    pub fn into_result(self, validation_mode: ValidationMode) -> ConfigResult<()> {
        for v in &self.violations {
            match v.severity {
                Severity::Error => tracing::warn!(config_key = %v.key, run_mode = %self.mode, "配置错误: {}", v.reason),
                Severity::Warning => tracing::warn!(config_key = %v.key, run_mode = %self.mode, "配置警告: {}", v.reason),
            }
        }

        if validation_mode == ValidationMode::Lenient || self.is_ok() {
            return Ok(());
        }

        let mode = self.mode.to_string();
        let violations: Vec<ValidationViolation> = self
            .violations
            .into_iter()
            .filter(|v| v.severity == Severity::Error)
            .collect();
        Err(ConfigError::Validation { mode, violations })
    }
}

// ==========================================
// 校验规则
// ==========================================

fn require_positive(out: &mut Vec<ValidationViolation>, key: &str, value: usize) {
    if value == 0 {
        out.push(ValidationViolation::error(key, "必须大于 0"));
    }
}

fn require_non_empty(out: &mut Vec<ValidationViolation>, key: &str, value: &str) {
    if value.trim().is_empty() {
        out.push(ValidationViolation::error(key, "不能为空"));
    }
}

/// 校验模型超参数（与运行模式无关的规则）
pub fn validate_model_config(config: &ModelConfig) -> Vec<ValidationViolation> {
    let mut out = Vec::new();

    // ===== 输入管道 =====
    if !SUPPORTED_IMAGE_FORMATS.contains(&config.image_format.as_str()) {
        out.push(ValidationViolation::error(
            config_keys::IMAGE_FORMAT,
            format!("不支持的图像格式 '{}'（仅支持 jpeg/png）", config.image_format),
        ));
    }
    require_positive(&mut out, config_keys::VALUES_PER_INPUT_SHARD, config.values_per_input_shard);
    require_positive(&mut out, config_keys::INPUT_QUEUE_CAPACITY_FACTOR, config.input_queue_capacity_factor);
    require_positive(&mut out, config_keys::NUM_INPUT_READER_THREADS, config.num_input_reader_threads);
    require_positive(&mut out, config_keys::NUM_PREPROCESS_THREADS, config.num_preprocess_threads);
    if config.num_preprocess_threads % 2 != 0 {
        out.push(ValidationViolation::warning(
            config_keys::NUM_PREPROCESS_THREADS,
            format!("应为 2 的倍数，当前 {}", config.num_preprocess_threads),
        ));
    }
    require_positive(&mut out, config_keys::BATCH_SIZE, config.batch_size);

    // ===== 特征名 =====
    for (key, value) in [
        (config_keys::IMAGE_FEATURE_NAME, &config.image_feature_name),
        (config_keys::IMAGE_ID_NAME, &config.image_id_name),
        (config_keys::CAPTION_FEATURE_NAME, &config.caption_feature_name),
        (config_keys::ARTICLE_ID_NAME, &config.article_id_name),
        (config_keys::SENTENCE_ID_NAME, &config.sentence_id_name),
        (config_keys::TITLE_FEATURE_NAME, &config.title_feature_name),
        (config_keys::SENTENCE_FEATURE_NAME, &config.sentence_feature_name),
        (config_keys::DF_FILENAME_NAME, &config.df_filename_name),
        (config_keys::DF_IMAGE_NAME, &config.df_image_name),
        (config_keys::DF_CATEGORY_NAME, &config.df_category_name),
        (config_keys::DF_ATTRIBUTES_NAME, &config.df_attributes_name),
    ] {
        require_non_empty(&mut out, key, value);
    }

    // ===== 模型与解码 =====
    require_positive(&mut out, config_keys::VOCAB_SIZE, config.vocab_size);
    require_positive(&mut out, config_keys::BEAM_SIZE, config.beam_size);
    require_positive(&mut out, config_keys::MAXIMUM_ITERATIONS, config.maximum_iterations);
    require_positive(&mut out, config_keys::IMAGE_HEIGHT, config.image_height);
    require_positive(&mut out, config_keys::IMAGE_WIDTH, config.image_width);
    require_positive(&mut out, config_keys::EMBEDDING_SIZE, config.embedding_size);
    require_positive(&mut out, config_keys::NUM_LSTM_UNITS, config.num_lstm_units);

    if !(config.initializer_scale > 0.0) {
        out.push(ValidationViolation::error(
            config_keys::INITIALIZER_SCALE,
            format!("必须大于 0，当前 {}", config.initializer_scale),
        ));
    }
    if !(config.lstm_dropout_keep_prob > 0.0 && config.lstm_dropout_keep_prob <= 1.0) {
        out.push(ValidationViolation::error(
            config_keys::LSTM_DROPOUT_KEEP_PROB,
            format!("必须位于 (0, 1]，当前 {}", config.lstm_dropout_keep_prob),
        ));
    }

    // ===== 辅助损失 =====
    for (key, weight) in [
        (config_keys::WEIGHT_GENERALITY_HEURISTIC, config.weight_generality_heuristic),
        (config_keys::WEIGHT_WIKIPEDIA, config.weight_wikipedia),
    ] {
        if !(weight >= 0.0) {
            out.push(ValidationViolation::error(key, format!("损失权重不能为负，当前 {}", weight)));
        }
    }
    if config.weight_generality_heuristic > 0.0 {
        require_positive(&mut out, config_keys::GENERALITY_HEURISTIC_SAMPLES, config.generality_heuristic_samples);
        require_non_empty(&mut out, config_keys::GENERALITY_HEURISTIC_FILE, &config.generality_heuristic_file);
    }
    require_positive(&mut out, config_keys::VALUES_PER_WIKIPEDIA_SHARD, config.values_per_wikipedia_shard);

    // ===== 词向量 =====
    let emb = &config.embedding_config;
    require_positive(&mut out, config_keys::EMBEDDING_DIM, emb.embedding);
    require_non_empty(&mut out, config_keys::EMBEDDING_SOURCE_DIRECTORY, &emb.source_directory);
    if emb.vocabulary_length > config.vocab_size {
        out.push(ValidationViolation::error(
            config_keys::EMBEDDING_VOCABULARY_LENGTH,
            format!(
                "词向量词表长度 {} 超过 vocab_size {}",
                emb.vocabulary_length, config.vocab_size
            ),
        ));
    } else if emb.vocabulary_length != config.vocab_size {
        out.push(ValidationViolation::warning(
            config_keys::EMBEDDING_VOCABULARY_LENGTH,
            format!(
                "词向量词表长度 {} 与 vocab_size {} 不一致",
                emb.vocabulary_length, config.vocab_size
            ),
        ));
    }
    if emb.embedding != config.embedding_size {
        out.push(ValidationViolation::warning(
            config_keys::EMBEDDING_DIM,
            format!(
                "词向量维度 {} 与 embedding_size {} 不一致",
                emb.embedding, config.embedding_size
            ),
        ));
    }
    for (key, token) in [
        (config_keys::EMBEDDING_START_TOKEN, &emb.start_token),
        (config_keys::EMBEDDING_END_TOKEN, &emb.end_token),
        (config_keys::EMBEDDING_UNKNOWN_TOKEN, &emb.unknown_token),
    ] {
        require_non_empty(&mut out, key, token);
    }
    let [start, end, unk] = emb.sentinel_tokens();
    if start == end || start == unk || end == unk {
        out.push(ValidationViolation::error(
            config_keys::EMBEDDING_UNKNOWN_TOKEN,
            format!("哨兵标记必须互不相同: start={}, end={}, unknown={}", start, end, unk),
        ));
    }

    out
}

/// 校验训练超参数
pub fn validate_training_config(config: &TrainingConfig) -> Vec<ValidationViolation> {
    let mut out = Vec::new();

    if config.num_examples_per_epoch == 0 {
        out.push(ValidationViolation::error(config_keys::NUM_EXAMPLES_PER_EPOCH, "必须大于 0"));
    }
    if !SUPPORTED_OPTIMIZERS.contains(&config.optimizer.as_str()) {
        out.push(ValidationViolation::error(
            config_keys::OPTIMIZER,
            format!(
                "不支持的优化器 '{}'（可选: {}）",
                config.optimizer,
                SUPPORTED_OPTIMIZERS.join("/")
            ),
        ));
    }
    for (key, rate) in [
        (config_keys::INITIAL_LEARNING_RATE, config.initial_learning_rate),
        (config_keys::TRAIN_INCEPTION_LEARNING_RATE, config.train_inception_learning_rate),
    ] {
        if !(rate > 0.0) {
            out.push(ValidationViolation::error(key, format!("学习率必须大于 0，当前 {}", rate)));
        }
    }

    let factor = config.learning_rate_decay_factor;
    if factor < 0.0 || factor.is_nan() {
        out.push(ValidationViolation::error(
            config_keys::LEARNING_RATE_DECAY_FACTOR,
            format!("不能为负，当前 {}", factor),
        ));
    } else if factor > 1.0 {
        out.push(ValidationViolation::warning(
            config_keys::LEARNING_RATE_DECAY_FACTOR,
            format!("大于 1 时学习率会逐步增大，当前 {}", factor),
        ));
    }
    if config.decay_enabled() && !(config.num_epochs_per_decay > 0.0) {
        out.push(ValidationViolation::error(
            config_keys::NUM_EPOCHS_PER_DECAY,
            format!("启用衰减时必须大于 0，当前 {}", config.num_epochs_per_decay),
        ));
    }

    if let Some(clip) = config.clip_gradients {
        if !(clip > 0.0) {
            out.push(ValidationViolation::error(
                config_keys::CLIP_GRADIENTS,
                format!("梯度裁剪阈值必须大于 0，当前 {}（不裁剪请设为 null）", clip),
            ));
        }
    }
    if config.max_checkpoints_to_keep == 0 {
        out.push(ValidationViolation::warning(
            config_keys::MAX_CHECKPOINTS_TO_KEEP,
            "为 0 时检查点保留行为由训练方决定",
        ));
    }

    out
}

/// 按运行模式校验完整配置
///
/// # 模式规则
/// - Train / Eval: 必须提供 input_file_pattern
/// - Train { from_scratch: true }: 必须提供 inception_checkpoint_file
/// - Train: weight_wikipedia > 0 但未提供 wikipedia_file_pattern 时告警
/// - Inference: 仅通用规则
pub fn validate_for_mode(
    model: &ModelConfig,
    training: &TrainingConfig,
    mode: RunMode,
) -> ValidationReport {
    let mut violations = validate_model_config(model);

    match mode {
        RunMode::Train { from_scratch } => {
            violations.extend(validate_training_config(training));
            if model.input_file_pattern.is_none() {
                violations.push(ValidationViolation::error(
                    config_keys::INPUT_FILE_PATTERN,
                    "训练模式必须提供输入文件模式",
                ));
            }
            if from_scratch && model.inception_checkpoint_file.is_none() {
                violations.push(ValidationViolation::error(
                    config_keys::INCEPTION_CHECKPOINT_FILE,
                    "首次训练必须提供 Inception v3 检查点",
                ));
            }
            if model.weight_wikipedia > 0.0 && model.wikipedia_file_pattern.is_none() {
                violations.push(ValidationViolation::warning(
                    config_keys::WIKIPEDIA_FILE_PATTERN,
                    format!(
                        "weight_wikipedia = {} 但未提供 Wikipedia 文件模式",
                        model.weight_wikipedia
                    ),
                ));
            }
        }
        RunMode::Eval => {
            if model.input_file_pattern.is_none() {
                violations.push(ValidationViolation::error(
                    config_keys::INPUT_FILE_PATTERN,
                    "评估模式必须提供输入文件模式",
                ));
            }
        }
        RunMode::Inference => {}
    }

    tracing::debug!(
        run_mode = %mode,
        violations = violations.len(),
        "配置校验完成"
    );

    ValidationReport { mode, violations }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_model_and_training_rules() {
        assert!(validate_model_config(&ModelConfig::default()).is_empty());
        assert!(validate_training_config(&TrainingConfig::default()).is_empty());
    }

    #[test]
    fn test_inference_mode_accepts_defaults() {
        let report = validate_for_mode(
            &ModelConfig::default(),
            &TrainingConfig::default(),
            RunMode::Inference,
        );
        assert!(report.is_ok());
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_train_mode_requires_input_and_checkpoint() {
        let report = validate_for_mode(
            &ModelConfig::default(),
            &TrainingConfig::default(),
            RunMode::Train { from_scratch: true },
        );
        assert!(!report.is_ok());
        assert!(report.has_violation(config_keys::INPUT_FILE_PATTERN));
        assert!(report.has_violation(config_keys::INCEPTION_CHECKPOINT_FILE));
        assert!(report
            .warnings()
            .any(|v| v.key == config_keys::WIKIPEDIA_FILE_PATTERN));
    }

    #[test]
    fn test_odd_preprocess_threads_is_warning() {
        let config = ModelConfig {
            num_preprocess_threads: 3,
            ..Default::default()
        };
        let violations = validate_model_config(&config);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::Warning);
    }

    #[test]
    fn test_dropout_keep_prob_range() {
        for bad in [0.0, -0.1, 1.5, f64::NAN] {
            let config = ModelConfig {
                lstm_dropout_keep_prob: bad,
                ..Default::default()
            };
            let violations = validate_model_config(&config);
            assert!(
                violations
                    .iter()
                    .any(|v| v.key == config_keys::LSTM_DROPOUT_KEEP_PROB),
                "keep_prob={} 应被拒绝",
                bad
            );
        }
    }

    #[test]
    fn test_vocabulary_desync() {
        let mut config = ModelConfig::default();
        config.vocab_size = 60000;
        let violations = validate_model_config(&config);
        let v = violations
            .iter()
            .find(|v| v.key == config_keys::EMBEDDING_VOCABULARY_LENGTH)
            .unwrap();
        assert_eq!(v.severity, Severity::Error);

        config.vocab_size = 80000;
        let violations = validate_model_config(&config);
        let v = violations
            .iter()
            .find(|v| v.key == config_keys::EMBEDDING_VOCABULARY_LENGTH)
            .unwrap();
        assert_eq!(v.severity, Severity::Warning);
    }

    #[test]
    fn test_duplicate_sentinel_tokens() {
        let mut config = ModelConfig::default();
        config.embedding_config.end_token = "<S>".to_string();
        let violations = validate_model_config(&config);
        assert!(violations
            .iter()
            .any(|v| v.key == config_keys::EMBEDDING_UNKNOWN_TOKEN && v.severity == Severity::Error));
    }

    #[test]
    fn test_unknown_optimizer_and_clip() {
        let config = TrainingConfig {
            optimizer: "Lion".to_string(),
            clip_gradients: Some(0.0),
            ..Default::default()
        };
        let violations = validate_training_config(&config);
        assert!(violations.iter().any(|v| v.key == config_keys::OPTIMIZER));
        assert!(violations.iter().any(|v| v.key == config_keys::CLIP_GRADIENTS));
    }

    /// 捕获日志输出
    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lenient_logs_warnings_at_warn_level() {
        let config = ModelConfig {
            num_preprocess_threads: 3,
            ..Default::default()
        };
        let report = validate_for_mode(&config, &TrainingConfig::default(), RunMode::Inference);
        assert_eq!(report.warnings().count(), 1);

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || {
            report.into_result(ValidationMode::Lenient)
        });
        assert!(result.is_ok());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|l| l.contains("配置警告"))
            .expect("应记录配置警告");
        assert!(line.contains("WARN"), "警告应以 warn 级别记录: {}", line);
        assert!(!line.contains("INFO"));
    }

    #[test]
    fn test_strict_and_lenient() {
        let report = validate_for_mode(
            &ModelConfig::default(),
            &TrainingConfig::default(),
            RunMode::Eval,
        );
        assert!(report.clone().into_result(ValidationMode::Lenient).is_ok());

        match report.into_result(ValidationMode::Strict) {
            Err(ConfigError::Validation { mode, violations }) => {
                assert_eq!(mode, "eval");
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].key, config_keys::INPUT_FILE_PATTERN);
            }
            other => panic!("期望校验错误，实际 {:?}", other),
        }
    }
}
