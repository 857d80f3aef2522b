// ==========================================
// im2txt 图像描述模型 - 配置管理器
// ==========================================
// 职责: 生效配置的分层解析、按键覆写、快照与恢复
// 分层: 默认值 → 数据根目录 → 设置文件 → 键值覆写（后者覆盖前者）
// ==========================================

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::discrepancy;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::model_config::ModelConfig;
use crate::config::paths;
use crate::config::training_config::TrainingConfig;
use crate::config::validator::{self, RunMode, ValidationReport};

/// 键值覆写环境变量前缀，例如 IM2TXT__MODEL__BATCH_SIZE=64
pub const OVERRIDE_ENV_PREFIX: &str = "IM2TXT__";

/// 快照元信息键前缀（恢复时忽略）
const META_PREFIX: &str = "__meta_";

// ==========================================
// LoadOptions - 加载选项
// ==========================================

/// 配置加载选项
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    /// 数据根目录（重定位启发式文件与词向量目录）
    pub data_root: Option<PathBuf>,

    /// JSON 设置文件
    pub settings_file: Option<PathBuf>,

    /// 键值覆写，按顺序应用
    pub overrides: Vec<(String, String)>,
}

impl LoadOptions {
    /// 从进程环境构造加载选项
    ///
    /// # 环境变量
    /// - IM2TXT_DATA_ROOT: 数据根目录
    /// - IM2TXT_CONFIG_PATH: 设置文件（未设置时使用默认位置，文件存在才加载）
    /// - IM2TXT__<SECTION>__<FIELD>: 键值覆写（按变量名排序）
    pub fn from_env() -> Self {
        let settings_file = paths::settings_file_from_env()
            .or_else(|| paths::default_settings_file().filter(|p| p.is_file()));

        Self {
            data_root: paths::data_root_from_env(),
            settings_file,
            overrides: overrides_from_vars(utf8_vars(std::env::vars_os())),
        }
    }

    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = Some(root.into());
        self
    }

    pub fn with_settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }
}

/// 只保留名称与取值均为合法 UTF-8 的环境变量
///
/// 非 UTF-8 的 IM2TXT__* 覆写会被跳过并记录 warn，其余变量静默忽略。
pub fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| match (name.into_string(), value.into_string()) {
            (Ok(name), Ok(value)) => Some((name, value)),
            (name, _) => {
                let lossy = match &name {
                    Ok(name) => name.clone(),
                    Err(raw) => raw.to_string_lossy().into_owned(),
                };
                if lossy.starts_with(OVERRIDE_ENV_PREFIX) {
                    tracing::warn!(env_var = %lossy, "环境变量覆写不是合法 UTF-8，已跳过");
                }
                None
            }
        })
}

/// 从环境变量集合中提取键值覆写
///
/// IM2TXT__MODEL__EMBEDDING_CONFIG__START_TOKEN → model.embedding_config.start_token
pub fn overrides_from_vars<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut overrides: Vec<(String, String)> = vars
        .into_iter()
        .filter_map(|(name, value)| {
            let rest = name.strip_prefix(OVERRIDE_ENV_PREFIX)?;
            if rest.is_empty() {
                return None;
            }
            Some((rest.to_lowercase().replace("__", "."), value))
        })
        .collect();
    overrides.sort_by(|a, b| a.0.cmp(&b.0));
    overrides
}

// ==========================================
// ConfigDocument - 序列化形态
// ==========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigDocument {
    model: ModelConfig,
    training: TrainingConfig,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================

/// 配置管理器
///
/// 持有一份 ModelConfig 与一份 TrainingConfig，二者互相独立，
/// 分别交给建模方与训练循环。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigManager {
    model: ModelConfig,
    training: TrainingConfig,
}

impl ConfigManager {
    /// 默认配置（不读环境、不做 I/O）
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(model: ModelConfig, training: TrainingConfig) -> Self {
        Self { model, training }
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn training(&self) -> &TrainingConfig {
        &self.training
    }

    pub fn model_mut(&mut self) -> &mut ModelConfig {
        &mut self.model
    }

    pub fn training_mut(&mut self) -> &mut TrainingConfig {
        &mut self.training
    }

    pub fn into_parts(self) -> (ModelConfig, TrainingConfig) {
        (self.model, self.training)
    }

    /// 从进程环境加载生效配置
    pub fn load() -> ConfigResult<Self> {
        Self::load_with(&LoadOptions::from_env())
    }

    /// 按加载选项解析生效配置
    ///
    /// # 顺序
    /// 1. 默认值
    /// 2. 数据根目录重定位
    /// 3. 设置文件（部分字段深度合并）
    /// 4. 键值覆写
    pub fn load_with(options: &LoadOptions) -> ConfigResult<Self> {
        let mut manager = Self::new();
        discrepancy::log_known_discrepancies();

        if let Some(root) = &options.data_root {
            manager.apply_data_root(root);
        }

        if let Some(path) = &options.settings_file {
            manager.merge_settings_file(path)?;
        }

        for (key, value) in &options.overrides {
            manager.apply_override(key, value)?;
        }

        tracing::info!(
            data_root = ?options.data_root,
            settings_file = ?options.settings_file,
            overrides = options.overrides.len(),
            "配置加载完成"
        );

        Ok(manager)
    }

    /// 将启发式文件与词向量目录重定位到指定数据根目录下
    pub fn apply_data_root(&mut self, root: &Path) {
        self.model.generality_heuristic_file = paths::heuristic_file_under(root);
        self.model.embedding_config.source_directory = paths::embedding_dir_under(root);

        tracing::debug!(
            data_root = %root.display(),
            heuristic_file = %self.model.generality_heuristic_file,
            embedding_dir = %self.model.embedding_config.source_directory,
            "数据根目录已应用"
        );
    }

    /// 合并 JSON 设置文件
    ///
    /// 格式: `{"model": {...}, "training": {...}}`，两段均可省略，
    /// 段内字段均可省略（保持当前值）。
    pub fn merge_settings_file(&mut self, path: &Path) -> ConfigResult<()> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SettingsFileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_err = |message: String| ConfigError::SettingsFileParse {
            path: path.to_path_buf(),
            message,
        };

        let patch: Value = serde_json::from_str(&raw).map_err(|e| parse_err(e.to_string()))?;
        let sections = patch
            .as_object()
            .ok_or_else(|| parse_err("顶层必须是 JSON 对象".to_string()))?;
        if let Some(unknown) = sections.keys().find(|k| *k != "model" && *k != "training") {
            return Err(parse_err(format!("未识别的设置段: {}", unknown)));
        }

        let mut doc = self.to_document()?;
        merge_json(&mut doc, patch);
        *self = Self::from_document(doc).map_err(|e| parse_err(e.to_string()))?;

        tracing::debug!(settings_file = %path.display(), "设置文件已合并");
        Ok(())
    }

    /// 按配置键覆写单个字段
    ///
    /// # 参数
    /// - key: 可识别的配置键（见 config_keys）
    /// - raw_value: 原始字符串；能解析为 JSON 时按 JSON 取值，否则视为字符串
    ///
    /// # 示例
    /// - ("model.batch_size", "64")
    /// - ("model.input_file_pattern", "/data/train-?????-of-00256")
    /// - ("training.clip_gradients", "null")
    pub fn apply_override(&mut self, key: &str, raw_value: &str) -> ConfigResult<()> {
        let pointer = key_to_pointer(key)?;

        let parsed = serde_json::from_str::<Value>(raw_value)
            .unwrap_or_else(|_| Value::String(raw_value.to_string()));

        let updated = match self.with_value_at(&pointer, parsed.clone()) {
            Ok(manager) => manager,
            // "123" 之类的值写入字符串字段时按原文重试
            Err(_) if !parsed.is_string() => self
                .with_value_at(&pointer, Value::String(raw_value.to_string()))
                .map_err(|e| invalid_value(key, raw_value, e))?,
            Err(e) => return Err(invalid_value(key, raw_value, e)),
        };

        *self = updated;
        tracing::debug!(config_key = key, value = raw_value, "配置已覆写");
        Ok(())
    }

    /// 按配置键读取当前值
    pub fn get_value(&self, key: &str) -> ConfigResult<Value> {
        let pointer = key_to_pointer(key)?;
        let doc = self.to_document()?;
        doc.pointer(&pointer)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
    }

    /// 获取生效配置快照（JSON）
    ///
    /// # 用途
    /// - 训练开始时与检查点一同记录，便于复现
    pub fn snapshot_json(&self) -> ConfigResult<String> {
        let mut doc = self.to_document()?;
        if let Value::Object(map) = &mut doc {
            map.insert(
                format!("{}captured_at", META_PREFIX),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
            map.insert(
                format!("{}crate_version", META_PREFIX),
                Value::String(crate::VERSION.to_string()),
            );
        }
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// 从快照恢复配置
    ///
    /// # 说明
    /// - 忽略 `__meta_` 开头的元信息键
    /// - 缺失的段或字段使用默认值
    pub fn restore_from_snapshot(snapshot_json: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(snapshot_json)
            .map_err(|e| ConfigError::InvalidSnapshot(e.to_string()))?;

        let mut map = match value {
            Value::Object(map) => map,
            _ => return Err(ConfigError::InvalidSnapshot("顶层必须是 JSON 对象".to_string())),
        };
        map.retain(|k, _| !k.starts_with(META_PREFIX));

        Self::from_document(Value::Object(map))
            .map_err(|e| ConfigError::InvalidSnapshot(e.to_string()))
    }

    /// 按运行模式校验（显式调用，加载时不自动校验）
    pub fn validate(&self, mode: RunMode) -> ValidationReport {
        validator::validate_for_mode(&self.model, &self.training, mode)
    }

    // ===== 内部辅助 =====

    fn to_document(&self) -> ConfigResult<Value> {
        let doc = ConfigDocument {
            model: self.model.clone(),
            training: self.training.clone(),
        };
        Ok(serde_json::to_value(doc)?)
    }

    fn from_document(doc: Value) -> Result<Self, serde_json::Error> {
        let doc: ConfigDocument = serde_json::from_value(doc)?;
        Ok(Self::from_parts(doc.model, doc.training))
    }

    fn with_value_at(&self, pointer: &str, value: Value) -> Result<Self, String> {
        let mut doc = self.to_document().map_err(|e| e.to_string())?;
        let slot = doc
            .pointer_mut(pointer)
            .ok_or_else(|| format!("字段不存在: {}", pointer))?;
        *slot = value;
        Self::from_document(doc).map_err(|e| e.to_string())
    }
}

fn invalid_value(key: &str, raw_value: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw_value.to_string(),
        message,
    }
}

/// 配置键 → JSON Pointer（model.embedding_config.start_token → /model/embedding_config/start_token）
fn key_to_pointer(key: &str) -> ConfigResult<String> {
    let key = key.trim();
    if !config_keys::is_recognized(key) {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }
    Ok(format!("/{}", key.replace('.', "/")))
}

/// 深度合并：对象逐键递归，其他类型整体替换
fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (k, v) in patch_map {
                match base_map.get_mut(&k) {
                    Some(existing) => merge_json(existing, v),
                    None => {
                        base_map.insert(k, v);
                    }
                }
            }
        }
        (slot, patch) => *slot = patch,
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 输入管道
    pub const INPUT_FILE_PATTERN: &str = "model.input_file_pattern";
    pub const IMAGE_FORMAT: &str = "model.image_format";
    pub const VALUES_PER_INPUT_SHARD: &str = "model.values_per_input_shard";
    pub const INPUT_QUEUE_CAPACITY_FACTOR: &str = "model.input_queue_capacity_factor";
    pub const NUM_INPUT_READER_THREADS: &str = "model.num_input_reader_threads";
    pub const NUM_PREPROCESS_THREADS: &str = "model.num_preprocess_threads";
    pub const BATCH_SIZE: &str = "model.batch_size";

    // 训练记录特征名
    pub const IMAGE_FEATURE_NAME: &str = "model.image_feature_name";
    pub const IMAGE_ID_NAME: &str = "model.image_id_name";
    pub const CAPTION_FEATURE_NAME: &str = "model.caption_feature_name";

    // 模型
    pub const VOCAB_SIZE: &str = "model.vocab_size";
    pub const INCEPTION_CHECKPOINT_FILE: &str = "model.inception_checkpoint_file";
    pub const IMAGE_HEIGHT: &str = "model.image_height";
    pub const IMAGE_WIDTH: &str = "model.image_width";
    pub const INITIALIZER_SCALE: &str = "model.initializer_scale";
    pub const EMBEDDING_SIZE: &str = "model.embedding_size";
    pub const NUM_LSTM_UNITS: &str = "model.num_lstm_units";
    pub const LSTM_DROPOUT_KEEP_PROB: &str = "model.lstm_dropout_keep_prob";
    pub const TRAIN_EMBEDDINGS: &str = "model.train_embeddings";

    // 解码
    pub const BEAM_SIZE: &str = "model.beam_size";
    pub const MAXIMUM_ITERATIONS: &str = "model.maximum_iterations";

    // 辅助损失
    pub const WEIGHT_GENERALITY_HEURISTIC: &str = "model.weight_generality_heuristic";
    pub const WEIGHT_WIKIPEDIA: &str = "model.weight_wikipedia";
    pub const GENERALITY_HEURISTIC_SAMPLES: &str = "model.generality_heuristic_samples";
    pub const GENERALITY_HEURISTIC_FILE: &str = "model.generality_heuristic_file";

    // Wikipedia 数据集
    pub const WIKIPEDIA_FILE_PATTERN: &str = "model.wikipedia_file_pattern";
    pub const ARTICLE_ID_NAME: &str = "model.article_id_name";
    pub const SENTENCE_ID_NAME: &str = "model.sentence_id_name";
    pub const TITLE_FEATURE_NAME: &str = "model.title_feature_name";
    pub const SENTENCE_FEATURE_NAME: &str = "model.sentence_feature_name";
    pub const VALUES_PER_WIKIPEDIA_SHARD: &str = "model.values_per_wikipedia_shard";

    // DeepFashion 数据集
    pub const DEEPFASHION_FILE_PATTERN: &str = "model.deepfashion_file_pattern";
    pub const DF_FILENAME_NAME: &str = "model.df_filename_name";
    pub const DF_IMAGE_NAME: &str = "model.df_image_name";
    pub const DF_CATEGORY_NAME: &str = "model.df_category_name";
    pub const DF_ATTRIBUTES_NAME: &str = "model.df_attributes_name";

    // 词向量加载
    pub const EMBEDDING_DIM: &str = "model.embedding_config.embedding";
    pub const EMBEDDING_SOURCE_DIRECTORY: &str = "model.embedding_config.source_directory";
    pub const EMBEDDING_VOCABULARY_LENGTH: &str = "model.embedding_config.vocabulary_length";
    pub const EMBEDDING_START_TOKEN: &str = "model.embedding_config.start_token";
    pub const EMBEDDING_END_TOKEN: &str = "model.embedding_config.end_token";
    pub const EMBEDDING_UNKNOWN_TOKEN: &str = "model.embedding_config.unknown_token";

    // 训练
    pub const NUM_EXAMPLES_PER_EPOCH: &str = "training.num_examples_per_epoch";
    pub const OPTIMIZER: &str = "training.optimizer";
    pub const INITIAL_LEARNING_RATE: &str = "training.initial_learning_rate";
    pub const LEARNING_RATE_DECAY_FACTOR: &str = "training.learning_rate_decay_factor";
    pub const NUM_EPOCHS_PER_DECAY: &str = "training.num_epochs_per_decay";
    pub const TRAIN_INCEPTION_LEARNING_RATE: &str = "training.train_inception_learning_rate";
    pub const CLIP_GRADIENTS: &str = "training.clip_gradients";
    pub const MAX_CHECKPOINTS_TO_KEEP: &str = "training.max_checkpoints_to_keep";

    /// 全部可识别的配置键
    pub const ALL: &[&str] = &[
        INPUT_FILE_PATTERN,
        IMAGE_FORMAT,
        VALUES_PER_INPUT_SHARD,
        INPUT_QUEUE_CAPACITY_FACTOR,
        NUM_INPUT_READER_THREADS,
        NUM_PREPROCESS_THREADS,
        BATCH_SIZE,
        IMAGE_FEATURE_NAME,
        IMAGE_ID_NAME,
        CAPTION_FEATURE_NAME,
        VOCAB_SIZE,
        INCEPTION_CHECKPOINT_FILE,
        IMAGE_HEIGHT,
        IMAGE_WIDTH,
        INITIALIZER_SCALE,
        EMBEDDING_SIZE,
        NUM_LSTM_UNITS,
        LSTM_DROPOUT_KEEP_PROB,
        TRAIN_EMBEDDINGS,
        BEAM_SIZE,
        MAXIMUM_ITERATIONS,
        WEIGHT_GENERALITY_HEURISTIC,
        WEIGHT_WIKIPEDIA,
        GENERALITY_HEURISTIC_SAMPLES,
        GENERALITY_HEURISTIC_FILE,
        WIKIPEDIA_FILE_PATTERN,
        ARTICLE_ID_NAME,
        SENTENCE_ID_NAME,
        TITLE_FEATURE_NAME,
        SENTENCE_FEATURE_NAME,
        VALUES_PER_WIKIPEDIA_SHARD,
        DEEPFASHION_FILE_PATTERN,
        DF_FILENAME_NAME,
        DF_IMAGE_NAME,
        DF_CATEGORY_NAME,
        DF_ATTRIBUTES_NAME,
        EMBEDDING_DIM,
        EMBEDDING_SOURCE_DIRECTORY,
        EMBEDDING_VOCABULARY_LENGTH,
        EMBEDDING_START_TOKEN,
        EMBEDDING_END_TOKEN,
        EMBEDDING_UNKNOWN_TOKEN,
        NUM_EXAMPLES_PER_EPOCH,
        OPTIMIZER,
        INITIAL_LEARNING_RATE,
        LEARNING_RATE_DECAY_FACTOR,
        NUM_EPOCHS_PER_DECAY,
        TRAIN_INCEPTION_LEARNING_RATE,
        CLIP_GRADIENTS,
        MAX_CHECKPOINTS_TO_KEEP,
    ];

    /// 是否为可识别的配置键
    pub fn is_recognized(key: &str) -> bool {
        ALL.contains(&key)
    }
}
