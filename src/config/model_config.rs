// ==========================================
// im2txt 图像描述模型 - 模型超参数
// ==========================================
// 职责: 模型、输入管道、解码与辅助损失的默认超参数
// 红线: 构造只赋字面默认值，不校验、不读环境、不做 I/O
// ==========================================

use serde::{Deserialize, Serialize};

use crate::config::discrepancy::EFFECTIVE_VALUES_PER_WIKIPEDIA_SHARD;
use crate::config::embedding_config::EmbeddingConfig;
use crate::config::paths;

/// 模型超参数
///
/// 字段为公开字段，交给建模方之前可以直接修改。
/// 校验是独立步骤，见 `config::validator`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    // ===== 输入管道 =====
    /// 分片 TFRecord 文件模式（SequenceExample），训练和评估模式必须提供
    pub input_file_pattern: Option<String>,

    /// 图像格式（"jpeg" 或 "png"）
    pub image_format: String,

    /// 每个输入分片的近似样本数，用于保证分片间充分混洗
    pub values_per_input_shard: usize,

    /// 输入队列中至少保留的分片数
    pub input_queue_capacity_factor: usize,

    /// 预取 SequenceExample 的线程数
    pub num_input_reader_threads: usize,

    // ===== 训练记录特征名 =====
    /// 图像数据所在的 context 特征名
    pub image_feature_name: String,
    pub image_id_name: String,

    /// 描述词 ID 序列所在的 feature list 名
    pub caption_feature_name: String,

    // ===== 模型 =====
    /// 词表大小（含 <UNK>）
    ///
    /// 默认值大于实际词表，以兼容不同分词器版本。
    /// 大于实际词表无害；小于实际词表会在使用时报错。
    pub vocab_size: usize,

    /// 图像预处理线程数，应为 2 的倍数
    pub num_preprocess_threads: usize,

    pub batch_size: usize,

    // ===== 解码 =====
    pub beam_size: usize,
    pub maximum_iterations: usize,

    /// Inception v3 检查点，首次训练时必须提供
    pub inception_checkpoint_file: Option<String>,

    /// Inception v3 输入图像尺寸
    pub image_height: usize,
    pub image_width: usize,

    /// 模型变量初始化范围
    pub initializer_scale: f64,

    /// LSTM 输入、输出维度
    pub embedding_size: usize,
    pub num_lstm_units: usize,

    /// 小于 1.0 时作为 LSTM 变量的 dropout 保留概率
    pub lstm_dropout_keep_prob: f64,

    /// 是否微调 GloVe 词向量
    pub train_embeddings: bool,

    // ===== 辅助损失 =====
    pub weight_generality_heuristic: f64,
    pub weight_wikipedia: f64,

    pub generality_heuristic_samples: usize,
    pub generality_heuristic_file: String,

    // ===== Wikipedia 数据集 =====
    pub wikipedia_file_pattern: Option<String>,
    pub article_id_name: String,
    /// 注意: 拼写 "sencence" 与记录写入方保持一致，不可修正
    pub sentence_id_name: String,
    pub title_feature_name: String,
    pub sentence_feature_name: String,
    /// 默认值存在重复赋值，见 `config::discrepancy`
    pub values_per_wikipedia_shard: usize,

    // ===== DeepFashion 数据集 =====
    pub deepfashion_file_pattern: Option<String>,
    pub df_filename_name: String,
    pub df_image_name: String,
    pub df_category_name: String,
    pub df_attributes_name: String,

    // ===== 词表与词向量加载 =====
    pub embedding_config: EmbeddingConfig,
}

impl ModelConfig {
    /// 创建默认模型超参数
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input_file_pattern: None,
            image_format: "jpeg".to_string(),
            values_per_input_shard: 2300,
            input_queue_capacity_factor: 2,
            num_input_reader_threads: 1,

            image_feature_name: "image/data".to_string(),
            image_id_name: "image/image_id".to_string(),
            caption_feature_name: "image/caption_ids".to_string(),

            vocab_size: 70000,
            num_preprocess_threads: 4,
            batch_size: 32,
            beam_size: 3,
            maximum_iterations: 20,

            inception_checkpoint_file: None,
            image_height: 299,
            image_width: 299,
            initializer_scale: 0.08,
            embedding_size: 300,
            num_lstm_units: 300,
            lstm_dropout_keep_prob: 0.7,
            train_embeddings: false,

            weight_generality_heuristic: 0.5,
            weight_wikipedia: 0.5,
            generality_heuristic_samples: 100,
            generality_heuristic_file: paths::DEFAULT_HEURISTIC_FILE.to_string(),

            wikipedia_file_pattern: None,
            article_id_name: "sentence/article_id".to_string(),
            sentence_id_name: "sencence/sentence_id".to_string(),
            title_feature_name: "sentence/article_title_ids".to_string(),
            sentence_feature_name: "sentence/sentence_words_ids".to_string(),
            values_per_wikipedia_shard: EFFECTIVE_VALUES_PER_WIKIPEDIA_SHARD,

            deepfashion_file_pattern: None,
            df_filename_name: "image/filename".to_string(),
            df_image_name: "image/data".to_string(),
            df_category_name: "image/category".to_string(),
            df_attributes_name: "image/attributes".to_string(),

            embedding_config: EmbeddingConfig::default(),
        }
    }
}
