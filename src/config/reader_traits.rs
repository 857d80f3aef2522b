// ==========================================
// im2txt 图像描述模型 - 配置读取 Trait
// ==========================================
// 职责: 按使用方划分的只读配置视图（不包含实现之外的逻辑）
// 用途: 输入管道、建模、辅助损失、训练循环只依赖各自的 trait，
//       测试中可以替换为 Mock
// ==========================================

use crate::config::embedding_config::EmbeddingConfig;
use crate::config::model_config::ModelConfig;
use crate::config::training_config::TrainingConfig;

// ==========================================
// InputPipelineConfigReader
// ==========================================
// 实现者: ModelConfig
pub trait InputPipelineConfigReader: Send + Sync {
    /// 输入文件模式（训练/评估必须提供）
    fn input_file_pattern(&self) -> Option<&str>;

    /// 图像格式（"jpeg" 或 "png"）
    fn image_format(&self) -> &str;

    fn values_per_input_shard(&self) -> usize;

    fn input_queue_capacity_factor(&self) -> usize;

    fn num_input_reader_threads(&self) -> usize;

    fn image_feature_name(&self) -> &str;

    fn image_id_name(&self) -> &str;

    fn caption_feature_name(&self) -> &str;

    fn vocab_size(&self) -> usize;

    fn num_preprocess_threads(&self) -> usize;

    fn batch_size(&self) -> usize;

    /// 输入队列最少保留的样本数
    ///
    /// = values_per_input_shard * input_queue_capacity_factor，溢出时饱和到 usize::MAX
    fn min_queue_examples(&self) -> usize {
        self.values_per_input_shard()
            .saturating_mul(self.input_queue_capacity_factor())
    }
}

// ==========================================
// ModelBuildConfigReader
// ==========================================
// 实现者: ModelConfig
pub trait ModelBuildConfigReader: Send + Sync {
    fn embedding_size(&self) -> usize;

    fn num_lstm_units(&self) -> usize;

    fn lstm_dropout_keep_prob(&self) -> f64;

    fn initializer_scale(&self) -> f64;

    fn inception_checkpoint_file(&self) -> Option<&str>;

    fn image_height(&self) -> usize;

    fn image_width(&self) -> usize;

    fn train_embeddings(&self) -> bool;

    fn beam_size(&self) -> usize;

    fn maximum_iterations(&self) -> usize;

    /// 词表与词向量加载配置
    fn embedding_config(&self) -> &EmbeddingConfig;

    /// keep_prob < 1.0 时才启用 dropout
    fn dropout_enabled(&self) -> bool {
        self.lstm_dropout_keep_prob() < 1.0
    }
}

// ==========================================
// AuxiliaryLossConfigReader
// ==========================================
// 实现者: ModelConfig
pub trait AuxiliaryLossConfigReader: Send + Sync {
    fn weight_generality_heuristic(&self) -> f64;

    fn weight_wikipedia(&self) -> f64;

    fn generality_heuristic_samples(&self) -> usize;

    fn generality_heuristic_file(&self) -> &str;

    // ===== Wikipedia 参数组 =====

    fn wikipedia_file_pattern(&self) -> Option<&str>;

    fn article_id_name(&self) -> &str;

    fn sentence_id_name(&self) -> &str;

    fn title_feature_name(&self) -> &str;

    fn sentence_feature_name(&self) -> &str;

    fn values_per_wikipedia_shard(&self) -> usize;

    // ===== DeepFashion 参数组 =====

    fn deepfashion_file_pattern(&self) -> Option<&str>;

    fn df_filename_name(&self) -> &str;

    fn df_image_name(&self) -> &str;

    fn df_category_name(&self) -> &str;

    fn df_attributes_name(&self) -> &str;
}

// ==========================================
// TrainingLoopConfigReader
// ==========================================
// 实现者: TrainingConfig
pub trait TrainingLoopConfigReader: Send + Sync {
    fn num_examples_per_epoch(&self) -> u64;

    fn optimizer(&self) -> &str;

    fn initial_learning_rate(&self) -> f64;

    fn learning_rate_decay_factor(&self) -> f64;

    fn num_epochs_per_decay(&self) -> f64;

    fn train_inception_learning_rate(&self) -> f64;

    /// None 表示不裁剪
    fn clip_gradients(&self) -> Option<f64>;

    fn max_checkpoints_to_keep(&self) -> usize;
}

// ==========================================
// ModelConfig 实现
// ==========================================

impl InputPipelineConfigReader for ModelConfig {
    fn input_file_pattern(&self) -> Option<&str> {
        self.input_file_pattern.as_deref()
    }

    fn image_format(&self) -> &str {
        &self.image_format
    }

    fn values_per_input_shard(&self) -> usize {
        self.values_per_input_shard
    }

    fn input_queue_capacity_factor(&self) -> usize {
        self.input_queue_capacity_factor
    }

    fn num_input_reader_threads(&self) -> usize {
        self.num_input_reader_threads
    }

    fn image_feature_name(&self) -> &str {
        &self.image_feature_name
    }

    fn image_id_name(&self) -> &str {
        &self.image_id_name
    }

    fn caption_feature_name(&self) -> &str {
        &self.caption_feature_name
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn num_preprocess_threads(&self) -> usize {
        self.num_preprocess_threads
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl ModelBuildConfigReader for ModelConfig {
    fn embedding_size(&self) -> usize {
        self.embedding_size
    }

    fn num_lstm_units(&self) -> usize {
        self.num_lstm_units
    }

    fn lstm_dropout_keep_prob(&self) -> f64 {
        self.lstm_dropout_keep_prob
    }

    fn initializer_scale(&self) -> f64 {
        self.initializer_scale
    }

    fn inception_checkpoint_file(&self) -> Option<&str> {
        self.inception_checkpoint_file.as_deref()
    }

    fn image_height(&self) -> usize {
        self.image_height
    }

    fn image_width(&self) -> usize {
        self.image_width
    }

    fn train_embeddings(&self) -> bool {
        self.train_embeddings
    }

    fn beam_size(&self) -> usize {
        self.beam_size
    }

    fn maximum_iterations(&self) -> usize {
        self.maximum_iterations
    }

    fn embedding_config(&self) -> &EmbeddingConfig {
        &self.embedding_config
    }
}

impl AuxiliaryLossConfigReader for ModelConfig {
    fn weight_generality_heuristic(&self) -> f64 {
        self.weight_generality_heuristic
    }

    fn weight_wikipedia(&self) -> f64 {
        self.weight_wikipedia
    }

    fn generality_heuristic_samples(&self) -> usize {
        self.generality_heuristic_samples
    }

    fn generality_heuristic_file(&self) -> &str {
        &self.generality_heuristic_file
    }

    fn wikipedia_file_pattern(&self) -> Option<&str> {
        self.wikipedia_file_pattern.as_deref()
    }

    fn article_id_name(&self) -> &str {
        &self.article_id_name
    }

    fn sentence_id_name(&self) -> &str {
        &self.sentence_id_name
    }

    fn title_feature_name(&self) -> &str {
        &self.title_feature_name
    }

    fn sentence_feature_name(&self) -> &str {
        &self.sentence_feature_name
    }

    fn values_per_wikipedia_shard(&self) -> usize {
        self.values_per_wikipedia_shard
    }

    fn deepfashion_file_pattern(&self) -> Option<&str> {
        self.deepfashion_file_pattern.as_deref()
    }

    fn df_filename_name(&self) -> &str {
        &self.df_filename_name
    }

    fn df_image_name(&self) -> &str {
        &self.df_image_name
    }

    fn df_category_name(&self) -> &str {
        &self.df_category_name
    }

    fn df_attributes_name(&self) -> &str {
        &self.df_attributes_name
    }
}

// ==========================================
// TrainingConfig 实现
// ==========================================

impl TrainingLoopConfigReader for TrainingConfig {
    fn num_examples_per_epoch(&self) -> u64 {
        self.num_examples_per_epoch
    }

    fn optimizer(&self) -> &str {
        &self.optimizer
    }

    fn initial_learning_rate(&self) -> f64 {
        self.initial_learning_rate
    }

    fn learning_rate_decay_factor(&self) -> f64 {
        self.learning_rate_decay_factor
    }

    fn num_epochs_per_decay(&self) -> f64 {
        self.num_epochs_per_decay
    }

    fn train_inception_learning_rate(&self) -> f64 {
        self.train_inception_learning_rate
    }

    fn clip_gradients(&self) -> Option<f64> {
        self.clip_gradients
    }

    fn max_checkpoints_to_keep(&self) -> usize {
        self.max_checkpoints_to_keep
    }
}
