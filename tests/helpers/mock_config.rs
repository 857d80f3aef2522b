// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use im2txt_config::config::{InputPipelineConfigReader, TrainingLoopConfigReader};

/// Mock 输入管道配置
#[derive(Debug, Clone)]
pub struct MockInputConfig {
    pub input_file_pattern: Option<String>,
    pub values_per_input_shard: usize,
    pub input_queue_capacity_factor: usize,
    pub batch_size: usize,
}

impl MockInputConfig {
    /// 创建默认配置
    pub fn default() -> Self {
        Self {
            input_file_pattern: Some("/tmp/train-*".to_string()),
            values_per_input_shard: 10,
            input_queue_capacity_factor: 3,
            batch_size: 2,
        }
    }
}

impl InputPipelineConfigReader for MockInputConfig {
    fn input_file_pattern(&self) -> Option<&str> {
        self.input_file_pattern.as_deref()
    }

    fn image_format(&self) -> &str {
        "png"
    }

    fn values_per_input_shard(&self) -> usize {
        self.values_per_input_shard
    }

    fn input_queue_capacity_factor(&self) -> usize {
        self.input_queue_capacity_factor
    }

    fn num_input_reader_threads(&self) -> usize {
        1
    }

    fn image_feature_name(&self) -> &str {
        "image/data"
    }

    fn image_id_name(&self) -> &str {
        "image/image_id"
    }

    fn caption_feature_name(&self) -> &str {
        "image/caption_ids"
    }

    fn vocab_size(&self) -> usize {
        100
    }

    fn num_preprocess_threads(&self) -> usize {
        2
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}

/// Mock 训练循环配置
#[derive(Debug, Clone)]
pub struct MockTrainingConfig {
    pub optimizer: String,
    pub clip_gradients: Option<f64>,
}

impl TrainingLoopConfigReader for MockTrainingConfig {
    fn num_examples_per_epoch(&self) -> u64 {
        128
    }

    fn optimizer(&self) -> &str {
        &self.optimizer
    }

    fn initial_learning_rate(&self) -> f64 {
        0.1
    }

    fn learning_rate_decay_factor(&self) -> f64 {
        0.0
    }

    fn num_epochs_per_decay(&self) -> f64 {
        1.0
    }

    fn train_inception_learning_rate(&self) -> f64 {
        0.01
    }

    fn clip_gradients(&self) -> Option<f64> {
        self.clip_gradients
    }

    fn max_checkpoints_to_keep(&self) -> usize {
        1
    }
}
