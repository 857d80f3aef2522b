// ==========================================
// im2txt 图像描述模型 - 训练超参数
// ==========================================
// 职责: 训练流程默认超参数与学习率衰减计划
// 红线: 构造只赋字面默认值，不校验
// ==========================================

use serde::{Deserialize, Serialize};

/// 训练超参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// 每个 epoch 的训练样本数
    pub num_examples_per_epoch: u64,

    /// 优化器名称
    pub optimizer: String,

    /// 初始阶段学习率
    pub initial_learning_rate: f64,
    pub learning_rate_decay_factor: f64,
    pub num_epochs_per_decay: f64,

    /// 微调 Inception v3 参数时的学习率
    pub train_inception_learning_rate: f64,

    /// 梯度裁剪阈值（None 表示不裁剪）
    pub clip_gradients: Option<f64>,

    /// 保留的检查点数量
    pub max_checkpoints_to_keep: usize,
}

impl TrainingConfig {
    /// 创建默认训练超参数
    pub fn new() -> Self {
        Self::default()
    }

    /// 学习率衰减是否启用（decay_factor > 0）
    pub fn decay_enabled(&self) -> bool {
        self.learning_rate_decay_factor > 0.0
    }

    /// 每个 epoch 的批次数
    pub fn num_batches_per_epoch(&self, batch_size: usize) -> f64 {
        if batch_size == 0 {
            return 0.0;
        }
        self.num_examples_per_epoch as f64 / batch_size as f64
    }

    /// 每次衰减间隔的步数
    ///
    /// # 返回
    /// - None: 衰减未启用，或 batch_size 为 0
    /// - Some(steps): floor(num_batches_per_epoch * num_epochs_per_decay)
    pub fn decay_steps(&self, batch_size: usize) -> Option<u64> {
        if !self.decay_enabled() || batch_size == 0 {
            return None;
        }
        let steps = self.num_batches_per_epoch(batch_size) * self.num_epochs_per_decay;
        Some(steps.max(0.0).floor() as u64)
    }

    /// 指定全局步数下的学习率
    ///
    /// # 参数
    /// - global_step: 当前全局步数
    /// - batch_size: 批大小（取自 ModelConfig）
    /// - train_inception: 是否处于 Inception 微调阶段
    ///
    /// # 逻辑
    /// 1. 微调阶段: 固定使用 train_inception_learning_rate
    /// 2. 否则: initial_learning_rate * decay_factor ^ floor(step / decay_steps)（阶梯衰减）
    /// 3. 衰减未启用或 decay_steps 为 0 时保持初始学习率
    pub fn learning_rate_at(&self, global_step: u64, batch_size: usize, train_inception: bool) -> f64 {
        if train_inception {
            return self.train_inception_learning_rate;
        }

        match self.decay_steps(batch_size) {
            Some(steps) if steps > 0 => {
                // powi 只接受 i32，超长训练时衰减次数饱和，学习率单调不增
                let exponent = i32::try_from(global_step / steps).unwrap_or(i32::MAX);
                self.initial_learning_rate * self.learning_rate_decay_factor.powi(exponent)
            }
            _ => self.initial_learning_rate,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_examples_per_epoch: 586363,
            optimizer: "SGD".to_string(),
            initial_learning_rate: 2.0,
            learning_rate_decay_factor: 0.5,
            num_epochs_per_decay: 8.0,
            train_inception_learning_rate: 0.0005,
            clip_gradients: Some(5.0),
            max_checkpoints_to_keep: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_steps_default() {
        let config = TrainingConfig::new();
        // 586363 / 32 = 18323.84375, * 8 = 146590.75
        assert_eq!(config.decay_steps(32), Some(146590));
    }

    #[test]
    fn test_learning_rate_staircase() {
        let config = TrainingConfig::new();
        let steps = config.decay_steps(32).unwrap();

        assert_eq!(config.learning_rate_at(0, 32, false), 2.0);
        assert_eq!(config.learning_rate_at(steps - 1, 32, false), 2.0);
        assert_eq!(config.learning_rate_at(steps, 32, false), 1.0);
        assert_eq!(config.learning_rate_at(steps * 3 + 7, 32, false), 0.25);
    }

    #[test]
    fn test_learning_rate_past_i32_decays() {
        let config = TrainingConfig {
            num_examples_per_epoch: 32,
            num_epochs_per_decay: 1.0,
            ..Default::default()
        };
        assert_eq!(config.decay_steps(32), Some(1));

        let before = config.learning_rate_at(2_147_483_647, 32, false);
        let past = config.learning_rate_at(2_147_483_648, 32, false);
        assert!(past.is_finite());
        assert!(past <= before);
        assert_eq!(past, 0.0);
        assert_eq!(config.learning_rate_at(u64::MAX, 32, false), 0.0);
    }

    #[test]
    fn test_fine_tune_rate_is_constant() {
        let config = TrainingConfig::new();
        assert_eq!(config.learning_rate_at(0, 32, true), 0.0005);
        assert_eq!(config.learning_rate_at(10_000_000, 32, true), 0.0005);
    }

    #[test]
    fn test_decay_disabled() {
        let config = TrainingConfig {
            learning_rate_decay_factor: 0.0,
            ..Default::default()
        };
        assert_eq!(config.decay_steps(32), None);
        assert_eq!(config.learning_rate_at(10_000_000, 32, false), 2.0);
    }

    #[test]
    fn test_zero_batch_size_keeps_initial_rate() {
        let config = TrainingConfig::new();
        assert_eq!(config.num_batches_per_epoch(0), 0.0);
        assert_eq!(config.decay_steps(0), None);
        assert_eq!(config.learning_rate_at(500, 0, false), 2.0);
    }

    #[test]
    fn test_clip_gradients_null_disables() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{"clip_gradients": null}"#).unwrap();
        assert_eq!(config.clip_gradients, None);
        assert_eq!(config.optimizer, "SGD");
    }
}
