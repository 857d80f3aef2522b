// ==========================================
// im2txt 图像描述模型 - 已知默认值冲突
// ==========================================
// 职责: 记录默认值中被覆盖的重复赋值，供加载时告警与审计
// ==========================================

use serde::Serialize;

use crate::config::config_manager::config_keys;

/// 被覆盖的 values_per_wikipedia_shard 早期默认值
pub const SHADOWED_VALUES_PER_WIKIPEDIA_SHARD: usize = 83_000;

/// 生效的 values_per_wikipedia_shard 默认值（后一次赋值生效）
pub const EFFECTIVE_VALUES_PER_WIKIPEDIA_SHARD: usize = 5_000;

/// 默认值冲突记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigDiscrepancy {
    /// 配置键
    pub key: &'static str,

    /// 被覆盖的值
    pub shadowed_value: serde_json::Value,

    /// 实际生效的值
    pub effective_value: serde_json::Value,

    /// 说明
    pub note: &'static str,
}

/// 已知的默认值冲突列表
///
/// values_per_wikipedia_shard 在默认值中被赋值两次（83000 → 5000），
/// 第二次赋值位于 DeepFashion 参数组内，疑为 DeepFashion 分片大小。
/// 保留 5000，不引入新的字段，等待确认真实意图。
pub fn known_discrepancies() -> Vec<ConfigDiscrepancy> {
    vec![ConfigDiscrepancy {
        key: config_keys::VALUES_PER_WIKIPEDIA_SHARD,
        shadowed_value: serde_json::json!(SHADOWED_VALUES_PER_WIKIPEDIA_SHARD),
        effective_value: serde_json::json!(EFFECTIVE_VALUES_PER_WIKIPEDIA_SHARD),
        note: "重复赋值：5000 位于 DeepFashion 参数组，疑为 DeepFashion 分片大小",
    }]
}

/// 以 warn 级别输出所有已知冲突
pub fn log_known_discrepancies() {
    for d in known_discrepancies() {
        tracing::warn!(
            config_key = d.key,
            shadowed = %d.shadowed_value,
            effective = %d.effective_value,
            "默认值冲突: {}",
            d.note
        );
    }
}
