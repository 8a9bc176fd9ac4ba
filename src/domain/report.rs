// ==========================================
// 组织数据导入 - 解析报告模型
// ==========================================
// 用途: 统计快照 + 预检（dry run）报告,仅用于展示
// ==========================================

use crate::domain::types::EntityType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// ResolutionStatistics - 解析统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStatistics {
    pub cached_entities: BTreeMap<EntityType, usize>,    // 存在性缓存条目数
    pub temporary_mappings: BTreeMap<EntityType, usize>, // 临时 ID 映射数
}

// ==========================================
// DryRunReport - 预检报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryRunReport {
    pub run_id: String,
    pub record_counts: BTreeMap<EntityType, usize>,
    pub dependency_errors: Vec<String>,
    pub processing_order: Option<Vec<EntityType>>,
    pub order_error: Option<String>,
    pub reference_errors: BTreeMap<EntityType, Vec<String>>,
    pub generated_at: DateTime<Utc>,
}

impl DryRunReport {
    /// 无任何错误即可提交
    pub fn is_valid(&self) -> bool {
        self.dependency_errors.is_empty()
            && self.order_error.is_none()
            && self.reference_errors.values().all(|errors| errors.is_empty())
    }

    pub fn error_count(&self) -> usize {
        self.dependency_errors.len()
            + usize::from(self.order_error.is_some())
            + self.reference_errors.values().map(Vec::len).sum::<usize>()
    }
}
