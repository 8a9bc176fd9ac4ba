// ==========================================
// 组织数据导入 - 领域类型定义
// ==========================================
// 职责: 实体类型标签 + 记录字段标量
// 红线: 实体类型为封闭集合,未知标签一律拒绝
// ==========================================

use crate::dependency::error::DependencyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ==========================================
// 实体类型 (Entity Type)
// ==========================================
// 声明顺序即默认处理顺序的种子顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "unit_types")]
    UnitType, // 组织单元类型
    #[serde(rename = "unit_type_themes")]
    UnitTypeTheme, // 单元类型主题
    #[serde(rename = "units")]
    Unit, // 组织单元
    #[serde(rename = "job_titles")]
    JobTitle, // 职位
    #[serde(rename = "persons")]
    Person, // 人员
    #[serde(rename = "assignments")]
    Assignment, // 任职
}

impl EntityType {
    /// 全部实体类型（声明顺序）
    pub const ALL: [EntityType; 6] = [
        EntityType::UnitType,
        EntityType::UnitTypeTheme,
        EntityType::Unit,
        EntityType::JobTitle,
        EntityType::Person,
        EntityType::Assignment,
    ];

    /// 导入数据中的实体键（同时也是存储表名）
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::UnitType => "unit_types",
            EntityType::UnitTypeTheme => "unit_type_themes",
            EntityType::Unit => "units",
            EntityType::JobTitle => "job_titles",
            EntityType::Person => "persons",
            EntityType::Assignment => "assignments",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = DependencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| DependencyError::InvalidEntityType(s.to_string()))
    }
}

// ==========================================
// 字段标量 (Scalar)
// ==========================================
// 记录字段值的封闭和类型,避免外键解析时的隐式类型混淆
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Str(String),
    Bool(bool),
    Null,
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// 空值判定（可选将空白字符串视为空）
    pub fn is_blank(&self, treat_blank_as_null: bool) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Str(s) => treat_blank_as_null && s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// 作为映射表查找键的字符串形式
    ///
    /// # 返回
    /// - Null → None
    /// - 其他 → Some(文本)
    pub fn to_key(&self) -> Option<String> {
        match self {
            Scalar::Int(v) => Some(v.to_string()),
            Scalar::Str(s) => Some(s.clone()),
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Null => None,
        }
    }

    /// 将值解析为整数 ID（整数原样返回,字符串需整体可解析）
    pub fn parse_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(v) => Some(*v),
            Scalar::Str(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Str(s) => write!(f, "{}", s),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Scalar::Null)
    }
}

// 读取器常以 JSON 交付记录;浮点/数组/对象不是合法的外键标量,按文本保留
impl From<serde_json::Value> for Scalar {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Scalar::Null,
            serde_json::Value::Bool(b) => Scalar::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Str(n.to_string()),
            },
            serde_json::Value::String(s) => Scalar::Str(s),
            other => Scalar::Str(other.to_string()),
        }
    }
}

/// 导入记录: 字段名 → 标量
pub type Record = HashMap<String, Scalar>;

/// 导入数据: 实体类型 → 记录列表（按实体类型声明顺序迭代）
pub type ImportData = std::collections::BTreeMap<EntityType, Vec<Record>>;

/// 调用级本地映射: 目标实体类型 → (原始值 → 持久化 ID)
pub type LocalMappings = HashMap<EntityType, HashMap<String, i64>>;

/// 从 JSON 对象构造记录（非对象输入返回空记录）
pub fn record_from_json(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map.into_iter().map(|(k, v)| (k, Scalar::from(v))).collect(),
        _ => Record::new(),
    }
}
