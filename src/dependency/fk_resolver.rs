// ==========================================
// 组织数据导入 - 外键解析器
// ==========================================
// 职责: 记录级/批次级外键解析 + 预检（dry run）引用校验
// 输入: 外键映射目录 + 运行上下文（临时 ID / 存在性缓存）+ 实体存储
// 输出: 外键字段全部为整数 ID 或 null 的新记录
// ==========================================
// 解析优先级（首个成功即采用）:
//   1. 整数值且存储中存在
//   2. 调用级本地映射
//   3. 临时 ID 登记表
//   4. 字符串可解析为整数且存储中存在
//   5. 自然键查找
// 红线: 不修改输入记录;解析结果不残留字符串
// ==========================================

use crate::config::ResolverConfig;
use crate::dependency::catalog::ForeignKeyCatalog;
use crate::dependency::context::ImportContext;
use crate::dependency::error::{DependencyError, DependencyResult};
use crate::dependency::store_trait::EntityStore;
use crate::domain::dependency::ForeignKeyMapping;
use crate::domain::types::{EntityType, ImportData, LocalMappings, Record, Scalar};
use std::collections::{HashMap, HashSet};

/// 可用引用集合: 实体类型 → 批次内可被引用的值（自身 ID + 自然键）
pub type ReferenceMap = HashMap<EntityType, HashSet<String>>;

/// 命中的解析步骤（用于日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolvedBy {
    ExistingId,
    LocalMapping,
    TemporaryId,
    ParsedId,
    NaturalKey,
}

pub struct ForeignKeyResolver<'a> {
    catalog: &'a ForeignKeyCatalog,
    store: &'a dyn EntityStore,
    config: &'a ResolverConfig,
}

impl<'a> ForeignKeyResolver<'a> {
    pub fn new(
        catalog: &'a ForeignKeyCatalog,
        store: &'a dyn EntityStore,
        config: &'a ResolverConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            config,
        }
    }

    /// 解析单条记录的全部外键字段
    ///
    /// # 参数
    /// - ctx: 本次导入的运行上下文
    /// - entity_type: 记录所属实体类型
    /// - record: 原始记录（不修改）
    /// - local_mappings: 调用级覆盖映射
    ///
    /// # 返回
    /// - Ok(Record): 外键字段已替换为整数 ID 或 null 的副本
    /// - Err(MissingRequiredForeignKey): 必填外键为空
    /// - Err(UnresolvedForeignKey): 必填外键无法解析
    /// - Err(Store): 存储错误原样透传
    pub fn resolve_foreign_keys(
        &self,
        ctx: &mut ImportContext,
        entity_type: EntityType,
        record: &Record,
        local_mappings: &LocalMappings,
    ) -> DependencyResult<Record> {
        let mut resolved = record.clone();

        for mapping in self.catalog.get_foreign_key_mappings(entity_type)? {
            let field = mapping.source_field.as_str();
            let value = record.get(field).cloned().unwrap_or(Scalar::Null);

            if value.is_blank(self.config.treat_blank_as_null) {
                if mapping.is_required {
                    return Err(DependencyError::MissingRequiredForeignKey {
                        entity_type,
                        field: field.to_string(),
                    });
                }
                if record.contains_key(field) {
                    resolved.insert(field.to_string(), Scalar::Null);
                }
                continue;
            }

            match self.resolve_value(ctx, mapping, &value, local_mappings)? {
                Some((id, by)) => {
                    tracing::debug!(
                        run_id = %ctx.run_id,
                        %entity_type,
                        field,
                        value = %value,
                        id,
                        resolved_by = ?by,
                        "外键已解析"
                    );
                    resolved.insert(field.to_string(), Scalar::Int(id));
                }
                None if mapping.is_required => {
                    return Err(DependencyError::UnresolvedForeignKey {
                        entity_type,
                        field: field.to_string(),
                        value,
                    });
                }
                None => {
                    tracing::warn!(
                        run_id = %ctx.run_id,
                        %entity_type,
                        field,
                        value = %value,
                        "可选外键无法解析,置为 null"
                    );
                    resolved.insert(field.to_string(), Scalar::Null);
                }
            }
        }

        Ok(resolved)
    }

    /// 批量解析同一实体类型的记录,遇到首个失败即返回（附带 1 基记录序号）
    pub fn resolve_batch(
        &self,
        ctx: &mut ImportContext,
        entity_type: EntityType,
        records: &[Record],
        local_mappings: &LocalMappings,
    ) -> DependencyResult<Vec<Record>> {
        // 未知类型属于配置错误,不归到具体记录
        self.catalog.get_foreign_key_mappings(entity_type)?;

        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                self.resolve_foreign_keys(ctx, entity_type, record, local_mappings)
                    .map_err(|e| match e {
                        DependencyError::Store(_) => e,
                        other => DependencyError::RecordFailed {
                            index: i + 1,
                            source: Box::new(other),
                        },
                    })
            })
            .collect()
    }

    fn resolve_value(
        &self,
        ctx: &mut ImportContext,
        mapping: &ForeignKeyMapping,
        value: &Scalar,
        local_mappings: &LocalMappings,
    ) -> DependencyResult<Option<(i64, ResolvedBy)>> {
        let target = mapping.target_entity;

        if let Scalar::Int(id) = value {
            if ctx.cache.validate_existing_id(self.store, target, *id)? {
                return Ok(Some((*id, ResolvedBy::ExistingId)));
            }
        }

        let Some(key) = value.to_key() else {
            return Ok(None);
        };

        if mapping.allow_temporary_ids {
            if let Some(&id) = local_mappings.get(&target).and_then(|m| m.get(&key)) {
                return Ok(Some((id, ResolvedBy::LocalMapping)));
            }
            if let Some(id) = ctx.registry.resolve(target, &key) {
                return Ok(Some((id, ResolvedBy::TemporaryId)));
            }
        }

        // 整数值已在第 1 步校验过
        if !matches!(value, Scalar::Int(_)) {
            if let Some(id) = value.parse_int() {
                if ctx.cache.validate_existing_id(self.store, target, id)? {
                    return Ok(Some((id, ResolvedBy::ParsedId)));
                }
            }
        }

        for field in self.lookup_fields(mapping) {
            if let Some(id) = self.store.find_by_natural_key(target, field, &key)? {
                return Ok(Some((id, ResolvedBy::NaturalKey)));
            }
        }

        Ok(None)
    }

    /// 自然键查找字段: 非 id 的目标字段优先,其后为配置的自然键字段
    fn lookup_fields<'m>(&'m self, mapping: &'m ForeignKeyMapping) -> Vec<&'m str> {
        let mut fields = Vec::with_capacity(self.config.natural_key_fields.len() + 1);
        if mapping.target_field != self.config.id_field {
            fields.push(mapping.target_field.as_str());
        }
        for field in &self.config.natural_key_fields {
            if !fields.contains(&field.as_str()) {
                fields.push(field.as_str());
            }
        }
        fields
    }

    /// 预检: 校验批次内外键引用（不修改、不查存储、不报错）
    ///
    /// # 返回
    /// - 错误描述列表,空列表表示通过
    pub fn validate_foreign_key_references(
        &self,
        entity_type: EntityType,
        records: &[Record],
        available_entities: &ReferenceMap,
    ) -> Vec<String> {
        let mappings = match self.catalog.get_foreign_key_mappings(entity_type) {
            Ok(mappings) => mappings,
            Err(e) => return vec![e.to_string()],
        };

        let mut errors = Vec::new();
        for (i, record) in records.iter().enumerate() {
            for mapping in mappings.iter().filter(|m| m.is_required) {
                let Some(value) = record.get(&mapping.source_field) else {
                    continue;
                };
                if value.is_blank(self.config.treat_blank_as_null) {
                    continue;
                }

                let available = value.to_key().is_some_and(|key| {
                    available_entities
                        .get(&mapping.target_entity)
                        .is_some_and(|set| set.contains(&key))
                });
                if available || is_plausible_id(value) {
                    continue;
                }

                errors.push(format!(
                    "Record {}: Cannot resolve foreign key '{}' with value '{}' for entity type '{}'",
                    i + 1,
                    mapping.source_field,
                    value,
                    mapping.target_entity
                ));
            }
        }
        errors
    }

    /// 汇总批次内可被引用的值（自身 ID + 自然键字段）
    pub fn build_reference_map(&self, data: &ImportData) -> ReferenceMap {
        let mut references = ReferenceMap::new();

        for (&entity_type, records) in data {
            let fields = self.reference_fields(entity_type);
            let available = references.entry(entity_type).or_default();
            for record in records {
                for &field in &fields {
                    if let Some(value) = record.get(field) {
                        if value.is_blank(self.config.treat_blank_as_null) {
                            continue;
                        }
                        if let Some(key) = value.to_key() {
                            available.insert(key);
                        }
                    }
                }
            }
        }

        references
    }

    /// 某实体类型可被引用的字段: id 字段 + 自然键字段 + 目录中指向它的非 id 目标字段
    fn reference_fields(&self, entity_type: EntityType) -> Vec<&str> {
        let mut fields = vec![self.config.id_field.as_str()];
        let targeted = self
            .catalog
            .iter()
            .flat_map(|(_, mappings)| mappings.iter())
            .filter(|m| m.target_entity == entity_type)
            .map(|m| m.target_field.as_str());

        for field in self
            .config
            .natural_key_fields
            .iter()
            .map(String::as_str)
            .chain(targeted)
        {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }
}

/// 形似已持久化 ID（正整数或正整数字符串）
fn is_plausible_id(value: &Scalar) -> bool {
    value.parse_int().is_some_and(|id| id > 0)
}
