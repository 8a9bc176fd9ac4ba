// ==========================================
// 组织数据导入 - 依赖解析器（编排方入口）
// ==========================================
// 职责: 对导入编排方暴露处理顺序、依赖校验、外键解析、临时映射与预检接口
// 状态: 只持有不可变配置 + 存储句柄,可跨并发导入只读共享
//       可变状态全部在调用方持有的 ImportContext 中
// 红线: 校验类接口（validate_* / dry_run）只返回错误列表,从不报错
// ==========================================

use crate::config::ResolverConfig;
use crate::dependency::catalog::ForeignKeyCatalog;
use crate::dependency::context::ImportContext;
use crate::dependency::error::DependencyResult;
use crate::dependency::fk_resolver::{ForeignKeyResolver, ReferenceMap};
use crate::dependency::graph::EntityDependencyGraph;
use crate::dependency::order::ProcessingOrderResolver;
use crate::dependency::store_trait::EntityStore;
use crate::domain::dependency::{EntityDependency, ForeignKeyMapping};
use crate::domain::report::{DryRunReport, ResolutionStatistics};
use crate::domain::types::{EntityType, ImportData, LocalMappings, Record};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

pub struct DependencyResolver {
    graph: EntityDependencyGraph,
    catalog: ForeignKeyCatalog,
    config: ResolverConfig,
    store: Arc<dyn EntityStore>,
}

impl DependencyResolver {
    /// 使用标准依赖图与外键目录创建
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            graph: EntityDependencyGraph::default(),
            catalog: ForeignKeyCatalog::default(),
            config: ResolverConfig::default(),
            store,
        }
    }

    /// 使用自定义配置创建
    ///
    /// # 返回
    /// - Err(Config): 解析配置非法
    /// - Err(InvalidEntityType): 外键目录登记或引用了依赖图未声明的实体类型
    pub fn with_configuration(
        graph: EntityDependencyGraph,
        catalog: ForeignKeyCatalog,
        config: ResolverConfig,
        store: Arc<dyn EntityStore>,
    ) -> DependencyResult<Self> {
        config.validate()?;
        for (entity_type, mappings) in catalog.iter() {
            graph.ensure_known(entity_type)?;
            for mapping in mappings {
                graph.ensure_known(mapping.target_entity)?;
            }
        }
        Ok(Self {
            graph,
            catalog,
            config,
            store,
        })
    }

    pub fn graph(&self) -> &EntityDependencyGraph {
        &self.graph
    }

    pub fn catalog(&self) -> &ForeignKeyCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn order_resolver(&self) -> ProcessingOrderResolver<'_> {
        ProcessingOrderResolver::new(&self.graph)
    }

    fn fk_resolver(&self) -> ForeignKeyResolver<'_> {
        ForeignKeyResolver::new(&self.catalog, self.store.as_ref(), &self.config)
    }

    // ===== 依赖图 / 处理顺序 =====

    pub fn get_processing_order(
        &self,
        entity_types: Option<&[EntityType]>,
    ) -> DependencyResult<Vec<EntityType>> {
        self.order_resolver().get_processing_order(entity_types)
    }

    pub fn detect_circular_dependencies(
        &self,
        entity_types: Option<&[EntityType]>,
    ) -> DependencyResult<Vec<Vec<EntityType>>> {
        self.order_resolver().detect_circular_dependencies(entity_types)
    }

    pub fn get_entity_hierarchy(
        &self,
        entity_types: Option<&[EntityType]>,
    ) -> DependencyResult<BTreeMap<EntityType, usize>> {
        self.order_resolver().get_entity_hierarchy(entity_types)
    }

    pub fn get_dependencies(&self, entity_type: EntityType) -> DependencyResult<&[EntityDependency]> {
        self.graph.get_dependencies(entity_type)
    }

    pub fn get_dependents(&self, entity_type: EntityType) -> DependencyResult<Vec<EntityType>> {
        self.graph.get_dependents(entity_type)
    }

    pub fn is_self_referential(&self, entity_type: EntityType) -> DependencyResult<bool> {
        self.graph.is_self_referential(entity_type)
    }

    pub fn get_foreign_key_mappings(
        &self,
        entity_type: EntityType,
    ) -> DependencyResult<&[ForeignKeyMapping]> {
        self.catalog.get_foreign_key_mappings(entity_type)
    }

    /// 校验导入数据是否包含全部必需的被依赖实体类型
    ///
    /// # 说明
    /// - 可选依赖与自引用依赖不校验
    /// - 每个缺失的 (实体类型, 被依赖类型) 组合产生一条错误
    pub fn validate_dependencies_exist(&self, data: &ImportData) -> Vec<String> {
        let mut errors = Vec::new();

        for &entity_type in data.keys() {
            let dependencies = match self.graph.get_dependencies(entity_type) {
                Ok(dependencies) => dependencies,
                Err(e) => {
                    errors.push(e.to_string());
                    continue;
                }
            };

            for dep in dependencies {
                if dep.is_optional || dep.is_self_reference() || data.contains_key(&dep.depends_on) {
                    continue;
                }
                errors.push(format!(
                    "Entity type '{}' depends on '{}' (field '{}'), which is missing from the import data",
                    entity_type, dep.depends_on, dep.foreign_key_field
                ));
            }
        }

        errors
    }

    // ===== 外键解析 =====

    pub fn resolve_foreign_keys(
        &self,
        ctx: &mut ImportContext,
        entity_type: EntityType,
        record: &Record,
        local_mappings: &LocalMappings,
    ) -> DependencyResult<Record> {
        self.graph.ensure_known(entity_type)?;
        self.fk_resolver()
            .resolve_foreign_keys(ctx, entity_type, record, local_mappings)
    }

    pub fn resolve_batch(
        &self,
        ctx: &mut ImportContext,
        entity_type: EntityType,
        records: &[Record],
        local_mappings: &LocalMappings,
    ) -> DependencyResult<Vec<Record>> {
        self.graph.ensure_known(entity_type)?;
        self.fk_resolver()
            .resolve_batch(ctx, entity_type, records, local_mappings)
    }

    pub fn validate_foreign_key_references(
        &self,
        entity_type: EntityType,
        records: &[Record],
        available_entities: &ReferenceMap,
    ) -> Vec<String> {
        if let Err(e) = self.graph.ensure_known(entity_type) {
            return vec![e.to_string()];
        }
        self.fk_resolver()
            .validate_foreign_key_references(entity_type, records, available_entities)
    }

    pub fn build_reference_map(&self, data: &ImportData) -> ReferenceMap {
        self.fk_resolver().build_reference_map(data)
    }

    // ===== 临时 ID 映射 =====

    pub fn add_temporary_mapping(
        &self,
        ctx: &mut ImportContext,
        entity_type: EntityType,
        temp_id: &str,
        persisted_id: i64,
    ) -> DependencyResult<()> {
        self.graph.ensure_known(entity_type)?;
        ctx.registry.add_mapping(entity_type, temp_id, persisted_id)
    }

    pub fn resolve_temporary_id(
        &self,
        ctx: &ImportContext,
        entity_type: EntityType,
        temp_id: &str,
    ) -> DependencyResult<Option<i64>> {
        self.graph.ensure_known(entity_type)?;
        Ok(ctx.registry.resolve(entity_type, temp_id))
    }

    pub fn get_temporary_mappings(
        &self,
        ctx: &ImportContext,
        entity_type: EntityType,
    ) -> DependencyResult<HashMap<String, i64>> {
        self.graph.ensure_known(entity_type)?;
        Ok(ctx.registry.get_all(entity_type))
    }

    pub fn clear_temporary_mappings(&self, ctx: &mut ImportContext) {
        ctx.registry.clear();
    }

    // ===== 存在性缓存 =====

    pub fn preload_cache(
        &self,
        ctx: &mut ImportContext,
        entity_types: &[EntityType],
    ) -> DependencyResult<()> {
        for &entity_type in entity_types {
            self.graph.ensure_known(entity_type)?;
        }
        ctx.cache.preload(entity_types);
        Ok(())
    }

    pub fn clear_cache(&self, ctx: &mut ImportContext) {
        ctx.cache.clear();
    }

    /// 统计快照
    pub fn get_resolution_statistics(&self, ctx: &ImportContext) -> ResolutionStatistics {
        ResolutionStatistics {
            cached_entities: ctx.cache.counts().collect(),
            temporary_mappings: ctx.registry.counts().collect(),
        }
    }

    // ===== 预检 =====

    /// 预检整批数据（不修改、不落库、不查存储、不报错）
    pub fn dry_run(&self, data: &ImportData) -> DryRunReport {
        let run_id = Uuid::new_v4();
        let entity_types: Vec<EntityType> = data.keys().copied().collect();

        let dependency_errors = self.validate_dependencies_exist(data);
        let (processing_order, order_error) = match self.get_processing_order(Some(entity_types.as_slice())) {
            Ok(order) => (Some(order), None),
            Err(e) => (None, Some(e.to_string())),
        };

        let references = self.build_reference_map(data);
        let reference_errors: BTreeMap<EntityType, Vec<String>> = data
            .iter()
            .map(|(&entity_type, records)| {
                (
                    entity_type,
                    self.validate_foreign_key_references(entity_type, records, &references),
                )
            })
            .collect();

        let report = DryRunReport {
            run_id: run_id.to_string(),
            record_counts: data.iter().map(|(&t, records)| (t, records.len())).collect(),
            dependency_errors,
            processing_order,
            order_error,
            reference_errors,
            generated_at: Utc::now(),
        };

        tracing::info!(
            run_id = %run_id,
            valid = report.is_valid(),
            errors = report.error_count(),
            "预检完成"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::error::DependencyError;
    use crate::domain::types::Scalar;
    use crate::store::InMemoryEntityStore;

    fn resolver() -> DependencyResolver {
        DependencyResolver::new(Arc::new(InMemoryEntityStore::new()))
    }

    fn record(fields: &[(&str, Scalar)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_validate_dependencies_missing_three() {
        let mut data = ImportData::new();
        data.insert(EntityType::Assignment, vec![Record::new()]);

        let errors = resolver().validate_dependencies_exist(&data);
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("'persons'"));
        assert!(errors[1].contains("'units'"));
        assert!(errors[2].contains("'job_titles'"));
    }

    #[test]
    fn test_validate_dependencies_ignores_optional_and_self() {
        let mut data = ImportData::new();
        data.insert(EntityType::UnitType, vec![]);
        data.insert(EntityType::Unit, vec![]);
        assert!(resolver().validate_dependencies_exist(&data).is_empty());
    }

    #[test]
    fn test_validate_dependencies_unknown_type_reported() {
        let store: Arc<dyn EntityStore> = Arc::new(InMemoryEntityStore::new());
        let resolver = DependencyResolver::with_configuration(
            EntityDependencyGraph::empty().declare(EntityType::Person),
            ForeignKeyCatalog::empty().register(EntityType::Person),
            ResolverConfig::default(),
            store,
        )
        .unwrap();
        let mut data = ImportData::new();
        data.insert(EntityType::Unit, vec![]);

        let errors = resolver.validate_dependencies_exist(&data);
        assert_eq!(errors, vec!["无效的实体类型: units".to_string()]);
    }

    #[test]
    fn test_with_configuration_validates_config() {
        let config = ResolverConfig {
            id_field: String::new(),
            ..ResolverConfig::default()
        };
        let result = DependencyResolver::with_configuration(
            EntityDependencyGraph::default(),
            ForeignKeyCatalog::default(),
            config,
            Arc::new(InMemoryEntityStore::new()),
        );
        assert!(matches!(result, Err(DependencyError::Config(_))));
    }

    #[test]
    fn test_temporary_mapping_round_trip() {
        let resolver = resolver();
        let mut ctx = ImportContext::new();
        resolver
            .add_temporary_mapping(&mut ctx, EntityType::Person, "temp_p1", 101)
            .unwrap();

        assert_eq!(
            resolver.resolve_temporary_id(&ctx, EntityType::Person, "temp_p1").unwrap(),
            Some(101)
        );
        assert_eq!(
            resolver.get_temporary_mappings(&ctx, EntityType::Person).unwrap().len(),
            1
        );

        resolver.clear_temporary_mappings(&mut ctx);
        assert_eq!(
            resolver.resolve_temporary_id(&ctx, EntityType::Person, "temp_p1").unwrap(),
            None
        );
    }

    #[test]
    fn test_statistics() {
        let store = InMemoryEntityStore::new().with_entity(EntityType::UnitType, 1);
        let resolver = DependencyResolver::new(Arc::new(store));
        let mut ctx = ImportContext::new();
        resolver.preload_cache(&mut ctx, &[EntityType::Person]).unwrap();
        resolver
            .add_temporary_mapping(&mut ctx, EntityType::Unit, "u1", 10)
            .unwrap();
        resolver
            .resolve_foreign_keys(
                &mut ctx,
                EntityType::Unit,
                &record(&[("unit_type_id", Scalar::Int(1))]),
                &LocalMappings::new(),
            )
            .unwrap();

        let stats = resolver.get_resolution_statistics(&ctx);
        assert_eq!(stats.cached_entities[&EntityType::UnitType], 1);
        assert_eq!(stats.cached_entities[&EntityType::Person], 0);
        assert_eq!(stats.temporary_mappings[&EntityType::Unit], 1);

        resolver.clear_cache(&mut ctx);
        assert!(resolver.get_resolution_statistics(&ctx).cached_entities.is_empty());
    }

    #[test]
    fn test_dry_run_clean_batch() {
        let mut data = ImportData::new();
        data.insert(
            EntityType::UnitType,
            vec![record(&[("id", "ut1".into()), ("name", "Department".into())])],
        );
        data.insert(
            EntityType::Unit,
            vec![
                record(&[("id", "u1".into()), ("unit_type_id", "Department".into())]),
                record(&[
                    ("id", "u2".into()),
                    ("unit_type_id", "ut1".into()),
                    ("parent_id", "u1".into()),
                ]),
            ],
        );

        let report = resolver().dry_run(&data);
        assert!(report.is_valid(), "{:?}", report);
        assert_eq!(
            report.processing_order,
            Some(vec![EntityType::UnitType, EntityType::Unit])
        );
        assert_eq!(report.record_counts[&EntityType::Unit], 2);
    }

    #[test]
    fn test_dry_run_collects_errors_without_raising() {
        let mut data = ImportData::new();
        data.insert(
            EntityType::Assignment,
            vec![record(&[
                ("person_id", "nobody".into()),
                ("unit_id", Scalar::Int(3)),
                ("job_title_id", Scalar::Int(4)),
            ])],
        );

        let report = resolver().dry_run(&data);
        assert!(!report.is_valid());
        assert_eq!(report.dependency_errors.len(), 3);
        assert_eq!(report.reference_errors[&EntityType::Assignment].len(), 1);
        assert_eq!(report.error_count(), 4);
        assert!(report.order_error.is_none());
    }

    fn persons_only() -> DependencyResolver {
        DependencyResolver::with_configuration(
            EntityDependencyGraph::empty().declare(EntityType::Person),
            ForeignKeyCatalog::empty().register(EntityType::Person),
            ResolverConfig::default(),
            Arc::new(InMemoryEntityStore::new()),
        )
        .unwrap()
    }

    fn is_invalid_type(err: &DependencyError, name: &str) -> bool {
        matches!(err, DependencyError::InvalidEntityType(t) if t == name)
    }

    #[test]
    fn test_undeclared_type_rejected_by_every_operation() {
        let resolver = persons_only();
        let mut ctx = ImportContext::new();
        let unit = EntityType::Unit;

        let err = resolver.add_temporary_mapping(&mut ctx, unit, "u1", 1).unwrap_err();
        assert!(is_invalid_type(&err, "units"));
        let err = resolver.resolve_temporary_id(&ctx, unit, "u1").unwrap_err();
        assert!(is_invalid_type(&err, "units"));
        let err = resolver.get_temporary_mappings(&ctx, unit).unwrap_err();
        assert!(is_invalid_type(&err, "units"));
        let err = resolver.preload_cache(&mut ctx, &[unit]).unwrap_err();
        assert!(is_invalid_type(&err, "units"));

        let input = record(&[("unit_type_id", Scalar::Null)]);
        let err = resolver
            .resolve_foreign_keys(&mut ctx, unit, &input, &LocalMappings::new())
            .unwrap_err();
        assert!(is_invalid_type(&err, "units"));
        let err = resolver
            .resolve_batch(&mut ctx, unit, &[input], &LocalMappings::new())
            .unwrap_err();
        assert!(is_invalid_type(&err, "units"));

        assert_eq!(
            resolver.validate_foreign_key_references(unit, &[Record::new()], &ReferenceMap::new()),
            vec!["无效的实体类型: units".to_string()]
        );

        // 已声明类型照常工作
        assert!(resolver
            .get_temporary_mappings(&ctx, EntityType::Person)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_with_configuration_rejects_catalog_outside_graph() {
        let store: Arc<dyn EntityStore> = Arc::new(InMemoryEntityStore::new());

        let registered = DependencyResolver::with_configuration(
            EntityDependencyGraph::empty().declare(EntityType::Person),
            ForeignKeyCatalog::empty()
                .register(EntityType::Person)
                .register(EntityType::UnitTypeTheme),
            ResolverConfig::default(),
            Arc::clone(&store),
        );
        assert!(is_invalid_type(&registered.err().unwrap(), "unit_type_themes"));

        let targeted = DependencyResolver::with_configuration(
            EntityDependencyGraph::empty().declare(EntityType::Assignment),
            ForeignKeyCatalog::empty()
                .with_mapping(EntityType::Assignment, ForeignKeyMapping::required("unit_id", EntityType::Unit)),
            ResolverConfig::default(),
            store,
        );
        assert!(is_invalid_type(&targeted.err().unwrap(), "units"));
    }

    #[test]
    fn test_dry_run_with_blank_values_kept() {
        let store: Arc<dyn EntityStore> = Arc::new(InMemoryEntityStore::new());
        let config = ResolverConfig {
            treat_blank_as_null: false,
            ..ResolverConfig::default()
        };
        let kept = DependencyResolver::with_configuration(
            EntityDependencyGraph::default(),
            ForeignKeyCatalog::default(),
            config,
            store,
        )
        .unwrap();

        let mut data = ImportData::new();
        data.insert(
            EntityType::UnitType,
            vec![record(&[("id", "ut1".into()), ("name", "Department".into())])],
        );
        data.insert(
            EntityType::Unit,
            vec![
                record(&[("id", "u1".into()), ("unit_type_id", "ut1".into())]),
                record(&[("id", "u2".into()), ("unit_type_id", "  ".into())]),
            ],
        );

        let report = kept.dry_run(&data);
        assert_eq!(
            report.reference_errors[&EntityType::Unit],
            vec!["Record 2: Cannot resolve foreign key 'unit_type_id' with value '  ' for entity type 'unit_types'".to_string()]
        );

        // 默认配置下空白视为 null,预检跳过
        assert!(resolver().dry_run(&data).is_valid());
    }
}
