// ==========================================
// 并发导入测试
// ==========================================
// 测试目标: 同一解析器跨线程只读共享,各导入的上下文互不污染
// ==========================================


use org_import_deps::{
    DependencyResolver, EntityType, ImportContext, InMemoryEntityStore, LocalMappings, Scalar,
};
use std::sync::Arc;
use std::thread;
use test_helpers::record;

#[test]
fn test_contexts_are_isolated_across_threads() {
    let store = InMemoryEntityStore::new().with_entity(EntityType::UnitType, 1);
    let resolver = Arc::new(DependencyResolver::new(Arc::new(store)));

    let handles: Vec<_> = (0..4i64)
        .map(|worker| {
            let resolver = Arc::clone(&resolver);
            thread::spawn(move || {
                let mut ctx = ImportContext::new();
                let persisted_id = 1_000 + worker;
                resolver
                    .add_temporary_mapping(&mut ctx, EntityType::Unit, "root", persisted_id)
                    .unwrap();

                let child = record(&[("unit_type_id", Scalar::Int(1)), ("parent_id", "root".into())]);
                let out = resolver
                    .resolve_foreign_keys(&mut ctx, EntityType::Unit, &child, &LocalMappings::new())
                    .unwrap();

                (persisted_id, out["parent_id"].clone(), ctx.run_id)
            })
        })
        .collect();

    let mut run_ids = Vec::new();
    for handle in handles {
        let (persisted_id, parent, run_id) = handle.join().unwrap();
        // 每个导入只看到自己登记的 root
        assert_eq!(parent, Scalar::Int(persisted_id));
        run_ids.push(run_id);
    }

    run_ids.sort();
    run_ids.dedup();
    assert_eq!(run_ids.len(), 4);
}

#[test]
fn test_same_temp_id_in_separate_runs_does_not_conflict() {
    let resolver = DependencyResolver::new(Arc::new(InMemoryEntityStore::new()));
    let mut first = ImportContext::new();
    let mut second = ImportContext::new();

    resolver
        .add_temporary_mapping(&mut first, EntityType::Person, "p1", 10)
        .unwrap();
    resolver
        .add_temporary_mapping(&mut second, EntityType::Person, "p1", 20)
        .unwrap();

    assert_eq!(
        resolver.resolve_temporary_id(&first, EntityType::Person, "p1").unwrap(),
        Some(10)
    );
    assert_eq!(
        resolver.resolve_temporary_id(&second, EntityType::Person, "p1").unwrap(),
        Some(20)
    );

    // 同一运行内改写则拒绝
    assert!(resolver
        .add_temporary_mapping(&mut first, EntityType::Person, "p1", 11)
        .is_err());
}
