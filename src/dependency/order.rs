// ==========================================
// 组织数据导入 - 处理顺序解析器
// ==========================================
// 职责: 拓扑排序（Kahn 算法）+ 循环依赖检测（DFS）
// 输入: 实体依赖图 + 请求的实体类型子集
// 输出: 被依赖方在前的处理顺序
// ==========================================
// 红线: 自引用边不进入排序图
// 红线: 相同输入必须得到相同顺序（按声明顺序入队）
// ==========================================

use crate::dependency::error::{DependencyError, DependencyResult};
use crate::dependency::graph::EntityDependencyGraph;
use crate::domain::types::EntityType;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

pub struct ProcessingOrderResolver<'a> {
    graph: &'a EntityDependencyGraph,
}

impl<'a> ProcessingOrderResolver<'a> {
    pub fn new(graph: &'a EntityDependencyGraph) -> Self {
        Self { graph }
    }

    /// 计算处理顺序
    ///
    /// # 参数
    /// - entity_types: 请求的实体类型（None 表示全部已声明类型）
    ///
    /// # 返回
    /// - Ok(Vec<EntityType>): 请求子集的一个排列,被依赖方在前
    /// - Err(InvalidEntityType): 子集中含未声明类型（建图前即拒绝）
    /// - Err(CircularDependency): 子集（去除自引用后）存在环,携带无法排序的剩余节点
    pub fn get_processing_order(
        &self,
        entity_types: Option<&[EntityType]>,
    ) -> DependencyResult<Vec<EntityType>> {
        let subset = self.resolve_subset(entity_types)?;
        if subset.is_empty() {
            return Ok(Vec::new());
        }

        let members: HashSet<EntityType> = subset.iter().copied().collect();
        let mut in_degree: HashMap<EntityType, usize> = subset.iter().map(|&t| (t, 0)).collect();
        let mut dependents: HashMap<EntityType, Vec<EntityType>> = HashMap::new();

        for &entity_type in &subset {
            for dep in self.graph.get_dependencies(entity_type)? {
                if dep.is_self_reference() || !members.contains(&dep.depends_on) {
                    continue;
                }
                dependents.entry(dep.depends_on).or_default().push(entity_type);
                *in_degree.entry(entity_type).or_default() += 1;
            }
        }

        let mut queue: VecDeque<EntityType> = subset
            .iter()
            .copied()
            .filter(|t| in_degree[t] == 0)
            .collect();
        let mut order = Vec::with_capacity(subset.len());

        while let Some(current) = queue.pop_front() {
            order.push(current);
            if let Some(next) = dependents.get(&current) {
                for dependent in next {
                    if let Some(degree) = in_degree.get_mut(dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(*dependent);
                        }
                    }
                }
            }
        }

        if order.len() < subset.len() {
            let remaining: Vec<EntityType> = subset
                .into_iter()
                .filter(|t| !order.contains(t))
                .collect();
            tracing::warn!(cycle = ?remaining, "实体依赖存在环,无法确定处理顺序");
            return Err(DependencyError::CircularDependency { cycle: remaining });
        }

        tracing::info!(order = ?order, "处理顺序已确定");
        Ok(order)
    }

    /// 循环依赖诊断（不尝试排序）
    ///
    /// # 返回
    /// - 每个环的节点序列,已旋转到名称最小的节点开头并去重
    /// - 空列表表示无环
    pub fn detect_circular_dependencies(
        &self,
        entity_types: Option<&[EntityType]>,
    ) -> DependencyResult<Vec<Vec<EntityType>>> {
        let subset = self.resolve_subset(entity_types)?;
        let members: HashSet<EntityType> = subset.iter().copied().collect();

        let mut walk = CycleWalk {
            graph: self.graph,
            members: &members,
            visited: HashSet::new(),
            stack: Vec::new(),
            cycles: Vec::new(),
        };

        for &entity_type in &subset {
            if !walk.visited.contains(&entity_type) {
                walk.visit(entity_type)?;
            }
        }

        Ok(walk.cycles)
    }

    /// 层级（处理顺序中的 0 基序号,仅用于报告）
    pub fn get_entity_hierarchy(
        &self,
        entity_types: Option<&[EntityType]>,
    ) -> DependencyResult<BTreeMap<EntityType, usize>> {
        Ok(self
            .get_processing_order(entity_types)?
            .into_iter()
            .enumerate()
            .map(|(rank, t)| (t, rank))
            .collect())
    }

    /// 校验并按声明顺序去重请求子集
    fn resolve_subset(&self, entity_types: Option<&[EntityType]>) -> DependencyResult<Vec<EntityType>> {
        let Some(requested) = entity_types else {
            return Ok(self.graph.entity_types().to_vec());
        };

        for &entity_type in requested {
            self.graph.ensure_known(entity_type)?;
        }

        Ok(self
            .graph
            .entity_types()
            .iter()
            .copied()
            .filter(|t| requested.contains(t))
            .collect())
    }
}

// ==========================================
// CycleWalk - DFS 递归栈
// ==========================================
struct CycleWalk<'g> {
    graph: &'g EntityDependencyGraph,
    members: &'g HashSet<EntityType>,
    visited: HashSet<EntityType>,
    stack: Vec<EntityType>,
    cycles: Vec<Vec<EntityType>>,
}

impl CycleWalk<'_> {
    fn visit(&mut self, node: EntityType) -> DependencyResult<()> {
        self.visited.insert(node);
        self.stack.push(node);

        let graph = self.graph;
        for dep in graph.get_dependencies(node)? {
            let next = dep.depends_on;
            if next == node || !self.members.contains(&next) {
                continue;
            }
            if let Some(pos) = self.stack.iter().position(|&t| t == next) {
                self.record(self.stack[pos..].to_vec());
            } else if !self.visited.contains(&next) {
                self.visit(next)?;
            }
        }

        self.stack.pop();
        Ok(())
    }

    fn record(&mut self, mut cycle: Vec<EntityType>) {
        if let Some(start) = cycle
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| t.as_str())
            .map(|(i, _)| i)
        {
            cycle.rotate_left(start);
        }
        if !self.cycles.contains(&cycle) {
            self.cycles.push(cycle);
        }
    }
}
