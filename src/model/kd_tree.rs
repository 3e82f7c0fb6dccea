//! Transient k-d tree used to partition entities into tiles.

use crate::types::Aabb;

#[derive(Debug, Clone)]
pub struct KdNode {
    pub aabb: Aabb,
    pub entities: Vec<usize>,
    pub left: Option<Box<KdNode>>,
    pub right: Option<Box<KdNode>>,
}

impl KdNode {
    fn new(aabb: Aabb) -> Self {
        Self {
            aabb,
            entities: Vec::new(),
            left: None,
            right: None,
        }
    }

    /// Store an entity here, growing the node to cover it.
    fn store(&mut self, entity: usize, entity_aabb: &Aabb) {
        self.entities.push(entity);
        self.aabb.expand_aabb(entity_aabb);
    }
}

/// A k-d tree over entity AABBs.
///
/// Nodes split along their longest axis until the diagonal drops below
/// `min_tile_size` or the depth limit is reached. An entity descends into the
/// first child that fully contains it, otherwise it stays at the current node.
#[derive(Debug, Clone)]
pub struct KdTree {
    root: KdNode,
    min_tile_size: f64,
    max_depth: usize,
}

impl KdTree {
    pub fn new(aabb: Aabb, min_tile_size: f64, max_depth: usize) -> Self {
        Self {
            root: KdNode::new(aabb),
            min_tile_size,
            max_depth,
        }
    }

    pub fn root(&self) -> &KdNode {
        &self.root
    }

    pub fn insert(&mut self, entity: usize, entity_aabb: &Aabb) {
        insert_into(
            &mut self.root,
            entity,
            entity_aabb,
            self.min_tile_size,
            self.max_depth,
            0,
        );
    }

    /// Nodes holding at least one entity, in depth-first pre-order (node, left, right).
    pub fn buckets(&self) -> Vec<(Aabb, Vec<usize>)> {
        let mut buckets = Vec::new();
        collect_buckets(&self.root, &mut buckets);
        buckets
    }
}

fn insert_into(
    node: &mut KdNode,
    entity: usize,
    entity_aabb: &Aabb,
    min_tile_size: f64,
    max_depth: usize,
    depth: usize,
) {
    if node.aabb.diagonal() < min_tile_size || depth >= max_depth {
        node.store(entity, entity_aabb);
        return;
    }

    if let Some(left) = node.left.as_deref_mut() {
        if left.aabb.contains_aabb(entity_aabb) {
            insert_into(left, entity, entity_aabb, min_tile_size, max_depth, depth + 1);
            return;
        }
    }
    if let Some(right) = node.right.as_deref_mut() {
        if right.aabb.contains_aabb(entity_aabb) {
            insert_into(right, entity, entity_aabb, min_tile_size, max_depth, depth + 1);
            return;
        }
    }

    let extent = node.aabb.extent();
    let mut dim = 0;
    if extent.y > extent[dim] {
        dim = 1;
    }
    if extent.z > extent[dim] {
        dim = 2;
    }
    let mid = (node.aabb.min[dim] + node.aabb.max[dim]) / 2.0;

    if node.left.is_none() {
        let mut left_aabb = node.aabb;
        left_aabb.max[dim] = mid;
        let contains = left_aabb.contains_aabb(entity_aabb);
        let left = node.left.insert(Box::new(KdNode::new(left_aabb)));
        if contains {
            insert_into(left, entity, entity_aabb, min_tile_size, max_depth, depth + 1);
            return;
        }
    }
    if node.right.is_none() {
        let mut right_aabb = node.aabb;
        right_aabb.min[dim] = mid;
        let contains = right_aabb.contains_aabb(entity_aabb);
        let right = node.right.insert(Box::new(KdNode::new(right_aabb)));
        if contains {
            insert_into(right, entity, entity_aabb, min_tile_size, max_depth, depth + 1);
            return;
        }
    }

    node.store(entity, entity_aabb);
}

fn collect_buckets(node: &KdNode, buckets: &mut Vec<(Aabb, Vec<usize>)>) {
    if !node.entities.is_empty() {
        buckets.push((node.aabb, node.entities.clone()));
    }
    if let Some(left) = &node.left {
        collect_buckets(left, buckets);
    }
    if let Some(right) = &node.right {
        collect_buckets(right, buckets);
    }
}
