use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Level of a node in the organisation tree. Only sites carry activity
/// records that produce emissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Group,
    #[serde(alias = "Legal Entity")]
    LegalEntity,
    Site,
}

/// One node of the organisation forest, as owned by the organisation
/// editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub children: Vec<OrgNode>,
}

#[derive(Debug, Clone)]
struct IndexedNode {
    id: String,
    node_type: NodeType,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Flat arena over an organisation forest, in pre-order. Nodes are
/// addressed by id; the tree itself is never mutated.
#[derive(Debug, Clone, Default)]
pub struct OrgIndex {
    nodes: Vec<IndexedNode>,
    by_id: HashMap<String, usize>,
}

impl OrgIndex {
    pub fn build(forest: &[OrgNode]) -> Self {
        let mut index = OrgIndex::default();
        for root in forest {
            index.insert(root, None);
        }
        index
    }

    fn insert(&mut self, node: &OrgNode, parent: Option<usize>) -> usize {
        let slot = self.nodes.len();
        self.nodes.push(IndexedNode {
            id: node.id.clone(),
            node_type: node.node_type,
            parent,
            children: Vec::with_capacity(node.children.len()),
        });
        // First occurrence wins for lookups; duplicates stay in the walk.
        self.by_id.entry(node.id.clone()).or_insert(slot);
        for child in &node.children {
            let child_slot = self.insert(child, Some(slot));
            self.nodes[slot].children.push(child_slot);
        }
        slot
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn node_type(&self, id: &str) -> Option<NodeType> {
        self.by_id.get(id).map(|&slot| self.nodes[slot].node_type)
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        let slot = *self.by_id.get(id)?;
        self.nodes[slot]
            .parent
            .map(|p| self.nodes[p].id.as_str())
    }

    /// Every node id, in pre-order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    /// Site ids across the whole forest, in pre-order.
    pub fn site_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.node_type == NodeType::Site)
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Site ids in the subtree rooted at `id` (the node itself included when
    /// it is a site). Empty for unknown ids.
    pub fn sites_under(&self, id: &str) -> Vec<&str> {
        let Some(&root) = self.by_id.get(id) else {
            return Vec::new();
        };
        let mut sites = Vec::new();
        let mut stack = vec![root];
        while let Some(slot) = stack.pop() {
            let node = &self.nodes[slot];
            if node.node_type == NodeType::Site {
                sites.push(node.id.as_str());
            }
            // Reverse so the walk stays in pre-order.
            stack.extend(node.children.iter().rev().copied());
        }
        sites
    }
}
