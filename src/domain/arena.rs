use std::collections::HashMap;

use generational_arena::Arena;
use tracing::instrument;

use crate::domain::node::{ClockId, ClockNode};

/// Immutable registry of every clock node of one tree.
///
/// Built once by [`crate::domain::TopologyBuilder`]; nodes are never added or
/// removed afterwards, so handles stay valid for the registry's lifetime.
#[derive(Debug)]
pub struct ClockArena {
    /// Arena storage for all clock nodes
    arena: Arena<ClockNode>,
    /// Handles in registration order
    order: Vec<ClockId>,
    /// Nodes without any parent, in registration order
    roots: Vec<ClockId>,
    names: HashMap<String, ClockId>,
}

impl ClockArena {
    pub(crate) fn new(arena: Arena<ClockNode>, order: Vec<ClockId>, roots: Vec<ClockId>) -> Self {
        let names = order
            .iter()
            .filter_map(|&id| arena.get(id.index()).map(|n| (n.name().to_string(), id)))
            .collect();
        Self {
            arena,
            order,
            roots,
            names,
        }
    }

    pub fn get_node(&self, id: ClockId) -> Option<&ClockNode> {
        self.arena.get(id.index())
    }

    pub fn lookup(&self, name: &str) -> Option<ClockId> {
        self.names.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn roots(&self) -> &[ClockId] {
        &self.roots
    }

    /// All nodes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ClockId, &ClockNode)> + '_ {
        self.order
            .iter()
            .filter_map(move |&id| self.get_node(id).map(|node| (id, node)))
    }

    /// Depth-first walk over `start` and everything it notifies.
    ///
    /// A node reachable through several parents is yielded once per path.
    #[instrument(level = "trace", skip(self))]
    pub fn descendants(&self, start: ClockId) -> PreOrder<'_> {
        PreOrder::new(self, start)
    }

    /// Number of levels in the deepest root-to-leaf path.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut memo = HashMap::new();
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root, &mut memo))
            .max()
            .unwrap_or(0)
    }

    /// Each node is measured once: nodes reachable through several parents
    /// (mux inputs) would otherwise be walked once per path.
    fn calculate_depth(&self, id: ClockId, memo: &mut HashMap<ClockId, usize>) -> usize {
        if let Some(&depth) = memo.get(&id) {
            return depth;
        }
        let depth = match self.get_node(id) {
            Some(node) => {
                1 + node
                    .children()
                    .iter()
                    .map(|child| self.calculate_depth(child, memo))
                    .max()
                    .unwrap_or(0)
            }
            None => 0,
        };
        memo.insert(id, depth);
        depth
    }

    /// Names of all nodes that notify nobody, in registration order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children().is_empty())
            .map(|(_, node)| node.name().to_string())
            .collect()
    }
}

pub struct PreOrder<'a> {
    arena: &'a ClockArena,
    stack: Vec<ClockId>,
}

impl<'a> PreOrder<'a> {
    fn new(arena: &'a ClockArena, start: ClockId) -> Self {
        let stack = if arena.get_node(start).is_some() {
            vec![start]
        } else {
            Vec::new()
        };
        Self { arena, stack }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (ClockId, &'a ClockNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current) {
                // Push children in reverse order for registration-order traversal
                let children: Vec<ClockId> = node.children().iter().collect();
                self.stack.extend(children.into_iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}
