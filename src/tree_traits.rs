use termtree::Tree;
use tracing::instrument;

use crate::domain::{ClockId, ClockNode};
use crate::engine::ClockTree;
use crate::errors::ClockError;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for ClockTree {
    /// Every root with the subtree of nodes it notifies.
    ///
    /// A node with several parents shows up under each of them.
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(tree: &ClockTree, id: ClockId, node: &ClockNode) -> Tree<String> {
            let leaves: Vec<_> = node
                .children()
                .iter()
                .filter_map(|child| {
                    tree.arena()
                        .get_node(child)
                        .map(|child_node| build_tree(tree, child, child_node))
                })
                .collect();
            Tree::new(label(tree, id, node)).with_leaves(leaves)
        }

        let roots: Vec<_> = self
            .arena()
            .roots()
            .iter()
            .filter_map(|&root| self.arena().get_node(root).map(|node| build_tree(self, root, node)))
            .collect();

        if roots.is_empty() {
            Tree::new("Empty tree".to_string())
        } else {
            Tree::new("clocks".to_string()).with_leaves(roots)
        }
    }
}

fn label(tree: &ClockTree, id: ClockId, node: &ClockNode) -> String {
    let kind = node.driver().kind();
    match tree.get_rate(id) {
        Ok(rate) => format!("{} ({}) {}", node.name(), kind, rate),
        // consumers have no rate of their own
        Err(ClockError::Unsupported { .. }) => format!("{} ({})", node.name(), kind),
        Err(err) => format!("{} ({}) <{}>", node.name(), kind, err),
    }
}
