//! Topology builder: registers clock nodes and validates the result.

use std::collections::{HashMap, HashSet};

use generational_arena::Arena;
use tracing::{debug, instrument};

use crate::config::EngineSettings;
use crate::domain::arena::ClockArena;
use crate::domain::node::{ClockId, ClockNode};
use crate::domain::rate::Rate;
use crate::driver::ClockDriver;
use crate::engine::{ClockTree, QueryCtx};
use crate::errors::{ClockError, ClockResult, TopologyError, TopologyResult};

/// Stand-in driver for a reserved slot; `build` refuses to keep it.
#[derive(Debug)]
struct Reserved;

impl ClockDriver for Reserved {
    fn kind(&self) -> &'static str {
        "reserved"
    }

    fn get_rate(&self, ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        Err(ClockError::Unavailable(ctx.id()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Collects clock nodes and subscriber edges, then freezes them into a
/// [`ClockTree`].
///
/// Nodes must reference their parents by handle, so parents are normally
/// added first. [`TopologyBuilder::reserve`] hands out a handle before the
/// driver exists, for topologies that need it.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    arena: Arena<ClockNode>,
    order: Vec<ClockId>,
    names: HashMap<String, ClockId>,
    duplicates: Vec<String>,
    reserved: HashSet<ClockId>,
    links: Vec<(ClockId, ClockId)>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node and return its handle.
    pub fn add(&mut self, name: impl Into<String>, driver: impl ClockDriver + 'static) -> ClockId {
        self.insert(name.into(), Box::new(driver))
    }

    /// Register a node whose driver is supplied later through [`Self::define`].
    pub fn reserve(&mut self, name: impl Into<String>) -> ClockId {
        let id = self.insert(name.into(), Box::new(Reserved));
        self.reserved.insert(id);
        id
    }

    /// Attach the driver of a previously reserved node.
    pub fn define(&mut self, id: ClockId, driver: impl ClockDriver + 'static) -> TopologyResult<()> {
        let node = self
            .arena
            .get_mut(id.index())
            .ok_or_else(|| TopologyError::DanglingReference {
                node: "<define>".to_string(),
                reference: id,
            })?;
        if !self.reserved.remove(&id) {
            return Err(TopologyError::DuplicateName(node.name().to_string()));
        }
        node.replace_driver(Box::new(driver));
        Ok(())
    }

    /// Add a subscriber edge that the child's driver does not declare itself.
    pub fn link(&mut self, parent: ClockId, child: ClockId) -> &mut Self {
        self.links.push((parent, child));
        self
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert(&mut self, name: String, driver: Box<dyn ClockDriver>) -> ClockId {
        let id = ClockId::new(self.arena.insert(ClockNode::new(name.clone(), driver)));
        if self.names.insert(name.clone(), id).is_some() {
            self.duplicates.push(name);
        }
        self.order.push(id);
        id
    }

    fn name_of(&self, id: ClockId) -> String {
        self.arena
            .get(id.index())
            .map(|n| n.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// Validate the topology and freeze it.
    ///
    /// Every node becomes a child of each parent its driver declares, in
    /// registration order, followed by the explicit [`Self::link`] edges.
    #[instrument(level = "debug", skip_all)]
    pub fn build(mut self, settings: EngineSettings) -> TopologyResult<ClockTree> {
        if let Some(name) = self.duplicates.first() {
            return Err(TopologyError::DuplicateName(name.clone()));
        }
        if let Some(&id) = self.order.iter().find(|id| self.reserved.contains(*id)) {
            return Err(TopologyError::Undefined(self.name_of(id)));
        }

        let mut edges = Vec::new();
        for &id in &self.order {
            let node = &self.arena[id.index()];
            for parent in node.driver().parents() {
                edges.push((parent, id));
            }
        }
        edges.extend(self.links.iter().copied());

        for &(parent, child) in &edges {
            if parent == child {
                return Err(TopologyError::SelfReference(self.name_of(child)));
            }
            if !self.arena.contains(parent.index()) {
                return Err(TopologyError::DanglingReference {
                    node: self.name_of(child),
                    reference: parent,
                });
            }
            if !self.arena.contains(child.index()) {
                return Err(TopologyError::DanglingReference {
                    node: self.name_of(parent),
                    reference: child,
                });
            }
            self.arena[parent.index()].children_mut().push_unique(child);
        }

        self.check_acyclic()?;

        let has_parent: HashSet<ClockId> = edges.iter().map(|&(_, child)| child).collect();
        let roots: Vec<ClockId> = self
            .order
            .iter()
            .copied()
            .filter(|id| !has_parent.contains(id))
            .collect();
        debug!(roots = roots.len(), edges = edges.len(), "topology validated");

        let arena = ClockArena::new(self.arena, self.order, roots);
        Ok(ClockTree::new(arena, settings))
    }

    /// Depth-first search over the children relation with an explicit stack,
    /// so a malformed description cannot exhaust the call stack.
    fn check_acyclic(&self) -> TopologyResult<()> {
        let mut marks: HashMap<ClockId, Mark> = HashMap::new();

        for &start in &self.order {
            if marks.contains_key(&start) {
                continue;
            }
            let mut stack: Vec<(ClockId, usize)> = vec![(start, 0)];
            marks.insert(start, Mark::InProgress);

            while let Some((current, next_child)) = stack.pop() {
                let children = self.arena[current.index()].children();
                match children.iter().nth(next_child) {
                    Some(child) => {
                        stack.push((current, next_child + 1));
                        match marks.get(&child) {
                            Some(Mark::InProgress) => {
                                return Err(TopologyError::CycleDetected(self.name_of(child)));
                            }
                            Some(Mark::Done) => {}
                            None => {
                                marks.insert(child, Mark::InProgress);
                                stack.push((child, 0));
                            }
                        }
                    }
                    None => {
                        marks.insert(current, Mark::Done);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{Divider, FixedSource, Output};

    #[test]
    fn test_children_follow_registration_order() {
        let mut builder = TopologyBuilder::new();
        let src = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
        let a = builder.add("a", Output::new(src));
        let b = builder.add("b", Output::new(src));
        let tree = builder.build(EngineSettings::default()).unwrap();

        let children: Vec<ClockId> = tree.node(src).unwrap().children().iter().collect();
        assert_eq!(children, vec![a, b]);
        assert_eq!(tree.arena().roots(), &[src]);
    }

    #[test]
    fn test_duplicate_link_is_registered_once() {
        let mut builder = TopologyBuilder::new();
        let src = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
        let out = builder.add("out", Output::new(src));
        builder.link(src, out);
        let tree = builder.build(EngineSettings::default()).unwrap();

        assert_eq!(tree.node(src).unwrap().children().len(), 1);
    }

    #[test]
    fn test_reserved_but_undefined_is_rejected() {
        let mut builder = TopologyBuilder::new();
        builder.reserve("pll");
        let err = builder.build(EngineSettings::default()).unwrap_err();
        assert_eq!(err, TopologyError::Undefined("pll".to_string()));
    }

    #[test]
    fn test_reserve_then_define() {
        let mut builder = TopologyBuilder::new();
        let src = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
        let div = builder.reserve("div");
        builder.define(div, Divider::new(src, 2)).unwrap();
        let tree = builder.build(EngineSettings::default()).unwrap();

        assert_eq!(tree.get_rate(div).unwrap(), Rate::from_mhz(12));
    }

    #[test]
    fn test_define_twice_is_rejected() {
        let mut builder = TopologyBuilder::new();
        let src = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
        let div = builder.reserve("div");
        builder.define(div, Divider::new(src, 2)).unwrap();
        assert!(builder.define(div, Divider::new(src, 4)).is_err());
    }
}
