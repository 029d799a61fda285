//! Registry entries: identities, nodes and their subscriber lists

use std::fmt;

use generational_arena::Index;

use crate::driver::ClockDriver;

/// Stable handle of a clock node inside one [`crate::ClockTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockId(Index);

impl ClockId {
    pub(crate) fn new(index: Index) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> Index {
        self.0
    }

    /// Slot number in the registry, stable for the lifetime of the tree.
    pub fn slot(self) -> usize {
        self.0.into_raw_parts().0
    }
}

impl fmt::Display for ClockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clk#{}", self.slot())
    }
}

/// Ordered set of children a node notifies when its rate changes.
///
/// Populated once by the builder. Order is registration order and an entry
/// appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children(Vec<ClockId>);

impl Children {
    pub fn iter(&self) -> impl Iterator<Item = ClockId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: ClockId) -> bool {
        self.0.contains(&id)
    }

    pub(crate) fn push_unique(&mut self, id: ClockId) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }
}

/// One stage of the clock tree.
#[derive(Debug)]
pub struct ClockNode {
    name: String,
    driver: Box<dyn ClockDriver>,
    children: Children,
}

impl ClockNode {
    pub(crate) fn new(name: String, driver: Box<dyn ClockDriver>) -> Self {
        Self {
            name,
            driver,
            children: Children::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn driver(&self) -> &dyn ClockDriver {
        self.driver.as_ref()
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Children {
        &mut self.children
    }

    pub(crate) fn replace_driver(&mut self, driver: Box<dyn ClockDriver>) {
        self.driver = driver;
    }
}
