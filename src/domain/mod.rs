//! Domain layer: clock identities, rates, targets and the node registry
//!
//! Nothing in here evaluates a rate; see [`crate::engine`] for that.

pub mod arena;
pub mod builder;
pub mod node;
pub mod rate;

pub use arena::{ClockArena, PreOrder};
pub use builder::TopologyBuilder;
pub use node::{Children, ClockId, ClockNode};
pub use rate::{ClockTarget, Rate};
