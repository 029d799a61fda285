//! The capability contract every clock node implements
//!
//! A driver owns the private state of one node (divisor, selected input,
//! gate bit, ...) and turns engine calls into rate arithmetic on that state.
//! It never holds references to other nodes: everything it needs from its
//! parents or children goes through the context the engine hands in.

use std::fmt;

use crate::domain::{ClockId, ClockTarget, Rate};
use crate::engine::{QueryCtx, UpdateCtx};
use crate::errors::{ClockError, ClockResult};

/// A configuration request travelling through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequest {
    pub target: ClockTarget,
    /// Child that asked this node to change on its behalf, if any.
    pub requester: Option<ClockId>,
}

impl ConfigureRequest {
    pub fn new(target: ClockTarget) -> Self {
        Self {
            target,
            requester: None,
        }
    }

    pub fn on_behalf_of(target: ClockTarget, requester: ClockId) -> Self {
        Self {
            target,
            requester: Some(requester),
        }
    }
}

/// Outcome of a successful `configure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Already in the requested state; nobody needs to hear about it.
    Unchanged,
    /// Local state changed; the engine notifies the children.
    Changed,
    /// Local state changed and the driver already notified its children.
    ///
    /// A driver that changed only by asking its parent returns `Changed`:
    /// the parent's fan-out skips nodes whose own request is in flight.
    Notified,
}

pub trait ClockDriver: Send + Sync + fmt::Debug {
    /// Short driver name used in logs and tree dumps.
    fn kind(&self) -> &'static str;

    /// Every node this one can take its rate from.
    ///
    /// The builder registers this node as a child of each of them.
    fn parents(&self) -> Vec<ClockId> {
        Vec::new()
    }

    /// Current effective rate. Must not mutate anything.
    fn get_rate(&self, ctx: &QueryCtx<'_>) -> ClockResult<Rate>;

    fn configure(&self, ctx: &UpdateCtx<'_>, request: &ConfigureRequest) -> ClockResult<Applied> {
        let _ = request;
        Err(ClockError::Unsupported {
            node: ctx.id(),
            op: "configure",
        })
    }

    /// A parent's rate changed to `parent_rate`.
    ///
    /// The default treats the node as a pass-through and forwards the rate
    /// unchanged.
    fn notify(&self, ctx: &UpdateCtx<'_>, parent: ClockId, parent_rate: Rate) -> ClockResult<()> {
        let _ = parent;
        ctx.forward(parent_rate)
    }

    /// Closest rate this node could produce for `rate`, without changing anything.
    fn round_rate(&self, ctx: &QueryCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        let _ = rate;
        Err(ClockError::Unsupported {
            node: ctx.id(),
            op: "round_rate",
        })
    }

    /// Move toward `rate` and return the rate actually produced.
    ///
    /// The engine does not fan out after `set_rate`, and the parent's fan-out
    /// skips this node while its request is in flight. A driver whose rate
    /// ends up different notifies its own children, once, with the final rate.
    fn set_rate(&self, ctx: &UpdateCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        let _ = rate;
        Err(ClockError::Unsupported {
            node: ctx.id(),
            op: "set_rate",
        })
    }
}
