//! Reference drivers
//!
//! Register-free models of the common clock node types. They keep their
//! private state in atomics so rate queries never block, and they follow
//! the arithmetic of the hardware blocks they stand in for.

pub mod consumer;
pub mod divider;
pub mod fixed;
pub mod gate;
pub mod mux;
pub mod output;

pub use consumer::{CallbackSlot, ClockEvent, Consumer};
pub use divider::Divider;
pub use fixed::FixedSource;
pub use gate::Gate;
pub use mux::Mux;
pub use output::Output;

use crate::domain::{ClockId, Rate};
use crate::engine::{QueryCtx, UpdateCtx};
use crate::errors::{ClockError, ClockResult};

/// `round_rate` on `parent`, or its current rate if it cannot round.
pub(crate) fn round_or_current(ctx: &QueryCtx<'_>, parent: ClockId, rate: Rate) -> ClockResult<Rate> {
    match ctx.round_rate_of(parent, rate) {
        Err(ClockError::Unsupported { .. }) => ctx.rate_of(parent),
        other => other,
    }
}

/// `set_rate` on `parent`, or its current rate if it cannot be set.
pub(crate) fn set_or_current(ctx: &UpdateCtx<'_>, parent: ClockId, rate: Rate) -> ClockResult<Rate> {
    match ctx.set_rate_of(parent, rate) {
        Err(ClockError::Unsupported { .. }) => ctx.rate_of(parent),
        other => other,
    }
}
