use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::{ClockId, ClockTarget, Rate};
use crate::driver::{Applied, ClockDriver, ConfigureRequest};
use crate::drivers::{round_or_current, set_or_current};
use crate::engine::{QueryCtx, UpdateCtx};
use crate::errors::{ClockError, ClockResult};

/// Clock gate: passes the parent rate through when enabled, 0 Hz otherwise.
#[derive(Debug)]
pub struct Gate {
    parent: ClockId,
    enabled: AtomicBool,
}

impl Gate {
    pub fn new(parent: ClockId, enabled: bool) -> Self {
        Self {
            parent,
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn gated(&self, parent_rate: Rate) -> Rate {
        if self.is_enabled() {
            parent_rate
        } else {
            Rate::ZERO
        }
    }
}

impl ClockDriver for Gate {
    fn kind(&self) -> &'static str {
        "gate"
    }

    fn parents(&self) -> Vec<ClockId> {
        vec![self.parent]
    }

    fn get_rate(&self, ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        if self.is_enabled() {
            ctx.rate_of(self.parent)
        } else {
            Ok(Rate::ZERO)
        }
    }

    fn configure(&self, ctx: &UpdateCtx<'_>, request: &ConfigureRequest) -> ClockResult<Applied> {
        match request.target {
            ClockTarget::Gate(enable) => {
                if self.enabled.swap(enable, Ordering::AcqRel) == enable {
                    Ok(Applied::Unchanged)
                } else {
                    Ok(Applied::Changed)
                }
            }
            _ => Err(ClockError::Unsupported {
                node: ctx.id(),
                op: "configure",
            }),
        }
    }

    fn notify(&self, ctx: &UpdateCtx<'_>, _parent: ClockId, parent_rate: Rate) -> ClockResult<()> {
        ctx.forward(self.gated(parent_rate))
    }

    fn round_rate(&self, ctx: &QueryCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        if !self.is_enabled() {
            return Ok(Rate::ZERO);
        }
        round_or_current(ctx, self.parent, rate)
    }

    fn set_rate(&self, ctx: &UpdateCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        if !self.is_enabled() {
            return Ok(Rate::ZERO);
        }
        let before = ctx.rate_of(self.parent).ok();
        let produced = set_or_current(ctx, self.parent, rate)?;
        if before != Some(produced) {
            ctx.forward(produced)?;
        }
        Ok(produced)
    }
}
