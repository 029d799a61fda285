use std::sync::atomic::{AtomicU32, Ordering};

use tracing::trace;

use crate::domain::{ClockId, ClockTarget, Rate};
use crate::driver::{Applied, ClockDriver, ConfigureRequest};
use crate::drivers::{round_or_current, set_or_current};
use crate::engine::{QueryCtx, UpdateCtx};
use crate::errors::{ClockError, ClockResult};

/// Widest divider field of the reference hardware (8 bits, stored as div-1).
pub const DEFAULT_MAX_DIVISOR: u32 = 256;

/// Integer divider: `rate = parent / divisor`.
#[derive(Debug)]
pub struct Divider {
    parent: ClockId,
    divisor: AtomicU32,
    max_divisor: u32,
}

impl Divider {
    /// Out-of-range initial divisors are clamped to `1..=DEFAULT_MAX_DIVISOR`.
    pub fn new(parent: ClockId, divisor: u32) -> Self {
        Self::with_max_divisor(parent, divisor, DEFAULT_MAX_DIVISOR)
    }

    pub fn with_max_divisor(parent: ClockId, divisor: u32, max_divisor: u32) -> Self {
        let max_divisor = max_divisor.max(1);
        Self {
            parent,
            divisor: AtomicU32::new(divisor.clamp(1, max_divisor)),
            max_divisor,
        }
    }

    pub fn divisor(&self) -> u32 {
        self.divisor.load(Ordering::Acquire)
    }

    pub fn max_divisor(&self) -> u32 {
        self.max_divisor
    }

    fn divide(&self, parent_rate: Rate) -> Rate {
        parent_rate.checked_div(self.divisor()).unwrap_or(Rate::ZERO)
    }

    fn store(&self, divisor: u32) -> Applied {
        if self.divisor.swap(divisor, Ordering::AcqRel) == divisor {
            Applied::Unchanged
        } else {
            Applied::Changed
        }
    }

    /// Divisor that turns `parent_rate` into exactly `target`, if one fits.
    fn exact_divisor(&self, parent_rate: Rate, target: Rate) -> Option<u32> {
        if target.is_zero() || parent_rate.hz() % target.hz() != 0 {
            return None;
        }
        let div = parent_rate.hz() / target.hz();
        (1..=self.max_divisor).contains(&div).then_some(div)
    }

    /// Divisor the hardware would pick for `rate`: `max(parent / rate, 1)`, clamped.
    fn nearest_divisor(&self, parent_rate: Rate, rate: Rate) -> u32 {
        parent_rate
            .hz()
            .checked_div(rate.hz())
            .unwrap_or(1)
            .clamp(1, self.max_divisor)
    }

    fn configure_rate(&self, ctx: &UpdateCtx<'_>, target: Rate) -> ClockResult<Applied> {
        let unachievable = ClockError::Unachievable {
            node: ctx.id(),
            target: ClockTarget::Rate(target),
        };
        if target.is_zero() {
            return Err(unachievable);
        }

        let parent_rate = ctx.rate_of(self.parent)?;
        if let Some(div) = self.exact_divisor(parent_rate, target) {
            return Ok(self.store(div));
        }

        // Keep the divisor and ask the parent for a rate that divides down to the target.
        let wanted = target.checked_mul(self.divisor()).ok_or(unachievable.clone())?;
        trace!(node = ctx.name(), %wanted, "asking parent for a new rate");
        match ctx.configure_parent(self.parent, ClockTarget::Rate(wanted)) {
            Ok(Applied::Unchanged) => Ok(Applied::Unchanged),
            // the parent's fan-out skipped this node; the engine reports the new rate
            Ok(_) => Ok(Applied::Changed),
            Err(err) if err.is_refusal() => Err(unachievable),
            Err(err) => Err(err),
        }
    }
}

impl ClockDriver for Divider {
    fn kind(&self) -> &'static str {
        "divider"
    }

    fn parents(&self) -> Vec<ClockId> {
        vec![self.parent]
    }

    fn get_rate(&self, ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        let parent_rate = ctx.rate_of(self.parent)?;
        Ok(self.divide(parent_rate))
    }

    fn configure(&self, ctx: &UpdateCtx<'_>, request: &ConfigureRequest) -> ClockResult<Applied> {
        match request.target {
            ClockTarget::Divisor(div) if (1..=self.max_divisor).contains(&div) => Ok(self.store(div)),
            ClockTarget::Divisor(_) => Err(ClockError::Unachievable {
                node: ctx.id(),
                target: request.target,
            }),
            ClockTarget::Rate(rate) => self.configure_rate(ctx, rate),
            ClockTarget::Select(_) | ClockTarget::Gate(_) => Err(ClockError::Unsupported {
                node: ctx.id(),
                op: "configure",
            }),
        }
    }

    fn notify(&self, ctx: &UpdateCtx<'_>, _parent: ClockId, parent_rate: Rate) -> ClockResult<()> {
        ctx.forward(self.divide(parent_rate))
    }

    fn round_rate(&self, ctx: &QueryCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        let parent_rate = round_or_current(ctx, self.parent, rate)?;
        let div = self.nearest_divisor(parent_rate, rate);
        Ok(parent_rate.checked_div(div).unwrap_or(Rate::ZERO))
    }

    fn set_rate(&self, ctx: &UpdateCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        let before = ctx.rate_of(ctx.id()).ok();
        let parent_rate = set_or_current(ctx, self.parent, rate)?;
        let div = self.nearest_divisor(parent_rate, rate);
        let produced = parent_rate.checked_div(div).unwrap_or(Rate::ZERO);
        self.store(div);
        if before != Some(produced) {
            ctx.forward(produced)?;
        }
        Ok(produced)
    }
}
