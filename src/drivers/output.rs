use crate::domain::{ClockId, Rate};
use crate::driver::{Applied, ClockDriver, ConfigureRequest};
use crate::engine::{QueryCtx, UpdateCtx};
use crate::errors::ClockResult;

/// Consumer-facing tap on a clock.
///
/// Pure pass-through: mirrors the parent's rate and hands every request to
/// the parent, naming itself as the requester.
#[derive(Debug, Clone)]
pub struct Output {
    parent: ClockId,
}

impl Output {
    pub fn new(parent: ClockId) -> Self {
        Self { parent }
    }

    pub fn parent(&self) -> ClockId {
        self.parent
    }
}

impl ClockDriver for Output {
    fn kind(&self) -> &'static str {
        "output"
    }

    fn parents(&self) -> Vec<ClockId> {
        vec![self.parent]
    }

    fn get_rate(&self, ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        ctx.rate_of(self.parent)
    }

    fn configure(&self, ctx: &UpdateCtx<'_>, request: &ConfigureRequest) -> ClockResult<Applied> {
        match ctx.configure_parent(self.parent, request.target)? {
            Applied::Unchanged => Ok(Applied::Unchanged),
            // the parent's fan-out skipped this node; the engine reports the new rate
            Applied::Changed | Applied::Notified => Ok(Applied::Changed),
        }
    }

    fn round_rate(&self, ctx: &QueryCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        ctx.round_rate_of(self.parent, rate)
    }

    fn set_rate(&self, ctx: &UpdateCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        let before = ctx.rate_of(self.parent).ok();
        let produced = ctx.set_rate_of(self.parent, rate)?;
        if before != Some(produced) {
            ctx.forward(produced)?;
        }
        Ok(produced)
    }
}
