use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

use crate::domain::{ClockId, ClockTarget, Rate};
use crate::driver::{Applied, ClockDriver, ConfigureRequest};
use crate::drivers::{round_or_current, set_or_current};
use crate::engine::{QueryCtx, UpdateCtx};
use crate::errors::{ClockError, ClockResult};

const DISCONNECTED: usize = usize::MAX;

/// Clock multiplexer routing one of a fixed set of inputs to its output.
///
/// The mux is registered as a child of every input, but only the active
/// input's notifications reach its own children.
#[derive(Debug)]
pub struct Mux {
    inputs: Vec<ClockId>,
    selected: AtomicUsize,
}

impl Mux {
    /// A mux routing `inputs[selected]`; an out-of-range index leaves it disconnected.
    pub fn new(inputs: Vec<ClockId>, selected: usize) -> Self {
        let selected = if selected < inputs.len() {
            selected
        } else {
            DISCONNECTED
        };
        Self {
            inputs,
            selected: AtomicUsize::new(selected),
        }
    }

    /// A mux with no input routed yet.
    pub fn disconnected(inputs: Vec<ClockId>) -> Self {
        Self::new(inputs, DISCONNECTED)
    }

    pub fn inputs(&self) -> &[ClockId] {
        &self.inputs
    }

    pub fn selected(&self) -> Option<usize> {
        match self.selected.load(Ordering::Acquire) {
            DISCONNECTED => None,
            idx => Some(idx),
        }
    }

    pub fn active_parent(&self) -> Option<ClockId> {
        self.selected().and_then(|idx| self.inputs.get(idx).copied())
    }

    fn select(&self, idx: usize) -> Applied {
        if self.selected.swap(idx, Ordering::AcqRel) == idx {
            Applied::Unchanged
        } else {
            Applied::Changed
        }
    }

    /// Input whose rounded rate lands closest to `rate`; ties go to the lower index.
    fn best_input(&self, ctx: &QueryCtx<'_>, rate: Rate) -> Option<(usize, Rate)> {
        self.inputs
            .iter()
            .enumerate()
            .filter_map(|(idx, &input)| round_or_current(ctx, input, rate).ok().map(|r| (idx, r)))
            .min_by_key(|&(_, candidate)| candidate.distance(rate))
    }
}

impl ClockDriver for Mux {
    fn kind(&self) -> &'static str {
        "mux"
    }

    fn parents(&self) -> Vec<ClockId> {
        self.inputs.clone()
    }

    fn get_rate(&self, ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        match self.active_parent() {
            Some(parent) => ctx.rate_of(parent),
            None => Err(ClockError::Unavailable(ctx.id())),
        }
    }

    fn configure(&self, ctx: &UpdateCtx<'_>, request: &ConfigureRequest) -> ClockResult<Applied> {
        let unachievable = ClockError::Unachievable {
            node: ctx.id(),
            target: request.target,
        };
        match request.target {
            ClockTarget::Select(idx) if idx < self.inputs.len() => Ok(self.select(idx)),
            ClockTarget::Select(_) => Err(unachievable),
            ClockTarget::Rate(rate) => {
                let found = self
                    .inputs
                    .iter()
                    .position(|&input| ctx.rate_of(input).ok() == Some(rate));
                match found {
                    Some(idx) => Ok(self.select(idx)),
                    None => Err(unachievable),
                }
            }
            ClockTarget::Divisor(_) | ClockTarget::Gate(_) => Err(ClockError::Unsupported {
                node: ctx.id(),
                op: "configure",
            }),
        }
    }

    fn notify(&self, ctx: &UpdateCtx<'_>, parent: ClockId, parent_rate: Rate) -> ClockResult<()> {
        if self.active_parent() != Some(parent) {
            trace!(node = ctx.name(), %parent, "ignoring inactive input");
            return Ok(());
        }
        ctx.forward(parent_rate)
    }

    fn round_rate(&self, ctx: &QueryCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        self.best_input(ctx, rate)
            .map(|(_, rounded)| rounded)
            .ok_or(ClockError::Unavailable(ctx.id()))
    }

    fn set_rate(&self, ctx: &UpdateCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        let (idx, _) = self
            .best_input(ctx, rate)
            .ok_or(ClockError::Unavailable(ctx.id()))?;
        let before = ctx.rate_of(ctx.id()).ok();
        // switch only once the input has settled, so a failed request leaves
        // the mux where it was
        let produced = set_or_current(ctx, self.inputs[idx], rate)?;
        self.select(idx);
        if before != Some(produced) {
            ctx.forward(produced)?;
        }
        Ok(produced)
    }
}
