use crate::domain::Rate;
use crate::driver::ClockDriver;
use crate::engine::{QueryCtx, UpdateCtx};
use crate::errors::ClockResult;

/// A root clock with a constant frequency: crystal, RC oscillator, pin input.
///
/// It cannot be configured. Rate requests are answered with the constant,
/// so children asking for a new rate learn what they have to work with.
#[derive(Debug, Clone)]
pub struct FixedSource {
    rate: Rate,
}

impl FixedSource {
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl ClockDriver for FixedSource {
    fn kind(&self) -> &'static str {
        "fixed-source"
    }

    fn get_rate(&self, _ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        Ok(self.rate)
    }

    fn round_rate(&self, _ctx: &QueryCtx<'_>, _rate: Rate) -> ClockResult<Rate> {
        Ok(self.rate)
    }

    fn set_rate(&self, _ctx: &UpdateCtx<'_>, _rate: Rate) -> ClockResult<Rate> {
        Ok(self.rate)
    }
}
