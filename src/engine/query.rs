use tracing::{instrument, trace};

use crate::domain::{ClockId, Rate};
use crate::engine::{ClockTree, QueryCtx};
use crate::errors::ClockResult;

impl ClockTree {
    /// Effective rate of `id` right now.
    ///
    /// Errors from any ancestor surface unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn get_rate(&self, id: ClockId) -> ClockResult<Rate> {
        self.query_rate(id)
    }

    /// Rate `id` would produce if asked for `rate`, without changing anything.
    #[instrument(level = "debug", skip(self))]
    pub fn round_rate(&self, id: ClockId, rate: Rate) -> ClockResult<Rate> {
        self.query_round_rate(id, rate)
    }

    pub(crate) fn query_rate(&self, id: ClockId) -> ClockResult<Rate> {
        let node = self.node(id)?;
        let rate = node.driver().get_rate(&QueryCtx::new(self, id))?;
        trace!(node = node.name(), %rate, "get_rate");
        Ok(rate)
    }

    pub(crate) fn query_round_rate(&self, id: ClockId, rate: Rate) -> ClockResult<Rate> {
        let node = self.node(id)?;
        let rounded = node.driver().round_rate(&QueryCtx::new(self, id), rate)?;
        trace!(node = node.name(), requested = %rate, %rounded, "round_rate");
        Ok(rounded)
    }
}
