use tracing::{debug, instrument, trace};

use crate::domain::{ClockId, ClockTarget, Rate};
use crate::driver::{Applied, ConfigureRequest};
use crate::engine::{ClockTree, Session, UpdateCtx};
use crate::errors::ClockResult;

impl ClockTree {
    /// Apply `target` to `id` and bring every descendant up to date.
    ///
    /// When this returns `Ok`, `get_rate` on the node and on all of its
    /// pass-through descendants already reports the new value.
    #[instrument(level = "debug", skip(self))]
    pub fn configure(&self, id: ClockId, target: ClockTarget) -> ClockResult<Applied> {
        let _guard = self.lock(id)?;
        let session = self.open_session();
        let applied = self.configure_in(&session, id, ConfigureRequest::new(target))?;
        debug!(node = self.name(id), ?applied, "configure done");
        Ok(applied)
    }

    /// Reconfigure toward `rate`; returns the rate actually produced.
    #[instrument(level = "debug", skip(self))]
    pub fn set_rate(&self, id: ClockId, rate: Rate) -> ClockResult<Rate> {
        let _guard = self.lock(id)?;
        let session = self.open_session();
        let produced = self.set_rate_in(&session, id, rate, None)?;
        debug!(node = self.name(id), requested = %rate, %produced, "set_rate done");
        Ok(produced)
    }

    pub(crate) fn configure_in(
        &self,
        session: &Session,
        id: ClockId,
        request: ConfigureRequest,
    ) -> ClockResult<Applied> {
        let node = self.node(id)?;
        let _in_flight = session.enter(id, request.requester)?;
        trace!(node = node.name(), target = %request.target, requester = ?request.requester, "configure");

        let ctx = UpdateCtx::new(self, session, id);
        let applied = node.driver().configure(&ctx, &request)?;
        if applied == Applied::Changed {
            let rate = self.query_rate(id)?;
            ctx.forward(rate)?;
        }
        Ok(applied)
    }

    pub(crate) fn set_rate_in(
        &self,
        session: &Session,
        id: ClockId,
        rate: Rate,
        requester: Option<ClockId>,
    ) -> ClockResult<Rate> {
        let node = self.node(id)?;
        let _in_flight = session.enter(id, requester)?;
        trace!(node = node.name(), %rate, ?requester, "set_rate");

        node.driver()
            .set_rate(&UpdateCtx::new(self, session, id), rate)
    }
}
