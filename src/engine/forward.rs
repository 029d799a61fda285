use tracing::{trace, warn};

use crate::config::NotifyPolicy;
use crate::domain::Rate;
use crate::engine::UpdateCtx;
use crate::errors::ClockResult;

/// Notify every child of `ctx.id()` that it now runs at `rate`.
///
/// Children are visited in registration order, each exactly once. A child
/// with a request of its own in flight is skipped: it asked for this change
/// and reports its own final rate once its request completes. Under
/// [`NotifyPolicy::ShortCircuit`] the first failing child stops the walk and
/// its failure comes back as `Rejected`; under [`NotifyPolicy::BestEffort`]
/// failures are logged and the walk continues.
pub(crate) fn forward(ctx: &UpdateCtx<'_>, rate: Rate) -> ClockResult<()> {
    let children = ctx.children();
    if children.is_empty() {
        return Ok(());
    }

    let tree = ctx.tree();
    let session = ctx.session();
    let parent = ctx.id();
    let _level = session.descend(parent, ctx.name());

    for child in children.iter() {
        let node = match tree.arena().get_node(child) {
            Some(node) => node,
            None => panic!(
                "{} lists child {} outside the clock registry",
                ctx.name(),
                child
            ),
        };
        if session.is_in_flight(child) {
            trace!(parent = ctx.name(), child = node.name(), "child mid-request, skipped");
            continue;
        }
        trace!(parent = ctx.name(), child = node.name(), %rate, depth = session.depth(), "notify");

        let child_ctx = UpdateCtx::new(tree, session, child);
        if let Err(err) = node.driver().notify(&child_ctx, parent, rate) {
            match session.policy() {
                NotifyPolicy::ShortCircuit => return Err(err.rejected_by(child)),
                NotifyPolicy::BestEffort => {
                    warn!(parent = ctx.name(), child = node.name(), %err, "notify failed, continuing");
                }
            }
        }
    }
    Ok(())
}
