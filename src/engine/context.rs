//! Views of the tree handed to driver hooks

use std::cell::{Cell, RefCell};
use std::ops::Deref;

use tracing::trace;

use crate::config::NotifyPolicy;
use crate::domain::{Children, ClockId, ClockTarget, Rate};
use crate::driver::{Applied, ConfigureRequest};
use crate::engine::{forward, ClockTree};
use crate::errors::{ClockError, ClockResult};

/// Read-only access for `get_rate` and `round_rate`.
#[derive(Debug, Clone, Copy)]
pub struct QueryCtx<'a> {
    tree: &'a ClockTree,
    id: ClockId,
}

impl<'a> QueryCtx<'a> {
    pub(crate) fn new(tree: &'a ClockTree, id: ClockId) -> Self {
        Self { tree, id }
    }

    /// The node whose hook is running.
    pub fn id(&self) -> ClockId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        self.tree.name(self.id).unwrap_or("<unknown>")
    }

    /// Effective rate of another node, usually a parent.
    pub fn rate_of(&self, other: ClockId) -> ClockResult<Rate> {
        self.tree.query_rate(other)
    }

    pub fn round_rate_of(&self, other: ClockId, rate: Rate) -> ClockResult<Rate> {
        self.tree.query_round_rate(other, rate)
    }

    pub(crate) fn tree(&self) -> &'a ClockTree {
        self.tree
    }
}

/// Mutating access for `configure`, `set_rate` and `notify`.
///
/// Only exists while the tree's configuration lock is held.
#[derive(Debug, Clone, Copy)]
pub struct UpdateCtx<'a> {
    query: QueryCtx<'a>,
    session: &'a Session,
}

impl<'a> UpdateCtx<'a> {
    pub(crate) fn new(tree: &'a ClockTree, session: &'a Session, id: ClockId) -> Self {
        Self {
            query: QueryCtx::new(tree, id),
            session,
        }
    }

    /// Children registered for notification, in registration order.
    pub fn children(&self) -> &'a Children {
        self.query.tree.children_of(self.query.id)
    }

    /// Ask `parent` to change on this node's behalf.
    pub fn configure_parent(&self, parent: ClockId, target: ClockTarget) -> ClockResult<Applied> {
        self.query.tree.configure_in(
            self.session,
            parent,
            ConfigureRequest::on_behalf_of(target, self.query.id),
        )
    }

    pub fn set_rate_of(&self, parent: ClockId, rate: Rate) -> ClockResult<Rate> {
        self.query
            .tree
            .set_rate_in(self.session, parent, rate, Some(self.query.id))
    }

    /// Tell every child that this node now runs at `rate`.
    pub fn forward(&self, rate: Rate) -> ClockResult<()> {
        forward::forward(self, rate)
    }

    pub(crate) fn session(&self) -> &'a Session {
        self.session
    }
}

impl<'a> Deref for UpdateCtx<'a> {
    type Target = QueryCtx<'a>;

    fn deref(&self) -> &Self::Target {
        &self.query
    }
}

/// Bookkeeping of one top-level configure or set_rate call.
#[derive(Debug)]
pub(crate) struct Session {
    in_flight: RefCell<Vec<ClockId>>,
    depth: Cell<usize>,
    depth_limit: usize,
    policy: NotifyPolicy,
}

impl Session {
    pub(crate) fn new(depth_limit: usize, policy: NotifyPolicy) -> Self {
        Self {
            in_flight: RefCell::new(Vec::new()),
            depth: Cell::new(0),
            depth_limit,
            policy,
        }
    }

    pub(crate) fn policy(&self) -> NotifyPolicy {
        self.policy
    }

    /// Mark `node` as mid-configuration until the guard drops.
    pub(crate) fn enter(
        &self,
        node: ClockId,
        requester: Option<ClockId>,
    ) -> ClockResult<InFlight<'_>> {
        let mut in_flight = self.in_flight.borrow_mut();
        if in_flight.contains(&node) {
            trace!(%node, ?requester, "reentrant configure refused");
            return Err(ClockError::Busy { node, requester });
        }
        in_flight.push(node);
        Ok(InFlight {
            session: self,
            node,
        })
    }

    pub(crate) fn is_in_flight(&self, node: ClockId) -> bool {
        self.in_flight.borrow().contains(&node)
    }

    /// Go one fan-out level deeper below `node`.
    ///
    /// Panics past the depth limit: an acyclic registry cannot get there, so
    /// the static topology must be corrupted.
    pub(crate) fn descend(&self, node: ClockId, name: &str) -> Level<'_> {
        let depth = self.depth.get() + 1;
        if depth > self.depth_limit {
            panic!(
                "notify fan-out below {} ({}) exceeded {} levels: clock topology is corrupted",
                name, node, self.depth_limit
            );
        }
        self.depth.set(depth);
        Level { session: self }
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth.get()
    }
}

#[derive(Debug)]
pub(crate) struct InFlight<'s> {
    session: &'s Session,
    node: ClockId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.session.in_flight.borrow_mut();
        if let Some(pos) = in_flight.iter().rposition(|&n| n == self.node) {
            in_flight.remove(pos);
        }
    }
}

#[derive(Debug)]
pub(crate) struct Level<'s> {
    session: &'s Session,
}

impl Drop for Level<'_> {
    fn drop(&mut self) {
        self.session.depth.set(self.session.depth.get().saturating_sub(1));
    }
}
