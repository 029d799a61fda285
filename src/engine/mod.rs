//! Query/configure engine and the notify forwarding primitive
//!
//! [`ClockTree`] is the public face of the crate: consumers hand it node
//! handles and it dispatches to the node drivers. Queries run lock-free;
//! `configure` and `set_rate` are serialized through one tree-wide lock.
//! Calling either of them again from a driver hook or consumer callback on
//! the thread that holds the lock fails with `Busy` instead of blocking.

mod configure;
mod context;
mod forward;
mod query;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tracing::debug;

pub use context::{QueryCtx, UpdateCtx};
pub(crate) use context::Session;

use crate::config::EngineSettings;
use crate::domain::{Children, ClockArena, ClockId, ClockNode};
use crate::errors::{ClockError, ClockResult};

/// A built clock topology plus the engine that evaluates it.
#[derive(Debug)]
pub struct ClockTree {
    arena: ClockArena,
    settings: EngineSettings,
    configure_lock: Mutex<()>,
    /// Thread currently holding `configure_lock`
    lock_owner: Mutex<Option<ThreadId>>,
}

impl ClockTree {
    pub(crate) fn new(arena: ClockArena, settings: EngineSettings) -> Self {
        Self {
            arena,
            settings,
            configure_lock: Mutex::new(()),
            lock_owner: Mutex::new(None),
        }
    }

    pub fn arena(&self) -> &ClockArena {
        &self.arena
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Handle of the node registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<ClockId> {
        self.arena.lookup(name)
    }

    pub fn name(&self, id: ClockId) -> Option<&str> {
        self.arena.get_node(id).map(ClockNode::name)
    }

    pub fn node(&self, id: ClockId) -> ClockResult<&ClockNode> {
        self.arena.get_node(id).ok_or(ClockError::UnknownClock(id))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Children of a node that is known to be in the registry.
    ///
    /// Panics on an out-of-registry handle: child references were validated
    /// at build time, so reaching this means corrupted static data.
    pub(crate) fn children_of(&self, id: ClockId) -> &Children {
        match self.arena.get_node(id) {
            Some(node) => node.children(),
            None => panic!("child reference {} is outside the clock registry", id),
        }
    }

    fn depth_limit(&self) -> usize {
        self.settings.depth_limit(self.arena.len())
    }

    fn owner(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.lock_owner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the configure lock for a request on `id`.
    ///
    /// The lock is not reentrant: a request issued while this thread already
    /// holds it would block forever, so it is refused with `Busy`.
    fn lock(&self, id: ClockId) -> ClockResult<ConfigureGuard<'_>> {
        let me = thread::current().id();
        if *self.owner() == Some(me) {
            debug!(node = %id, "configure re-entered on the lock-holding thread");
            return Err(ClockError::Busy {
                node: id,
                requester: None,
            });
        }
        // The lock guards no data of its own; a panic mid-configure leaves
        // nothing to repair, so a poisoned lock is still usable.
        let guard = self
            .configure_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *self.owner() = Some(me);
        Ok(ConfigureGuard {
            tree: self,
            _guard: guard,
        })
    }

    fn open_session(&self) -> Session {
        Session::new(self.depth_limit(), self.settings.notify_policy)
    }
}

/// Held for the duration of one top-level configure or set_rate call.
struct ConfigureGuard<'a> {
    tree: &'a ClockTree,
    _guard: MutexGuard<'a, ()>,
}

impl Drop for ConfigureGuard<'_> {
    fn drop(&mut self) {
        // runs before `_guard` releases the lock
        *self.tree.owner() = None;
    }
}
