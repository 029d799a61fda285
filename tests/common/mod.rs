//! Test drivers shared by the integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use clktree::engine::{QueryCtx, UpdateCtx};
use clktree::{ClockDriver, ClockError, ClockId, ClockResult, ClockTarget, Rate};

/// `(label, notifying parent, rate)` in the order notifications arrived.
pub type NotifyLog = Arc<Mutex<Vec<(String, ClockId, Rate)>>>;

pub fn new_log() -> NotifyLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &NotifyLog) -> Vec<(String, ClockId, Rate)> {
    log.lock().unwrap().clone()
}

/// Pass-through node that records every notification it receives.
#[derive(Debug)]
pub struct Recorder {
    label: String,
    parent: ClockId,
    log: NotifyLog,
}

impl Recorder {
    pub fn new(label: &str, parent: ClockId, log: &NotifyLog) -> Self {
        Self {
            label: label.to_string(),
            parent,
            log: Arc::clone(log),
        }
    }
}

impl ClockDriver for Recorder {
    fn kind(&self) -> &'static str {
        "recorder"
    }

    fn parents(&self) -> Vec<ClockId> {
        vec![self.parent]
    }

    fn get_rate(&self, ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        ctx.rate_of(self.parent)
    }

    fn notify(&self, ctx: &UpdateCtx<'_>, parent: ClockId, parent_rate: Rate) -> ClockResult<()> {
        self.log
            .lock()
            .unwrap()
            .push((self.label.clone(), parent, parent_rate));
        ctx.forward(parent_rate)
    }
}

/// Refuses every rate its parent moves to.
#[derive(Debug)]
pub struct Refusing {
    parent: ClockId,
}

impl Refusing {
    pub fn new(parent: ClockId) -> Self {
        Self { parent }
    }
}

impl ClockDriver for Refusing {
    fn kind(&self) -> &'static str {
        "refusing"
    }

    fn parents(&self) -> Vec<ClockId> {
        vec![self.parent]
    }

    fn get_rate(&self, ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        ctx.rate_of(self.parent)
    }

    fn notify(&self, ctx: &UpdateCtx<'_>, _parent: ClockId, parent_rate: Rate) -> ClockResult<()> {
        Err(ClockError::Unachievable {
            node: ctx.id(),
            target: ClockTarget::Rate(parent_rate),
        })
    }
}

/// On notification, asks its parent to go back to divisor 2.
#[derive(Debug)]
pub struct Reentrant {
    parent: ClockId,
}

impl Reentrant {
    pub fn new(parent: ClockId) -> Self {
        Self { parent }
    }
}

impl ClockDriver for Reentrant {
    fn kind(&self) -> &'static str {
        "reentrant"
    }

    fn parents(&self) -> Vec<ClockId> {
        vec![self.parent]
    }

    fn get_rate(&self, ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        ctx.rate_of(self.parent)
    }

    fn notify(&self, ctx: &UpdateCtx<'_>, _parent: ClockId, _parent_rate: Rate) -> ClockResult<()> {
        ctx.configure_parent(self.parent, ClockTarget::Divisor(2))?;
        Ok(())
    }
}

/// Root clock that reports and rounds to a fixed rate but refuses to be set.
#[derive(Debug)]
pub struct Unsettable {
    rate: Rate,
}

impl Unsettable {
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }
}

impl ClockDriver for Unsettable {
    fn kind(&self) -> &'static str {
        "unsettable"
    }

    fn get_rate(&self, _ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        Ok(self.rate)
    }

    fn round_rate(&self, _ctx: &QueryCtx<'_>, _rate: Rate) -> ClockResult<Rate> {
        Ok(self.rate)
    }

    fn set_rate(&self, ctx: &UpdateCtx<'_>, rate: Rate) -> ClockResult<Rate> {
        Err(ClockError::Unachievable {
            node: ctx.id(),
            target: ClockTarget::Rate(rate),
        })
    }
}
