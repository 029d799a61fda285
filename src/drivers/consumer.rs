use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::domain::{ClockId, Rate};
use crate::driver::ClockDriver;
use crate::engine::{QueryCtx, UpdateCtx};
use crate::errors::{ClockError, ClockResult};

/// Delivered to a peripheral when one of its clock outputs changed rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockEvent {
    /// Index into the peripheral's output list
    pub output: usize,
    pub rate: Rate,
}

pub type ClockCallback = dyn Fn(ClockEvent) + Send + Sync;

/// Shared holder of a peripheral's change callback.
#[derive(Default)]
pub struct CallbackSlot {
    callback: RwLock<Option<Arc<ClockCallback>>>,
}

impl CallbackSlot {
    pub fn set(&self, callback: Arc<ClockCallback>) {
        *self
            .callback
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    pub fn clear(&self) {
        *self
            .callback
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn get(&self) -> Option<Arc<ClockCallback>> {
        self.callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

impl fmt::Debug for CallbackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("installed", &self.is_set())
            .finish()
    }
}

/// Leaf subscriber standing for a peripheral.
///
/// Has no rate of its own. Its `notify` turns a parent's rate change into a
/// [`ClockEvent`] for every output slot fed by that parent.
#[derive(Debug)]
pub struct Consumer {
    outputs: Vec<ClockId>,
    callback: Arc<CallbackSlot>,
}

impl Consumer {
    pub fn new(outputs: Vec<ClockId>, callback: Arc<CallbackSlot>) -> Self {
        Self { outputs, callback }
    }

    pub fn outputs(&self) -> &[ClockId] {
        &self.outputs
    }
}

impl ClockDriver for Consumer {
    fn kind(&self) -> &'static str {
        "consumer"
    }

    fn parents(&self) -> Vec<ClockId> {
        self.outputs.clone()
    }

    fn get_rate(&self, ctx: &QueryCtx<'_>) -> ClockResult<Rate> {
        Err(ClockError::Unsupported {
            node: ctx.id(),
            op: "get_rate",
        })
    }

    fn notify(&self, ctx: &UpdateCtx<'_>, parent: ClockId, parent_rate: Rate) -> ClockResult<()> {
        let Some(callback) = self.callback.get() else {
            trace!(node = ctx.name(), "no callback installed");
            return Ok(());
        };
        for (output, _) in self
            .outputs
            .iter()
            .enumerate()
            .filter(|(_, id)| **id == parent)
        {
            callback(ClockEvent {
                output,
                rate: parent_rate,
            });
        }
        Ok(())
    }
}
