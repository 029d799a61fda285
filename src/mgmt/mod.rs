//! Per-peripheral clock management
//!
//! A peripheral does not talk to individual clock nodes. It owns a
//! [`ClockManagement`] block listing the clock outputs it consumes and the
//! named states it can switch between, and it may install a callback to
//! hear about rate changes on any of its outputs.

mod state;

pub use state::{ClockState, STATE_DEFAULT, STATE_PRIV_START, STATE_SLEEP};

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::{ClockId, Rate, TopologyBuilder};
use crate::drivers::{CallbackSlot, ClockEvent, Consumer};
use crate::engine::ClockTree;
use crate::errors::{ManagementError, ManagementResult};

#[derive(Debug)]
pub struct ClockManagement {
    consumer: ClockId,
    outputs: Vec<ClockId>,
    states: Vec<ClockState>,
    callback: Arc<CallbackSlot>,
}

impl ClockManagement {
    /// Register a consumer node named `name` subscribed to every output.
    pub fn define(
        builder: &mut TopologyBuilder,
        name: impl Into<String>,
        outputs: Vec<ClockId>,
        states: Vec<ClockState>,
    ) -> Self {
        let callback = Arc::new(CallbackSlot::default());
        let consumer = builder.add(name, Consumer::new(outputs.clone(), Arc::clone(&callback)));
        Self {
            consumer,
            outputs,
            states,
            callback,
        }
    }

    /// Handle of the consumer node standing for this peripheral.
    pub fn consumer(&self) -> ClockId {
        self.consumer
    }

    pub fn outputs(&self) -> &[ClockId] {
        &self.outputs
    }

    pub fn states(&self) -> &[ClockState] {
        &self.states
    }

    pub fn state_index(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|s| s.name() == name)
    }

    /// Current rate of output `output`.
    pub fn rate(&self, tree: &ClockTree, output: usize) -> ManagementResult<Rate> {
        let id = self
            .outputs
            .get(output)
            .copied()
            .ok_or(ManagementError::NoSuchOutput {
                index: output,
                count: self.outputs.len(),
            })?;
        Ok(tree.get_rate(id)?)
    }

    /// Apply every setting of state `index` in order.
    ///
    /// Stops at the first failing setting. Settings applied before it stay
    /// applied.
    #[instrument(level = "debug", skip(self, tree), fields(consumer = %self.consumer))]
    pub fn apply_state(&self, tree: &ClockTree, index: usize) -> ManagementResult<()> {
        let state = self.states.get(index).ok_or(ManagementError::NoSuchState {
            index,
            count: self.states.len(),
        })?;
        for &(clock, target) in state.settings() {
            tree.configure(clock, target)?;
        }
        debug!(state = state.name(), settings = state.settings().len(), "state applied");
        Ok(())
    }

    /// Install `callback`, replacing any previous one.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(ClockEvent) + Send + Sync + 'static,
    {
        self.callback.set(Arc::new(callback));
    }

    pub fn clear_callback(&self) {
        self.callback.clear();
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_set()
    }
}
