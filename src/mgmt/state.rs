use crate::domain::{ClockId, ClockTarget};

/// State every peripheral applies when it starts up.
pub const STATE_DEFAULT: usize = 0;
/// State applied before the peripheral goes to sleep.
pub const STATE_SLEEP: usize = 1;
/// First index free for peripheral-specific states.
pub const STATE_PRIV_START: usize = 2;

/// Named bundle of clock settings applied together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockState {
    name: String,
    settings: Vec<(ClockId, ClockTarget)>,
}

impl ClockState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: Vec::new(),
        }
    }

    /// Append a setting; settings are applied in the order they were added.
    pub fn with(mut self, clock: ClockId, target: ClockTarget) -> Self {
        self.settings.push((clock, target));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &[(ClockId, ClockTarget)] {
        &self.settings
    }
}
