use thiserror::Error;

use crate::domain::{ClockId, ClockTarget};

/// Runtime failures of rate queries, configuration requests and notify fan-out.
///
/// Every variant is a recoverable status. Corrupted static topology is not
/// represented here: it is rejected by the builder, and if it still shows up
/// at runtime the engine panics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("no active source along the ancestor chain of {0}")]
    Unavailable(ClockId),

    #[error("{node} does not support {op}")]
    Unsupported { node: ClockId, op: &'static str },

    #[error("{node} cannot reach target {target}")]
    Unachievable { node: ClockId, target: ClockTarget },

    /// A child failed while being told about a rate change.
    ///
    /// The change that triggered the fan-out stays applied and is not rolled
    /// back. Under the short-circuit policy the children after `node` were
    /// not notified.
    #[error("{node} rejected the rate change: {reason}")]
    Rejected {
        node: ClockId,
        reason: Box<ClockError>,
    },

    /// `node` is already being configured within the same request, or a
    /// configure/set_rate was issued from inside another one on the same
    /// thread (`requester` is `None` then).
    #[error("{node} cannot be configured: a configuration is already in progress")]
    Busy {
        node: ClockId,
        requester: Option<ClockId>,
    },

    #[error("unknown clock handle: {0}")]
    UnknownClock(ClockId),
}

impl ClockError {
    /// Attribute a failure to the child that returned it during fan-out.
    ///
    /// A failure that is already a rejection keeps its original culprit.
    pub fn rejected_by(self, node: ClockId) -> Self {
        match self {
            rejected @ ClockError::Rejected { .. } => rejected,
            reason => ClockError::Rejected {
                node,
                reason: Box::new(reason),
            },
        }
    }

    /// True for the two "this node cannot do it" outcomes.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            ClockError::Unsupported { .. } | ClockError::Unachievable { .. }
        )
    }
}

pub type ClockResult<T> = Result<T, ClockError>;

/// Build-time defects in a topology description.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("duplicate clock name: {0}")]
    DuplicateName(String),

    #[error("clock reserved but never defined: {0}")]
    Undefined(String),

    #[error("clock {node} references a handle outside the registry: {reference}")]
    DanglingReference { node: String, reference: ClockId },

    #[error("clock {0} references itself")]
    SelfReference(String),

    #[error("cycle detected in clock topology at: {0}")]
    CycleDetected(String),
}

pub type TopologyResult<T> = Result<T, TopologyError>;

/// Failures while loading [`crate::config::EngineSettings`].
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("config error: {message}")]
    Config { message: String },
}

/// Failures of a peripheral's clock management block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagementError {
    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error("no clock state {index} (have {count})")]
    NoSuchState { index: usize, count: usize },

    #[error("no clock output {index} (have {count})")]
    NoSuchOutput { index: usize, count: usize },
}

pub type ManagementResult<T> = Result<T, ManagementError>;
