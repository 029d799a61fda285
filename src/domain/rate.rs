//! Frequencies and configuration targets

use std::fmt;

/// A clock frequency in Hz.
///
/// Zero is a valid rate (a gated clock). Failures never travel inside a
/// `Rate`; they are reported as [`crate::ClockError`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rate(u32);

impl Rate {
    pub const ZERO: Rate = Rate(0);

    pub const fn from_hz(hz: u32) -> Self {
        Self(hz)
    }

    /// # Panics
    ///
    /// If the rate does not fit in `u32` Hz (above 4 294 967 kHz).
    pub const fn from_khz(khz: u32) -> Self {
        match khz.checked_mul(1_000) {
            Some(hz) => Self(hz),
            None => panic!("rate in kHz overflows u32 Hz"),
        }
    }

    /// # Panics
    ///
    /// If the rate does not fit in `u32` Hz (above 4294 MHz).
    pub const fn from_mhz(mhz: u32) -> Self {
        match mhz.checked_mul(1_000_000) {
            Some(hz) => Self(hz),
            None => panic!("rate in MHz overflows u32 Hz"),
        }
    }

    pub const fn hz(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Divide by an integer divisor; `None` for a zero divisor.
    pub fn checked_div(self, divisor: u32) -> Option<Self> {
        self.0.checked_div(divisor).map(Self)
    }

    pub fn checked_mul(self, factor: u32) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    /// Absolute distance between two rates, used to rank candidates.
    pub fn distance(self, other: Rate) -> u32 {
        self.0.abs_diff(other.0)
    }
}

impl From<u32> for Rate {
    fn from(hz: u32) -> Self {
        Self(hz)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// What a configuration request asks a node to become.
///
/// Each driver interprets the variants that make sense for it and rejects
/// the rest with [`crate::ClockError::Unsupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockTarget {
    /// Produce this output rate.
    Rate(Rate),
    /// Use this integer divisor.
    Divisor(u32),
    /// Route this input (by candidate index).
    Select(usize),
    /// Ungate (`true`) or gate (`false`) the clock.
    Gate(bool),
}

impl fmt::Display for ClockTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockTarget::Rate(rate) => write!(f, "rate {}", rate),
            ClockTarget::Divisor(div) => write!(f, "divisor {}", div),
            ClockTarget::Select(idx) => write!(f, "input {}", idx),
            ClockTarget::Gate(true) => write!(f, "ungated"),
            ClockTarget::Gate(false) => write!(f, "gated"),
        }
    }
}
