//! clktree: clock tree management core
//!
//! Models the clock distribution network of a system-on-chip as an acyclic
//! graph of clock nodes. Consumers query effective rates, push
//! configuration requests up toward the sources, and every node whose rate
//! changes tells the nodes it feeds.
//!
//! ```
//! use clktree::drivers::{Divider, FixedSource, Output};
//! use clktree::{ClockTarget, EngineSettings, Rate, TopologyBuilder};
//!
//! let mut builder = TopologyBuilder::new();
//! let osc = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
//! let div = builder.add("div", Divider::new(osc, 2));
//! let out = builder.add("out", Output::new(div));
//! let tree = builder.build(EngineSettings::default()).unwrap();
//!
//! assert_eq!(tree.get_rate(out).unwrap(), Rate::from_mhz(12));
//! tree.configure(div, ClockTarget::Divisor(4)).unwrap();
//! assert_eq!(tree.get_rate(out).unwrap(), Rate::from_mhz(6));
//! ```

pub mod config;
pub mod domain;
pub mod driver;
pub mod drivers;
pub mod engine;
pub mod errors;
pub mod mgmt;
pub mod tree_traits;
pub mod util;

pub use config::{EngineSettings, NotifyPolicy};
pub use domain::{ClockId, ClockTarget, Rate, TopologyBuilder};
pub use driver::{Applied, ClockDriver, ConfigureRequest};
pub use engine::ClockTree;
pub use errors::{ClockError, ClockResult, ManagementError, TopologyError};
pub use mgmt::{ClockManagement, ClockState};
