//! Headless runner for the territorial grid simulation.
//!
//! Everything here sits on top of the public `turf_core` API:
//!
//! - [`strategies`]: built-in seeded decision strategies
//! - [`scenario`]: RON scenario files and world construction
//! - [`runner`]: tick loop with early-exit and metrics collection
//! - [`ascii`]: terminal rendering
//! - [`metrics`]: per-run population time series, serializable as JSON
//!
//! The core stays deterministic and RNG-free; any randomness lives in
//! strategy instances seeded from the scenario.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ascii;
pub mod metrics;
pub mod runner;
pub mod scenario;
pub mod strategies;

pub use ascii::{render_ascii, AsciiConfig};
pub use metrics::{MetricsCollector, PopulationSample, RunMetrics};
pub use runner::{RunConfig, Runner};
pub use scenario::{Scenario, ScenarioError, SpawnPoint, StrategyKind};
pub use strategies::{RandomWalk, Territorial};
