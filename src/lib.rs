//! Core of the galactic war dashboard: raw API documents in, render-ready
//! view models and live countdowns out.

pub mod config;
pub mod countdown;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod timestamp;
pub mod view;

pub use config::Config;
pub use dashboard::{Dashboard, ErrorState, ViewOutcome};
pub use error::DashboardError;
