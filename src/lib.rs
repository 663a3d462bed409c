//! scanflow: barcode scan station
//!
//! Keystrokes from a keyboard-wedge scanner are reassembled into delivery-note
//! numbers by the [`aggregator`], submitted to the scan service by
//! [`scan_service`], and acknowledged to the operator through a
//! [`notify::NotificationSink`].

#[cfg(test)]
mod tests;

pub mod aggregator;
pub mod config;
pub mod headless;
pub mod input;
pub mod logging;
pub mod notify;
pub mod scan_service;
pub mod scheduler;
pub mod state;
pub mod submission;
pub mod ui;

pub use aggregator::{AggregatorSettings, ScanAggregator, StationCommand, StationHandle};
pub use config::Config;
pub use input::KeyInput;
pub use notify::{ResultKind, ScanResult};
