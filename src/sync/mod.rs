//! Audio/visual clock reconciliation

pub mod drift;

pub use drift::{DriftStatus, SyncDriftConfig, SyncDriftMonitor, SyncDriftSample};
