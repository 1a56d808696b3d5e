pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod persistence;
pub mod report;
pub mod stats;
pub mod store;
pub mod ticker;
pub mod tracker;
pub mod ui;
pub mod validate;

pub use error::{StorageError, ValidationError};
pub use tracker::{Tracker, TrackerOptions};
