//! Skid-steer drive model and teleop runtime.
//!
//! [`drive::DifferentialDriveModel`] turns normalized drive intents into
//! per-side velocity/voltage commands; [`runtime`] feeds it from zenoh.

pub mod config;
pub mod drive;
pub mod messages;
pub mod runtime;
