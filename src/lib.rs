//! PetFeeder firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;

// The hardware-facing rings compile on the host too; their ESP-IDF
// calls are replaced by simulation stubs there.
pub mod adapters;
pub mod drivers;
