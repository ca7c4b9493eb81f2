//! Core Kernel - Foundational types and utilities for the enrollment system
//!
//! This crate provides the fundamental building blocks used across all modules:
//! - Strongly-typed integer identifiers for students and payments
//! - Calendar types: institution timezone, injectable clocks, day arithmetic
//! - Port error and health-check types shared by every store adapter

pub mod identifiers;
pub mod temporal;
pub mod ports;

pub use identifiers::{StudentId, PaymentId};
pub use temporal::{Clock, SystemClock, FixedClock, Timezone, TemporalError, add_days, sub_days};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
