// src/lockdown/mod.rs

//! Anti-cheating layer for an open exam.
//!
//! - [`LockdownMonitor`]: violation counting as a pure state machine
//! - [`LockdownSession`]: owns the host listeners and full-screen state for
//!   one exam and executes the monitor's effects
//! - [`SecurityGuard`]: blocks shortcuts and the context menu, reporting each
//!   attempt without touching the violation counter

pub mod guard;
pub mod monitor;
pub mod session;

pub use guard::{GuardVerdict, SecurityGuard};
pub use monitor::{LockdownEffect, LockdownMonitor, LockdownState};
pub use session::{LockdownHost, LockdownReaction, LockdownSession};
