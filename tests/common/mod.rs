//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration tests:
//! - Binary invocation (via `run_extpack`)
//! - Project fixtures (via `helpers`)

pub(crate) mod helpers;

pub(crate) use helpers::{LiblinearCheckout, run_extpack};
