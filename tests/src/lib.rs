//! Integration test framework for nextgsim
#![allow(missing_docs)]
//!
//! This crate provides fixtures and utilities for driving the simulated 5G
//! core with real NAS bytes.
//!
//! # Components
//!
//! - [`test_fixtures`] - Core/UE configuration and NAS message builders
//! - [`test_utils`] - Utility functions for test setup and assertions
//!
//! # Test Categories
//!
//! 1. **PDU Session Tests** - Establishment, rejection and reply encoding
//! 2. **Multi-UE Tests** - Concurrent establishments over a shared core

pub mod test_fixtures;
pub mod test_utils;

pub use test_fixtures::{TestConfig, TestCoreConfig, TestUeConfig, UlNasBuilder};
pub use test_utils::{
    expect_accept, expect_reject, init_test_logging, wait_for_condition, TestResult,
    DEFAULT_POLL_INTERVAL, DEFAULT_TEST_TIMEOUT,
};
