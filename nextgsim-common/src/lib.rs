//! Common types and utilities for nextgsim
//!
//! This crate provides the 5G value types, configuration structures, and
//! logging utilities shared by the simulated 5G core crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{
    validate_dnn, AddressPoolConfig, CoreConfig, DataNetworkConfig, Ipv4Block, SessionRuleConfig,
    DEFAULT_DNN, DEFAULT_UE_SUBNET, MAX_DNN_LABEL_LEN,
};
pub use error::Error;
pub use logging::{
    init_logging, init_logging_with_filter, log_nas_message, log_protocol_message, Direction,
    HexDump, LogLevel,
};
pub use types::*;
