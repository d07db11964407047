//! NAS 5G Messages
//!
//! ## Message Categories
//!
//! - 5GMM (Mobility Management) transport messages - [`mm`]
//! - 5GSM (Session Management) messages - [`sm`]

pub mod mm;
pub mod sm;

pub use mm::*;
pub use sm::*;
