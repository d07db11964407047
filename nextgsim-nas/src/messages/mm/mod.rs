//! NAS 5GMM (Mobility Management) Messages
//!
//! Only the NAS transport messages that carry 5GSM payloads are modelled.

pub mod nas_transport;

pub use nas_transport::*;
