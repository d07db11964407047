//! PDU session management for the nextgsim simulated 5G core
//!
//! Builds per-subscriber PDU session contexts from UL NAS Transport messages:
//!
//! - [`service`] - DNN list, data networks, session rules and the address pool
//! - [`pool`] - UE IPv4 address allocation
//! - [`ue`] - Subscriber context holding the UE's sessions
//! - [`context`] - The PDU session context and its NAS address form
//! - [`establishment`] - The establishment procedure
//! - [`reply`] - Establishment Accept/Reject builders
//! - [`node`] - The node tying subscribers and the session service together
//!
//! # Example
//!
//! ```rust
//! use nextgsim_5gc::{FiveGc, UeContext};
//! use nextgsim_common::{CoreConfig, NrLocation, SNssai};
//! use nextgsim_nas::{PayloadContainerType, PduSessionEstablishmentRequest, UlNasTransport};
//!
//! let core = FiveGc::from_config(&CoreConfig::default()).unwrap();
//! let ue = core.add_ue(UeContext::new("imsi-001010000000001", SNssai::new(1), NrLocation::default()));
//!
//! let mut sm = Vec::new();
//! PduSessionEstablishmentRequest::new(1, 1).encode(&mut sm);
//! let transport = UlNasTransport::new(PayloadContainerType::N1SmInformation, sm);
//!
//! let session = core.establish_pdu_session(&ue, &transport, 1).unwrap();
//! assert_eq!(session.pdu_address(), Some("10.0.0.1".parse().unwrap()));
//! ```

pub mod codec;
pub mod context;
pub mod error;
pub mod establishment;
pub mod node;
pub mod pool;
pub mod reply;
pub mod service;
pub mod ue;

pub use codec::{NasSmCodec, SmCodec};
pub use context::{ProtocolConfigurationOptions, SessionContext, SessionType, PDU_ADDRESS_LEN};
pub use error::{DecodeError, ErrorKind, EstablishmentError, PoolError, ResolutionError};
pub use establishment::{create_pdu_session, DEFAULT_QFI};
pub use node::FiveGc;
pub use pool::AddressPool;
pub use reply::{build_establishment_accept, build_establishment_reject};
pub use service::{DataNetwork, SessionRule, SessionService};
pub use ue::UeContext;
