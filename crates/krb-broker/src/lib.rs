//! Client-side acquisition of Kerberos service tickets from a TGT, covering
//! same-realm requests, configured realm-path traversal, RFC 6806 referral
//! chasing and the S4U2self/S4U2proxy extensions. The DER codec, the network
//! transport and the realm topology are supplied by the host as collaborators.

#[macro_use]
extern crate tracing;

pub mod broker;
pub mod cache;
pub mod config;
pub mod constants;
pub mod credential;
pub mod error;
pub mod exchange;
pub mod options;
pub mod principal;
pub mod trace;

mod capath;
mod referral;
mod s4u;

pub use broker::TicketBroker;
pub use cache::{ReferralCache, ReferralCacheEntry};
pub use config::{Config, RealmRoutes, StaticRoutes};
pub use credential::{Credential, SessionKey, Ticket, TicketFlags};
pub use error::AcquireError;
pub use exchange::{ExchangeError, KdcExchange, PaData, PaForUser, PaValue, TgsRequest};
pub use options::KdcOptions;
pub use principal::{NameType, PrincipalName, Realm, SpnParseError};
pub use trace::{TraceEvent, TraceSink, TracingSink};
