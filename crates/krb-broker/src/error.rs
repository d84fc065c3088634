use thiserror::Error;

use crate::exchange::ExchangeError;
use crate::principal::{Realm, SpnParseError};

/// Errors surfaced by the acquisition engine.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("cannot impersonate a principal of {client_realm} with a TGT from {tgt_realm}: cross-realm S4U2self is not supported")]
    UnsupportedCrossRealm { client_realm: Realm, tgt_realm: Realm },

    #[error("precondition violated: {detail}")]
    PreconditionViolation { detail: &'static str },

    /// The KDC granted the request, but the reply breaks a protocol
    /// postcondition.
    #[error("unacceptable KDC reply: {detail}")]
    KdcRefused { detail: &'static str },

    #[error("KDC replied with error code {code}")]
    KdcError { code: i32 },

    /// The configured realm hierarchy could not be traversed to the service
    /// realm.
    #[error("no TGT for the service realm is obtainable")]
    NoServiceCreds,

    #[error("referral loop: the KDC chain pointed at {realm} twice")]
    ReferralLoop { realm: Realm },

    #[error("invalid service principal name")]
    BadSpn {
        #[from]
        source: SpnParseError,
    },

    /// Transport failure or cancellation. Never retried.
    #[error("transport failure during the KDC exchange")]
    Io { source: std::io::Error },

    #[error("malformed KDC reply")]
    Protocol {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ExchangeError> for AcquireError {
    fn from(error: ExchangeError) -> Self {
        match error {
            ExchangeError::KdcError { code } => AcquireError::KdcError { code },
            ExchangeError::Io { source } => AcquireError::Io { source },
            ExchangeError::Protocol { source } => AcquireError::Protocol { source },
        }
    }
}
