use thiserror::Error;

use crate::constants::pa_data_types;
use crate::credential::{Credential, SessionKey, Ticket};
use crate::options::KdcOptions;
use crate::principal::PrincipalName;

/// Everything one TGS-REQ needs.
///
/// `server_name` is the name actually put on the wire; `canonical_server_name`
/// is the name originally asked for, which referral chasing keeps stable while
/// it rewrites the realm of `server_name`.
#[derive(Debug)]
pub struct TgsRequest<'a> {
    pub options: KdcOptions,
    /// The TGT authenticating the request.
    pub tgt: &'a Credential,
    pub client_name: &'a PrincipalName,
    pub client_alias: Option<&'a PrincipalName>,
    pub server_name: &'a PrincipalName,
    pub canonical_server_name: &'a PrincipalName,
    pub additional_tickets: &'a [Ticket],
    pub extra_padata: &'a [PaData],
}

/// Pre-authentication data attached to a TGS-REQ.
#[derive(Debug, Clone)]
pub struct PaData {
    pub padata_type: u32,
    pub value: PaValue,
}

impl PaData {
    /// PA-FOR-USER naming the principal a service wants a ticket to itself
    /// for. The checksum over the name is keyed with the TGT session key and
    /// computed by the exchange when it encodes the request.
    pub fn for_user(user: PrincipalName, key: SessionKey) -> Self {
        PaData {
            padata_type: pa_data_types::PA_FOR_USER,
            value: PaValue::ForUser(PaForUser {
                user,
                key,
                auth_package: "Kerberos".to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PaValue {
    /// Already-encoded payload, passed through untouched.
    Raw(Vec<u8>),
    ForUser(PaForUser),
}

#[derive(Debug, Clone)]
pub struct PaForUser {
    pub user: PrincipalName,
    pub key: SessionKey,
    pub auth_package: String,
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The KDC answered with a KRB-ERROR.
    #[error("KDC replied with error code {code}")]
    KdcError { code: i32 },
    /// Transport failure or cancellation.
    #[error("transport failure during the KDC exchange")]
    Io {
        #[from]
        source: std::io::Error,
    },
    /// The reply could not be decoded or validated.
    #[error("malformed KDC reply")]
    Protocol {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// One TGS round trip: encode and send the request, receive and decode the
/// reply. Implementations must not retry, and must release any socket or
/// cryptographic context they open on every exit path. A cancellation
/// observed mid-exchange surfaces as [`ExchangeError::Io`].
pub trait KdcExchange: Send + Sync {
    fn send(&self, request: TgsRequest<'_>) -> Result<Credential, ExchangeError>;
}
