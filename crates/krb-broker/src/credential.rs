use core::fmt;

use time::OffsetDateTime;
use typed_builder::TypedBuilder;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::principal::{PrincipalName, Realm};

bitflags::bitflags! {
    /// Ticket flags from [RFC 4120 5.4.1](https://www.rfc-editor.org/rfc/rfc4120.txt),
    /// MSB-0 bit numbering over the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TicketFlags: u32 {
        const FORWARDABLE = 1 << 30;
        const FORWARDED = 1 << 29;
        const PROXIABLE = 1 << 28;
        const PROXY = 1 << 27;
        const MAY_POSTDATE = 1 << 26;
        const POSTDATED = 1 << 25;
        const INVALID = 1 << 24;
        const RENEWABLE = 1 << 23;
        const INITIAL = 1 << 22;
        const PRE_AUTHENT = 1 << 21;
        const HW_AUTHENT = 1 << 20;
        const TRANSITED_POLICY_CHECKED = 1 << 19;
        const OK_AS_DELEGATE = 1 << 18;
    }
}

/// Session key material negotiated with the KDC.
///
/// The key bytes are wiped on drop and never shown by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    key_type: i32,
    value: Vec<u8>,
}

impl SessionKey {
    pub fn new(key_type: i32, value: Vec<u8>) -> Self {
        SessionKey { key_type, value }
    }

    pub fn key_type(&self) -> i32 {
        self.key_type
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("key_type", &self.key_type)
            .finish_non_exhaustive()
    }
}

/// An encrypted ticket, opaque to this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct Ticket(Vec<u8>);

impl Ticket {
    pub fn new(der: Vec<u8>) -> Self {
        Ticket(der)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticket({} bytes)", self.0.len())
    }
}

/// A credential decoded from a KDC reply: either a (possibly cross-realm) TGT
/// or an end-service ticket. Immutable once issued, except that the broker may
/// withdraw the delegation authorization before handing it out.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Credential {
    client: PrincipalName,
    /// Canonical client name reported by the KDC when it differs from `client`.
    #[builder(default)]
    client_alias: Option<PrincipalName>,
    server: PrincipalName,
    session_key: SessionKey,
    #[builder(default)]
    flags: TicketFlags,
    start_time: OffsetDateTime,
    end_time: OffsetDateTime,
    ticket: Ticket,
    #[builder(default)]
    second_ticket: Option<Ticket>,
}

impl Credential {
    pub fn client(&self) -> &PrincipalName {
        &self.client
    }

    pub fn client_alias(&self) -> Option<&PrincipalName> {
        self.client_alias.as_ref()
    }

    pub fn server(&self) -> &PrincipalName {
        &self.server
    }

    pub fn session_key(&self) -> &SessionKey {
        &self.session_key
    }

    pub fn flags(&self) -> TicketFlags {
        self.flags
    }

    pub fn start_time(&self) -> OffsetDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> OffsetDateTime {
        self.end_time
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn second_ticket(&self) -> Option<&Ticket> {
        self.second_ticket.as_ref()
    }

    pub fn is_tgt(&self) -> bool {
        self.tgs_target_realm().is_some()
    }

    /// For a TGT, the realm it grants entry into; the realm it is valid *in*
    /// is `server().realm()`.
    pub fn tgs_target_realm(&self) -> Option<Realm> {
        self.server.tgs_target_realm()
    }

    pub fn is_forwardable(&self) -> bool {
        self.flags.contains(TicketFlags::FORWARDABLE)
    }

    pub fn ok_as_delegate(&self) -> bool {
        self.flags.contains(TicketFlags::OK_AS_DELEGATE)
    }

    /// Withdraws the delegation authorization from this credential.
    pub fn clear_delegate(&mut self) {
        self.flags.remove(TicketFlags::OK_AS_DELEGATE);
    }

    pub fn has_expired(&self, at: OffsetDateTime) -> bool {
        self.end_time <= at
    }
}
