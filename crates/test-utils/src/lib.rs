//! Test doubles for the ticket broker: a scripted KDC exchange, a recording
//! trace sink, and credential fixtures.

use std::collections::VecDeque;
use std::sync::Arc;

use krb_broker::{
    Credential, ExchangeError, KdcExchange, KdcOptions, PaValue, PrincipalName, Realm, SessionKey,
    TgsRequest, Ticket, TicketFlags, TraceEvent, TraceSink,
};
use parking_lot::Mutex;
use time::{Duration, OffsetDateTime};

/// What the fake KDC should answer to the next request.
#[derive(Debug)]
pub enum ScriptedReply {
    Grant(Credential),
    /// KRB-ERROR with the given code.
    Deny(i32),
    /// Transport failure.
    Unreachable,
    /// Undecodable reply.
    Garbled,
}

/// What the broker put into one TGS-REQ, captured for assertions.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub options: KdcOptions,
    /// Server principal of the TGT that authenticated the request.
    pub tgt_server: PrincipalName,
    pub client_name: PrincipalName,
    pub client_alias: Option<PrincipalName>,
    pub server_name: PrincipalName,
    pub canonical_server_name: PrincipalName,
    pub additional_tickets: usize,
    /// Principal named by a PA-FOR-USER payload, if one was attached.
    pub impersonated: Option<PrincipalName>,
}

#[derive(Default)]
struct ScriptedInner {
    script: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<RequestRecord>>,
}

/// A KDC that replays a scripted list of replies and records every request.
/// Clones share the script and the log, so tests can keep a handle after
/// moving one into the broker.
#[derive(Clone, Default)]
pub struct ScriptedKdc {
    inner: Arc<ScriptedInner>,
}

impl ScriptedKdc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, reply: ScriptedReply) {
        self.inner.script.lock().push_back(reply);
    }

    pub fn requests(&self) -> Vec<RequestRecord> {
        self.inner.requests.lock().clone()
    }

    /// Replies enqueued but never consumed.
    pub fn outstanding(&self) -> usize {
        self.inner.script.lock().len()
    }
}

impl KdcExchange for ScriptedKdc {
    fn send(&self, request: TgsRequest<'_>) -> Result<Credential, ExchangeError> {
        let impersonated = request.extra_padata.iter().find_map(|pa| match &pa.value {
            PaValue::ForUser(for_user) => Some(for_user.user.clone()),
            PaValue::Raw(_) => None,
        });

        self.inner.requests.lock().push(RequestRecord {
            options: request.options,
            tgt_server: request.tgt.server().clone(),
            client_name: request.client_name.clone(),
            client_alias: request.client_alias.cloned(),
            server_name: request.server_name.clone(),
            canonical_server_name: request.canonical_server_name.clone(),
            additional_tickets: request.additional_tickets.len(),
            impersonated,
        });

        match self.inner.script.lock().pop_front() {
            Some(ScriptedReply::Grant(credential)) => Ok(credential),
            Some(ScriptedReply::Deny(code)) => Err(ExchangeError::KdcError { code }),
            Some(ScriptedReply::Unreachable) => Err(ExchangeError::Io {
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "KDC unreachable"),
            }),
            Some(ScriptedReply::Garbled) => Err(ExchangeError::Protocol {
                source: "truncated TGS-REP".into(),
            }),
            None => panic!("TGS request without a scripted reply: {}", request.server_name),
        }
    }
}

/// Captures traversal events for sequence assertions. Clones share storage.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<TraceEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }
}

impl TraceSink for RecordingSink {
    fn record(&self, event: TraceEvent) {
        self.events.lock().push(event);
    }
}

/// `"alice@A"` or `"http/host@B"` into a principal. The realm is mandatory.
pub fn principal(repr: &str) -> PrincipalName {
    let (name, realm) = repr
        .rsplit_once('@')
        .expect("principal needs an @realm suffix");
    PrincipalName::parse_spn(name, &Realm::new(realm)).expect("bad principal")
}

pub fn session_key() -> SessionKey {
    SessionKey::new(18, vec![0x42; 32])
}

/// A TGT for `client`, issued by `issuing`, granting entry into `target`,
/// forwardable and delegation-friendly.
pub fn tgt(client: &str, issuing: &str, target: &str) -> Credential {
    tgt_with_flags(
        client,
        issuing,
        target,
        TicketFlags::FORWARDABLE | TicketFlags::INITIAL | TicketFlags::OK_AS_DELEGATE,
    )
}

pub fn tgt_with_flags(client: &str, issuing: &str, target: &str, flags: TicketFlags) -> Credential {
    credential(
        principal(client),
        PrincipalName::tgs_service(&Realm::new(target), &Realm::new(issuing)),
        flags,
    )
}

/// Like [`tgt`], with the canonical client name the KDC reported.
pub fn tgt_with_alias(client: &str, alias: &str, issuing: &str, target: &str) -> Credential {
    let now = OffsetDateTime::now_utc();

    Credential::builder()
        .client(principal(client))
        .client_alias(Some(principal(alias)))
        .server(PrincipalName::tgs_service(&Realm::new(target), &Realm::new(issuing)))
        .session_key(session_key())
        .flags(TicketFlags::FORWARDABLE | TicketFlags::INITIAL | TicketFlags::OK_AS_DELEGATE)
        .start_time(now - Duration::minutes(5))
        .end_time(now + Duration::hours(8))
        .ticket(Ticket::new(vec![0x61; 16]))
        .build()
}

/// A service ticket for `client` to `spn` (`svc/host@REALM`), forwardable.
pub fn service_ticket(client: &str, spn: &str) -> Credential {
    service_ticket_with_flags(client, spn, TicketFlags::FORWARDABLE)
}

pub fn service_ticket_with_flags(client: &str, spn: &str, flags: TicketFlags) -> Credential {
    credential(principal(client), principal(spn), flags)
}

fn credential(client: PrincipalName, server: PrincipalName, flags: TicketFlags) -> Credential {
    let now = OffsetDateTime::now_utc();

    Credential::builder()
        .client(client)
        .server(server)
        .session_key(session_key())
        .flags(flags)
        .start_time(now - Duration::minutes(5))
        .end_time(now + Duration::hours(8))
        .ticket(Ticket::new(vec![0x61; 16]))
        .build()
}
