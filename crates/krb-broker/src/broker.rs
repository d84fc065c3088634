use tap::prelude::*;
use typed_builder::TypedBuilder;

use crate::cache::ReferralCache;
use crate::config::{Config, RealmRoutes};
use crate::credential::{Credential, Ticket};
use crate::error::AcquireError;
use crate::exchange::{KdcExchange, PaData, TgsRequest};
use crate::options::KdcOptions;
use crate::principal::PrincipalName;
use crate::trace::{TraceEvent, TraceSink, TracingSink};

/// Turns a TGT into service tickets.
///
/// One broker can serve many threads: every acquisition is an independent,
/// blocking call chain, and the referral cache is the only shared state.
///
/// ```no_run
/// # use krb_broker::{AcquireError, Credential, KdcExchange, StaticRoutes, TicketBroker};
/// # fn demo(exchange: Box<dyn KdcExchange>, tgt: &Credential) -> Result<(), AcquireError> {
/// let broker = TicketBroker::builder()
///     .exchange(exchange)
///     .realm_routes(Box::new(StaticRoutes::default()))
///     .build();
///
/// let ticket = broker.acquire_service("http/web.example.com", tgt)?;
/// # let _ = ticket;
/// # Ok(())
/// # }
/// ```
#[derive(TypedBuilder)]
pub struct TicketBroker {
    #[builder(default)]
    pub(crate) config: Config,
    pub(crate) exchange: Box<dyn KdcExchange>,
    pub(crate) realm_routes: Box<dyn RealmRoutes>,
    #[builder(default = Box::new(TracingSink))]
    pub(crate) trace: Box<dyn TraceSink>,
    #[builder(default, setter(skip))]
    pub(crate) referral_cache: ReferralCache,
}

/// Parameters for one logical resolution step.
pub(crate) struct ResolveStep<'a> {
    pub(crate) options: KdcOptions,
    pub(crate) tgt: &'a Credential,
    pub(crate) client_name: &'a PrincipalName,
    pub(crate) client_alias: Option<&'a PrincipalName>,
    pub(crate) server_name: &'a PrincipalName,
    pub(crate) canonical_server_name: &'a PrincipalName,
    pub(crate) additional_tickets: &'a [Ticket],
    pub(crate) extra_padata: &'a [PaData],
}

impl TicketBroker {
    /// Acquires a ticket for `service_spn` (`svc/host` or `svc/host@REALM`;
    /// a missing realm defaults to the client's) using `initial_tgt`.
    pub fn acquire_service(
        &self,
        service_spn: &str,
        initial_tgt: &Credential,
    ) -> Result<Credential, AcquireError> {
        let service = PrincipalName::parse_spn(service_spn, initial_tgt.client().realm())?;

        debug!(service = %service, client = %initial_tgt.client(), "acquiring service ticket");

        self.acquire(
            KdcOptions::empty(),
            initial_tgt,
            initial_tgt.client(),
            &service,
            &[],
            &[],
        )
    }

    /// The shared pipeline behind every public entry point: chase referrals
    /// when enabled, and fall back to the plain exchange when the KDC rejects
    /// the canonicalized request (older KDCs answer it with a KRB-ERROR).
    /// Every other failure is final; in particular a cancellation is never
    /// retried against the legacy path.
    pub(crate) fn acquire(
        &self,
        options: KdcOptions,
        as_tgt: &Credential,
        client_name: &PrincipalName,
        service_name: &PrincipalName,
        additional_tickets: &[Ticket],
        extra_padata: &[PaData],
    ) -> Result<Credential, AcquireError> {
        if self.config.referrals_enabled {
            match self.resolve_referrals(
                options,
                as_tgt,
                client_name,
                service_name,
                additional_tickets,
                extra_padata,
            ) {
                Ok(Some(creds)) => return Ok(creds),
                Ok(None) => return Err(AcquireError::NoServiceCreds),
                Err(AcquireError::KdcError { code }) => {
                    self.trace.record(TraceEvent::ReferralFallback);
                    debug!(code, "KDC rejected the canonicalized request, retrying without referrals");
                }
                Err(error) => return Err(error),
            }
        }

        self.resolve_one(ResolveStep {
            options,
            tgt: as_tgt,
            client_name,
            client_alias: as_tgt.client_alias(),
            server_name: service_name,
            canonical_server_name: service_name,
            additional_tickets,
            extra_padata,
        })
        .tap_err(|error| debug!(%error, "non-referral resolution failed"))
    }

    /// One logical TGS acquisition: when the TGT at hand does not reach the
    /// service realm, first walk the realm hierarchy for one that does, then
    /// send the actual request. An intermediate hop that refuses delegation
    /// poisons the result's ok-as-delegate flag.
    pub(crate) fn resolve_one(&self, step: ResolveStep<'_>) -> Result<Credential, AcquireError> {
        let Some(tgt_realm) = step.tgt.tgs_target_realm() else {
            return Err(AcquireError::PreconditionViolation {
                detail: "authenticating credential is not a ticket-granting ticket",
            });
        };
        let service_realm = step.server_name.realm();

        let mut ok_as_delegate = true;
        let prefetched = if *service_realm != tgt_realm {
            debug!(%tgt_realm, %service_realm, "TGT does not reach the service realm, walking the realm path");

            let outcome = self.tgt_for_realm(&tgt_realm, service_realm, step.tgt);
            ok_as_delegate = outcome.ok_as_delegate;

            let Some(cross_tgt) = outcome.tgt else {
                return Err(AcquireError::NoServiceCreds);
            };
            Some(cross_tgt)
        } else {
            None
        };

        // A prefetched TGT names the client as its own issuer saw it.
        let (tgt, client_name) = match &prefetched {
            Some(cross_tgt) => (cross_tgt, cross_tgt.client()),
            None => (step.tgt, step.client_name),
        };

        let mut creds = self.exchange.send(TgsRequest {
            options: step.options,
            tgt,
            client_name,
            client_alias: step.client_alias,
            server_name: step.server_name,
            canonical_server_name: step.canonical_server_name,
            additional_tickets: step.additional_tickets,
            extra_padata: step.extra_padata,
        })?;

        if !ok_as_delegate {
            creds.clear_delegate();
        }

        Ok(creds)
    }
}
