use crate::broker::{ResolveStep, TicketBroker};
use crate::credential::{Credential, Ticket};
use crate::error::AcquireError;
use crate::exchange::PaData;
use crate::options::KdcOptions;
use crate::principal::{PrincipalName, Realm};
use crate::trace::TraceEvent;

impl TicketBroker {
    /// Resolves `service_name` by following RFC 6806 referrals.
    ///
    /// The request is sent with CANONICALIZE so the KDC may answer with a
    /// cross-realm TGT pointing at the realm it believes the service lives
    /// in; the chase re-issues the request there and repeats. Observed hops
    /// are remembered in the referral cache and replayed without a round
    /// trip. A realm offered twice aborts the chase. After
    /// `max_referrals + 1` rounds the last credential obtained is handed
    /// back as a best effort.
    pub(crate) fn resolve_referrals(
        &self,
        options: KdcOptions,
        as_tgt: &Credential,
        client_name: &PrincipalName,
        service_name: &PrincipalName,
        additional_tickets: &[Ticket],
        extra_padata: &[PaData],
    ) -> Result<Option<Credential>, AcquireError> {
        let options = options | KdcOptions::CANONICALIZE;
        let client_alias = as_tgt.client_alias().cloned();

        let mut current_ref = service_name.clone();
        let mut current_tgt = as_tgt.clone();
        let mut visited: Vec<Realm> = Vec::new();
        let mut last_creds = None;

        for _ in 0..=self.config.max_referrals {
            let to_realm = if let Some(entry) =
                self.referral_cache
                    .get(client_name, service_name, current_ref.realm())
            {
                debug!(to_realm = %entry.to_realm, "referral hop known from cache");
                self.trace.record(TraceEvent::ReferralCacheHit {
                    realm: entry.to_realm.clone(),
                });

                current_tgt = entry.credential;
                entry.to_realm
            } else {
                let creds = self.resolve_one(ResolveStep {
                    options,
                    tgt: &current_tgt,
                    client_name,
                    client_alias: client_alias.as_ref(),
                    server_name: &current_ref,
                    canonical_server_name: service_name,
                    additional_tickets,
                    extra_padata,
                })?;

                if *creds.server() == current_ref {
                    return Ok(Some(creds));
                }

                let Some(target) = referral_target(&creds, &current_ref) else {
                    // Neither the requested service nor a referral; hand the
                    // KDC's answer back unchanged.
                    return Ok(Some(creds));
                };

                debug!(%target, server = %creds.server(), "KDC referred the request to another realm");
                self.trace
                    .record(TraceEvent::ReferralObserved { realm: target.clone() });

                self.referral_cache.put(
                    client_name,
                    service_name,
                    creds.server().realm(),
                    &target,
                    creds.clone(),
                );

                last_creds = Some(creds.clone());
                current_tgt = creds;
                target
            };

            if visited.contains(&to_realm) {
                return Err(AcquireError::ReferralLoop { realm: to_realm });
            }
            visited.push(to_realm.clone());

            current_ref = current_ref.with_realm(to_realm);
        }

        debug!(limit = self.config.max_referrals, "referral limit reached, returning the last hop credential");
        self.trace.record(TraceEvent::ReferralsExhausted {
            limit: self.config.max_referrals,
        });

        Ok(last_creds)
    }
}

/// A reply whose server is a TGT for a realm other than the one just asked is
/// the KDC's way of saying "go there instead".
fn referral_target(creds: &Credential, requested: &PrincipalName) -> Option<Realm> {
    creds
        .server()
        .tgs_target_realm()
        .filter(|target| target != requested.realm())
}
