use crate::broker::TicketBroker;
use crate::credential::Credential;
use crate::exchange::TgsRequest;
use crate::options::KdcOptions;
use crate::principal::{PrincipalName, Realm};
use crate::trace::TraceEvent;

/// Result of a realm-hierarchy walk: the TGT reaching the target realm (if
/// any), and whether every hop along the way authorized delegation.
pub(crate) struct CapathOutcome {
    pub(crate) tgt: Option<Credential>,
    pub(crate) ok_as_delegate: bool,
}

impl TicketBroker {
    /// Walks the configured realm path from `local_realm` towards
    /// `service_realm`, exchanging the TGT at each hop, until a TGT into the
    /// service realm is obtained or no further hop answers.
    ///
    /// At each position the traversal first asks for the target realm
    /// outright; if that fails it scans the rest of the path left to right
    /// for any realm the current hop does reach. A KDC offering a shortcut
    /// outside the configured path is not followed. Probe failures are routes
    /// that do not exist, not errors.
    pub(crate) fn tgt_for_realm(
        &self,
        local_realm: &Realm,
        service_realm: &Realm,
        starting_tgt: &Credential,
    ) -> CapathOutcome {
        let realms = self.realm_routes.realms_list(local_realm, service_realm);
        let mut ok_as_delegate = true;

        if realms.len() < 2 {
            debug!(%local_realm, %service_realm, "no realm path configured");
            return CapathOutcome {
                tgt: None,
                ok_as_delegate,
            };
        }

        let mut i = 0;
        let mut working_tgt: Option<Credential> = None;

        loop {
            let auth = working_tgt.as_ref().unwrap_or(starting_tgt);

            let mut new_tgt = self.probe(auth, &realms[i], service_realm);

            if new_tgt.is_none() {
                for hop in &realms[i + 1..] {
                    if let Some(tgt) = self.probe(auth, &realms[i], hop) {
                        new_tgt = Some(tgt);
                        break;
                    }
                }
            }

            let Some(new_tgt) = new_tgt else {
                debug!(from = %realms[i], "realm path traversal is stuck");
                return CapathOutcome {
                    tgt: None,
                    ok_as_delegate,
                };
            };

            if ok_as_delegate && !new_tgt.ok_as_delegate() {
                ok_as_delegate = false;
                self.trace
                    .record(TraceEvent::DelegateFlagCleared { at: realms[i].clone() });
                debug!(at = %realms[i], "intermediate TGT does not authorize delegation");
            }

            let Some(reached) = new_tgt.tgs_target_realm() else {
                warn!(server = %new_tgt.server(), "cross-realm exchange returned a non-TGT credential");
                return CapathOutcome {
                    tgt: None,
                    ok_as_delegate,
                };
            };

            if reached == *service_realm {
                return CapathOutcome {
                    tgt: Some(new_tgt),
                    ok_as_delegate,
                };
            }

            let Some(next) = (i + 1..realms.len()).find(|&k| realms[k] == reached) else {
                debug!(%reached, "KDC pointed outside the configured realm path, refusing to follow");
                return CapathOutcome {
                    tgt: None,
                    ok_as_delegate,
                };
            };

            i = next;
            working_tgt = Some(new_tgt);
        }
    }

    /// One cross-realm TGS probe: ask the KDC of `issuing` for a TGT into
    /// `target`, authenticated by `auth`. Every failure means "no route".
    fn probe(&self, auth: &Credential, issuing: &Realm, target: &Realm) -> Option<Credential> {
        self.trace.record(TraceEvent::ProbeAttempt {
            from: issuing.clone(),
            to: target.clone(),
        });

        let sname = PrincipalName::tgs_service(target, issuing);
        let request = TgsRequest {
            options: KdcOptions::empty(),
            tgt: auth,
            client_name: auth.client(),
            client_alias: auth.client_alias(),
            server_name: &sname,
            canonical_server_name: &sname,
            additional_tickets: &[],
            extra_padata: &[],
        };

        match self.exchange.send(request) {
            Ok(credential) => Some(credential),
            Err(error) => {
                debug!(from = %issuing, to = %target, %error, "cross-realm TGS probe failed");
                self.trace.record(TraceEvent::ProbeFailed {
                    from: issuing.clone(),
                    to: target.clone(),
                });
                None
            }
        }
    }
}
