use crate::broker::TicketBroker;
use crate::credential::{Credential, Ticket};
use crate::error::AcquireError;
use crate::exchange::PaData;
use crate::options::KdcOptions;
use crate::principal::PrincipalName;

impl TicketBroker {
    /// S4U2self: using its own TGT, a service obtains a ticket *to itself* on
    /// behalf of `impersonated`, without that user's secrets.
    ///
    /// The middle service's TGT must be forwardable and share the
    /// impersonated principal's realm; the KDC reply must name the
    /// impersonated principal as client and be forwardable in turn, otherwise
    /// it is rejected here.
    pub fn acquire_s4u2self(
        &self,
        impersonated: PrincipalName,
        middle_tgt: &Credential,
    ) -> Result<Credential, AcquireError> {
        let middle = middle_tgt.client();

        if impersonated.realm() != middle.realm() {
            return Err(AcquireError::UnsupportedCrossRealm {
                client_realm: impersonated.realm().clone(),
                tgt_realm: middle.realm().clone(),
            });
        }

        if !middle_tgt.is_forwardable() {
            return Err(AcquireError::PreconditionViolation {
                detail: "S4U2self requires a forwardable TGT",
            });
        }

        debug!(%impersonated, middle = %middle, "acquiring ticket to self on behalf of another principal");

        let padata = [PaData::for_user(
            impersonated.clone(),
            middle_tgt.session_key().clone(),
        )];
        let creds = self.acquire(
            KdcOptions::FORWARDABLE,
            middle_tgt,
            middle,
            middle,
            &[],
            &padata,
        )?;

        if *creds.client() != impersonated {
            return Err(AcquireError::KdcRefused {
                detail: "reply does not name the impersonated principal as client",
            });
        }
        if !creds.is_forwardable() {
            return Err(AcquireError::KdcRefused {
                detail: "reply obtained on behalf of another principal is not forwardable",
            });
        }

        Ok(creds)
    }

    /// S4U2proxy: presenting a user's ticket to itself as evidence, a service
    /// obtains a ticket to `backend_spn` on that user's behalf.
    ///
    /// The KDC reply must name `expected_client`, the client of the evidence
    /// ticket, otherwise it is rejected here.
    pub fn acquire_s4u2proxy(
        &self,
        backend_spn: &str,
        evidence_ticket: Ticket,
        expected_client: &PrincipalName,
        middle_tgt: &Credential,
    ) -> Result<Credential, AcquireError> {
        let backend = PrincipalName::parse_spn(backend_spn, middle_tgt.client().realm())?;

        debug!(backend = %backend, on_behalf_of = %expected_client, "acquiring delegated ticket to backend service");

        let additional_tickets = [evidence_ticket];
        let creds = self.acquire(
            KdcOptions::CNAME_IN_ADDL_TKT | KdcOptions::FORWARDABLE,
            middle_tgt,
            middle_tgt.client(),
            &backend,
            &additional_tickets,
            &[],
        )?;

        if creds.client() != expected_client {
            return Err(AcquireError::KdcRefused {
                detail: "reply does not name the delegated client",
            });
        }

        Ok(creds)
    }
}
