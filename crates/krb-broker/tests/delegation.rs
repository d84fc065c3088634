#![allow(clippy::unwrap_used)]

use krb_broker::{AcquireError, KdcOptions, StaticRoutes, Ticket, TicketBroker, TicketFlags};
use test_utils::{
    principal, service_ticket, service_ticket_with_flags, tgt, tgt_with_flags, RecordingSink,
    ScriptedKdc, ScriptedReply,
};

fn broker(kdc: &ScriptedKdc) -> TicketBroker {
    TicketBroker::builder()
        .exchange(Box::new(kdc.clone()))
        .realm_routes(Box::new(StaticRoutes::default()))
        .trace(Box::new(RecordingSink::new()))
        .build()
}

fn evidence_ticket() -> Ticket {
    Ticket::new(vec![0x6E; 64])
}

#[test]
fn ticket_to_self_on_behalf_of_a_user() {
    let kdc = ScriptedKdc::new();
    // The KDC answers with a ticket to the middle service naming the
    // impersonated user as client.
    kdc.enqueue(ScriptedReply::Grant(service_ticket("joe@A", "svc1@A")));

    let middle_tgt = tgt("svc1@A", "A", "A");
    let creds = broker(&kdc)
        .acquire_s4u2self(principal("joe@A"), &middle_tgt)
        .unwrap();

    assert_eq!(creds.client(), &principal("joe@A"));
    assert!(creds.is_forwardable());

    let requests = kdc.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].options.contains(KdcOptions::FORWARDABLE));
    // The service asks for a ticket to itself...
    assert_eq!(requests[0].server_name, principal("svc1@A"));
    assert_eq!(requests[0].client_name, principal("svc1@A"));
    // ...naming the user in the PA-FOR-USER payload.
    assert_eq!(requests[0].impersonated, Some(principal("joe@A")));
    assert_eq!(requests[0].additional_tickets, 0);
}

#[test]
fn impersonation_across_realms_is_refused_offline() {
    let kdc = ScriptedKdc::new();

    let middle_tgt = tgt("svc1@A", "A", "A");
    let error = broker(&kdc)
        .acquire_s4u2self(principal("joe@B"), &middle_tgt)
        .unwrap_err();

    assert!(matches!(error, AcquireError::UnsupportedCrossRealm { .. }));
    assert!(kdc.requests().is_empty());
}

#[test]
fn impersonation_needs_a_forwardable_tgt() {
    let kdc = ScriptedKdc::new();

    let middle_tgt = tgt_with_flags("svc1@A", "A", "A", TicketFlags::INITIAL);
    let error = broker(&kdc)
        .acquire_s4u2self(principal("joe@A"), &middle_tgt)
        .unwrap_err();

    assert!(matches!(error, AcquireError::PreconditionViolation { .. }));
    assert!(kdc.requests().is_empty());
}

#[test]
fn reply_naming_the_wrong_client_is_rejected() {
    let kdc = ScriptedKdc::new();
    kdc.enqueue(ScriptedReply::Grant(service_ticket("someoneelse@A", "svc1@A")));

    let middle_tgt = tgt("svc1@A", "A", "A");
    let error = broker(&kdc)
        .acquire_s4u2self(principal("joe@A"), &middle_tgt)
        .unwrap_err();

    assert!(matches!(error, AcquireError::KdcRefused { .. }));
}

#[test]
fn non_forwardable_impersonation_reply_is_rejected() {
    let kdc = ScriptedKdc::new();
    kdc.enqueue(ScriptedReply::Grant(service_ticket_with_flags(
        "joe@A",
        "svc1@A",
        TicketFlags::empty(),
    )));

    let middle_tgt = tgt("svc1@A", "A", "A");
    let error = broker(&kdc)
        .acquire_s4u2self(principal("joe@A"), &middle_tgt)
        .unwrap_err();

    assert!(matches!(error, AcquireError::KdcRefused { .. }));
}

#[test]
fn delegation_to_backend_presents_the_evidence_ticket() {
    let kdc = ScriptedKdc::new();
    kdc.enqueue(ScriptedReply::Grant(service_ticket("joe@A", "cifs/backend@A")));

    let middle_tgt = tgt("svc1@A", "A", "A");
    let creds = broker(&kdc)
        .acquire_s4u2proxy("cifs/backend", evidence_ticket(), &principal("joe@A"), &middle_tgt)
        .unwrap();

    assert_eq!(creds.client(), &principal("joe@A"));
    assert_eq!(creds.server(), &principal("cifs/backend@A"));

    let requests = kdc.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].options.contains(KdcOptions::CNAME_IN_ADDL_TKT));
    assert!(requests[0].options.contains(KdcOptions::FORWARDABLE));
    assert_eq!(requests[0].server_name, principal("cifs/backend@A"));
    assert_eq!(requests[0].additional_tickets, 1);
    assert_eq!(requests[0].impersonated, None);
}

#[test]
fn delegated_reply_for_the_wrong_client_is_rejected() {
    let kdc = ScriptedKdc::new();
    kdc.enqueue(ScriptedReply::Grant(service_ticket("mallory@A", "cifs/backend@A")));

    let middle_tgt = tgt("svc1@A", "A", "A");
    let error = broker(&kdc)
        .acquire_s4u2proxy("cifs/backend", evidence_ticket(), &principal("joe@A"), &middle_tgt)
        .unwrap_err();

    assert!(matches!(error, AcquireError::KdcRefused { .. }));
}
