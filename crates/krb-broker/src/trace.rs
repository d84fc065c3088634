use crate::principal::Realm;

/// Traversal milestones, published so hosts can observe how a ticket was
/// obtained. Session keys and ticket bytes never appear in events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A cross-realm TGS probe towards the KDC of `from`, asking for a TGT
    /// into `to`.
    ProbeAttempt { from: Realm, to: Realm },
    /// The probe failed; the traversal keeps looking for another route.
    ProbeFailed { from: Realm, to: Realm },
    /// The KDC answered a service request with a cross-realm TGT instead.
    ReferralObserved { realm: Realm },
    /// A previously observed referral was replayed from the cache.
    ReferralCacheHit { realm: Realm },
    /// An intermediate TGT without ok-as-delegate poisoned the chain.
    DelegateFlagCleared { at: Realm },
    /// The canonicalized exchange was rejected; retrying the legacy way.
    ReferralFallback,
    /// The referral limit was reached before the chain resolved.
    ReferralsExhausted { limit: u32 },
}

pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent);
}

/// Forwards traversal events to the `tracing` pipeline at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, event: TraceEvent) {
        debug!(?event, "ticket acquisition event");
    }
}
