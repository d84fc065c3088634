use std::collections::HashMap;

use parking_lot::RwLock;
use time::OffsetDateTime;

use crate::credential::Credential;
use crate::principal::{PrincipalName, Realm};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReferralKey {
    client: PrincipalName,
    service: PrincipalName,
    current_realm: Realm,
}

/// Where a KDC previously told us to go from `current_realm`, and the
/// cross-realm TGT it handed out for the hop.
#[derive(Debug, Clone)]
pub struct ReferralCacheEntry {
    pub to_realm: Realm,
    pub credential: Credential,
}

/// Remembered referrals, keyed by `(client, original service, current realm)`.
///
/// Lookups run concurrently; writes are serialized and the first writer wins.
/// Replies for the same key agree, so dropping later writes loses nothing.
/// Entries whose TGT has expired are pruned on lookup.
#[derive(Debug, Default)]
pub struct ReferralCache {
    entries: RwLock<HashMap<ReferralKey, ReferralCacheEntry>>,
}

impl ReferralCache {
    pub fn get(
        &self,
        client: &PrincipalName,
        service: &PrincipalName,
        current_realm: &Realm,
    ) -> Option<ReferralCacheEntry> {
        let key = ReferralKey {
            client: client.clone(),
            service: service.clone(),
            current_realm: current_realm.clone(),
        };
        let now = OffsetDateTime::now_utc();

        {
            let entries = self.entries.read();
            match entries.get(&key) {
                Some(entry) if !entry.credential.has_expired(now) => return Some(entry.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // The stored hop TGT went stale; drop it so the realm is re-resolved.
        let mut entries = self.entries.write();
        if entries
            .get(&key)
            .is_some_and(|entry| entry.credential.has_expired(now))
        {
            entries.remove(&key);
        }
        None
    }

    pub fn put(
        &self,
        client: &PrincipalName,
        service: &PrincipalName,
        current_realm: &Realm,
        to_realm: &Realm,
        credential: Credential,
    ) {
        if credential.has_expired(OffsetDateTime::now_utc()) {
            return;
        }

        let key = ReferralKey {
            client: client.clone(),
            service: service.clone(),
            current_realm: current_realm.clone(),
        };

        self.entries.write().entry(key).or_insert(ReferralCacheEntry {
            to_realm: to_realm.clone(),
            credential,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::credential::{SessionKey, Ticket, TicketFlags};
    use crate::principal::NameType;

    fn client() -> PrincipalName {
        PrincipalName::new(NameType::Principal, vec!["alice".to_owned()], Realm::new("A"))
    }

    fn service() -> PrincipalName {
        PrincipalName::parse_spn("http/host@A", &Realm::new("A")).unwrap()
    }

    fn hop_tgt(to: &str, lifetime: Duration) -> Credential {
        let now = OffsetDateTime::now_utc();

        Credential::builder()
            .client(client())
            .server(PrincipalName::tgs_service(&Realm::new(to), &Realm::new("A")))
            .session_key(SessionKey::new(18, vec![0x01; 32]))
            .flags(TicketFlags::FORWARDABLE)
            .start_time(now - Duration::minutes(1))
            .end_time(now + lifetime)
            .ticket(Ticket::new(vec![0x61; 8]))
            .build()
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = ReferralCache::default();

        assert!(cache.get(&client(), &service(), &Realm::new("A")).is_none());

        cache.put(
            &client(),
            &service(),
            &Realm::new("A"),
            &Realm::new("B"),
            hop_tgt("B", Duration::hours(8)),
        );

        let entry = cache.get(&client(), &service(), &Realm::new("A")).unwrap();
        assert_eq!(entry.to_realm, Realm::new("B"));
        assert_eq!(
            entry.credential.tgs_target_realm(),
            Some(Realm::new("B"))
        );

        // A different current realm is a different key.
        assert!(cache.get(&client(), &service(), &Realm::new("B")).is_none());
    }

    #[test]
    fn first_writer_wins() {
        let cache = ReferralCache::default();

        cache.put(
            &client(),
            &service(),
            &Realm::new("A"),
            &Realm::new("B"),
            hop_tgt("B", Duration::hours(8)),
        );
        cache.put(
            &client(),
            &service(),
            &Realm::new("A"),
            &Realm::new("C"),
            hop_tgt("C", Duration::hours(8)),
        );

        let entry = cache.get(&client(), &service(), &Realm::new("A")).unwrap();
        assert_eq!(entry.to_realm, Realm::new("B"));
    }

    #[test]
    fn already_expired_hop_tgts_are_not_stored() {
        let cache = ReferralCache::default();

        cache.put(
            &client(),
            &service(),
            &Realm::new("A"),
            &Realm::new("B"),
            hop_tgt("B", Duration::seconds(-1)),
        );
        assert!(cache.get(&client(), &service(), &Realm::new("A")).is_none());

        // The slot stays free for a live entry.
        cache.put(
            &client(),
            &service(),
            &Realm::new("A"),
            &Realm::new("C"),
            hop_tgt("C", Duration::hours(8)),
        );
        let entry = cache.get(&client(), &service(), &Realm::new("A")).unwrap();
        assert_eq!(entry.to_realm, Realm::new("C"));
    }

    #[test]
    fn entries_expiring_after_insertion_are_pruned_on_lookup() {
        let cache = ReferralCache::default();

        cache.put(
            &client(),
            &service(),
            &Realm::new("A"),
            &Realm::new("B"),
            hop_tgt("B", Duration::milliseconds(20)),
        );

        std::thread::sleep(std::time::Duration::from_millis(50));

        assert!(cache.get(&client(), &service(), &Realm::new("A")).is_none());

        // The stale entry is gone for good, not merely hidden.
        cache.put(
            &client(),
            &service(),
            &Realm::new("A"),
            &Realm::new("C"),
            hop_tgt("C", Duration::hours(8)),
        );
        let entry = cache.get(&client(), &service(), &Realm::new("A")).unwrap();
        assert_eq!(entry.to_realm, Realm::new("C"));
    }
}
