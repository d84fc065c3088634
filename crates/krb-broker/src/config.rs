use std::collections::HashMap;

use serde::Deserialize;

use crate::principal::Realm;

/// Tunables for the acquisition pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Whether to chase RFC 6806 referrals before trying the configured
    /// realm hierarchy.
    #[serde(default = "default_referrals_enabled")]
    pub referrals_enabled: bool,
    /// Upper bound on followed referrals within one acquisition.
    #[serde(default = "default_max_referrals")]
    pub max_referrals: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            referrals_enabled: default_referrals_enabled(),
            max_referrals: default_max_referrals(),
        }
    }
}

fn default_referrals_enabled() -> bool {
    true
}

fn default_max_referrals() -> u32 {
    5
}

/// Provider of the configured realm hierarchy.
pub trait RealmRoutes: Send + Sync {
    /// Ordered realm path from `from` to `to`, both endpoints included.
    /// Callers tolerate empty and singleton lists (no usable path).
    fn realms_list(&self, from: &Realm, to: &Realm) -> Vec<Realm>;
}

/// `[capaths]`-style static route table: per source realm, the intermediate
/// realms to cross towards each destination realm. A pair with no entry is
/// assumed to share a direct cross-realm trust.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticRoutes {
    capaths: HashMap<Realm, HashMap<Realm, Vec<Realm>>>,
}

impl StaticRoutes {
    pub fn insert(&mut self, from: Realm, to: Realm, intermediates: Vec<Realm>) {
        self.capaths.entry(from).or_default().insert(to, intermediates);
    }
}

impl RealmRoutes for StaticRoutes {
    fn realms_list(&self, from: &Realm, to: &Realm) -> Vec<Realm> {
        if from == to {
            return vec![from.clone()];
        }

        let mut path = vec![from.clone()];
        if let Some(intermediates) = self.capaths.get(from).and_then(|routes| routes.get(to)) {
            path.extend(intermediates.iter().cloned());
        }
        path.push(to.clone());
        path
    }
}
