use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;

use chrono::NaiveDate;
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::workflows::fleet::Document;

/// Per-entity "has expired documents" flags for one refresh of a list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExpiryMap<K: Eq + Hash> {
    entries: HashMap<K, bool>,
}

impl<K: Eq + Hash> Default for ExpiryMap<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> ExpiryMap<K> {
    /// Unknown ids read as "no expired documents".
    pub fn has_expired(&self, id: &K) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    pub fn expired_count(&self) -> usize {
        self.entries.values().filter(|expired| **expired).count()
    }

    pub fn get(&self, id: &K) -> Option<bool> {
        self.entries.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, bool)> {
        self.entries.iter().map(|(id, expired)| (id, *expired))
    }
}

impl<K: Eq + Hash> FromIterator<(K, bool)> for ExpiryMap<K> {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Which listing a banner describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Ship,
    CrewMember,
}

impl EntityKind {
    pub const fn plural_label(self) -> &'static str {
        match self {
            EntityKind::Ship => "barco(s)",
            EntityKind::CrewMember => "tripulante(s)",
        }
    }
}

/// Count plus banner text shown above a list view; empty banner means nothing to warn about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpirySummary {
    pub expired: usize,
    pub banner: String,
}

impl ExpirySummary {
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn from_map<K: Eq + Hash>(kind: EntityKind, map: &ExpiryMap<K>) -> Self {
        let expired = map.expired_count();
        let banner = if expired == 0 {
            String::new()
        } else {
            format!(
                "{expired} {} con documentos caducados.",
                kind.plural_label()
            )
        };
        Self { expired, banner }
    }
}

/// Check every entity's documents concurrently and collect the expiry flags.
///
/// All fetches are polled together and the join waits for every one of them. A failed fetch
/// counts as "no expired documents" for that entity and never aborts the others. An empty
/// id list returns immediately without calling `fetch`.
pub async fn aggregate_expiry<K, I, F, Fut, E>(
    ids: I,
    today: NaiveDate,
    fetch: F,
) -> ExpiryMap<K>
where
    K: Eq + Hash + Clone + Display,
    I: IntoIterator<Item = K>,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<Vec<Document>, E>>,
    E: Display,
{
    let branches: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let pending = fetch(id.clone());
            async move {
                match pending.await {
                    Ok(documents) => {
                        let expired = documents.iter().any(|doc| doc.is_expired(today));
                        (id, expired)
                    }
                    Err(err) => {
                        warn!(
                            entity = %id,
                            error = %err,
                            "document check failed; treating as not expired"
                        );
                        (id, false)
                    }
                }
            }
        })
        .collect();

    if branches.is_empty() {
        return ExpiryMap::default();
    }

    let checked = branches.len();
    let map: ExpiryMap<K> = join_all(branches).await.into_iter().collect();
    debug!(checked, expired = map.expired_count(), "expiry aggregation settled");
    map
}
