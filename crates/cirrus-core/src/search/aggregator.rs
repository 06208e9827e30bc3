// ── Search aggregator ──
//
// Case-insensitive substring search over servers, domains, volumes, load
// balancers and public images. Servers also match on their plan name.
// The computation is pure: identical query and corpus give identical,
// identically ordered results.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::results::{Relevance, SearchHit, SearchResults};
use crate::model::{Domain, Entity, EntityKind, Image, LoadBalancer, Server, Volume};
use crate::store::DataStore;

/// How hits are ordered inside a group.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RankingPolicy {
    /// Exact, then prefix, then substring, then plan-name matches; label
    /// ascending within each tier.
    #[default]
    Relevance,
    /// Label ascending only.
    Label,
    /// Collection order, untouched.
    Source,
}

/// Everything a search runs over.
#[derive(Debug, Clone, Default)]
pub struct SearchCorpus {
    pub servers: Vec<Arc<Server>>,
    pub volumes: Vec<Arc<Volume>>,
    pub domains: Vec<Arc<Domain>>,
    pub load_balancers: Vec<Arc<LoadBalancer>>,
    /// All images; private ones are skipped at search time.
    pub images: Vec<Arc<Image>>,
    /// Plan id -> plan display name.
    pub plan_labels: HashMap<String, String>,
}

impl SearchCorpus {
    /// Build a corpus from the store's current snapshots.
    pub fn from_store(store: &DataStore) -> Self {
        Self {
            servers: store.servers_snapshot().to_vec(),
            volumes: store.volumes_snapshot().to_vec(),
            domains: store.domains_snapshot().to_vec(),
            load_balancers: store.load_balancers_snapshot().to_vec(),
            images: store.images_snapshot().to_vec(),
            plan_labels: store.plan_labels(),
        }
    }

    fn plan_label(&self, server: &Server) -> Option<&str> {
        let plan = server.server_type.as_deref()?;
        self.plan_labels.get(plan).map(String::as_str)
    }
}

/// Rank a label against an already lower-cased query.
fn label_relevance(label: &str, query: &str) -> Option<Relevance> {
    let label = label.to_lowercase();
    if label == query {
        Some(Relevance::Exact)
    } else if label.starts_with(query) {
        Some(Relevance::Prefix)
    } else if label.contains(query) {
        Some(Relevance::Substring)
    } else {
        None
    }
}

fn hit<T: Entity>(
    entity: &T,
    description: String,
    tags: &[String],
    relevance: Relevance,
) -> SearchHit {
    SearchHit {
        kind: T::KIND,
        id: entity.id().clone(),
        label: entity.label().to_owned(),
        description,
        path: T::KIND.detail_path(entity.id()),
        tags: tags.to_vec(),
        relevance,
    }
}

fn join_nonempty(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

fn rank(hits: &mut [SearchHit], policy: RankingPolicy) {
    match policy {
        RankingPolicy::Relevance => hits.sort_by(|a, b| {
            a.relevance
                .cmp(&b.relevance)
                .then_with(|| a.label.to_lowercase().cmp(&b.label.to_lowercase()))
                .then_with(|| a.label.cmp(&b.label))
        }),
        RankingPolicy::Label => hits.sort_by(|a, b| {
            a.label
                .to_lowercase()
                .cmp(&b.label.to_lowercase())
                .then_with(|| a.label.cmp(&b.label))
        }),
        RankingPolicy::Source => {}
    }
}

/// Run `query` over `corpus`.
///
/// The query is lower-cased here and otherwise used as given; an empty
/// query matches every entity.
pub fn search(query: &str, corpus: &SearchCorpus, policy: RankingPolicy) -> SearchResults {
    let query = query.to_lowercase();
    let mut results = SearchResults::empty();

    let mut servers: Vec<SearchHit> = corpus
        .servers
        .iter()
        .filter_map(|s| {
            let plan = corpus.plan_label(s);
            let relevance = label_relevance(&s.label, &query).or_else(|| {
                plan.filter(|p| p.to_lowercase().contains(&query))
                    .map(|_| Relevance::TypeName)
            })?;
            let description = join_nonempty(&[plan, Some(s.region.as_str())]);
            Some(hit(s, description, &s.tags, relevance))
        })
        .collect();

    let mut volumes: Vec<SearchHit> = corpus
        .volumes
        .iter()
        .filter_map(|v| {
            let relevance = label_relevance(&v.label, &query)?;
            let description = format!("{} GB, {}", v.size_gb, v.region);
            Some(hit(v, description, &v.tags, relevance))
        })
        .collect();

    let mut domains: Vec<SearchHit> = corpus
        .domains
        .iter()
        .filter_map(|d| {
            let relevance = label_relevance(&d.domain, &query)?;
            let description = format!("{} zone", d.zone_kind);
            Some(hit(d, description, &d.tags, relevance))
        })
        .collect();

    let mut load_balancers: Vec<SearchHit> = corpus
        .load_balancers
        .iter()
        .filter_map(|lb| {
            let relevance = label_relevance(&lb.label, &query)?;
            let description =
                join_nonempty(&[lb.hostname.as_deref(), Some(lb.region.as_str())]);
            Some(hit(lb, description, &lb.tags, relevance))
        })
        .collect();

    let mut images: Vec<SearchHit> = corpus
        .images
        .iter()
        .filter(|i| i.is_public)
        .filter_map(|i| {
            let relevance = label_relevance(&i.label, &query)?;
            let description = i
                .description
                .clone()
                .or_else(|| i.vendor.clone())
                .unwrap_or_default();
            Some(hit(i, description, &[], relevance))
        })
        .collect();

    for (kind, hits) in [
        (EntityKind::Server, &mut servers),
        (EntityKind::Domain, &mut domains),
        (EntityKind::Volume, &mut volumes),
        (EntityKind::LoadBalancer, &mut load_balancers),
        (EntityKind::Image, &mut images),
    ] {
        rank(hits, policy);
        results.set(kind, std::mem::take(hits));
    }

    results
}
