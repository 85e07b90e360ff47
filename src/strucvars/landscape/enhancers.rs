//! Enhancers with tissue specificity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    common::{
        coords::GenomicRegion,
        index::{ContigIndex, Located, RecordHandle},
    },
    err::Error,
};

/// Origin of the enhancer annotation.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EnhancerSource {
    #[default]
    Unknown,
    Vista,
    Fantom5,
}

/// Specificity of an enhancer for the tissue described by an HPO term.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TissueSpecificity {
    /// HPO term of the tissue, e.g., `"HP:0001627"`.
    pub term_id: String,
    /// Tissue specificity in `[0, 1]`.
    pub tau: f64,
}

/// An enhancer region.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Enhancer {
    region: GenomicRegion,
    id: String,
    source: EnhancerSource,
    is_developmental: bool,
    specificities: Vec<TissueSpecificity>,
}

impl Enhancer {
    /// Construct enhancer, rejecting empty regions and tau values outside of
    /// `[0, 1]`.
    pub fn new(
        region: GenomicRegion,
        id: &str,
        source: EnhancerSource,
        is_developmental: bool,
        specificities: Vec<TissueSpecificity>,
    ) -> Result<Self, Error> {
        super::check_record_region(&region)?;
        if let Some(bad) = specificities
            .iter()
            .find(|s| !(0.0..=1.0).contains(&s.tau))
        {
            return Err(Error::InvalidTau {
                id: id.to_owned(),
                tau: bad.tau,
            });
        }

        Ok(Self {
            region,
            id: id.to_owned(),
            source,
            is_developmental,
            specificities,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> EnhancerSource {
        self.source
    }

    pub fn is_developmental(&self) -> bool {
        self.is_developmental
    }

    pub fn specificities(&self) -> &[TissueSpecificity] {
        &self.specificities
    }
}

impl Located for Enhancer {
    fn region(&self) -> &GenomicRegion {
        &self.region
    }

    fn key(&self) -> &str {
        &self.id
    }
}

/// Maximal tissue specificity of the enhancer, `0.0` if there is none.
pub fn max_tau(enhancer: &Enhancer) -> f64 {
    enhancer
        .specificities
        .iter()
        .map(|s| s.tau)
        .fold(0.0, f64::max)
}

/// Tau of the enhancer for the given term, if any.
pub fn tau_for_term(enhancer: &Enhancer, term_id: &str) -> Option<f64> {
    enhancer
        .specificities
        .iter()
        .filter(|s| s.term_id == term_id)
        .map(|s| s.tau)
        .reduce(f64::max)
}

/// The HPO terms the enhancer is associated with through its tissues.
pub fn hpo_term_associations(enhancer: &Enhancer) -> impl Iterator<Item = &str> {
    enhancer.specificities.iter().map(|s| s.term_id.as_str())
}

/// Selection of enhancers to put into the layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnhancerParameters {
    /// Include VISTA enhancers.
    pub use_vista: bool,
    /// Include FANTOM5 enhancers.
    pub use_fantom5: bool,
    /// Minimal maximal tau for a FANTOM5 enhancer to be included.
    pub fantom5_min_tau: f64,
}

impl Default for EnhancerParameters {
    fn default() -> Self {
        Self {
            use_vista: true,
            use_fantom5: true,
            fantom5_min_tau: 0.0,
        }
    }
}

impl EnhancerParameters {
    fn keep(&self, enhancer: &Enhancer) -> bool {
        match enhancer.source {
            EnhancerSource::Vista => self.use_vista,
            EnhancerSource::Fantom5 => self.use_fantom5 && max_tau(enhancer) >= self.fantom5_min_tau,
            EnhancerSource::Unknown => true,
        }
    }
}

/// Layer of enhancers.
#[derive(Debug, Default)]
pub struct EnhancerLayer {
    /// Spatial index.
    index: ContigIndex<Enhancer>,
    /// Enhancers by HPO term, sorted by descending tau and id.
    by_term: HashMap<String, Vec<RecordHandle>>,
}

impl EnhancerLayer {
    /// Build layer from `records`, selecting according to `params`.
    pub fn build(records: Vec<Enhancer>, params: &EnhancerParameters) -> Self {
        let total = records.len();
        let records = records
            .into_iter()
            .filter(|e| params.keep(e))
            .collect::<Vec<_>>();
        debug!("keeping {} of {} enhancers", records.len(), total);

        let index = ContigIndex::build(records);

        let mut by_term: HashMap<String, Vec<(f64, &str, RecordHandle)>> = HashMap::new();
        for (handle, enhancer) in index.iter_handles() {
            for term_id in hpo_term_associations(enhancer) {
                let entries = by_term.entry(term_id.to_owned()).or_default();
                // enhancers are visited one at a time, so a repeated term finds its own handle last
                if entries.last().map_or(true, |(_, _, last)| *last != handle) {
                    let tau = tau_for_term(enhancer, term_id).unwrap_or_default();
                    entries.push((tau, &enhancer.id, handle));
                }
            }
        }
        let by_term = by_term
            .into_iter()
            .map(|(term_id, mut entries)| {
                entries.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
                let handles: Vec<_> = entries.into_iter().map(|(_, _, handle)| handle).collect();
                (term_id, handles)
            })
            .collect::<HashMap<_, _>>();

        Self { index, by_term }
    }

    /// Enhancers overlapping `region`.
    pub fn query(&self, region: &GenomicRegion) -> Vec<&Enhancer> {
        self.index.query(region)
    }

    /// Enhancers specific for `term_id`, sorted by descending tau.
    pub fn by_hpo_term(&self, term_id: &str) -> Vec<&Enhancer> {
        self.by_term
            .get(term_id)
            .map(|handles| {
                handles
                    .iter()
                    .filter_map(|handle| self.index.get(*handle))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
