//! Boundaries of topologically associating domains (TADs).

use serde::{Deserialize, Serialize};

use crate::{
    common::{
        coords::{GenomicRegion, Strand},
        index::{ContigIndex, Located},
    },
    err::Error,
};

/// A boundary between two adjacent TADs.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TadBoundary {
    region: GenomicRegion,
    id: String,
    /// Fraction of cell types in which the boundary is observed.
    stability: f64,
}

impl TadBoundary {
    /// Construct boundary, rejecting empty regions and stability outside of
    /// `[0, 1]`.
    pub fn new(region: GenomicRegion, id: &str, stability: f64) -> Result<Self, Error> {
        super::check_record_region(&region)?;
        if !(0.0..=1.0).contains(&stability) {
            return Err(Error::InvalidStability {
                id: id.to_owned(),
                stability,
            });
        }

        Ok(Self {
            region,
            id: id.to_owned(),
            stability,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stability(&self) -> f64 {
        self.stability
    }

    /// Positive strand position of the central base.
    pub fn midpoint(&self) -> u32 {
        let start = self.region.start_on_strand(Strand::Positive);
        let end = self.region.end_on_strand(Strand::Positive);
        start + (end - start) / 2
    }
}

impl Located for TadBoundary {
    fn region(&self) -> &GenomicRegion {
        &self.region
    }

    fn key(&self) -> &str {
        &self.id
    }
}

/// Selection of TAD boundaries to put into the layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct TadParameters {
    /// Boundaries less stable than this are dropped.
    pub min_stability: f64,
}

/// Layer of TAD boundaries.
#[derive(Debug, Default)]
pub struct TadLayer {
    index: ContigIndex<TadBoundary>,
}

impl TadLayer {
    pub fn build(records: Vec<TadBoundary>, params: &TadParameters) -> Self {
        let total = records.len();
        let records = records
            .into_iter()
            .filter(|boundary| boundary.stability >= params.min_stability)
            .collect::<Vec<_>>();
        tracing::debug!(
            "dropped {} of {} TAD boundaries below stability {}",
            total - records.len(),
            total,
            params.min_stability
        );

        Self {
            index: ContigIndex::build(records),
        }
    }

    /// Boundaries whose midpoint lies in `region`.
    pub fn query(&self, region: &GenomicRegion) -> Vec<&TadBoundary> {
        self.index
            .query(region)
            .into_iter()
            .filter(|boundary| region.covers(boundary.midpoint()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
