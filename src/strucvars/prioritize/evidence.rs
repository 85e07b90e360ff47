//! Collect overlaps of a variant with all annotation layers.

use serde::{Deserialize, Serialize};

use crate::{
    common::{
        coords::{GenomicRegion, Strand},
        index::Located,
    },
    strucvars::{
        landscape::{
            dosage::DosageRegion, enhancers::Enhancer, genes::Gene, repeats::RepetitiveRegion,
            tads::TadBoundary, Landscape,
        },
        schema::StructuralVariant,
    },
};

/// Which part of the variant an overlap was found for.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryOrigin {
    /// The full span of a span variant.
    Span,
    /// The window around the first break-end.
    LeftBreakend,
    /// The window around the mate break-end.
    RightBreakend,
}

/// One query against the landscape.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub origin: QueryOrigin,
    /// Region to query the layers with.
    pub window: GenomicRegion,
    /// Zero-length breakpoint positions used for distances.
    pub breakpoints: Vec<GenomicRegion>,
}

/// Build the queries for `variant`.
///
/// Break-end variants yield one window of `flank` bases around each break-end,
/// left before right.  Span variants yield their positive strand span, with
/// zero-length spans widened by one base to the left, or to the right at the
/// contig start.
pub fn queries(variant: &StructuralVariant, flank: u32) -> Vec<Query> {
    if variant.sv_type().is_breakend() {
        let breakends = std::iter::once(*variant.region()).chain(variant.mate().copied());
        [QueryOrigin::LeftBreakend, QueryOrigin::RightBreakend]
            .into_iter()
            .zip(breakends)
            .map(|(origin, breakend)| Query {
                origin,
                window: breakend.expanded(flank),
                breakpoints: vec![breakend],
            })
            .collect()
    } else {
        let span = variant.region().with_strand(Strand::Positive);
        let (start, end) = span.boundaries();
        let window = if span.is_empty() && span.start() == 0 {
            span.extended_right(1)
        } else if span.is_empty() {
            span.extended_left(1)
        } else {
            span
        };
        vec![Query {
            origin: QueryOrigin::Span,
            window,
            breakpoints: vec![start, end],
        }]
    }
}

/// Overlap of one query with one annotation record.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap<'a, T> {
    pub record: &'a T,
    pub origin: QueryOrigin,
    /// Fraction of the record covered by the query window, in `[0, 1]`.
    pub overlap_fraction: f64,
    /// Distance from the closest breakpoint to the record; `0` if window and
    /// record contain each other.
    pub breakpoint_distance: u32,
    /// Whether the record covers a breakpoint base: the first or last base of
    /// a span window, or the base at a break-end.
    pub spans_breakpoint: bool,
}

impl<'a, T: Located> Overlap<'a, T> {
    fn new(query: &Query, record: &'a T) -> Self {
        let region = record.region();
        let window = &query.window;

        let overlap_fraction = if region.is_empty() {
            0.0
        } else {
            (window.intersection_len(region) as f64 / region.len() as f64).clamp(0.0, 1.0)
        };

        let raw_distance = query
            .breakpoints
            .iter()
            .filter_map(|bp| bp.distance_to(region))
            .min()
            .unwrap_or(0);
        let breakpoint_distance = if window.contains(region) || region.contains(window) {
            0
        } else {
            raw_distance
        };

        let spans_breakpoint = match query.origin {
            QueryOrigin::Span => {
                let start = window.start_on_strand(Strand::Positive);
                let end = window.end_on_strand(Strand::Positive);
                region.covers(start) || region.covers(end.saturating_sub(1))
            }
            QueryOrigin::LeftBreakend | QueryOrigin::RightBreakend => query
                .breakpoints
                .iter()
                .any(|bp| bp.contig_id() == region.contig_id() && region.covers(bp.start())),
        };

        Self {
            record,
            origin: query.origin,
            overlap_fraction,
            breakpoint_distance,
            spans_breakpoint,
        }
    }
}

/// All overlaps of a variant, by layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceBundle<'a> {
    pub enhancers: Vec<Overlap<'a, Enhancer>>,
    pub dosage: Vec<Overlap<'a, DosageRegion>>,
    pub repeats: Vec<Overlap<'a, RepetitiveRegion>>,
    pub genes: Vec<Overlap<'a, Gene>>,
    pub tad_boundaries: Vec<Overlap<'a, TadBoundary>>,
}

impl<'a> EvidenceBundle<'a> {
    pub fn is_empty(&self) -> bool {
        self.enhancers.is_empty()
            && self.dosage.is_empty()
            && self.repeats.is_empty()
            && self.genes.is_empty()
            && self.tad_boundaries.is_empty()
    }
}

/// Query all layers of `landscape` for `variant`.
pub fn resolve_evidence<'a>(
    variant: &StructuralVariant,
    landscape: &'a Landscape,
    flank: u32,
) -> EvidenceBundle<'a> {
    let mut result = EvidenceBundle::default();
    for query in queries(variant, flank) {
        let window = &query.window;
        result.enhancers.extend(
            landscape
                .enhancers()
                .query(window)
                .into_iter()
                .map(|record| Overlap::new(&query, record)),
        );
        result.dosage.extend(
            landscape
                .dosage()
                .dosage_elements(window)
                .into_iter()
                .map(|record| Overlap::new(&query, record)),
        );
        result.repeats.extend(
            landscape
                .repeats()
                .query(window)
                .into_iter()
                .map(|record| Overlap::new(&query, record)),
        );
        result.genes.extend(
            landscape
                .genes()
                .query(window)
                .into_iter()
                .map(|record| Overlap::new(&query, record)),
        );
        result.tad_boundaries.extend(
            landscape
                .tads()
                .query(window)
                .into_iter()
                .map(|record| Overlap::new(&query, record)),
        );
    }
    tracing::trace!(
        "variant {}: {} enhancer, {} dosage, {} repeat, {} gene, {} TAD boundary overlaps",
        variant.id(),
        result.enhancers.len(),
        result.dosage.len(),
        result.repeats.len(),
        result.genes.len(),
        result.tad_boundaries.len()
    );

    result
}
