//! Structural variant data structures.

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{
    common::coords::{ContigRegistry, GenomicRegion, Strand},
    err::Error,
};

/// Encode the type of an SV
#[derive(
    Serialize,
    Deserialize,
    EnumIter,
    PartialEq,
    Eq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Clone,
    Copy,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SvType {
    /// Deletion
    #[default]
    Del,
    /// Duplication
    Dup,
    /// Insertion
    Ins,
    /// Inversion
    Inv,
    /// Copy number variable region
    Cnv,
    /// Translocation
    Tra,
    /// Break-end
    Bnd,
}

impl SvType {
    /// Whether the variant is described by two break-ends rather than a span.
    pub fn is_breakend(&self) -> bool {
        matches!(self, SvType::Tra | SvType::Bnd)
    }
}

/// Information about the variant call, passed through to the output.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CallInfo {
    /// Total read depth at the variant.
    pub read_depth: Option<u32>,
    /// Reads supporting the reference allele.
    pub ref_count: Option<u32>,
    /// Reads supporting the alternate allele.
    pub alt_count: Option<u32>,
}

/// Module with code supporting the parsing.
pub mod input {
    use serde::{Deserialize, Serialize};

    use super::SvType;

    /// A variant as read from the input TSV file.
    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct VariantRecord {
        /// Variant identifier
        pub id: String,
        /// Chromosome name
        pub chromosome: String,
        /// 0-based begin position
        pub begin: i64,
        /// 0-based end position; ignored for break-ends
        pub end: i64,
        /// Type of the variant
        pub sv_type: SvType,
        /// Chromosome of the mate break-end
        #[serde(default)]
        pub chromosome2: Option<String>,
        /// 0-based position of the mate break-end
        #[serde(default)]
        pub pos2: Option<i64>,
        #[serde(default)]
        pub ref_allele: String,
        #[serde(default)]
        pub alt_allele: String,
        #[serde(default)]
        pub read_depth: Option<u32>,
        #[serde(default)]
        pub ref_count: Option<u32>,
        #[serde(default)]
        pub alt_count: Option<u32>,
    }

    /// An input row that could not be parsed into a `VariantRecord`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RejectedRow {
        /// Raw `id` column, empty if missing.
        pub id: String,
        /// Raw `chromosome` column, empty if missing.
        pub chromosome: String,
        pub error: crate::err::Error,
    }

    /// One row of the input file, in input order.
    pub type VariantRow = Result<VariantRecord, RejectedRow>;
}

/// A resolved structural variant.
///
/// Span variants cover `region`; break-end variants have zero-length
/// `region` and `mate` positions.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StructuralVariant {
    id: String,
    sv_type: SvType,
    ref_allele: String,
    alt_allele: String,
    region: GenomicRegion,
    mate: Option<GenomicRegion>,
    call_info: CallInfo,
}

impl StructuralVariant {
    /// Construct variant, checking the consistency of regions and type.
    pub fn new(
        id: &str,
        sv_type: SvType,
        region: GenomicRegion,
        mate: Option<GenomicRegion>,
        alleles: (String, String),
        call_info: CallInfo,
    ) -> Result<Self, Error> {
        let invalid = |reason| Error::InvalidVariant {
            id: id.to_owned(),
            sv_type: sv_type.to_string(),
            reason,
        };
        match (sv_type.is_breakend(), &mate) {
            (true, None) => return Err(invalid("break-end variant requires a mate break-end")),
            (false, Some(_)) => return Err(invalid("span variant must not have a mate")),
            (true, Some(mate)) if !region.is_empty() || !mate.is_empty() => {
                return Err(invalid("break-ends must be zero-length positions"))
            }
            _ => (),
        }

        let (ref_allele, alt_allele) = alleles;
        Ok(Self {
            id: id.to_owned(),
            sv_type,
            ref_allele,
            alt_allele,
            region,
            mate,
            call_info,
        })
    }

    /// Resolve `record` against `registry`.
    pub fn from_record(
        record: &input::VariantRecord,
        registry: &ContigRegistry,
    ) -> Result<Self, Error> {
        let contig = registry.resolve(&record.chromosome)?;
        let (region, mate) = if record.sv_type.is_breakend() {
            let (Some(chromosome2), Some(pos2)) = (&record.chromosome2, record.pos2) else {
                return Err(Error::InvalidVariant {
                    id: record.id.clone(),
                    sv_type: record.sv_type.to_string(),
                    reason: "break-end variant requires a mate break-end",
                });
            };
            (
                GenomicRegion::position(contig, record.begin)?,
                Some(GenomicRegion::position(
                    registry.resolve(chromosome2)?,
                    pos2,
                )?),
            )
        } else {
            (
                GenomicRegion::new(contig, Strand::Positive, record.begin, record.end)?,
                None,
            )
        };

        Self::new(
            &record.id,
            record.sv_type,
            region,
            mate,
            (record.ref_allele.clone(), record.alt_allele.clone()),
            CallInfo {
                read_depth: record.read_depth,
                ref_count: record.ref_count,
                alt_count: record.alt_count,
            },
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sv_type(&self) -> SvType {
        self.sv_type
    }

    pub fn ref_allele(&self) -> &str {
        &self.ref_allele
    }

    pub fn alt_allele(&self) -> &str {
        &self.alt_allele
    }

    /// Primary region; the first break-end for break-end variants.
    pub fn region(&self) -> &GenomicRegion {
        &self.region
    }

    pub fn mate(&self) -> Option<&GenomicRegion> {
        self.mate.as_ref()
    }

    pub fn call_info(&self) -> &CallInfo {
        &self.call_info
    }
}
