//! Genomic coordinate model: contigs, strands, and half-open regions.
//!
//! Contigs live in an arena (`ContigRegistry`) and are referenced by their
//! small integer `ContigId`.  Regions are 0-based, half-open `[start, end)`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    common::{canonicalize, GenomeRelease, CHROMS},
    err::Error,
};

/// Index of a contig in the `ContigRegistry` arena.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct ContigId(pub u32);

/// A reference sequence of the assembly.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    /// Position in the registry.
    pub id: ContigId,
    /// Primary name, e.g., `"1"`.
    pub name: String,
    /// Length in base pairs.
    pub length: u32,
    /// Alternative names, e.g., `"chr1"` or RefSeq accessions.
    pub aliases: Vec<String>,
}

/// Strand of a genomic region.
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
pub enum Strand {
    #[default]
    #[strum(serialize = "+")]
    #[serde(rename = "+")]
    Positive,
    #[strum(serialize = "-")]
    #[serde(rename = "-")]
    Negative,
}

/// Primary assembly sequence lengths of GRCh37, in `CHROMS` order.
const GRCH37_LENGTHS: &[u32] = &[
    249_250_621,
    243_199_373,
    198_022_430,
    191_154_276,
    180_915_260,
    171_115_067,
    159_138_663,
    146_364_022,
    141_213_431,
    135_534_747,
    135_006_516,
    133_851_895,
    115_169_878,
    107_349_540,
    102_531_392,
    90_354_753,
    81_195_210,
    78_077_248,
    59_128_983,
    63_025_520,
    48_129_895,
    51_304_566,
    155_270_560,
    59_373_566,
    16_569,
];

/// Primary assembly sequence lengths of GRCh38, in `CHROMS` order.
const GRCH38_LENGTHS: &[u32] = &[
    248_956_422,
    242_193_529,
    198_295_559,
    190_214_555,
    181_538_259,
    170_805_979,
    159_345_973,
    145_138_636,
    138_394_717,
    133_797_422,
    135_086_622,
    133_275_309,
    114_364_328,
    107_043_718,
    101_991_189,
    90_338_345,
    83_257_441,
    80_373_285,
    58_617_616,
    64_444_167,
    46_709_983,
    50_818_468,
    156_040_895,
    57_227_415,
    16_569,
];

/// Arena of contigs, resolved once at startup.
#[derive(Debug, Clone, Default)]
pub struct ContigRegistry {
    /// Contigs, indexed by `ContigId`.
    contigs: Vec<Contig>,
    /// Mapping from canonicalized name or alias to contig id.
    by_name: IndexMap<String, ContigId>,
}

impl ContigRegistry {
    /// Build registry from `(name, length, aliases)` triples.
    pub fn new<I, S>(contigs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32, Vec<String>)>,
        S: Into<String>,
    {
        let mut result = Self::default();
        for (name, length, aliases) in contigs {
            let id = ContigId(result.contigs.len() as u32);
            let name: String = name.into();
            result.by_name.insert(canonicalize(&name), id);
            for alias in &aliases {
                result.by_name.insert(canonicalize(alias), id);
            }
            result.contigs.push(Contig {
                id,
                name,
                length,
                aliases,
            });
        }
        result
    }

    /// Registry with the primary chromosomes of the given release.
    pub fn for_release(genome_release: GenomeRelease) -> Self {
        let lengths = match genome_release {
            GenomeRelease::Grch37 => GRCH37_LENGTHS,
            GenomeRelease::Grch38 => GRCH38_LENGTHS,
        };
        Self::new(CHROMS.iter().zip(lengths.iter()).map(|(name, length)| {
            let mut aliases = vec![format!("chr{}", name)];
            if *name == "MT" {
                aliases.push(String::from("chrM"));
            }
            (*name, *length, aliases)
        }))
    }

    /// Lookup contig by name or alias; `chr` prefixes are ignored.
    pub fn contig_by_name(&self, name: &str) -> Option<&Contig> {
        self.by_name
            .get(&canonicalize(name))
            .map(|id| &self.contigs[id.0 as usize])
    }

    /// Lookup contig by its id.
    pub fn contig_by_id(&self, id: ContigId) -> Option<&Contig> {
        self.contigs.get(id.0 as usize)
    }

    /// Like `contig_by_name` but fails with `Error::UnknownContig`.
    pub fn resolve(&self, name: &str) -> Result<&Contig, Error> {
        self.contig_by_name(name)
            .ok_or_else(|| Error::UnknownContig(name.to_owned()))
    }

    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }
}

/// A half-open interval `[start, end)` on a strand of a contig.
///
/// The coordinates are stored relative to `strand`.  All comparisons between
/// regions are done after projecting both to the positive strand.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "RegionFields")]
pub struct GenomicRegion {
    contig: ContigId,
    contig_length: u32,
    start: u32,
    end: u32,
    strand: Strand,
}

/// Unchecked fields of a serialized `GenomicRegion`.
#[derive(Deserialize)]
struct RegionFields {
    contig: ContigId,
    contig_length: u32,
    start: u32,
    end: u32,
    strand: Strand,
}

impl TryFrom<RegionFields> for GenomicRegion {
    type Error = Error;

    fn try_from(fields: RegionFields) -> Result<Self, Self::Error> {
        let invalid = |reason| Error::InvalidCoordinate {
            contig: format!("#{}", fields.contig.0),
            length: fields.contig_length,
            start: fields.start as i64,
            end: fields.end as i64,
            reason,
        };
        if fields.start > fields.end {
            return Err(invalid("start must not be greater than end"));
        }
        if fields.end > fields.contig_length {
            return Err(invalid("end exceeds contig length"));
        }

        Ok(Self {
            contig: fields.contig,
            contig_length: fields.contig_length,
            start: fields.start,
            end: fields.end,
            strand: fields.strand,
        })
    }
}

impl GenomicRegion {
    /// Construct a new region, validating coordinates against `contig`.
    pub fn new(contig: &Contig, strand: Strand, start: i64, end: i64) -> Result<Self, Error> {
        let invalid = |reason| Error::InvalidCoordinate {
            contig: contig.name.clone(),
            length: contig.length,
            start,
            end,
            reason,
        };
        if start < 0 || end < 0 {
            return Err(invalid("coordinates must not be negative"));
        }
        if start > end {
            return Err(invalid("start must not be greater than end"));
        }
        if end > contig.length as i64 {
            return Err(invalid("end exceeds contig length"));
        }

        Ok(Self {
            contig: contig.id,
            contig_length: contig.length,
            start: start as u32,
            end: end as u32,
            strand,
        })
    }

    /// Zero-length region marking a position on the positive strand.
    pub fn position(contig: &Contig, pos: i64) -> Result<Self, Error> {
        Self::new(contig, Strand::Positive, pos, pos)
    }

    pub fn contig_id(&self) -> ContigId {
        self.contig
    }

    pub fn contig_length(&self) -> u32 {
        self.contig_length
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Start coordinate when projected onto `strand`.
    pub fn start_on_strand(&self, strand: Strand) -> u32 {
        if strand == self.strand {
            self.start
        } else {
            self.contig_length - self.end
        }
    }

    /// End coordinate when projected onto `strand`.
    pub fn end_on_strand(&self, strand: Strand) -> u32 {
        if strand == self.strand {
            self.end
        } else {
            self.contig_length - self.start
        }
    }

    /// Return the same region expressed on `strand`.
    pub fn with_strand(&self, strand: Strand) -> Self {
        Self {
            start: self.start_on_strand(strand),
            end: self.end_on_strand(strand),
            strand,
            ..*self
        }
    }

    /// Positive strand `(start, end)`.
    fn pos_coords(&self) -> (u32, u32) {
        (
            self.start_on_strand(Strand::Positive),
            self.end_on_strand(Strand::Positive),
        )
    }

    /// Whether the two regions share at least one base.
    ///
    /// An empty region overlaps a region that strictly encloses its position.
    pub fn overlaps(&self, other: &GenomicRegion) -> bool {
        if self.contig != other.contig {
            return false;
        }
        let (a_start, a_end) = self.pos_coords();
        let (b_start, b_end) = other.pos_coords();
        a_start < b_end && b_start < a_end
    }

    /// Length of the gap between the regions; `0` for overlapping or adjacent
    /// regions and `None` for regions on different contigs.
    pub fn distance_to(&self, other: &GenomicRegion) -> Option<u32> {
        if self.contig != other.contig {
            return None;
        }
        let (a_start, a_end) = self.pos_coords();
        let (b_start, b_end) = other.pos_coords();
        Some(std::cmp::max(a_start, b_start).saturating_sub(std::cmp::min(a_end, b_end)))
    }

    /// Whether `other` lies completely within `self`.
    pub fn contains(&self, other: &GenomicRegion) -> bool {
        if self.contig != other.contig {
            return false;
        }
        let (a_start, a_end) = self.pos_coords();
        let (b_start, b_end) = other.pos_coords();
        a_start <= b_start && b_end <= a_end
    }

    /// Number of bases shared by the two regions.
    pub fn intersection_len(&self, other: &GenomicRegion) -> u32 {
        if self.contig != other.contig {
            return 0;
        }
        let (a_start, a_end) = self.pos_coords();
        let (b_start, b_end) = other.pos_coords();
        std::cmp::min(a_end, b_end).saturating_sub(std::cmp::max(a_start, b_start))
    }

    /// Region extended by `flank` bases on both sides, clamped to the contig.
    pub fn expanded(&self, flank: u32) -> Self {
        Self {
            start: self.start.saturating_sub(flank),
            end: std::cmp::min(self.end.saturating_add(flank), self.contig_length),
            ..*self
        }
    }

    /// Zero-length positive strand regions at start and end.
    pub fn boundaries(&self) -> (Self, Self) {
        let region = self.with_strand(Strand::Positive);
        (
            Self {
                end: region.start,
                ..region
            },
            Self {
                start: region.end,
                ..region
            },
        )
    }

    /// Whether the base at positive strand position `pos` lies in the region.
    pub fn covers(&self, pos: u32) -> bool {
        let (start, end) = self.pos_coords();
        start <= pos && pos < end
    }

    /// Region extended by `left` bases to the left on the positive strand.
    pub fn extended_left(&self, left: u32) -> Self {
        let region = self.with_strand(Strand::Positive);
        Self {
            start: region.start.saturating_sub(left),
            ..region
        }
    }

    /// Region extended by `right` bases to the right on the positive strand,
    /// clamped to the contig.
    pub fn extended_right(&self, right: u32) -> Self {
        let region = self.with_strand(Strand::Positive);
        Self {
            end: std::cmp::min(region.end.saturating_add(right), region.contig_length),
            ..region
        }
    }
}
