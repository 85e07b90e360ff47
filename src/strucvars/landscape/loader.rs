//! Loading of annotation records from (optionally gzip-ed) TSV files.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use thousands::Separable;

use crate::common::{
    coords::{ContigRegistry, GenomicRegion, Strand},
    open_read_maybe_gz,
};

use super::{
    dosage::{Dosage, DosageRegion},
    enhancers::{Enhancer, TissueSpecificity},
    genes::Gene,
    repeats::{RepeatFamily, RepetitiveRegion},
    tads::TadBoundary,
};

/// Source of annotation records for building a `Landscape`.
///
/// Implementations resolve contig names through the given registry.
pub trait AnnotationLoader {
    fn load_enhancers(&self, registry: &ContigRegistry) -> Result<Vec<Enhancer>, anyhow::Error>;

    fn load_dosage_regions(
        &self,
        registry: &ContigRegistry,
    ) -> Result<Vec<DosageRegion>, anyhow::Error>;

    fn load_repeats(
        &self,
        registry: &ContigRegistry,
    ) -> Result<Vec<RepetitiveRegion>, anyhow::Error>;

    fn load_genes(&self, registry: &ContigRegistry) -> Result<Vec<Gene>, anyhow::Error>;

    fn load_tad_boundaries(
        &self,
        registry: &ContigRegistry,
    ) -> Result<Vec<TadBoundary>, anyhow::Error>;
}

/// Module with code supporting the parsing.
pub(crate) mod input {
    use serde::{Deserialize, Deserializer};

    use crate::strucvars::landscape::{
        dosage::{DosageSensitivity, DosageSensitivityEvidence},
        enhancers::EnhancerSource,
    };

    /// Deserialize a comma separated list; the empty string yields an empty list.
    pub fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect())
    }

    /// Enhancer record.
    #[derive(Debug, Deserialize)]
    pub struct EnhancerRecord {
        /// Chromosome name
        pub chromosome: String,
        /// 0-based begin position
        pub begin: i64,
        /// 0-based end position
        pub end: i64,
        /// Enhancer identifier
        pub id: String,
        /// Source database
        #[serde(default)]
        pub source: EnhancerSource,
        /// Whether the enhancer is active during development
        #[serde(default)]
        pub is_developmental: bool,
        /// Tissue specificities as `HP:0001627=0.8` pairs
        #[serde(deserialize_with = "deserialize_list", default)]
        pub tissues: Vec<String>,
    }

    /// Dosage region record.
    #[derive(Debug, Deserialize)]
    pub struct DosageRecord {
        pub chromosome: String,
        pub begin: i64,
        pub end: i64,
        /// HGNC id or ISCA region id
        pub id: String,
        pub sensitivity: DosageSensitivity,
        pub evidence: DosageSensitivityEvidence,
    }

    /// Repetitive element record.
    #[derive(Debug, Deserialize)]
    pub struct RepeatRecord {
        pub chromosome: String,
        pub begin: i64,
        pub end: i64,
        /// RepeatMasker `class/family`
        pub family: String,
    }

    /// Contig table record.
    #[derive(Debug, Deserialize)]
    pub struct ContigRecord {
        pub name: String,
        pub length: u32,
        /// Alternative names, e.g., `chr1`
        #[serde(deserialize_with = "deserialize_list", default)]
        pub aliases: Vec<String>,
    }

    /// Gene record.
    #[derive(Debug, Deserialize)]
    pub struct GeneRecord {
        pub chromosome: String,
        pub begin: i64,
        pub end: i64,
        pub hgnc_id: String,
        pub symbol: String,
        /// Associated HPO terms
        #[serde(deserialize_with = "deserialize_list", default)]
        pub hpo_terms: Vec<String>,
    }

    /// TAD boundary record.
    #[derive(Debug, Deserialize)]
    pub struct TadBoundaryRecord {
        pub chromosome: String,
        pub begin: i64,
        pub end: i64,
        pub id: String,
        /// Stability in `[0, 1]`
        pub stability: f64,
    }
}

/// Parse `HP:0001627=0.8` into a tissue specificity.
fn parse_tissue(value: &str) -> Result<TissueSpecificity, anyhow::Error> {
    let (term_id, tau) = value
        .rsplit_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid tissue specificity {:?}", value))?;
    Ok(TissueSpecificity {
        term_id: term_id.to_owned(),
        tau: tau
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid tau in {:?}: {}", value, e))?,
    })
}

/// Read all records of type `R` from the TSV file at `path` and convert them
/// with `convert`.
///
/// Records that cannot be converted are logged and skipped.
fn load_tsv<R, T, F>(path: &Path, label: &str, convert: F) -> Result<Vec<T>, anyhow::Error>
where
    R: serde::de::DeserializeOwned,
    F: Fn(R) -> Result<T, anyhow::Error>,
{
    tracing::debug!("loading {} records from {:?}", label, path);
    let before_loading = Instant::now();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .from_reader(open_read_maybe_gz(path)?);

    let mut result = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize() {
        let record: R = record.map_err(|e| anyhow::anyhow!("error parsing {:?}: {}", path, e))?;
        match convert(record) {
            Ok(record) => result.push(record),
            Err(e) => {
                tracing::warn!("skipping {} record: {}", label, e);
                skipped += 1;
            }
        }
    }

    tracing::debug!(
        "loaded {} {} records ({} skipped) in {:?}",
        result.len().separate_with_commas(),
        label,
        skipped.separate_with_commas(),
        before_loading.elapsed()
    );

    Ok(result)
}

/// Resolve the positive strand region of a TSV record.
fn region(
    registry: &ContigRegistry,
    chromosome: &str,
    begin: i64,
    end: i64,
) -> Result<GenomicRegion, anyhow::Error> {
    let contig = registry.resolve(chromosome)?;
    Ok(GenomicRegion::new(contig, Strand::Positive, begin, end)?)
}

/// Load a contig registry from a TSV file with `name`, `length`, and
/// `aliases` columns.
#[tracing::instrument]
pub fn load_contigs(path: &Path) -> Result<ContigRegistry, anyhow::Error> {
    let contigs = load_tsv(path, "contig", |record: input::ContigRecord| {
        if record.length == 0 {
            anyhow::bail!("contig {:?} has length zero", &record.name);
        }
        Ok((record.name, record.length, record.aliases))
    })?;
    Ok(ContigRegistry::new(contigs))
}

/// Load annotation from one TSV file per layer; layers without file are empty.
#[derive(Debug, Default, Clone)]
pub struct TsvAnnotationLoader {
    pub path_enhancers: Option<PathBuf>,
    pub path_dosage: Option<PathBuf>,
    pub path_repeats: Option<PathBuf>,
    pub path_genes: Option<PathBuf>,
    pub path_tad_boundaries: Option<PathBuf>,
}

impl AnnotationLoader for TsvAnnotationLoader {
    #[tracing::instrument(skip(registry))]
    fn load_enhancers(&self, registry: &ContigRegistry) -> Result<Vec<Enhancer>, anyhow::Error> {
        let Some(path) = &self.path_enhancers else {
            return Ok(Vec::new());
        };
        load_tsv(path, "enhancer", |record: input::EnhancerRecord| {
            let tissues = record
                .tissues
                .iter()
                .map(|value| parse_tissue(value))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Enhancer::new(
                region(registry, &record.chromosome, record.begin, record.end)?,
                &record.id,
                record.source,
                record.is_developmental,
                tissues,
            )?)
        })
    }

    #[tracing::instrument(skip(registry))]
    fn load_dosage_regions(
        &self,
        registry: &ContigRegistry,
    ) -> Result<Vec<DosageRegion>, anyhow::Error> {
        let Some(path) = &self.path_dosage else {
            return Ok(Vec::new());
        };
        load_tsv(path, "dosage", |record: input::DosageRecord| {
            Ok(DosageRegion::new(
                region(registry, &record.chromosome, record.begin, record.end)?,
                Dosage {
                    id: record.id,
                    sensitivity: record.sensitivity,
                    evidence: record.evidence,
                },
            )?)
        })
    }

    #[tracing::instrument(skip(registry))]
    fn load_repeats(
        &self,
        registry: &ContigRegistry,
    ) -> Result<Vec<RepetitiveRegion>, anyhow::Error> {
        let Some(path) = &self.path_repeats else {
            return Ok(Vec::new());
        };
        load_tsv(path, "repeat", |record: input::RepeatRecord| {
            Ok(RepetitiveRegion::new(
                region(registry, &record.chromosome, record.begin, record.end)?,
                RepeatFamily::parse(&record.family),
            )?)
        })
    }

    #[tracing::instrument(skip(registry))]
    fn load_genes(&self, registry: &ContigRegistry) -> Result<Vec<Gene>, anyhow::Error> {
        let Some(path) = &self.path_genes else {
            return Ok(Vec::new());
        };
        load_tsv(path, "gene", |record: input::GeneRecord| {
            Ok(Gene::new(
                region(registry, &record.chromosome, record.begin, record.end)?,
                &record.hgnc_id,
                &record.symbol,
                record.hpo_terms,
            )?)
        })
    }

    #[tracing::instrument(skip(registry))]
    fn load_tad_boundaries(
        &self,
        registry: &ContigRegistry,
    ) -> Result<Vec<TadBoundary>, anyhow::Error> {
        let Some(path) = &self.path_tad_boundaries else {
            return Ok(Vec::new());
        };
        load_tsv(path, "TAD boundary", |record: input::TadBoundaryRecord| {
            Ok(TadBoundary::new(
                region(registry, &record.chromosome, record.begin, record.end)?,
                &record.id,
                record.stability,
            )?)
        })
    }
}
