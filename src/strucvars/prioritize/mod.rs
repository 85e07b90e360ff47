//! Prioritization of structural variants against the annotation landscape.

pub mod batch;
pub mod conf;
pub mod evidence;
pub mod output;
pub mod ranking;
pub mod scorer;

use std::{io::Write, path::PathBuf, sync::Arc, time::Instant};

use clap::Parser;
use thousands::Separable;

use crate::{
    common::{self, coords::ContigRegistry, GenomeRelease},
    err::Error,
    strucvars::{
        landscape::{
            loader::{load_contigs, TsvAnnotationLoader},
            Landscape, LandscapeHandle,
        },
        pheno::{OntologyResolver, PhenotypeContext},
        schema::input::{RejectedRow, VariantRecord, VariantRow},
    },
};

use self::{batch::CancellationFlag, conf::Config, scorer::PriorityScorer};

/// Command line arguments for `strucvars prioritize` sub command.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Prioritize structural variants", long_about = None)]
pub struct Args {
    /// Genome release to use, selects the built-in contig table.
    #[arg(long, value_enum, default_value_t = GenomeRelease::Grch38)]
    pub genome_release: GenomeRelease,
    /// Optional contig table TSV, replaces the built-in one.
    #[arg(long)]
    pub path_contigs: Option<PathBuf>,
    /// Path to enhancer TSV file.
    #[arg(long)]
    pub path_enhancers: Option<PathBuf>,
    /// Path to dosage sensitivity TSV file.
    #[arg(long)]
    pub path_dosage: Option<PathBuf>,
    /// Path to repeat TSV file.
    #[arg(long)]
    pub path_repeats: Option<PathBuf>,
    /// Path to gene TSV file.
    #[arg(long)]
    pub path_genes: Option<PathBuf>,
    /// Path to TAD boundary TSV file.
    #[arg(long)]
    pub path_tad_boundaries: Option<PathBuf>,
    /// Path to input TSV file with structural variants.
    #[arg(long)]
    pub path_input: PathBuf,
    /// Path to output TSV file.
    #[arg(long)]
    pub path_output: PathBuf,
    /// Optional JSON file with scoring and landscape configuration.
    #[arg(long)]
    pub path_config: Option<PathBuf>,
    /// HPO terms of the patient, enables phenotype scoring.
    #[arg(long)]
    pub hpo_terms: Vec<String>,
    /// Directory with the standard HPO files.
    #[arg(long)]
    pub path_hpo_dir: Option<PathBuf>,
    /// Set the number of threads to use, defaults to number of cores.
    #[arg(long)]
    pub num_threads: Option<usize>,
    /// Maximal number of ranked records to write.
    #[arg(long)]
    pub max_results: Option<usize>,
}

/// Read the structural variants from the TSV file at `path`.
///
/// Rows that cannot be parsed are kept as `RejectedRow`s and reported as
/// failures in the output.
fn load_variants(path: &std::path::Path) -> Result<Vec<VariantRow>, anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(common::open_read_maybe_gz(path)?);
    let headers = reader
        .headers()
        .map_err(|e| anyhow::anyhow!("error reading header of {:?}: {}", path, e))?
        .clone();
    let column = |name: &str| headers.iter().position(|header| header == name);
    let (idx_id, idx_chromosome) = (column("id"), column("chromosome"));

    let mut rows = Vec::new();
    for raw in reader.records() {
        let raw = raw.map_err(|e| anyhow::anyhow!("error reading {:?}: {}", path, e))?;
        let row = match raw.deserialize::<VariantRecord>(Some(&headers)) {
            Ok(record) => Ok(record),
            Err(e) => {
                let field = |idx: Option<usize>| {
                    idx.and_then(|idx| raw.get(idx))
                        .unwrap_or_default()
                        .to_owned()
                };
                let rejected = RejectedRow {
                    id: field(idx_id),
                    chromosome: field(idx_chromosome),
                    error: Error::UnparseableRecord {
                        line: raw.position().map(|pos| pos.line()).unwrap_or_default(),
                        message: e.to_string(),
                    },
                };
                tracing::warn!("skipping unparseable row: {}", &rejected.error);
                Err(rejected)
            }
        };
        rows.push(row);
    }

    Ok(rows)
}

/// Build the phenotype context if patient terms are given.
fn phenotype_context(args: &Args) -> Result<Option<PhenotypeContext>, anyhow::Error> {
    if args.hpo_terms.is_empty() {
        return Ok(None);
    }
    let path_hpo_dir = args
        .path_hpo_dir
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("--path-hpo-dir is required with --hpo-terms"))?;
    let resolver = OntologyResolver::from_standard(path_hpo_dir)?;
    Ok(Some(PhenotypeContext::new(
        args.hpo_terms.clone(),
        Arc::new(resolver),
    )))
}

/// Main entry point for `strucvars prioritize` sub command.
pub fn run(args_common: &common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    if let Some(num_threads) = args.num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| anyhow::anyhow!("building global Rayon thread pool failed: {}", e))?;
    }

    let config = match &args.path_config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    tracing::info!("config = {:#?}", &config);

    tracing::info!("Building landscape ...");
    let registry = match &args.path_contigs {
        Some(path) => load_contigs(path)?,
        None => ContigRegistry::for_release(args.genome_release),
    };
    let loader = TsvAnnotationLoader {
        path_enhancers: args.path_enhancers.clone(),
        path_dosage: args.path_dosage.clone(),
        path_repeats: args.path_repeats.clone(),
        path_genes: args.path_genes.clone(),
        path_tad_boundaries: args.path_tad_boundaries.clone(),
    };
    let handle = LandscapeHandle::new(Landscape::build(registry, &loader, &config.landscape)?);
    tracing::info!("... done building landscape");

    let scorer = PriorityScorer::new(config.scoring, phenotype_context(args)?);

    tracing::info!("Prioritizing variants ...");
    let before_query = Instant::now();
    let records = load_variants(&args.path_input)?;
    let ranking = batch::prioritize_batch(&records, &handle, &scorer, &CancellationFlag::new());
    tracing::info!(
        "... done prioritizing {} variants in {:?}",
        records.len().separate_with_commas(),
        before_query.elapsed()
    );

    let mut writer = common::open_write_maybe_gz(&args.path_output)?;
    let stats = output::write_ranking(&mut writer, &ranking, &records, args.max_results)?;
    writer.flush()?;
    tracing::info!(
        "wrote {} ranked and {} failed variants",
        stats.count_ranked.separate_with_commas(),
        stats.count_failed.separate_with_commas()
    );

    tracing::info!(
        "All of `strucvars prioritize` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}
