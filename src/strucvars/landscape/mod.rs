//! The annotation landscape: enhancer, dosage, repeat, gene, and TAD boundary
//! layers.

pub mod dosage;
pub mod enhancers;
pub mod genes;
pub mod loader;
pub mod repeats;
pub mod tads;

use std::{
    sync::{Arc, RwLock},
    time::Instant,
};

use serde::{Deserialize, Serialize};
use thousands::Separable;

use crate::{
    common::coords::{ContigRegistry, GenomicRegion},
    err::Error,
};

use self::{
    dosage::DosageLayer,
    enhancers::{EnhancerLayer, EnhancerParameters},
    genes::GeneLayer,
    loader::AnnotationLoader,
    repeats::RepeatLayer,
    tads::{TadLayer, TadParameters},
};

/// Annotation records must span at least one base.
pub(crate) fn check_record_region(region: &GenomicRegion) -> Result<(), Error> {
    if region.is_empty() {
        Err(Error::InvalidCoordinate {
            contig: format!("#{}", region.contig_id().0),
            length: region.contig_length(),
            start: region.start() as i64,
            end: region.end() as i64,
            reason: "annotation record must span at least one base",
        })
    } else {
        Ok(())
    }
}

/// Parameters for building the landscape.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LandscapeParameters {
    pub enhancers: EnhancerParameters,
    pub tads: TadParameters,
}

/// Immutable bundle of all annotation layers.
#[derive(Debug, Default)]
pub struct Landscape {
    registry: ContigRegistry,
    enhancers: EnhancerLayer,
    dosage: DosageLayer,
    repeats: RepeatLayer,
    genes: GeneLayer,
    tads: TadLayer,
}

impl Landscape {
    /// Load all layers through `loader` and index them.
    ///
    /// Fails with `Error::EmptyLandscape` if no layer has any record.
    #[tracing::instrument(skip(registry, loader))]
    pub fn build<L: AnnotationLoader>(
        registry: ContigRegistry,
        loader: &L,
        params: &LandscapeParameters,
    ) -> Result<Self, anyhow::Error> {
        let before_loading = Instant::now();
        let enhancers = loader.load_enhancers(&registry)?;
        let dosage = loader.load_dosage_regions(&registry)?;
        let repeats = loader.load_repeats(&registry)?;
        let genes = loader.load_genes(&registry)?;
        let tads = loader.load_tad_boundaries(&registry)?;
        tracing::info!(
            "loaded {} enhancers, {} dosage regions, {} repeats, {} genes, {} TAD boundaries in {:?}",
            enhancers.len().separate_with_commas(),
            dosage.len().separate_with_commas(),
            repeats.len().separate_with_commas(),
            genes.len().separate_with_commas(),
            tads.len().separate_with_commas(),
            before_loading.elapsed()
        );
        if enhancers.is_empty()
            && dosage.is_empty()
            && repeats.is_empty()
            && genes.is_empty()
            && tads.is_empty()
        {
            return Err(Error::EmptyLandscape.into());
        }

        let before_building = Instant::now();
        let result = Self {
            registry,
            enhancers: EnhancerLayer::build(enhancers, &params.enhancers),
            dosage: DosageLayer::build(dosage),
            repeats: RepeatLayer::build(repeats),
            genes: GeneLayer::build(genes),
            tads: TadLayer::build(tads, &params.tads),
        };
        tracing::debug!("done building indices in {:?}", before_building.elapsed());

        Ok(result)
    }

    pub fn registry(&self) -> &ContigRegistry {
        &self.registry
    }

    pub fn enhancers(&self) -> &EnhancerLayer {
        &self.enhancers
    }

    pub fn dosage(&self) -> &DosageLayer {
        &self.dosage
    }

    pub fn repeats(&self) -> &RepeatLayer {
        &self.repeats
    }

    pub fn genes(&self) -> &GeneLayer {
        &self.genes
    }

    pub fn tads(&self) -> &TadLayer {
        &self.tads
    }
}

/// Shared, swappable reference to the current `Landscape`.
///
/// Readers take a snapshot and keep using it even if the landscape is
/// replaced concurrently.
#[derive(Debug)]
pub struct LandscapeHandle {
    current: RwLock<Arc<Landscape>>,
}

impl LandscapeHandle {
    pub fn new(landscape: Landscape) -> Self {
        Self {
            current: RwLock::new(Arc::new(landscape)),
        }
    }

    /// The current landscape.
    pub fn snapshot(&self) -> Arc<Landscape> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Swap in `landscape`, returning the previous one.
    pub fn replace(&self, landscape: Landscape) -> Arc<Landscape> {
        let landscape = Arc::new(landscape);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, landscape)
    }
}
