//! Turn evidence bundles into explainable priority scores.

use serde::{Deserialize, Serialize};

use crate::strucvars::{
    landscape::{enhancers, Landscape},
    pheno::PhenotypeContext,
    schema::StructuralVariant,
};

use super::{
    conf::ScoringConfig,
    evidence::{resolve_evidence, EvidenceBundle, QueryOrigin},
};

/// Annotation layer a contribution stems from.
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
pub enum Layer {
    Enhancer,
    Dosage,
    Repeat,
    Gene,
    TadBoundary,
}

/// One term of the score.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Contribution {
    pub layer: Layer,
    pub record_id: String,
    pub origin: QueryOrigin,
    pub value: f64,
}

/// Priority of one variant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SvPriority {
    pub variant_id: String,
    /// Non-negative score.
    pub score: f64,
    /// Non-zero contributions, by layer in evidence order.
    pub contributions: Vec<Contribution>,
}

/// Scores evidence bundles according to a `ScoringConfig`.
#[derive(Debug, Clone, Default)]
pub struct PriorityScorer {
    config: ScoringConfig,
    /// Phenotype scoring is enabled iff this is set.
    phenotype: Option<PhenotypeContext>,
}

impl PriorityScorer {
    pub fn new(config: ScoringConfig, phenotype: Option<PhenotypeContext>) -> Self {
        Self { config, phenotype }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Phenotype multiplier for a feature annotated with `terms`.
    fn phenotype_factor<'a, I>(&self, terms: I) -> f64
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(context) = &self.phenotype else {
            return 1.0;
        };
        if context.is_relevant(terms) {
            self.config.phenotype_multiplier
        } else {
            1.0
        }
    }

    /// Compute the priority from the evidence collected for `variant_id`.
    pub fn score(&self, variant_id: &str, evidence: &EvidenceBundle) -> SvPriority {
        let config = &self.config;
        let mut contributions = Vec::new();

        for overlap in &evidence.enhancers {
            let enhancer = overlap.record;
            let developmental = if enhancer.is_developmental() {
                config.developmental_multiplier
            } else {
                1.0
            };
            let value = enhancers::max_tau(enhancer)
                * overlap.overlap_fraction
                * developmental
                * self.phenotype_factor(enhancers::hpo_term_associations(enhancer))
                * config.distance_factor(overlap.breakpoint_distance)
                * config.enhancer_weight;
            contributions.push(Contribution {
                layer: Layer::Enhancer,
                record_id: enhancer.id().to_owned(),
                origin: overlap.origin,
                value,
            });
        }

        let mut best_dosage: Option<Contribution> = None;
        for overlap in &evidence.dosage {
            let dosage = overlap.record.dosage();
            if dosage.evidence < config.min_dosage_evidence {
                continue;
            }
            let value = config.dosage_class_weights.weight(dosage.sensitivity)
                * overlap.overlap_fraction
                * config.distance_factor(overlap.breakpoint_distance)
                * config.dosage_weight;
            if best_dosage.as_ref().map_or(true, |best| value > best.value) {
                best_dosage = Some(Contribution {
                    layer: Layer::Dosage,
                    record_id: dosage.id.clone(),
                    origin: overlap.origin,
                    value,
                });
            }
        }
        contributions.extend(best_dosage);

        for overlap in evidence.repeats.iter().filter(|o| o.spans_breakpoint) {
            contributions.push(Contribution {
                layer: Layer::Repeat,
                record_id: overlap.record.id().to_owned(),
                origin: overlap.origin,
                value: -config.repeat_penalty * config.repeat_weight,
            });
        }

        for overlap in &evidence.genes {
            let gene = overlap.record;
            let value = overlap.overlap_fraction
                * self.phenotype_factor(gene.hpo_terms().iter().map(String::as_str))
                * config.distance_factor(overlap.breakpoint_distance)
                * config.gene_weight;
            contributions.push(Contribution {
                layer: Layer::Gene,
                record_id: gene.hgnc_id().to_owned(),
                origin: overlap.origin,
                value,
            });
        }

        // span queries only report boundaries with their midpoint in the span
        for overlap in &evidence.tad_boundaries {
            if overlap.origin != QueryOrigin::Span && !overlap.spans_breakpoint {
                continue;
            }
            let boundary = overlap.record;
            contributions.push(Contribution {
                layer: Layer::TadBoundary,
                record_id: boundary.id().to_owned(),
                origin: overlap.origin,
                value: boundary.stability()
                    * config.distance_factor(overlap.breakpoint_distance)
                    * config.tad_weight,
            });
        }

        contributions.retain(|c| c.value != 0.0);
        let total: f64 = contributions.iter().map(|c| c.value).sum();

        SvPriority {
            variant_id: variant_id.to_owned(),
            score: if total > 0.0 { total } else { 0.0 },
            contributions,
        }
    }

    /// Resolve the evidence for `variant` in `landscape` and score it.
    pub fn prioritize(&self, variant: &StructuralVariant, landscape: &Landscape) -> SvPriority {
        let evidence = resolve_evidence(variant, landscape, self.config.flank_bp);
        self.score(variant.id(), &evidence)
    }
}
