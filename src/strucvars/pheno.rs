//! Phenotype relevance of annotation records.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::Arc,
    time::Instant,
};

use hpo::{HpoTermId, Ontology};

/// Answers ancestry queries on phenotype terms.
pub trait PhenotypeTermResolver: Send + Sync {
    /// Whether `ancestor` is `term` itself or one of its ancestors.
    fn is_equal_or_ancestor(&self, ancestor: &str, term: &str) -> bool;
}

/// In-memory ancestry: maps each term to the set of its ancestors.
#[derive(Debug, Clone, Default)]
pub struct TermAncestry {
    ancestors: HashMap<String, HashSet<String>>,
}

impl TermAncestry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ancestors` of `term`; transitive closure is up to the caller.
    pub fn with_ancestors(mut self, term: &str, ancestors: &[&str]) -> Self {
        self.ancestors
            .entry(term.to_owned())
            .or_default()
            .extend(ancestors.iter().map(|s| s.to_string()));
        self
    }
}

impl PhenotypeTermResolver for TermAncestry {
    fn is_equal_or_ancestor(&self, ancestor: &str, term: &str) -> bool {
        ancestor == term
            || self
                .ancestors
                .get(term)
                .map(|ancestors| ancestors.contains(ancestor))
                .unwrap_or(false)
    }
}

/// Resolver backed by the HPO.
pub struct OntologyResolver {
    ontology: Ontology,
}

impl std::fmt::Debug for OntologyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntologyResolver").finish_non_exhaustive()
    }
}

impl OntologyResolver {
    pub fn new(ontology: Ontology) -> Self {
        Self { ontology }
    }

    /// Load the ontology from the standard files in `path_hpo_dir`.
    #[tracing::instrument]
    pub fn from_standard(path_hpo_dir: &Path) -> Result<Self, anyhow::Error> {
        let before_loading = Instant::now();
        let ontology = Ontology::from_standard(&format!("{}", path_hpo_dir.display()))?;
        tracing::info!("loaded HPO in {:?}", before_loading.elapsed());
        Ok(Self::new(ontology))
    }
}

impl PhenotypeTermResolver for OntologyResolver {
    fn is_equal_or_ancestor(&self, ancestor: &str, term: &str) -> bool {
        let (Ok(ancestor_id), Ok(term_id)) =
            (HpoTermId::try_from(ancestor), HpoTermId::try_from(term))
        else {
            return false;
        };
        if ancestor_id == term_id {
            return true;
        }
        match (self.ontology.hpo(ancestor_id), self.ontology.hpo(term_id)) {
            (Some(ancestor), Some(term)) => term.child_of(&ancestor),
            _ => false,
        }
    }
}

/// Patient phenotype together with the resolver to relate terms.
#[derive(Clone)]
pub struct PhenotypeContext {
    patient_terms: Vec<String>,
    resolver: Arc<dyn PhenotypeTermResolver>,
}

impl std::fmt::Debug for PhenotypeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhenotypeContext")
            .field("patient_terms", &self.patient_terms)
            .finish_non_exhaustive()
    }
}

impl PhenotypeContext {
    pub fn new(patient_terms: Vec<String>, resolver: Arc<dyn PhenotypeTermResolver>) -> Self {
        Self {
            patient_terms,
            resolver,
        }
    }

    pub fn patient_terms(&self) -> &[String] {
        &self.patient_terms
    }

    /// A feature annotated with `terms` is relevant if one of them equals or is
    /// an ancestor of one of the patient's terms.
    pub fn is_relevant<'a, I>(&self, terms: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        terms.into_iter().any(|feature_term| {
            self.patient_terms
                .iter()
                .any(|patient_term| self.resolver.is_equal_or_ancestor(feature_term, patient_term))
        })
    }
}
