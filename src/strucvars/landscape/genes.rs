//! Gene models with phenotype associations.

use std::collections::HashMap;

use serde::Serialize;

use crate::common::{
    coords::GenomicRegion,
    index::{ContigIndex, Located, RecordHandle},
};

/// A gene, reduced to its genomic extent.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Gene {
    region: GenomicRegion,
    /// HGNC identifier, e.g., `"HGNC:1100"`.
    hgnc_id: String,
    /// HGNC gene symbol.
    symbol: String,
    /// Associated HPO terms.
    hpo_terms: Vec<String>,
}

impl Gene {
    pub fn new(
        region: GenomicRegion,
        hgnc_id: &str,
        symbol: &str,
        hpo_terms: Vec<String>,
    ) -> Result<Self, crate::err::Error> {
        super::check_record_region(&region)?;
        Ok(Self {
            region,
            hgnc_id: hgnc_id.to_owned(),
            symbol: symbol.to_owned(),
            hpo_terms,
        })
    }

    pub fn hgnc_id(&self) -> &str {
        &self.hgnc_id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn hpo_terms(&self) -> &[String] {
        &self.hpo_terms
    }
}

impl Located for Gene {
    fn region(&self) -> &GenomicRegion {
        &self.region
    }

    fn key(&self) -> &str {
        &self.hgnc_id
    }
}

/// Layer of genes.
#[derive(Debug, Default)]
pub struct GeneLayer {
    index: ContigIndex<Gene>,
    by_hgnc_id: HashMap<String, RecordHandle>,
}

impl GeneLayer {
    pub fn build(records: Vec<Gene>) -> Self {
        let index = ContigIndex::build(records);
        let by_hgnc_id = index
            .iter_handles()
            .map(|(handle, gene)| (gene.hgnc_id.clone(), handle))
            .collect();

        Self { index, by_hgnc_id }
    }

    /// Genes overlapping `region`.
    pub fn query(&self, region: &GenomicRegion) -> Vec<&Gene> {
        self.index.query(region)
    }

    /// Lookup gene by HGNC id.
    pub fn by_hgnc_id(&self, hgnc_id: &str) -> Option<&Gene> {
        self.by_hgnc_id
            .get(hgnc_id)
            .and_then(|handle| self.index.get(*handle))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use pretty_assertions::assert_eq;

    use super::{Gene, GeneLayer};
    use crate::common::coords::{ContigRegistry, GenomicRegion, Strand};

    pub fn gene(
        registry: &ContigRegistry,
        hgnc_id: &str,
        symbol: &str,
        chrom: &str,
        start: i64,
        end: i64,
        hpo_terms: &[&str],
    ) -> Gene {
        Gene::new(
            GenomicRegion::new(registry.resolve(chrom).unwrap(), Strand::Positive, start, end)
                .unwrap(),
            hgnc_id,
            symbol,
            hpo_terms.iter().map(|t| t.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn layer_queries() {
        let registry = ContigRegistry::new(vec![("1", 10_000, vec![]), ("2", 10_000, vec![])]);
        let layer = GeneLayer::build(vec![
            gene(&registry, "HGNC:3", "C", "2", 100, 900, &[]),
            gene(&registry, "HGNC:2", "B", "1", 500, 900, &["HP:0001250"]),
            gene(&registry, "HGNC:1", "A", "1", 100, 600, &[]),
        ]);

        let query =
            GenomicRegion::new(registry.resolve("1").unwrap(), Strand::Positive, 550, 560).unwrap();
        assert_eq!(
            layer
                .query(&query)
                .iter()
                .map(|g| g.symbol())
                .collect::<Vec<_>>(),
            vec!["A", "B"]
        );
        assert_eq!(
            layer.by_hgnc_id("HGNC:2").map(|g| g.hpo_terms().to_vec()),
            Some(vec![String::from("HP:0001250")])
        );
        assert_eq!(layer.by_hgnc_id("HGNC:3").map(|g| g.symbol()), Some("C"));
        assert!(layer.by_hgnc_id("HGNC:4").is_none());
    }
}
