//! Dosage sensitive regions (ClinGen style curation).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::common::{
    coords::GenomicRegion,
    index::{ContigIndex, Located},
};

/// Kind of dosage sensitivity.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DosageSensitivity {
    Haploinsufficiency,
    Triplosensitivity,
    Unknown,
}

/// Strength of the curated dosage evidence, ordered from weakest to strongest.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DosageSensitivityEvidence {
    #[default]
    NoEvidence,
    LittleEvidence,
    SomeEvidence,
    SufficientEvidence,
}

impl DosageSensitivityEvidence {
    /// Map ClinGen dosage score (0, 1, 2, 3, 30, 40) to evidence.
    pub fn from_clingen_score(score: u32) -> Self {
        match score {
            1 => Self::LittleEvidence,
            2 => Self::SomeEvidence,
            3 => Self::SufficientEvidence,
            _ => Self::NoEvidence,
        }
    }
}

/// A dosage assessment, e.g., for a gene or an ISCA region.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dosage {
    /// HGNC id of the gene or id of the ISCA region.
    pub id: String,
    pub sensitivity: DosageSensitivity,
    pub evidence: DosageSensitivityEvidence,
}

/// Region with a dosage assessment.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DosageRegion {
    region: GenomicRegion,
    dosage: Dosage,
}

impl DosageRegion {
    pub fn new(region: GenomicRegion, dosage: Dosage) -> Result<Self, crate::err::Error> {
        super::check_record_region(&region)?;
        Ok(Self { region, dosage })
    }

    pub fn dosage(&self) -> &Dosage {
        &self.dosage
    }

    pub fn id(&self) -> &str {
        &self.dosage.id
    }
}

impl Located for DosageRegion {
    fn region(&self) -> &GenomicRegion {
        &self.region
    }

    fn key(&self) -> &str {
        &self.dosage.id
    }
}

/// Layer of dosage sensitive regions.
#[derive(Debug, Default)]
pub struct DosageLayer {
    index: ContigIndex<DosageRegion>,
    by_id: HashMap<String, Vec<Dosage>>,
}

impl DosageLayer {
    pub fn build(records: Vec<DosageRegion>) -> Self {
        let mut by_id: HashMap<String, Vec<Dosage>> = HashMap::new();
        for record in &records {
            by_id
                .entry(record.dosage.id.clone())
                .or_default()
                .push(record.dosage.clone());
        }

        Self {
            index: ContigIndex::build(records),
            by_id,
        }
    }

    /// Dosage regions overlapping `region`.
    pub fn dosage_elements(&self, region: &GenomicRegion) -> Vec<&DosageRegion> {
        self.index.query(region)
    }

    /// Dosage assessments of the gene with the given HGNC id.
    pub fn by_hgnc_id(&self, hgnc_id: &str) -> &[Dosage] {
        self.by_id.get(hgnc_id).map(Vec::as_slice).unwrap_or(&[])
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

    use super::{Dosage, DosageLayer, DosageRegion, DosageSensitivity, DosageSensitivityEvidence};
    use crate::common::coords::{ContigRegistry, GenomicRegion, Strand};

    pub fn dosage_region(
        registry: &ContigRegistry,
        id: &str,
        chrom: &str,
        start: i64,
        end: i64,
        sensitivity: DosageSensitivity,
        evidence: DosageSensitivityEvidence,
    ) -> DosageRegion {
        DosageRegion::new(
            GenomicRegion::new(registry.resolve(chrom).unwrap(), Strand::Positive, start, end)
                .unwrap(),
            Dosage {
                id: id.to_owned(),
                sensitivity,
                evidence,
            },
        )
        .unwrap()
    }

    #[test]
    fn evidence_order() {
        use DosageSensitivityEvidence::*;

        assert!(NoEvidence < LittleEvidence);
        assert!(LittleEvidence < SomeEvidence);
        assert!(SomeEvidence < SufficientEvidence);
        assert_eq!(
            DosageSensitivityEvidence::from_clingen_score(3),
            SufficientEvidence
        );
        assert_eq!(DosageSensitivityEvidence::from_clingen_score(40), NoEvidence);
    }

    #[rstest::rstest]
    #[case("HAPLOINSUFFICIENCY", DosageSensitivity::Haploinsufficiency)]
    #[case("triplosensitivity", DosageSensitivity::Triplosensitivity)]
    fn sensitivity_from_str(#[case] value: &str, #[case] expected: DosageSensitivity) {
        use std::str::FromStr;

        assert_eq!(DosageSensitivity::from_str(value).unwrap(), expected);
    }

    #[test]
    fn layer_queries() {
        let registry = ContigRegistry::new(vec![("1", 10_000, vec![])]);
        let layer = DosageLayer::build(vec![
            dosage_region(
                &registry,
                "HGNC:1100",
                "1",
                1_000,
                2_000,
                DosageSensitivity::Haploinsufficiency,
                DosageSensitivityEvidence::SufficientEvidence,
            ),
            dosage_region(
                &registry,
                "HGNC:1100",
                "1",
                1_000,
                2_000,
                DosageSensitivity::Triplosensitivity,
                DosageSensitivityEvidence::LittleEvidence,
            ),
            dosage_region(
                &registry,
                "ISCA-37404",
                "1",
                5_000,
                8_000,
                DosageSensitivity::Haploinsufficiency,
                DosageSensitivityEvidence::SomeEvidence,
            ),
        ]);

        let query =
            GenomicRegion::new(registry.resolve("1").unwrap(), Strand::Positive, 1_500, 5_500)
                .unwrap();
        assert_eq!(
            layer
                .dosage_elements(&query)
                .iter()
                .map(|r| r.id())
                .collect::<Vec<_>>(),
            vec!["HGNC:1100", "HGNC:1100", "ISCA-37404"]
        );
        assert_eq!(layer.by_hgnc_id("HGNC:1100").len(), 2);
        assert!(layer.by_hgnc_id("HGNC:1").is_empty());
    }
}
