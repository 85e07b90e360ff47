//! Configuration of the prioritization.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    err::Error,
    strucvars::landscape::{
        dosage::{DosageSensitivity, DosageSensitivityEvidence},
        LandscapeParameters,
    },
};

/// Weight of each dosage sensitivity class.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(default)]
pub struct DosageClassWeights {
    pub haploinsufficiency: f64,
    pub triplosensitivity: f64,
    pub unknown: f64,
}

impl Default for DosageClassWeights {
    fn default() -> Self {
        Self {
            haploinsufficiency: 1.0,
            triplosensitivity: 0.5,
            unknown: 0.0,
        }
    }
}

impl DosageClassWeights {
    pub fn weight(&self, sensitivity: DosageSensitivity) -> f64 {
        match sensitivity {
            DosageSensitivity::Haploinsufficiency => self.haploinsufficiency,
            DosageSensitivity::Triplosensitivity => self.triplosensitivity,
            DosageSensitivity::Unknown => self.unknown,
        }
    }
}

/// Weights and switches of the priority score.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the enhancer contribution.
    pub enhancer_weight: f64,
    /// Weight of the dosage contribution.
    pub dosage_weight: f64,
    /// Weight of the repeat penalty.
    pub repeat_weight: f64,
    /// Weight of the gene contribution.
    pub gene_weight: f64,
    /// Weight of the contribution of disrupted TAD boundaries.
    pub tad_weight: f64,
    /// Multiplier for enhancers active during development.
    pub developmental_multiplier: f64,
    /// Weight of each dosage sensitivity class; must be strictly decreasing
    /// from haploinsufficiency over triplosensitivity to unknown.
    pub dosage_class_weights: DosageClassWeights,
    /// Dosage regions with weaker evidence are ignored.
    pub min_dosage_evidence: DosageSensitivityEvidence,
    /// Penalty per repeat spanning a breakpoint.
    pub repeat_penalty: f64,
    /// Multiplier for phenotype relevant enhancers and genes.
    pub phenotype_multiplier: f64,
    /// Contributions are scaled by `1 / (1 + d / decay)` for breakpoint
    /// distance `d` if set.
    pub distance_decay_bp: Option<f64>,
    /// Window around break-ends.
    pub flank_bp: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            enhancer_weight: 1.0,
            dosage_weight: 1.0,
            repeat_weight: 1.0,
            gene_weight: 1.0,
            tad_weight: 1.0,
            developmental_multiplier: 2.0,
            dosage_class_weights: DosageClassWeights::default(),
            min_dosage_evidence: DosageSensitivityEvidence::NoEvidence,
            repeat_penalty: 0.1,
            phenotype_multiplier: 2.0,
            distance_decay_bp: None,
            flank_bp: 50,
        }
    }
}

impl ScoringConfig {
    /// Check the configuration for consistency.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: &str| Err(Error::InvalidConfig(msg.to_owned()));

        let weights = [
            self.enhancer_weight,
            self.dosage_weight,
            self.repeat_weight,
            self.gene_weight,
            self.tad_weight,
            self.repeat_penalty,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return invalid("weights and penalties must be finite and non-negative");
        }
        if !(self.developmental_multiplier > 1.0) {
            return invalid("developmental_multiplier must be greater than 1");
        }
        if !(self.phenotype_multiplier >= 1.0) {
            return invalid("phenotype_multiplier must be at least 1");
        }
        let classes = &self.dosage_class_weights;
        if !(classes.haploinsufficiency > classes.triplosensitivity
            && classes.triplosensitivity > classes.unknown
            && classes.unknown >= 0.0)
        {
            return invalid("dosage class weights must be strictly decreasing and non-negative");
        }
        if let Some(decay) = self.distance_decay_bp {
            if !(decay > 0.0) {
                return invalid("distance_decay_bp must be positive");
            }
        }

        Ok(())
    }

    /// Factor for a contribution at breakpoint distance `distance`.
    pub fn distance_factor(&self, distance: u32) -> f64 {
        match self.distance_decay_bp {
            Some(decay) => 1.0 / (1.0 + distance as f64 / decay),
            None => 1.0,
        }
    }
}

/// Configuration file contents.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub scoring: ScoringConfig,
    pub landscape: LandscapeParameters,
}

impl Config {
    /// Load configuration from JSON file at `path` and validate it.
    pub fn load(path: &Path) -> Result<Self, anyhow::Error> {
        let file = std::fs::File::open(path)
            .map_err(|e| anyhow::anyhow!("could not open {:?}: {}", path, e))?;
        let config: Config = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| anyhow::anyhow!("could not parse {:?}: {}", path, e))?;
        config.scoring.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use float_cmp::assert_approx_eq;
    use pretty_assertions::assert_eq;

    use super::{Config, DosageClassWeights, ScoringConfig};
    use crate::{err::Error, strucvars::landscape::dosage::DosageSensitivityEvidence};

    #[test]
    fn default_is_valid() {
        assert_eq!(ScoringConfig::default().validate(), Ok(()));
    }

    #[rstest::rstest]
    #[case(ScoringConfig { developmental_multiplier: 0.5, ..Default::default() })]
    #[case(ScoringConfig { developmental_multiplier: 1.0, ..Default::default() })]
    #[case(ScoringConfig { phenotype_multiplier: f64::NAN, ..Default::default() })]
    #[case(ScoringConfig { gene_weight: -1.0, ..Default::default() })]
    #[case(ScoringConfig { tad_weight: f64::INFINITY, ..Default::default() })]
    #[case(ScoringConfig { distance_decay_bp: Some(0.0), ..Default::default() })]
    #[case(ScoringConfig {
        dosage_class_weights: DosageClassWeights {
            haploinsufficiency: 0.5,
            triplosensitivity: 0.5,
            unknown: 0.0,
        },
        ..Default::default()
    })]
    fn validate_rejects(#[case] config: ScoringConfig) {
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[rstest::rstest]
    #[case(None, 1_000, 1.0)]
    #[case(Some(1_000.0), 0, 1.0)]
    #[case(Some(1_000.0), 1_000, 0.5)]
    #[case(Some(1_000.0), 3_000, 0.25)]
    fn distance_factor(#[case] decay: Option<f64>, #[case] distance: u32, #[case] expected: f64) {
        let config = ScoringConfig {
            distance_decay_bp: decay,
            ..Default::default()
        };

        assert_approx_eq!(f64, config.distance_factor(distance), expected);
    }

    #[test]
    fn load_partial_json() -> Result<(), anyhow::Error> {
        let tmpdir = temp_testdir::TempDir::default();
        let path = tmpdir.join("config.json");
        std::fs::File::create(&path)?.write_all(
            br#"{
                "scoring": {"repeat_penalty": 0.5, "min_dosage_evidence": "SOME_EVIDENCE"},
                "landscape": {"enhancers": {"use_vista": false}}
            }"#,
        )?;

        let config = Config::load(&path)?;

        assert_eq!(config.scoring.repeat_penalty, 0.5);
        assert_eq!(
            config.scoring.min_dosage_evidence,
            DosageSensitivityEvidence::SomeEvidence
        );
        assert_eq!(config.scoring.flank_bp, 50);
        assert!(!config.landscape.enhancers.use_vista);
        assert!(config.landscape.enhancers.use_fantom5);

        Ok(())
    }

    #[test]
    fn load_invalid_json() -> Result<(), anyhow::Error> {
        let tmpdir = temp_testdir::TempDir::default();
        let path = tmpdir.join("config.json");
        std::fs::File::create(&path)?
            .write_all(br#"{"scoring": {"developmental_multiplier": 0.1}}"#)?;

        let err = Config::load(&path).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidConfig(_))
        ));

        Ok(())
    }
}
