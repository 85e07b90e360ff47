//! Repetitive elements (RepeatMasker).

use serde::{Deserialize, Serialize};

use crate::common::{
    coords::GenomicRegion,
    index::{ContigIndex, Located},
};

/// RepeatMasker repeat class and family.
///
/// Families are grouped below their class (`base_type`) and, for some, below
/// an intermediate family (`parent`).
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
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RepeatFamily {
    Dna,
    DnaHat,
    DnaHatAc,
    DnaHatBlackjack,
    DnaHatCharlie,
    DnaHatTag1,
    DnaHatTip100,
    DnaMerlin,
    DnaMuleMudr,
    DnaPifHarbinger,
    DnaPiggyBac,
    DnaTcMar,
    DnaTcMarMariner,
    DnaTcMarPogo,
    DnaTcMarTc2,
    DnaTcMarTigger,
    Line,
    LowComplexity,
    Ltr,
    LtrErv1,
    LtrErvk,
    LtrErvl,
    LtrErvlMalr,
    LtrGypsy,
    Sine,
    Sine5SDeuL2,
    SineAlu,
    SineMir,
    SineTrna,
    SineTrnaDeu,
    SineTrnaRte,
    Retroposon,
    RcHelitron,
    Rna,
    RnaRrna,
    RnaScrna,
    RnaSnrna,
    RnaSrprna,
    RnaTrna,
    Satellite,
    SatelliteAcro,
    SatelliteCentr,
    SatelliteTelo,
    SimpleRepeat,
    #[default]
    Unknown,
}

impl RepeatFamily {
    /// Parse RepeatMasker `class/family` string, e.g., `"SINE/Alu"`.
    ///
    /// Uncertain assignments (trailing `?`) are treated as certain and all
    /// LINE families collapse to `Line`.  Unknown values yield `Unknown`.
    pub fn parse(value: &str) -> Self {
        let value = value.to_ascii_lowercase().replace('?', "");
        match value.as_str() {
            "dna" => Self::Dna,
            "dna/hat" => Self::DnaHat,
            "dna/hat-ac" => Self::DnaHatAc,
            "dna/hat-blackjack" => Self::DnaHatBlackjack,
            "dna/hat-charlie" => Self::DnaHatCharlie,
            "dna/hat-tag1" => Self::DnaHatTag1,
            "dna/hat-tip100" => Self::DnaHatTip100,
            "dna/merlin" => Self::DnaMerlin,
            "dna/mule-mudr" => Self::DnaMuleMudr,
            "dna/pif-harbinger" => Self::DnaPifHarbinger,
            "dna/piggybac" => Self::DnaPiggyBac,
            "dna/tcmar" => Self::DnaTcMar,
            "dna/tcmar-mariner" => Self::DnaTcMarMariner,
            "dna/tcmar-pogo" => Self::DnaTcMarPogo,
            "dna/tcmar-tc2" => Self::DnaTcMarTc2,
            "dna/tcmar-tigger" => Self::DnaTcMarTigger,
            "line" => Self::Line,
            line if line.starts_with("line/") => Self::Line,
            "low_complexity" => Self::LowComplexity,
            "ltr" => Self::Ltr,
            "ltr/erv1" => Self::LtrErv1,
            "ltr/ervk" => Self::LtrErvk,
            "ltr/ervl" => Self::LtrErvl,
            "ltr/ervl-malr" => Self::LtrErvlMalr,
            "ltr/gypsy" => Self::LtrGypsy,
            "sine" => Self::Sine,
            "sine/5s-deu-l2" => Self::Sine5SDeuL2,
            "sine/alu" => Self::SineAlu,
            "sine/mir" => Self::SineMir,
            "sine/trna" => Self::SineTrna,
            "sine/trna-deu" => Self::SineTrnaDeu,
            "sine/trna-rte" => Self::SineTrnaRte,
            "retroposon" | "retroposon/sva" => Self::Retroposon,
            "rc/helitron" => Self::RcHelitron,
            "rna" => Self::Rna,
            "rrna" => Self::RnaRrna,
            "scrna" => Self::RnaScrna,
            "snrna" => Self::RnaSnrna,
            "srprna" => Self::RnaSrprna,
            "trna" => Self::RnaTrna,
            "satellite" => Self::Satellite,
            "satellite/acro" => Self::SatelliteAcro,
            "satellite/centr" => Self::SatelliteCentr,
            "satellite/telo" => Self::SatelliteTelo,
            "simple_repeat" => Self::SimpleRepeat,
            _ => Self::Unknown,
        }
    }

    /// Repeat class of the family, e.g., `Sine` for `SineAlu`.
    pub fn base_type(&self) -> Self {
        use RepeatFamily::*;
        match self {
            DnaHat | DnaHatAc | DnaHatBlackjack | DnaHatCharlie | DnaHatTag1 | DnaHatTip100
            | DnaMerlin | DnaMuleMudr | DnaPifHarbinger | DnaPiggyBac | DnaTcMar
            | DnaTcMarMariner | DnaTcMarPogo | DnaTcMarTc2 | DnaTcMarTigger => Dna,
            LtrErv1 | LtrErvk | LtrErvl | LtrErvlMalr | LtrGypsy => Ltr,
            Sine5SDeuL2 | SineAlu | SineMir | SineTrna | SineTrnaDeu | SineTrnaRte => Sine,
            RnaRrna | RnaScrna | RnaSnrna | RnaSrprna | RnaTrna => Rna,
            SatelliteAcro | SatelliteCentr | SatelliteTelo => Satellite,
            other => *other,
        }
    }

    /// Immediate parent family, the family itself for top-level classes.
    pub fn parent(&self) -> Self {
        use RepeatFamily::*;
        match self {
            DnaHatAc | DnaHatBlackjack | DnaHatCharlie | DnaHatTag1 | DnaHatTip100 => DnaHat,
            DnaTcMarMariner | DnaTcMarPogo | DnaTcMarTc2 | DnaTcMarTigger => DnaTcMar,
            LtrErvlMalr => LtrErvl,
            SineTrnaDeu | SineTrnaRte => SineTrna,
            other => other.base_type(),
        }
    }
}

/// A repetitive element.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RepetitiveRegion {
    region: GenomicRegion,
    family: RepeatFamily,
    /// Identifier derived from family and position; used as sort key.
    id: String,
}

impl RepetitiveRegion {
    pub fn new(region: GenomicRegion, family: RepeatFamily) -> Result<Self, crate::err::Error> {
        super::check_record_region(&region)?;
        let id = format!(
            "{}:{}-{}",
            family,
            region.start_on_strand(crate::common::coords::Strand::Positive),
            region.end_on_strand(crate::common::coords::Strand::Positive)
        );
        Ok(Self { region, family, id })
    }

    pub fn family(&self) -> RepeatFamily {
        self.family
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Located for RepetitiveRegion {
    fn region(&self) -> &GenomicRegion {
        &self.region
    }

    fn key(&self) -> &str {
        &self.id
    }
}

/// Layer of repetitive elements.
#[derive(Debug, Default)]
pub struct RepeatLayer {
    index: ContigIndex<RepetitiveRegion>,
}

impl RepeatLayer {
    pub fn build(records: Vec<RepetitiveRegion>) -> Self {
        Self {
            index: ContigIndex::build(records),
        }
    }

    pub fn query(&self, region: &GenomicRegion) -> Vec<&RepetitiveRegion> {
        self.index.query(region)
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
    use strum::IntoEnumIterator;

    use super::{RepeatFamily, RepeatLayer, RepetitiveRegion};
    use crate::common::coords::{ContigRegistry, GenomicRegion, Strand};

    pub fn repeat(
        registry: &ContigRegistry,
        chrom: &str,
        start: i64,
        end: i64,
        family: RepeatFamily,
    ) -> RepetitiveRegion {
        RepetitiveRegion::new(
            GenomicRegion::new(registry.resolve(chrom).unwrap(), Strand::Positive, start, end)
                .unwrap(),
            family,
        )
        .unwrap()
    }

    #[rstest::rstest]
    #[case("SINE/Alu", RepeatFamily::SineAlu, RepeatFamily::Sine)]
    #[case("DNA/hAT-Tip100?", RepeatFamily::DnaHatTip100, RepeatFamily::Dna)]
    #[case("LINE/L1", RepeatFamily::Line, RepeatFamily::Line)]
    #[case("LTR/ERVL-MaLR", RepeatFamily::LtrErvlMalr, RepeatFamily::Ltr)]
    #[case("SINE?/tRNA", RepeatFamily::SineTrna, RepeatFamily::Sine)]
    #[case("Retroposon/SVA", RepeatFamily::Retroposon, RepeatFamily::Retroposon)]
    #[case("RC?/Helitron?", RepeatFamily::RcHelitron, RepeatFamily::RcHelitron)]
    #[case("Simple_repeat", RepeatFamily::SimpleRepeat, RepeatFamily::SimpleRepeat)]
    #[case("tRNA", RepeatFamily::RnaTrna, RepeatFamily::Rna)]
    #[case("Satellite/centr", RepeatFamily::SatelliteCentr, RepeatFamily::Satellite)]
    #[case("ARTEFACT", RepeatFamily::Unknown, RepeatFamily::Unknown)]
    fn repeat_family_parse(
        #[case] value: &str,
        #[case] expected: RepeatFamily,
        #[case] base_type: RepeatFamily,
    ) {
        let family = RepeatFamily::parse(value);

        assert_eq!(family, expected);
        assert_eq!(family.base_type(), base_type);
    }

    #[test]
    fn repeat_family_hierarchy() {
        assert_eq!(RepeatFamily::DnaTcMarPogo.parent(), RepeatFamily::DnaTcMar);
        assert_eq!(RepeatFamily::SineAlu.parent(), RepeatFamily::Sine);
        for family in RepeatFamily::iter() {
            let base = family.base_type();
            assert_eq!(base.base_type(), base, "{}", family);
            assert_eq!(family.parent().base_type(), base, "{}", family);
        }
    }

    #[test]
    fn layer_query() {
        let registry = ContigRegistry::new(vec![("1", 10_000, vec![])]);
        let layer = RepeatLayer::build(vec![
            repeat(&registry, "1", 300, 400, RepeatFamily::SineAlu),
            repeat(&registry, "1", 100, 200, RepeatFamily::Line),
        ]);

        let query =
            GenomicRegion::new(registry.resolve("1").unwrap(), Strand::Positive, 150, 350).unwrap();
        let result = layer.query(&query);

        assert_eq!(
            result.iter().map(|r| r.id()).collect::<Vec<_>>(),
            vec!["LINE:100-200", "SINE_ALU:300-400"]
        );
        assert_eq!(result[1].family(), RepeatFamily::SineAlu);
    }
}
