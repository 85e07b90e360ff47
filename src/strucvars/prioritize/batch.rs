//! Parallel prioritization of a batch of variants.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use rayon::prelude::*;

use crate::strucvars::{
    landscape::{Landscape, LandscapeHandle},
    schema::{input::VariantRow, StructuralVariant},
};

use super::{
    ranking::{rank, FailureReason, Ranking, VariantFailure, VariantOutcome},
    scorer::PriorityScorer,
};

/// Cooperative cancellation, shared between the caller and the workers.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Resolve and score a single input row.
fn process(
    index: usize,
    row: &VariantRow,
    landscape: &Landscape,
    scorer: &PriorityScorer,
    cancel: &CancellationFlag,
) -> VariantOutcome {
    let record = match row {
        Ok(record) => record,
        Err(rejected) => {
            return Err(VariantFailure {
                index,
                variant_id: rejected.id.clone(),
                reason: rejected.error.clone().into(),
            })
        }
    };
    let fail = |reason| VariantFailure {
        index,
        variant_id: record.id.clone(),
        reason,
    };
    if cancel.is_cancelled() {
        return Err(fail(FailureReason::Cancelled));
    }

    let variant = StructuralVariant::from_record(record, landscape.registry()).map_err(|e| {
        tracing::warn!("could not resolve variant {}: {}", &record.id, &e);
        fail(e.into())
    })?;

    Ok(scorer.prioritize(&variant, landscape))
}

/// Prioritize `rows` in parallel on the global thread pool.
///
/// All rows are scored against one landscape snapshot taken when the batch
/// starts; a concurrent `LandscapeHandle::replace` affects the next batch
/// only.  Workers check `cancel` before each variant and outcomes are ranked
/// once all are collected.
pub fn prioritize_batch(
    rows: &[VariantRow],
    handle: &LandscapeHandle,
    scorer: &PriorityScorer,
    cancel: &CancellationFlag,
) -> Ranking {
    let landscape = handle.snapshot();
    let outcomes = rows
        .par_iter()
        .enumerate()
        .map(|(index, row)| process(index, row, &landscape, scorer, cancel))
        .collect::<Vec<_>>();

    rank(outcomes)
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;
    use pretty_assertions::assert_eq;

    use std::collections::BTreeSet;

    use super::{prioritize_batch, CancellationFlag};
    use crate::{
        err::Error,
        strucvars::{
            landscape::{
                enhancers::test::enhancer,
                genes::test::gene,
                test::{landscape, test_registry, VecLoader},
                LandscapeHandle,
            },
            prioritize::{
                ranking::FailureReason,
                scorer::{Layer, PriorityScorer},
            },
            schema::{
                input::{RejectedRow, VariantRecord, VariantRow},
                SvType,
            },
        },
    };

    fn records() -> Vec<VariantRow> {
        (0..10)
            .map(|i| VariantRecord {
                id: format!("sv{:02}", i),
                chromosome: if i == 7 {
                    String::from("chrUn")
                } else {
                    String::from("chr1")
                },
                begin: i * 1_000,
                end: i * 1_000 + 500,
                sv_type: SvType::Del,
                ..Default::default()
            })
            .map(Ok)
            .collect()
    }

    fn handle() -> LandscapeHandle {
        let registry = test_registry();
        LandscapeHandle::new(landscape(&VecLoader {
            enhancers: vec![enhancer(
                &registry,
                "enh1",
                "1",
                3_000,
                3_500,
                true,
                &[("HP:1", 0.5)],
            )],
            genes: vec![gene(&registry, "HGNC:1", "A", "1", 0, 10_000, &[])],
            ..Default::default()
        }))
    }

    #[test]
    fn batch_with_unknown_contig() {
        let records = records();

        let ranking = prioritize_batch(
            &records,
            &handle(),
            &PriorityScorer::default(),
            &CancellationFlag::new(),
        );

        assert_eq!(ranking.ranked.len(), 9);
        assert_eq!(ranking.failures.len(), 1);
        assert_eq!(ranking.failures[0].variant_id, "sv07");
        assert_eq!(ranking.failures[0].index, 7);
        assert_eq!(
            ranking.failures[0].reason,
            FailureReason::Invalid(Error::UnknownContig(String::from("chrUn")))
        );

        // sv03 hits the developmental enhancer, all others only the gene
        assert_eq!(ranking.ranked[0].priority.variant_id, "sv03");
        assert_approx_eq!(f64, ranking.ranked[0].priority.score, 1.05);
        assert_eq!(
            ranking.ranked[1..]
                .iter()
                .map(|r| r.priority.variant_id.as_str())
                .collect::<Vec<_>>(),
            vec!["sv00", "sv01", "sv02", "sv04", "sv05", "sv06", "sv08", "sv09"]
        );
        assert_eq!(
            ranking.ranked.iter().map(|r| r.rank).collect::<Vec<_>>(),
            (1..=9).collect::<Vec<_>>()
        );
    }

    #[test]
    fn batch_is_deterministic() {
        let records = records();
        let handle = handle();
        let scorer = PriorityScorer::default();

        let first = prioritize_batch(&records, &handle, &scorer, &CancellationFlag::new());
        let second = prioritize_batch(&records, &handle, &scorer, &CancellationFlag::new());

        assert_eq!(first, second);
    }

    #[test]
    fn batch_cancelled() {
        let records = records();
        let cancel = CancellationFlag::new();
        cancel.cancel();

        let ranking = prioritize_batch(&records, &handle(), &PriorityScorer::default(), &cancel);

        assert!(ranking.ranked.is_empty());
        assert_eq!(ranking.failures.len(), 10);
        assert!(ranking
            .failures
            .iter()
            .all(|f| f.reason == FailureReason::Cancelled));
    }

    #[test]
    fn batch_after_landscape_swap() {
        let records = records();
        let handle = handle();
        let scorer = PriorityScorer::default();
        let before = prioritize_batch(&records, &handle, &scorer, &CancellationFlag::new());

        let registry = test_registry();
        let previous = handle.replace(landscape(&VecLoader {
            genes: vec![gene(&registry, "HGNC:2", "B", "1", 9_000, 9_500, &[])],
            ..Default::default()
        }));
        let after = prioritize_batch(&records, &handle, &scorer, &CancellationFlag::new());

        assert_eq!(before.ranked[0].priority.variant_id, "sv03");
        assert_eq!(after.ranked[0].priority.variant_id, "sv09");
        assert_approx_eq!(f64, after.ranked[0].priority.score, 1.0);
        assert_eq!(previous.enhancers().len(), 1);
    }

    #[test]
    fn batch_with_rejected_row() {
        let mut records = records();
        records[2] = Err(RejectedRow {
            id: String::from("sv02"),
            chromosome: String::from("chr1"),
            error: Error::UnparseableRecord {
                line: 4,
                message: String::from("unknown variant `CPX`"),
            },
        });

        let ranking = prioritize_batch(
            &records,
            &handle(),
            &PriorityScorer::default(),
            &CancellationFlag::new(),
        );

        assert_eq!(ranking.ranked.len(), 8);
        assert_eq!(
            ranking
                .failures
                .iter()
                .map(|f| (f.index, f.variant_id.as_str()))
                .collect::<Vec<_>>(),
            vec![(2, "sv02"), (7, "sv07")]
        );
        assert!(matches!(
            ranking.failures[0].reason,
            FailureReason::Invalid(Error::UnparseableRecord { line: 4, .. })
        ));
    }

    #[test]
    fn batch_sees_single_landscape_during_swaps() {
        let records = records();
        let registry = test_registry();
        let with_gene = |hgnc_id: &str| {
            landscape(&VecLoader {
                genes: vec![gene(&registry, hgnc_id, "A", "1", 0, 10_000, &[])],
                ..Default::default()
            })
        };
        let handle = LandscapeHandle::new(with_gene("HGNC:1"));
        let scorer = PriorityScorer::default();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..500 {
                    handle.replace(with_gene(if i % 2 == 0 { "HGNC:2" } else { "HGNC:1" }));
                }
            });

            for _ in 0..20 {
                let ranking =
                    prioritize_batch(&records, &handle, &scorer, &CancellationFlag::new());
                let genes = ranking
                    .ranked
                    .iter()
                    .flat_map(|ranked| ranked.priority.contributions.iter())
                    .filter(|contribution| contribution.layer == Layer::Gene)
                    .map(|contribution| contribution.record_id.as_str())
                    .collect::<BTreeSet<_>>();
                assert_eq!(ranking.ranked.len(), 9);
                assert_eq!(genes.len(), 1, "mixed landscapes: {:?}", genes);
            }
        });
    }
}
