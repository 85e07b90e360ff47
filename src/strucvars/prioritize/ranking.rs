//! Deterministic ranking of priorities.

use crate::err::Error;

use super::scorer::SvPriority;

/// Why a variant could not be scored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FailureReason {
    #[error(transparent)]
    Invalid(#[from] Error),
    #[error("cancelled before processing")]
    Cancelled,
}

/// A variant that could not be scored.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantFailure {
    /// Position in the input.
    pub index: usize,
    pub variant_id: String,
    pub reason: FailureReason,
}

/// Outcome for one input variant.
pub type VariantOutcome = Result<SvPriority, VariantFailure>;

/// A priority together with its 1-based rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPriority {
    pub rank: usize,
    /// Position in the input.
    pub index: usize,
    pub priority: SvPriority,
}

/// Ranked priorities followed by the failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    /// By descending score, then ascending variant id.
    pub ranked: Vec<RankedPriority>,
    /// By ascending variant id.
    pub failures: Vec<VariantFailure>,
}

/// Rank the `outcomes`, given in input order.
pub fn rank(outcomes: Vec<VariantOutcome>) -> Ranking {
    let mut scored = Vec::new();
    let mut failures = Vec::new();
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(priority) => scored.push((index, priority)),
            Err(failure) => failures.push(failure),
        }
    }

    scored.sort_by(|(idx_a, a), (idx_b, b)| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.variant_id.cmp(&b.variant_id))
            .then(idx_a.cmp(idx_b))
    });
    failures.sort_by(|a, b| {
        a.variant_id
            .cmp(&b.variant_id)
            .then(a.index.cmp(&b.index))
    });

    Ranking {
        ranked: scored
            .into_iter()
            .enumerate()
            .map(|(i, (index, priority))| RankedPriority {
                rank: i + 1,
                index,
                priority,
            })
            .collect(),
        failures,
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{rank, FailureReason, VariantFailure, VariantOutcome};
    use crate::{err::Error, strucvars::prioritize::scorer::SvPriority};

    fn priority(id: &str, score: f64) -> VariantOutcome {
        Ok(SvPriority {
            variant_id: id.to_owned(),
            score,
            contributions: Vec::new(),
        })
    }

    fn failure(index: usize, id: &str) -> VariantOutcome {
        Err(VariantFailure {
            index,
            variant_id: id.to_owned(),
            reason: FailureReason::Invalid(Error::UnknownContig(String::from("chrUn"))),
        })
    }

    #[test]
    fn rank_orders_by_score_then_id() {
        let ranking = rank(vec![
            priority("b", 1.0),
            failure(1, "z"),
            priority("c", 2.0),
            priority("a", 1.0),
            failure(4, "y"),
            priority("d", 0.0),
        ]);

        assert_eq!(
            ranking
                .ranked
                .iter()
                .map(|r| (r.rank, r.index, r.priority.variant_id.as_str()))
                .collect::<Vec<_>>(),
            vec![(1, 2, "c"), (2, 3, "a"), (3, 0, "b"), (4, 5, "d")]
        );
        assert_eq!(
            ranking
                .failures
                .iter()
                .map(|f| f.variant_id.as_str())
                .collect::<Vec<_>>(),
            vec!["y", "z"]
        );
    }

    #[test]
    fn rank_is_stable_under_permutation() {
        let outcomes = vec![
            priority("v1", 0.5),
            priority("v2", 0.5),
            priority("v3", 3.0),
            priority("v4", 0.0),
            priority("v5", 0.5),
        ];
        let expected = rank(outcomes.clone())
            .ranked
            .into_iter()
            .map(|r| r.priority.variant_id)
            .collect::<Vec<_>>();

        let mut permuted = outcomes;
        permuted.reverse();
        permuted.swap(1, 3);
        let actual = rank(permuted)
            .ranked
            .into_iter()
            .map(|r| r.priority.variant_id)
            .collect::<Vec<_>>();

        assert_eq!(actual, expected);
        assert_eq!(expected, vec!["v3", "v1", "v2", "v5", "v4"]);
    }

    #[test]
    fn rank_empty() {
        let ranking = rank(Vec::new());

        assert!(ranking.ranked.is_empty());
        assert!(ranking.failures.is_empty());
    }
}
