//! Static interval indices over located records.

use std::collections::HashMap;

use bio::data_structures::interval_tree::ArrayBackedIntervalTree;

use super::coords::{ContigId, GenomicRegion, Strand};

/// Alias for the interval tree that we use.
type IntervalTree = ArrayBackedIntervalTree<u32, u32>;

/// Capability shared by all records that can be put into an index.
pub trait Located {
    /// The genomic region of the record.
    fn region(&self) -> &GenomicRegion;

    /// Stable secondary sort key, e.g., the record identifier.
    fn key(&self) -> &str;
}

/// Half-open positive strand key for the tree.
///
/// Empty ranges are widened to one base so the tree reports them as
/// candidates; the exact overlap test is done on the `GenomicRegion`s.
fn tree_key(region: &GenomicRegion) -> std::ops::Range<u32> {
    let start = region.start_on_strand(Strand::Positive);
    let end = region.end_on_strand(Strand::Positive);
    start..std::cmp::max(end, start + 1)
}

/// Immutable interval index over the records of one contig.
#[derive(Debug)]
pub struct IntervalIndex<T> {
    /// Records, sorted by start, end, and key.
    records: Vec<T>,
    /// Interval tree pointing into `records`.
    tree: IntervalTree,
}

impl<T: Located> IntervalIndex<T> {
    /// Build index from the given records.
    pub fn build(mut records: Vec<T>) -> Self {
        records.sort_by(|a, b| {
            let (ra, rb) = (a.region(), b.region());
            ra.start_on_strand(Strand::Positive)
                .cmp(&rb.start_on_strand(Strand::Positive))
                .then(
                    ra.end_on_strand(Strand::Positive)
                        .cmp(&rb.end_on_strand(Strand::Positive)),
                )
                .then_with(|| a.key().cmp(b.key()))
        });

        let mut tree = IntervalTree::new();
        for (idx, record) in records.iter().enumerate() {
            tree.insert(tree_key(record.region()), idx as u32);
        }
        tree.index();

        Self { records, tree }
    }

    /// Return all records overlapping `region`, ordered by start, end, and key.
    pub fn query(&self, region: &GenomicRegion) -> Vec<&T> {
        let mut idxs = self
            .tree
            .find(tree_key(region))
            .iter()
            .map(|entry| *entry.data() as usize)
            .filter(|idx| self.records[*idx].region().overlaps(region))
            .collect::<Vec<_>>();
        idxs.sort_unstable();
        idxs.into_iter().map(|idx| &self.records[idx]).collect()
    }

    /// All records in index order.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Stable reference to a record in a `ContigIndex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle {
    contig: ContigId,
    pos: usize,
}

/// Per-contig collection of `IntervalIndex`es.
#[derive(Debug)]
pub struct ContigIndex<T> {
    by_contig: HashMap<ContigId, IntervalIndex<T>>,
}

impl<T> Default for ContigIndex<T> {
    fn default() -> Self {
        Self {
            by_contig: HashMap::new(),
        }
    }
}

impl<T: Located> ContigIndex<T> {
    /// Group `records` by contig and build one index per contig.
    pub fn build(records: Vec<T>) -> Self {
        let mut grouped: HashMap<ContigId, Vec<T>> = HashMap::new();
        for record in records {
            grouped
                .entry(record.region().contig_id())
                .or_default()
                .push(record);
        }

        Self {
            by_contig: grouped
                .into_iter()
                .map(|(contig, records)| (contig, IntervalIndex::build(records)))
                .collect(),
        }
    }

    /// Overlapping records; empty if there is no index for the contig.
    pub fn query(&self, region: &GenomicRegion) -> Vec<&T> {
        self.by_contig
            .get(&region.contig_id())
            .map(|index| index.query(region))
            .unwrap_or_default()
    }

    /// Iterate all records, contig by contig in id order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.iter_handles().map(|(_, record)| record)
    }

    /// Like `iter` but also yield the handle for `get`.
    pub fn iter_handles(&self) -> impl Iterator<Item = (RecordHandle, &T)> {
        let mut contigs = self.by_contig.keys().copied().collect::<Vec<_>>();
        contigs.sort();
        contigs.into_iter().flat_map(move |contig| {
            self.by_contig[&contig]
                .records()
                .iter()
                .enumerate()
                .map(move |(pos, record)| (RecordHandle { contig, pos }, record))
        })
    }

    /// Record for a handle from `iter_handles`.
    pub fn get(&self, handle: RecordHandle) -> Option<&T> {
        self.by_contig
            .get(&handle.contig)
            .and_then(|index| index.records().get(handle.pos))
    }

    pub fn len(&self) -> usize {
        self.by_contig.values().map(|index| index.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{ContigIndex, IntervalIndex, Located};
    use crate::common::coords::{ContigRegistry, GenomicRegion, Strand};

    #[derive(Debug, Clone)]
    struct Record {
        id: String,
        region: GenomicRegion,
    }

    impl Located for Record {
        fn region(&self) -> &GenomicRegion {
            &self.region
        }

        fn key(&self) -> &str {
            &self.id
        }
    }

    #[rstest::fixture]
    fn registry() -> ContigRegistry {
        ContigRegistry::new(vec![("1", 10_000, vec![]), ("2", 10_000, vec![])])
    }

    fn region(registry: &ContigRegistry, chrom: &str, start: i64, end: i64) -> GenomicRegion {
        GenomicRegion::new(registry.resolve(chrom).unwrap(), Strand::Positive, start, end).unwrap()
    }

    fn records(registry: &ContigRegistry) -> Vec<Record> {
        vec![
            ("e", 500, 600),
            ("d", 100, 200),
            ("c", 100, 200),
            ("b", 150, 400),
            ("a", 1_000, 1_100),
        ]
        .into_iter()
        .map(|(id, start, end)| Record {
            id: id.to_owned(),
            region: region(registry, "1", start, end),
        })
        .collect()
    }

    fn ids(records: Vec<&Record>) -> Vec<&str> {
        records.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[rstest::rstest]
    #[case(0, 50, vec![])]
    #[case(0, 100, vec![])]
    #[case(0, 101, vec!["c", "d"])]
    #[case(190, 510, vec!["c", "d", "b", "e"])]
    #[case(400, 500, vec![])]
    #[case(150, 150, vec!["c", "d"])]
    #[case(0, 10_000, vec!["c", "d", "b", "e", "a"])]
    fn interval_index_query(
        registry: ContigRegistry,
        #[case] start: i64,
        #[case] end: i64,
        #[case] expected: Vec<&str>,
    ) {
        let index = IntervalIndex::build(records(&registry));

        let result = index.query(&region(&registry, "1", start, end));

        assert_eq!(ids(result), expected);
    }

    #[rstest::rstest]
    fn interval_index_own_region(registry: ContigRegistry) {
        let records = records(&registry);
        let index = IntervalIndex::build(records.clone());

        for record in &records {
            let result = ids(index.query(&record.region));
            assert!(result.contains(&record.id.as_str()), "{:?}", record);
        }
        // identical coordinates are not deduplicated
        assert_eq!(ids(index.query(&records[1].region)), vec!["c", "d", "b"]);
    }

    #[rstest::rstest]
    fn interval_index_negative_strand_query(registry: ContigRegistry) {
        let index = IntervalIndex::build(records(&registry));
        let query = region(&registry, "1", 1_000, 1_050).with_strand(Strand::Negative);

        assert_eq!(ids(index.query(&query)), vec!["a"]);
    }

    #[rstest::rstest]
    fn contig_index_unknown_contig(registry: ContigRegistry) {
        let index = ContigIndex::build(records(&registry));

        assert_eq!(index.len(), 5);
        assert!(index.query(&region(&registry, "2", 0, 10_000)).is_empty());
        assert_eq!(
            ids(index.query(&region(&registry, "1", 0, 120))),
            vec!["c", "d"]
        );
        assert_eq!(
            index.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["c", "d", "b", "e", "a"]
        );
        for (handle, record) in index.iter_handles() {
            assert_eq!(index.get(handle).map(|r| r.id.as_str()), Some(record.id.as_str()));
        }
    }

    #[test]
    fn interval_index_empty() {
        let registry = ContigRegistry::new(vec![("1", 100, vec![])]);
        let index = IntervalIndex::<Record>::build(Vec::new());

        assert!(index.is_empty());
        assert!(index.query(&region(&registry, "1", 0, 100)).is_empty());
    }
}
