//! Genome-wide interval indexing over every sequence of a store.
//!
//! [`MultiChromOverlapper`] keeps one [`Bits`] index per sequence name. Each
//! indexed interval carries the row position it came from, so hits can be
//! mapped back to the records of the indexed store.
//!
//! # Examples
//!
//! ```
//! use integrange_core::models::{GenomeInfo, IntervalStore, Record, Schema, SeqnameStyle, Strand};
//! use integrange_overlaprs::multi_chrom_overlapper::IntoMultiChromOverlapper;
//!
//! let peaks = IntervalStore::new(
//!     GenomeInfo::new("GRCh38", SeqnameStyle::Ucsc),
//!     Schema::empty(),
//!     vec![
//!         Record::new("chr1", 1000, 2000, Strand::Plus),
//!         Record::new("chr2", 1000, 3000, Strand::Minus),
//!     ],
//! )
//! .unwrap();
//!
//! let index = peaks.to_multi_chrom_overlapper();
//! let rows: Vec<usize> = index.find_rows("chr2", 2500, 2600);
//! assert_eq!(rows, vec![1]);
//! ```

use std::collections::HashMap;

use integrange_core::models::{Interval, IntervalStore};
use log::debug;

use crate::{Bits, Overlapper};

/// A genome-wide index for overlap queries across many sequences.
pub struct MultiChromOverlapper {
    index_maps: HashMap<String, Bits<u32, usize>>,
}

impl MultiChromOverlapper {
    /// Iterate over the indexed intervals on `seqname` overlapping `[start, end]`.
    ///
    /// Sequences without any indexed interval yield nothing.
    pub fn find_iter<'a>(
        &'a self,
        seqname: &str,
        start: u32,
        end: u32,
    ) -> Box<dyn Iterator<Item = &'a Interval<u32, usize>> + 'a> {
        match self.index_maps.get(seqname) {
            Some(bits) => bits.find_iter(start, end),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Row positions of the overlapping intervals, ascending.
    pub fn find_rows(&self, seqname: &str, start: u32, end: u32) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .find_iter(seqname, start, end)
            .map(|iv| iv.val)
            .collect();
        rows.sort_unstable();
        rows
    }

    pub fn count(&self, seqname: &str, start: u32, end: u32) -> usize {
        self.index_maps
            .get(seqname)
            .map(|bits| bits.count(start, end))
            .unwrap_or(0)
    }

    pub fn seqnames(&self) -> impl Iterator<Item = &str> {
        self.index_maps.keys().map(String::as_str)
    }

    /// Total number of indexed intervals.
    pub fn len(&self) -> usize {
        self.index_maps.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build a [`MultiChromOverlapper`] from a collection of intervals.
pub trait IntoMultiChromOverlapper {
    fn to_multi_chrom_overlapper(&self) -> MultiChromOverlapper;
}

impl IntoMultiChromOverlapper for IntervalStore {
    fn to_multi_chrom_overlapper(&self) -> MultiChromOverlapper {
        let mut intervals: HashMap<String, Vec<Interval<u32, usize>>> = HashMap::default();

        // STEP 1: organize records into one vector per sequence
        for (row, record) in self.iter().enumerate() {
            intervals
                .entry(record.seqname.clone())
                .or_default()
                .push(Interval {
                    start: record.start,
                    end: record.end,
                    val: row,
                });
        }

        // STEP 2: build one index per sequence
        let index_maps: HashMap<String, Bits<u32, usize>> = intervals
            .into_iter()
            .map(|(seqname, ivs)| (seqname, Bits::build(ivs)))
            .collect();

        debug!(
            "Indexed {} intervals over {} sequences",
            self.len(),
            index_maps.len()
        );

        MultiChromOverlapper { index_maps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use integrange_core::models::{GenomeInfo, Record, Schema, SeqnameStyle, Strand};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn store(records: Vec<Record>) -> IntervalStore {
        IntervalStore::new(
            GenomeInfo::new("GRCh38", SeqnameStyle::Ucsc),
            Schema::empty(),
            records,
        )
        .unwrap()
    }

    #[rstest]
    fn test_basic_overlaps() {
        let index = store(vec![
            Record::new("chr1", 100, 200, Strand::Plus),
            Record::new("chr1", 300, 400, Strand::Plus),
            Record::new("chr1", 600, 800, Strand::Plus),
        ])
        .to_multi_chrom_overlapper();

        assert_eq!(index.find_rows("chr1", 110, 210), vec![0]);
        assert_eq!(index.count("chr1", 110, 210), 1);
    }

    #[rstest]
    fn test_rows_are_ascending() {
        // the index sorts by start, rows come back in store order
        let index = store(vec![
            Record::new("chr1", 180, 300, Strand::Plus),
            Record::new("chr1", 100, 200, Strand::Plus),
            Record::new("chr1", 150, 250, Strand::Plus),
        ])
        .to_multi_chrom_overlapper();

        assert_eq!(index.find_rows("chr1", 160, 190), vec![0, 1, 2]);
    }

    #[rstest]
    #[case("chr1", 500, 600, 0)]
    #[case("chr3", 100, 200, 0)]
    #[case("chr2", 400, 400, 1)]
    fn test_counts(#[case] seqname: &str, #[case] start: u32, #[case] end: u32, #[case] n: usize) {
        let index = store(vec![
            Record::new("chr1", 100, 200, Strand::Plus),
            Record::new("chr2", 300, 400, Strand::Minus),
        ])
        .to_multi_chrom_overlapper();

        assert_eq!(index.len(), 2);
        assert_eq!(index.count(seqname, start, end), n);
        assert_eq!(index.find_rows(seqname, start, end).len(), n);
    }
}
