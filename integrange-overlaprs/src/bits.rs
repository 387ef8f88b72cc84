use num_traits::identities::{one, zero};

use super::Overlapper;
use integrange_core::models::{Coord, Interval, Payload};

/// A Binary Interval Search index over closed intervals.
///
/// From the journal article: <https://academic.oup.com/bioinformatics/article/29/1/1/273289>
///
/// Intervals are kept sorted by start and the longest span is tracked, so a
/// query binary-searches the first candidate at `start - max_span` and scans
/// forward until starts pass the query end.
///
/// # Examples
///
/// ```
/// use integrange_overlaprs::{Bits, Overlapper, Interval};
///
/// let genes = vec![
///     Interval { start: 100u32, end: 150, val: 0usize },
///     Interval { start: 200, end: 250, val: 1 },
///     Interval { start: 250, end: 275, val: 2 },
/// ];
///
/// let bits = Bits::build(genes);
///
/// // closed coordinates: position 250 touches both later intervals
/// assert_eq!(bits.find(250, 250).len(), 2);
/// assert_eq!(bits.count(151, 199), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Bits<I, T>
where
    I: Coord,
    T: Payload,
{
    /// Intervals sorted by (start, end)
    pub intervals: Vec<Interval<I, T>>,
    /// Sorted list of start positions
    starts: Vec<I>,
    /// Sorted list of end positions
    ends: Vec<I>,
    /// The largest `end - start` of any interval
    max_span: I,
}

impl<I, T> Overlapper<I, T> for Bits<I, T>
where
    I: Coord,
    T: Payload,
{
    /// Create a new instance of Bits. The intervals are sorted immediately.
    fn build(mut intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized,
    {
        intervals.sort();
        let (mut starts, mut ends): (Vec<_>, Vec<_>) =
            intervals.iter().map(|x| (x.start, x.end)).unzip();
        starts.sort();
        ends.sort();
        let max_span = intervals
            .iter()
            .map(|iv| iv.end.checked_sub(&iv.start).unwrap_or_else(zero::<I>))
            .max()
            .unwrap_or_else(zero::<I>);
        Bits {
            intervals,
            starts,
            ends,
            max_span,
        }
    }

    #[inline]
    fn find(&self, start: I, stop: I) -> Vec<Interval<I, T>> {
        self.find_iter(start, stop).cloned().collect()
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        stop: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        Box::new(IterFind {
            inner: self,
            off: self.first_candidate(start),
            start,
            stop,
        })
    }

    #[inline]
    fn len(&self) -> usize {
        self.intervals.len()
    }
}

impl<I, T> Bits<I, T>
where
    I: Coord,
    T: Payload,
{
    /// Return an iterator over the intervals in start order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Interval<I, T>> {
        self.intervals.iter()
    }

    #[inline]
    fn first_candidate(&self, start: I) -> usize {
        Self::lower_bound(
            start.checked_sub(&self.max_span).unwrap_or_else(zero::<I>),
            &self.intervals,
        )
    }

    /// First index whose interval starts at or after `start`.
    #[inline]
    pub fn lower_bound(start: I, intervals: &[Interval<I, T>]) -> usize {
        let mut size = intervals.len();
        let mut low = 0;

        while size > 0 {
            let half = size / 2;
            let other_half = size - half;
            let probe = low + half;
            let other_low = low + other_half;
            let v = &intervals[probe];
            size = half;
            low = if v.start < start { other_low } else { low }
        }
        low
    }

    /// Number of elements of the sorted slice `elems` that are strictly less than `key`.
    #[inline]
    pub fn bsearch_seq<K>(key: K, elems: &[K]) -> usize
    where
        K: PartialOrd,
    {
        elems.partition_point(|e| *e < key)
    }

    /// Count the intervals overlapping `[start, stop]` without scanning them.
    ///
    /// Everything ending before `start` or starting after `stop` is excluded by
    /// two binary searches; the rest overlaps.
    #[inline]
    pub fn count(&self, start: I, stop: I) -> usize {
        let len = self.intervals.len();
        let ends_before = Self::bsearch_seq(start, &self.ends);
        let starts_after = match stop.checked_add(&one::<I>()) {
            Some(next) => len - Self::bsearch_seq(next, &self.starts),
            None => 0,
        };
        len - ends_before - starts_after
    }
}

/// Iterator over the intervals of a [`Bits`] that overlap a query range.
#[derive(Debug)]
pub struct IterFind<'a, I, T>
where
    T: Payload + 'a,
    I: Coord,
{
    inner: &'a Bits<I, T>,
    off: usize,
    start: I,
    stop: I,
}

impl<'a, I, T> Iterator for IterFind<'a, I, T>
where
    T: Payload + 'a,
    I: Coord,
{
    type Item = &'a Interval<I, T>;

    #[inline]
    // interval.start <= stop && interval.end >= start
    fn next(&mut self) -> Option<Self::Item> {
        while self.off < self.inner.intervals.len() {
            let interval = &self.inner.intervals[self.off];
            self.off += 1;
            if interval.overlap(self.start, self.stop) {
                return Some(interval);
            } else if interval.start > self.stop {
                break;
            }
        }
        None
    }
}

impl<'a, I, T> IntoIterator for &'a Bits<I, T>
where
    T: Payload + 'a,
    I: Coord,
{
    type Item = &'a Interval<I, T>;
    type IntoIter = std::slice::Iter<'a, Interval<I, T>>;

    fn into_iter(self) -> std::slice::Iter<'a, Interval<I, T>> {
        self.intervals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn intervals() -> Vec<Interval<u32, &'static str>> {
        vec![
            Interval {
                start: 1,
                end: 5,
                val: "a",
            },
            Interval {
                start: 3,
                end: 7,
                val: "b",
            },
            Interval {
                start: 6,
                end: 10,
                val: "c",
            },
            Interval {
                start: 8,
                end: 12,
                val: "d",
            },
            Interval {
                start: 20,
                end: 20,
                val: "point",
            },
        ]
    }

    fn vals(hits: &[Interval<u32, &'static str>]) -> Vec<&'static str> {
        hits.iter().map(|i| i.val).collect()
    }

    #[rstest]
    fn test_build_and_len(intervals: Vec<Interval<u32, &'static str>>) {
        let bits = Bits::build(intervals.clone());
        assert_eq!(bits.len(), intervals.len());
        assert!(!bits.is_empty());
    }

    #[rstest]
    #[case(2, 4, vec!["a", "b"])]
    #[case(5, 5, vec!["a", "b"])]
    #[case(10, 10, vec!["c", "d"])]
    #[case(13, 19, vec![])]
    #[case(20, 20, vec!["point"])]
    #[case(0, 100, vec!["a", "b", "c", "d", "point"])]
    fn test_find_closed(
        intervals: Vec<Interval<u32, &'static str>>,
        #[case] start: u32,
        #[case] stop: u32,
        #[case] expected: Vec<&'static str>,
    ) {
        let bits = Bits::build(intervals);
        let hits = bits.find(start, stop);
        assert_eq!(vals(&hits), expected);
        assert_eq!(bits.count(start, stop), expected.len());
    }

    #[rstest]
    fn test_count_at_max_coordinate() {
        let bits = Bits::build(vec![Interval {
            start: u32::MAX - 1,
            end: u32::MAX,
            val: 0usize,
        }]);
        assert_eq!(bits.count(u32::MAX, u32::MAX), 1);
        assert_eq!(bits.find(u32::MAX, u32::MAX).len(), 1);
    }

    #[rstest]
    fn test_empty_bits() {
        let bits: Bits<u32, &str> = Bits::build(vec![]);
        assert!(bits.is_empty());
        assert!(bits.find(1, 2).is_empty());
        assert_eq!(bits.count(1, 2), 0);
    }

    proptest! {
        #[test]
        fn find_matches_linear_scan(
            raw in proptest::collection::vec((0u32..500, 0u32..60), 0..40),
            qstart in 0u32..560,
            qlen in 0u32..40,
        ) {
            let intervals: Vec<Interval<u32, usize>> = raw
                .iter()
                .enumerate()
                .map(|(i, &(s, w))| Interval { start: s, end: s + w, val: i })
                .collect();
            let qend = qstart + qlen;
            let mut expected: Vec<usize> = intervals
                .iter()
                .filter(|iv| iv.start <= qend && qstart <= iv.end)
                .map(|iv| iv.val)
                .collect();
            expected.sort();

            let bits = Bits::build(intervals);
            let mut found: Vec<usize> = bits.find_iter(qstart, qend).map(|iv| iv.val).collect();
            found.sort();

            prop_assert_eq!(bits.count(qstart, qend), expected.len());
            prop_assert_eq!(found, expected);
        }
    }
}
