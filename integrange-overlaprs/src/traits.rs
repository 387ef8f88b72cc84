pub use integrange_core::models::{Coord, Interval, Payload};

/// An index answering closed-range overlap queries.
pub trait Overlapper<I: Coord, T: Payload>: Send + Sync {
    fn build(intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized;

    /// All intervals overlapping `[start, end]`, ordered by (start, end).
    fn find(&self, start: I, end: I) -> Vec<Interval<I, T>>;

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
