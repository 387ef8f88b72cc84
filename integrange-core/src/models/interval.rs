use num_traits::{PrimInt, Unsigned};
use std::cmp::Ordering::{self};

/// Unsigned integer usable as an interval coordinate.
pub trait Coord: PrimInt + Unsigned + Send + Sync {}

impl<I: PrimInt + Unsigned + Send + Sync> Coord for I {}

/// Value carried alongside an interval, typically a row position.
pub trait Payload: Eq + Clone + Send + Sync {}

impl<T: Eq + Clone + Send + Sync> Payload for T {}

/// Represent a closed range `[start, end]` carrying a payload.
#[derive(Eq, Debug, Clone)]
pub struct Interval<I, T>
where
    I: Coord,
    T: Payload,
{
    pub start: I,
    pub end: I,
    pub val: T,
}

impl<I: Coord, T: Payload> Ord for Interval<I, T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl<I, T> Interval<I, T>
where
    I: Coord,
    T: Payload,
{
    /// Check if this interval overlaps the closed range `[start, end]`.
    #[inline]
    pub fn overlap(&self, start: I, end: I) -> bool {
        self.start <= end && start <= self.end
    }

    /// Length minus one; zero for point intervals.
    #[inline]
    pub fn span(&self) -> I {
        self.end - self.start
    }
}

impl<I: Coord, T: Payload> PartialOrd for Interval<I, T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Equality ignores the payload.
impl<I: Coord, T: Payload> PartialEq for Interval<I, T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}
