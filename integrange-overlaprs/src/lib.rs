//! Closed-interval overlap operations for integrange stores.
//!
//! The [`Bits`] index answers single-sequence queries; a
//! [`MultiChromOverlapper`](multi_chrom_overlapper::MultiChromOverlapper)
//! holds one per sequence. [`left_join_overlap`] and [`count_overlaps`] are
//! built on top of them.
//!
//! ```rust
//! use integrange_overlaprs::{Bits, Overlapper, Interval};
//!
//! let peaks = vec![
//!     Interval { start: 100u32, end: 200, val: 0usize },
//!     Interval { start: 150, end: 300, val: 1 },
//!     Interval { start: 400, end: 500, val: 2 },
//! ];
//! let bits = Bits::build(peaks);
//! assert_eq!(bits.find(200, 250).len(), 2);
//! ```

/// Binary Interval Search implementation.
///
/// See [`Bits`] for details.
pub mod bits;

pub mod join;

/// Genome-wide interval indexing.
pub mod multi_chrom_overlapper;

/// Core traits for overlap operations.
///
/// See [`Overlapper`] for the main trait.
pub mod traits;

// re-exports
pub use self::bits::Bits;
pub use self::join::{JoinOptions, StrandMode, count_overlaps, left_join_overlap};
pub use self::traits::{Interval, Overlapper};
