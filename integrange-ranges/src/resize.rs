//! Anchored resizing of interval stores.
//!
//! Widths are closed: a resized interval covers exactly `width` bases.
//! Unstranded intervals are resized as if they were on the plus strand.

use std::fmt::{self, Display};
use std::str::FromStr;

use integrange_core::models::{IntervalStore, Record, Strand};
use log::{debug, warn};

use crate::errors::{RangesError, RangesResult};

/// The point of an interval that stays fixed while resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    FivePrime,
    ThreePrime,
    Center,
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" | "five_prime" | "5p" | "5'" => Ok(Anchor::FivePrime),
            "end" | "three_prime" | "3p" | "3'" => Ok(Anchor::ThreePrime),
            "center" | "centre" => Ok(Anchor::Center),
            other => Err(format!("unknown anchor: {}", other)),
        }
    }
}

impl Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::FivePrime => write!(f, "start"),
            Anchor::ThreePrime => write!(f, "end"),
            Anchor::Center => write!(f, "center"),
        }
    }
}

/// Resized closed coordinates of one record, before any range check.
fn resized_unchecked(record: &Record, anchor: Anchor, width: u32) -> (i64, i64) {
    let w = width as i64;
    let start = record.start as i64;
    let end = record.end as i64;
    let keep_start = |s: i64| (s, s + w - 1);
    let keep_end = |e: i64| (e - w + 1, e);

    match (anchor, record.strand) {
        (Anchor::FivePrime, Strand::Minus) => keep_end(end),
        (Anchor::FivePrime, _) => keep_start(start),
        (Anchor::ThreePrime, Strand::Minus) => keep_start(start),
        (Anchor::ThreePrime, _) => keep_end(end),
        (Anchor::Center, _) => keep_start((start + end - w + 1).div_euclid(2)),
    }
}

fn resized(record: &Record, anchor: Anchor, width: u32) -> RangesResult<(u32, u32)> {
    let (new_start, new_end) = resized_unchecked(record, anchor, width);
    match (u32::try_from(new_start), u32::try_from(new_end)) {
        (Ok(s), Ok(e)) => Ok((s, e)),
        _ => Err(RangesError::CoordinateOutOfRange {
            interval: record.to_string(),
            width,
        }),
    }
}

///
/// Resize every interval of a store to `width` bases around an anchor.
///
/// - `FivePrime` keeps the 5' end: `start` on `+`/`*`, `end` on `-`.
/// - `ThreePrime` keeps the 3' end: `end` on `+`/`*`, `start` on `-`.
/// - `Center` places the new interval at `floor((start + end - width + 1) / 2)`,
///   so applying the same center resize twice changes nothing.
///
/// Sequence names, strands and metadata are kept.
///
/// # Arguments:
/// - store: the intervals to resize
/// - anchor: which point stays fixed
/// - width: new width, at least 1
pub fn anchor_resize(store: &IntervalStore, anchor: Anchor, width: u32) -> RangesResult<IntervalStore> {
    if width == 0 {
        return Err(RangesError::InvalidWidth(width));
    }
    let ranges = store
        .iter()
        .map(|r| resized(r, anchor, width))
        .collect::<RangesResult<Vec<_>>>()?;
    debug!("Resized {} intervals to width {} ({})", store.len(), width, anchor);
    Ok(store.with_ranges(ranges)?)
}

///
/// Windows of `width` bases centered on each interval's transcription start site.
///
pub fn tss_windows(store: &IntervalStore, width: u32) -> RangesResult<IntervalStore> {
    let tss = anchor_resize(store, Anchor::FivePrime, 1)?;
    anchor_resize(&tss, Anchor::Center, width)
}

///
/// Like [tss_windows], but windows running past either end of the coordinate
/// space are trimmed to it instead of failing. Trimmed windows are shorter
/// than `width`; how many were trimmed is logged as a warning.
///
pub fn trimmed_tss_windows(store: &IntervalStore, width: u32) -> RangesResult<IntervalStore> {
    if width == 0 {
        return Err(RangesError::InvalidWidth(width));
    }
    let tss = anchor_resize(store, Anchor::FivePrime, 1)?;
    let mut trimmed = 0usize;
    let ranges = tss
        .iter()
        .map(|r| {
            let (s, e) = resized_unchecked(r, Anchor::Center, width);
            let (cs, ce) = (s.max(0), e.min(u32::MAX as i64));
            if (cs, ce) != (s, e) {
                trimmed += 1;
            }
            (cs as u32, ce as u32)
        })
        .collect::<Vec<_>>();
    if trimmed > 0 {
        warn!(
            "Trimmed {} of {} TSS windows at the edge of their sequence",
            trimmed,
            tss.len()
        );
    }
    Ok(tss.with_ranges(ranges)?)
}

/// Resize operations as methods on a store.
pub trait IntervalResize {
    fn anchor_resize(&self, anchor: Anchor, width: u32) -> RangesResult<IntervalStore>;

    fn tss_windows(&self, width: u32) -> RangesResult<IntervalStore>;
}

impl IntervalResize for IntervalStore {
    fn anchor_resize(&self, anchor: Anchor, width: u32) -> RangesResult<IntervalStore> {
        anchor_resize(self, anchor, width)
    }

    fn tss_windows(&self, width: u32) -> RangesResult<IntervalStore> {
        tss_windows(self, width)
    }
}
