use std::fmt::{self, Display};
use std::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::models::strand::Strand;
use crate::models::value::{Value, format_field};

///
/// Record struct, one genomic interval of an [IntervalStore](crate::models::IntervalStore)
/// together with its metadata values.
///
/// Coordinates are closed: the record covers `start..=end`.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    pub seqname: String,
    pub start: u32,
    pub end: u32,
    pub strand: Strand,

    pub values: Vec<Option<Value>>,
}

impl Record {
    pub fn new(seqname: &str, start: u32, end: u32, strand: Strand) -> Self {
        Record {
            seqname: seqname.to_string(),
            start,
            end,
            strand,
            values: Vec::new(),
        }
    }

    pub fn with_values(mut self, values: Vec<Option<Value>>) -> Self {
        self.values = values;
        self
    }

    /// Number of bases covered.
    pub fn width(&self) -> u64 {
        (self.end as u64) - (self.start as u64) + 1
    }

    /// The 5' coordinate: `end` on the minus strand, `start` otherwise.
    pub fn tss(&self) -> u32 {
        match self.strand {
            Strand::Minus => self.end,
            _ => self.start,
        }
    }

    /// Closed-interval overlap on the same sequence, ignoring strand.
    pub fn overlaps(&self, other: &Record) -> bool {
        self.seqname == other.seqname && self.start <= other.end && other.start <= self.end
    }

    pub fn same_range(&self, other: &Record) -> bool {
        self.seqname == other.seqname
            && self.start == other.start
            && self.end == other.end
            && self.strand == other.strand
    }

    ///
    /// Get the TSV line of this record
    ///
    pub fn as_string(&self) -> String {
        let mut fields = vec![
            self.seqname.clone(),
            self.start.to_string(),
            self.end.to_string(),
            self.strand.to_string(),
        ];
        fields.extend(self.values.iter().map(|v| format_field(v.as_ref())));
        fields.join("\t")
    }
}

impl Index<usize> for Record {
    type Output = Option<Value>;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.values[idx]
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.seqname, self.start, self.end, self.strand
        )
    }
}
