use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};

/// Sequence naming convention of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SeqnameStyle {
    /// `chr1`, `chrX`, `chrM`
    Ucsc,
    /// `1`, `X`, `MT`
    Ensembl,
}

impl SeqnameStyle {
    ///
    /// Rename a sequence from this style into `target`.
    ///
    /// Names that do not follow the source convention are returned unchanged.
    pub fn convert(&self, name: &str, target: SeqnameStyle) -> String {
        match (self, target) {
            (SeqnameStyle::Ucsc, SeqnameStyle::Ensembl) => match name {
                "chrM" => "MT".to_string(),
                _ => name.strip_prefix("chr").unwrap_or(name).to_string(),
            },
            (SeqnameStyle::Ensembl, SeqnameStyle::Ucsc) => match name {
                "MT" => "chrM".to_string(),
                n if n.starts_with("chr") => n.to_string(),
                n => format!("chr{}", n),
            },
            _ => name.to_string(),
        }
    }
}

impl FromStr for SeqnameStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ucsc" => Ok(SeqnameStyle::Ucsc),
            "ensembl" | "ncbi" => Ok(SeqnameStyle::Ensembl),
            other => Err(format!("unknown seqname style: {}", other)),
        }
    }
}

impl Display for SeqnameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeqnameStyle::Ucsc => write!(f, "UCSC"),
            SeqnameStyle::Ensembl => write!(f, "Ensembl"),
        }
    }
}

///
/// Reference genome identity carried by every interval store.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenomeInfo {
    pub build: String,
    pub style: SeqnameStyle,
}

impl GenomeInfo {
    pub fn new(build: &str, style: SeqnameStyle) -> Self {
        GenomeInfo {
            build: build.to_string(),
            style,
        }
    }

    /// Fails with [`StoreError::GenomeMismatch`] unless build and style both match.
    pub fn check_compatible(&self, other: &GenomeInfo) -> StoreResult<()> {
        if self == other {
            Ok(())
        } else {
            Err(StoreError::GenomeMismatch {
                left: self.to_string(),
                right: other.to_string(),
            })
        }
    }
}

impl Display for GenomeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.build, self.style)
    }
}
