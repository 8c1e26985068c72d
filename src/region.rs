//! Genome region descriptors
//!
//! Parses samtools-style region strings ("chr20", "chr2:100-2000") into
//! structured descriptors used to restrict an analysis to part of the
//! genome. A single option value may carry several disjoint regions joined
//! by '+'.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// A single genome region: a chromosome with an optional coordinate span.
///
/// Spans are 1-based closed intervals. `start` and `end` are always either
/// both present or both absent; a bare chromosome name selects the whole
/// chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeRegion {
    /// Chromosome name
    pub chrom: String,
    /// Span start (1-based, inclusive)
    pub start: Option<u64>,
    /// Span end (inclusive)
    pub end: Option<u64>,
}

impl GenomeRegion {
    /// Select a whole chromosome.
    pub fn whole_chrom(chrom: impl Into<String>) -> Self {
        Self {
            chrom: chrom.into(),
            start: None,
            end: None,
        }
    }

    /// Select a coordinate span within a chromosome.
    pub fn span(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start: Some(start),
            end: Some(end),
        }
    }

    /// Parse one samtools-style region token.
    ///
    /// Accepted forms are `chrom` and `chrom:start-end` with `start >= 1`
    /// and `end >= start`. Anything else is a fatal configuration error
    /// naming the offending token.
    pub fn parse(token: &str) -> Result<Self, ConfigurationError> {
        let token = token.trim();
        let words: Vec<&str> = token.split(':').collect();
        if words.len() > 2 {
            return Err(ConfigurationError::malformed_region(
                token,
                "more than one ':' separator",
            ));
        }

        let chrom = words[0];
        if chrom.is_empty() {
            return Err(ConfigurationError::malformed_region(
                token,
                "missing chromosome name",
            ));
        }

        if words.len() == 1 {
            return Ok(Self::whole_chrom(chrom));
        }

        let range: Vec<&str> = words[1].split('-').collect();
        if range.len() != 2 {
            return Err(ConfigurationError::malformed_region(
                token,
                "coordinate span must be of the form start-end",
            ));
        }

        let start: u64 = range[0].parse().map_err(|_| {
            ConfigurationError::malformed_region(token, "span start is not a number")
        })?;
        let end: u64 = range[1].parse().map_err(|_| {
            ConfigurationError::malformed_region(token, "span end is not a number")
        })?;

        if start < 1 {
            return Err(ConfigurationError::malformed_region(
                token,
                "span start must be >= 1",
            ));
        }
        if end < start {
            return Err(ConfigurationError::malformed_region(
                token,
                "span end is before span start",
            ));
        }

        Ok(Self::span(chrom, start, end))
    }
}

impl std::fmt::Display for GenomeRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start, self.end) {
            (Some(start), Some(end)) => write!(f, "{}:{}-{}", self.chrom, start, end),
            _ => f.write_str(&self.chrom),
        }
    }
}

/// The set of genome regions an analysis is restricted to.
///
/// Regions are caller-declared non-overlapping; overlap is not checked
/// here and overlapping input produces meaningless downstream results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionSet {
    /// No restriction: analyze the whole genome
    WholeGenome,
    /// Analyze only the listed regions (never empty)
    Restricted(Vec<GenomeRegion>),
}

impl RegionSet {
    /// Parse the raw region option values into a region set.
    ///
    /// Each value is first split on '+' so one flag can express multiple
    /// disjoint regions; resulting tokens are parsed left to right, outer
    /// list first. No values at all means the whole genome.
    pub fn parse(raw: &[String]) -> Result<Self, ConfigurationError> {
        if raw.is_empty() {
            return Ok(Self::WholeGenome);
        }

        let mut regions = Vec::new();
        for value in raw {
            for token in value.split('+') {
                regions.push(GenomeRegion::parse(token)?);
            }
        }
        Ok(Self::Restricted(regions))
    }

    /// True when no region restriction applies.
    pub fn is_whole_genome(&self) -> bool {
        matches!(self, Self::WholeGenome)
    }

    /// The restricted regions, empty for the whole genome.
    pub fn regions(&self) -> &[GenomeRegion] {
        match self {
            Self::WholeGenome => &[],
            Self::Restricted(regions) => regions,
        }
    }
}
