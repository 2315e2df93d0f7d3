// Human-readable job numbers: FS-<year>-<5-digit sequence>

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

pub const JOB_NUMBER_PREFIX: &str = "FS";

/// Exclusive upper bound of the per-year suffix space
pub const JOB_NUMBER_SUFFIX_LIMIT: u32 = 99_999;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobNumber {
    year: i32,
    sequence: u32,
}

impl JobNumber {
    pub fn new(year: i32, sequence: u32) -> Result<Self> {
        if !(0..=9999).contains(&year) {
            return Err(DomainError::InvalidJobNumber(format!(
                "year {} out of range",
                year
            )));
        }
        if sequence >= JOB_NUMBER_SUFFIX_LIMIT {
            return Err(DomainError::InvalidJobNumber(format!(
                "sequence {} out of range",
                sequence
            )));
        }
        Ok(Self { year, sequence })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Prefix shared by every job number of `year` (e.g. `FS-2026-`)
    pub fn year_prefix(year: i32) -> String {
        format!("{}-{:04}-", JOB_NUMBER_PREFIX, year)
    }

    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || DomainError::InvalidJobNumber(s.to_string());

        let mut parts = s.splitn(3, '-');
        let (prefix, year, sequence) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(y), Some(n)) => (p, y, n),
            _ => return Err(invalid()),
        };

        if prefix != JOB_NUMBER_PREFIX
            || year.len() != 4
            || sequence.len() != 5
            || !year.bytes().chain(sequence.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year = year.parse().map_err(|_| invalid())?;
        let sequence = sequence.parse().map_err(|_| invalid())?;
        Self::new(year, sequence)
    }
}

impl std::fmt::Display for JobNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:05}", Self::year_prefix(self.year), self.sequence)
    }
}

impl std::str::FromStr for JobNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JobNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<JobNumber> for String {
    fn from(value: JobNumber) -> Self {
        value.to_string()
    }
}
