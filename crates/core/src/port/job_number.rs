// Job Number Source Port
//
// Process-wide allocator for the 5-digit suffix of FS-<year>-<suffix>.

use crate::domain::job_number::JOB_NUMBER_SUFFIX_LIMIT;
use crate::error::{AppError, Result};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;

pub trait JobNumberSource: Send + Sync {
    /// Next suffix for `year`, in `[0, 99999)`
    fn next_suffix(&self, year: i32) -> Result<u32>;
}

/// Monotonic counter per year.
///
/// Seed it from persisted state at start-up so numbers continue after the
/// highest one already stored; `reset` clears every counter (tests).
#[derive(Default)]
pub struct SequentialJobNumberSource {
    last: Mutex<HashMap<i32, u32>>,
}

impl SequentialJobNumberSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue `year` after `last_used` (never moves a counter backwards)
    pub fn seed(&self, year: i32, last_used: u32) -> Result<()> {
        let mut last = self.lock()?;
        let entry = last.entry(year).or_insert(last_used);
        *entry = (*entry).max(last_used);
        Ok(())
    }

    pub fn reset(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<i32, u32>>> {
        self.last
            .lock()
            .map_err(|_| AppError::Internal("job number counter lock poisoned".to_string()))
    }
}

impl JobNumberSource for SequentialJobNumberSource {
    fn next_suffix(&self, year: i32) -> Result<u32> {
        let mut last = self.lock()?;
        let next = match last.get(&year) {
            Some(n) => n + 1,
            None => 1,
        };
        if next >= JOB_NUMBER_SUFFIX_LIMIT {
            return Err(AppError::Internal(format!(
                "job number space exhausted for {}",
                year
            )));
        }
        last.insert(year, next);
        Ok(next)
    }
}

/// Uniform random suffix; collisions are caught by the unique index and
/// retried by intake.
pub struct RandomJobNumberSource;

impl JobNumberSource for RandomJobNumberSource {
    fn next_suffix(&self, _year: i32) -> Result<u32> {
        Ok(rand::thread_rng().gen_range(0..JOB_NUMBER_SUFFIX_LIMIT))
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;

    /// Hands out a scripted list of suffixes, then fails
    pub struct ScriptedJobNumberSource {
        suffixes: Mutex<VecDeque<u32>>,
    }

    impl ScriptedJobNumberSource {
        pub fn new(suffixes: impl IntoIterator<Item = u32>) -> Self {
            Self {
                suffixes: Mutex::new(suffixes.into_iter().collect()),
            }
        }
    }

    impl JobNumberSource for ScriptedJobNumberSource {
        fn next_suffix(&self, _year: i32) -> Result<u32> {
            self.suffixes
                .lock()
                .map_err(|_| AppError::Internal("scripted source lock poisoned".to_string()))?
                .pop_front()
                .ok_or_else(|| AppError::Internal("scripted suffixes exhausted".to_string()))
        }
    }
}
