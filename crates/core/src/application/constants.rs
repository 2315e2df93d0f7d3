// Use-case constants (no magic values)

/// Attempts at allocating an unused job number before giving up
pub const MAX_JOB_NUMBER_ATTEMPTS: u32 = 5;

/// Longest accepted free-text issue description (chars)
pub const MAX_ISSUE_DESCRIPTION_LEN: usize = 2000;

/// Longest accepted short free-text field: ids, issue type, city, state (chars)
pub const MAX_SHORT_FIELD_LEN: usize = 128;

/// Longest accepted address / notes / reason text (chars)
pub const MAX_TEXT_FIELD_LEN: usize = 512;

/// Jobs returned by a mechanic's job list
pub const MECHANIC_JOBS_LIMIT: u32 = 20;
