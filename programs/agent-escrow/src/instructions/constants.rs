//! Shared constants for instruction handlers

/// Maximum workers a single job can name. Bounds the job account size and
/// keeps a serialized `Job` within the 1024-byte return data limit of `get_job`;
/// the `max_len` attributes on `Job` must agree with it.
pub const MAX_WORKERS: usize = 10;

/// Maximum length of an agent metadata URI
pub const MAX_METADATA_URI_LEN: usize = 128;

/// Lowest accepted client rating
pub const MIN_RATING: u8 = 1;

/// Highest accepted client rating
pub const MAX_RATING: u8 = 5;

/// Job ids returned per page by the list views. A full page serializes to
/// 516 bytes, inside the 1024-byte return data limit.
pub const JOBS_PER_PAGE: usize = 64;

/// First id handed out by the job id sequence. 0 is never a valid job.
pub const FIRST_JOB_ID: u64 = 1;
