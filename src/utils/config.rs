//! Configuration and constants for the parser and CLI.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Separator between the fields of one log line
pub const FIELD_DELIMITER: char = '|';

/// Lines with fewer fields than this carry no event (blank, continuation, header)
pub const MIN_LINE_FIELDS: usize = 3;

// The timing field counts nanoseconds; the tree reports milliseconds
pub const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Durations are reported with three decimal places
pub const DURATION_SCALE: f64 = 1000.0;

/// Environment variable overriding the batch worker count
pub const JOBS_ENV: &str = "APEX_LOG_TRACE_JOBS";

/// Environment variable overriding the output path
pub const OUTPUT_ENV: &str = "APEX_LOG_TRACE_OUTPUT";

/// Round a millisecond value to three decimals.
///
/// Adds `f64::EPSILON` before scaling so values such as `1.0005` that land
/// just below the midpoint in binary still round up.
pub fn round3(value: f64) -> f64 {
    ((value + f64::EPSILON) * DURATION_SCALE).round() / DURATION_SCALE
}
