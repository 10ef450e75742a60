//! Parsing for the scheduler queue-level trace.

pub mod parse;
pub mod row;

pub use parse::{parse_trace_file, parse_trace_str};
pub use row::TraceRow;
