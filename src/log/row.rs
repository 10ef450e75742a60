/// A single queue-transition record from the scheduler trace.
///
/// Lines are positional with no header:
/// tick  pid  prev_level  level  [extra fields ignored]
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRow {
    pub tick: f64,
    pub pid: i64,
    pub level: f64,
}
