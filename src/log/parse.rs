use crate::Result;
use crate::log::row::TraceRow;
use anyhow::{Context, bail};
use std::fs;

/// Parse a scheduler trace file into rows, in file order.
///
/// Expected columns (whitespace-separated, no header):
/// tick  pid  prev_level  level  [extra...]
///
/// Example:
/// 1270 4 0 1
pub fn parse_trace_file(path: &str) -> Result<Vec<TraceRow>> {
    let text = fs::read_to_string(path).with_context(|| format!("read trace file {}", path))?;
    parse_trace_str(&text).with_context(|| format!("parse trace file {}", path))
}

/// Parse trace text. Every token on a line must be numeric; there is no
/// partial-line recovery. Blank lines are skipped.
pub fn parse_trace_str(text: &str) -> Result<Vec<TraceRow>> {
    let mut rows = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;

        if line.trim().is_empty() {
            continue;
        }

        let fields = tokenize(line).with_context(|| format!("trace parse error at line {}", lno))?;
        if fields.len() < 4 {
            bail!(
                "trace parse error at line {}: expected at least 4 fields, got {}",
                lno,
                fields.len()
            );
        }

        let pid = integral_pid(fields[1]).with_context(|| format!("bad pid at line {}", lno))?;

        rows.push(TraceRow {
            tick: fields[0],
            pid,
            level: fields[3],
        });
    }

    Ok(rows)
}

/// Split on runs of whitespace and parse every token as f64, which accepts
/// both the integer and the float renditions of the trace.
fn tokenize(line: &str) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .with_context(|| format!("non-numeric field {:?}", tok))
        })
        .collect()
}

/// The pid keys a bucket, so it must be a whole number even in float traces.
fn integral_pid(v: f64) -> Result<i64> {
    if !v.is_finite() || v.fract() != 0.0 {
        bail!("pid must be an integer, got {}", v);
    }
    Ok(v as i64)
}
