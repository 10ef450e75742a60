use anyhow::Context;
use clap::{Parser, Subcommand};

mod log;
mod model;
mod render;

pub type Result<T> = anyhow::Result<T>;

use model::UnknownPid;

#[derive(Parser)]
#[command(name = "schedtrace-viz")]
#[command(about = "Scheduler queue-level trace plotter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render per-process level-over-ticks lines from a trace file.
    Plot {
        /// Trace file: whitespace-delimited `tick pid prev_level level` lines.
        #[arg(long)]
        log: String,

        /// Output image (.svg or .png).
        #[arg(short = 'o', long)]
        out: String,

        /// Lowest pid expected in the trace.
        #[arg(long, default_value_t = 4)]
        base_pid: i64,

        /// Expected process count. When set, pids outside
        /// base_pid..base_pid+procs hit the --unknown policy; when unset,
        /// every pid gets its own line.
        #[arg(long)]
        procs: Option<usize>,

        /// What to do with a pid outside the declared range.
        #[arg(long, value_enum, default_value = "fail")]
        unknown: UnknownPid,

        /// Output image size as WIDTHxHEIGHT.
        #[arg(long, default_value = "1024x640")]
        size: String,

        /// Also write the partitioned series as JSON.
        #[arg(long)]
        dump: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Plot {
            log,
            out,
            base_pid,
            procs,
            unknown,
            size,
            dump,
        } => {
            // 1) Parse the trace.
            let rows = log::parse_trace_file(&log)?;

            // 2) Partition by pid and rebase ticks against the first record.
            let opts = model::SeriesOptions {
                base_pid,
                procs,
                unknown,
            };
            let data = model::build_series(&rows, &opts)?;

            // 3) Optional machine-readable export.
            if let Some(path) = dump {
                std::fs::write(&path, serde_json::to_string_pretty(&data)?)
                    .with_context(|| format!("write series dump {}", path))?;
                println!("Wrote {}", path);
            }

            // 4) Render the chart.
            let size = parse_size(&size)?;
            render::render_chart(&data, &out, size)?;
            println!("Wrote {}", out);
        }
    }

    Ok(())
}

/// Parse "1024x640" into (1024, 640).
fn parse_size(s: &str) -> Result<(u32, u32)> {
    let parse = |part: &str| {
        part.parse::<u32>()
            .with_context(|| format!("bad size {:?}: expected WIDTHxHEIGHT", s))
    };
    match s.split_once('x') {
        Some((w, h)) => Ok((parse(w)?, parse(h)?)),
        None => anyhow::bail!("bad size {:?}: expected WIDTHxHEIGHT", s),
    }
}
