//! Seen-history commands: `seen diff` and `seen update`.

use std::io::Write;

use anyhow::{Context, Result};
use jobcli_core::seen;
use tracing::debug;

use crate::cli::{SeenDiffArgs, SeenUpdateArgs};

/// Writes the jobs in `--new` that are absent from `--seen` to `--out`.
pub fn run_seen_diff_command(args: &SeenDiffArgs, out: &mut dyn Write) -> Result<()> {
    let new_jobs = seen::read_jobs(&args.new_jobs).context("read --new")?;
    let seen_jobs = seen::read_jobs_allow_missing(&args.seen).context("read --seen")?;

    let (unseen, stats) = seen::diff(&new_jobs, &seen_jobs);
    seen::write_jobs(&args.out, &unseen).context("write --out")?;
    debug!(unseen = stats.unseen, out = %args.out.display(), "Seen diff written");

    if args.stats {
        writeln!(
            out,
            "total_new={} total_seen={} invalid_skipped={} unseen_emitted={}",
            stats.total_new,
            stats.total_seen,
            stats.invalid_skipped(),
            stats.unseen
        )?;
    }
    Ok(())
}

/// Merges `--input` into the `--seen` history and writes the result to `--out`.
pub fn run_seen_update_command(args: &SeenUpdateArgs, out: &mut dyn Write) -> Result<()> {
    let seen_jobs = seen::read_jobs_allow_missing(&args.seen).context("read --seen")?;
    let input_jobs = seen::read_jobs(&args.input).context("read --input")?;

    let (merged, stats) = seen::merge(&seen_jobs, &input_jobs);
    seen::write_jobs(&args.out, &merged).context("write --out")?;
    debug!(added = stats.added, out = %args.out.display(), "Seen history updated");

    if args.stats {
        writeln!(
            out,
            "total_seen={} total_input={} invalid_skipped={} added={} total_out={}",
            stats.total_seen,
            stats.total_input,
            stats.invalid_skipped(),
            stats.added,
            stats.total_out
        )?;
    }
    Ok(())
}
