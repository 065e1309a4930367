//! Job list renderers.

use std::io::{self, Write};

use url::Url;

use super::{Format, LinkStyle};
use crate::models::Job;

const CSV_HEADER: [&str; 11] = [
    "site",
    "title",
    "company",
    "location",
    "url",
    "remote",
    "job_type",
    "salary",
    "snippet",
    "posted_at",
    "posted_at_raw",
];
const TABLE_HEADER: [&str; 4] = ["site", "title", "company", "url"];
const TABLE_PADDING: usize = 2;
/// Sky blue (#87CEEB) foreground.
const LINK_COLOR: &str = "\x1b[38;2;135;206;235m";
const RESET: &str = "\x1b[0m";
const SHORT_LABEL_MAX: usize = 60;

/// Table rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub color: bool,
    /// Wrap URLs in OSC-8 hyperlinks.
    pub hyperlinks: bool,
    pub links: LinkStyle,
}

/// Renders `jobs` to `out` in `format`.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn write_jobs(
    out: &mut dyn Write,
    jobs: &[Job],
    format: Format,
    options: RenderOptions,
) -> io::Result<()> {
    match format {
        Format::Json => write_json(out, jobs),
        Format::Csv => write_delimited(out, jobs, ','),
        Format::Tsv => write_delimited(out, jobs, '\t'),
        Format::Markdown => write_markdown(out, jobs),
        Format::Table => write_table(out, jobs, options),
    }
}

fn write_json(out: &mut dyn Write, jobs: &[Job]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, jobs)?;
    writeln!(out)
}

fn write_delimited(out: &mut dyn Write, jobs: &[Job], delim: char) -> io::Result<()> {
    write_record(out, &CSV_HEADER, delim)?;
    for job in jobs {
        let posted = job.posted_at.map(|t| t.to_rfc3339()).unwrap_or_default();
        let row = [
            job.site.as_str(),
            job.title.as_str(),
            job.company.as_str(),
            job.location.as_str(),
            job.url.as_str(),
            if job.remote { "true" } else { "false" },
            job.job_type.as_str(),
            job.salary.as_str(),
            job.snippet.as_str(),
            posted.as_str(),
            job.posted_at_raw.as_str(),
        ];
        write_record(out, &row, delim)?;
    }
    Ok(())
}

fn write_record(out: &mut dyn Write, fields: &[&str], delim: char) -> io::Result<()> {
    let mut line = String::new();
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            line.push(delim);
        }
        if needs_quotes(field, delim) {
            line.push('"');
            line.push_str(&field.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(field);
        }
    }
    writeln!(out, "{line}")
}

fn needs_quotes(field: &str, delim: char) -> bool {
    if field.is_empty() {
        return false;
    }
    field.contains([delim, '"', '\r', '\n'])
        || field.chars().next().is_some_and(char::is_whitespace)
}

fn write_markdown(out: &mut dyn Write, jobs: &[Job]) -> io::Result<()> {
    if jobs.is_empty() {
        return writeln!(out, "No results.");
    }
    for job in jobs {
        writeln!(out, "- **{}** ({})", job.title.trim(), job.company.trim())?;
        writeln!(out, "  Location: {}", job.location.trim())?;
        writeln!(out, "  Site: {}", job.site.trim())?;
        let url = job.url.trim();
        if url.is_empty() {
            writeln!(out, "  URL: -")?;
        } else {
            writeln!(out, "  URL: [Open listing](<{url}>)")?;
        }
        if job.remote {
            writeln!(out, "  Remote: yes")?;
        }
        if !job.job_type.is_empty() {
            writeln!(out, "  Type: {}", job.job_type.trim())?;
        }
        if !job.salary.is_empty() {
            writeln!(out, "  Salary: {}", job.salary.trim())?;
        }
        if let Some(posted) = job.posted_at {
            writeln!(out, "  Posted: {}", posted.to_rfc3339())?;
        }
        if !job.posted_at_raw.is_empty() {
            writeln!(out, "  Posted (raw): {}", job.posted_at_raw.trim())?;
        }
        if !job.snippet.is_empty() {
            writeln!(out, "  Summary: {}", job.snippet.trim())?;
        }
    }
    Ok(())
}

fn write_table(out: &mut dyn Write, jobs: &[Job], options: RenderOptions) -> io::Result<()> {
    let rows: Vec<[String; 3]> = jobs
        .iter()
        .map(|job| {
            [
                job.site.trim().to_string(),
                job.title.trim().to_string(),
                job.company.trim().to_string(),
            ]
        })
        .collect();

    let mut widths = [0usize; 3];
    for (col, header) in TABLE_HEADER.iter().take(3).enumerate() {
        widths[col] = rows
            .iter()
            .map(|row| row[col].chars().count())
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or_default();
    }

    let pad = |text: &str, width: usize| {
        let fill = width + TABLE_PADDING - text.chars().count();
        format!("{text}{}", " ".repeat(fill))
    };

    let mut header = String::new();
    for (col, name) in TABLE_HEADER.iter().take(3).enumerate() {
        header.push_str(&pad(name, widths[col]));
    }
    header.push_str(TABLE_HEADER[3]);
    writeln!(out, "{header}")?;

    for (row, job) in rows.iter().zip(jobs) {
        let mut line = String::new();
        for (col, cell) in row.iter().enumerate() {
            line.push_str(&pad(cell, widths[col]));
        }
        line.push_str(&display_url(&job.url, options));
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn display_url(raw: &str, options: RenderOptions) -> String {
    let url = raw.trim();
    if url.is_empty() {
        return "-".to_string();
    }
    let mut label = if options.links == LinkStyle::Short && options.hyperlinks {
        short_url_label(url)
    } else {
        url.to_string()
    };
    if options.color {
        label = format!("{LINK_COLOR}{label}{RESET}");
    }
    if options.hyperlinks {
        label = hyperlink(url, &label);
    }
    label
}

/// Wraps `text` in an OSC-8 terminal hyperlink to `url`.
#[must_use]
pub fn hyperlink(url: &str, text: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\{text}\x1b]8;;\x1b\\")
}

/// `host/path` without a leading `www.`, cut to 60 characters.
#[must_use]
pub fn short_url_label(raw: &str) -> String {
    let mut label = raw.trim().to_string();
    if let Ok(parsed) = Url::parse(raw.trim())
        && let Some(host) = parsed.host_str()
    {
        let host = host.strip_prefix("www.").unwrap_or(host);
        let path = if parsed.path() == "/" && !raw.trim_end().ends_with('/') {
            ""
        } else {
            parsed.path()
        };
        label = format!("{host}{path}");
    }
    if label.chars().count() > SHORT_LABEL_MAX {
        let mut cut: String = label.chars().take(SHORT_LABEL_MAX - 3).collect();
        cut.push_str("...");
        label = cut;
    }
    label
}
