//! `proxies check`: probe every configured proxy against a target URL.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use jobcli_core::config;
use jobcli_core::network::FetchRequest;
use jobcli_core::{GlobalOptions, ProxyRotator, SourceClient};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::ProxyCheckArgs;

const CHECK_COOLDOWN: Duration = Duration::from_secs(5 * 60);
const TABLE_HEADER: [&str; 4] = ["proxy", "status", "latency_ms", "error"];
const TABLE_PADDING: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ProxyCheckResult {
    proxy: String,
    /// Numeric HTTP status, or `error`.
    status: String,
    latency_ms: u128,
    #[serde(skip_serializing_if = "String::is_empty")]
    error: String,
}

impl ProxyCheckResult {
    fn failed(proxy: &str, error: impl std::fmt::Display) -> Self {
        Self {
            proxy: proxy.to_string(),
            status: "error".to_string(),
            latency_ms: 0,
            error: error.to_string(),
        }
    }
}

pub async fn run_proxies_check_command(
    args: &ProxyCheckArgs,
    global: GlobalOptions,
    out: &mut dyn Write,
) -> Result<()> {
    let proxies = config::load_proxies("")?;
    if proxies.is_empty() {
        bail!("no proxies configured");
    }
    info!(proxies = proxies.len(), target = %args.target, "Checking proxies");

    let timeout = Duration::from_secs(args.timeout);
    let mut results = Vec::with_capacity(proxies.len());
    for proxy in &proxies {
        results.push(check_proxy(proxy, &args.target, timeout).await);
    }

    write_results(out, &results, global)
}

async fn check_proxy(proxy: &str, target: &str, timeout: Duration) -> ProxyCheckResult {
    let rotator = match ProxyRotator::new(&[proxy], CHECK_COOLDOWN) {
        Ok(rotator) => Arc::new(rotator),
        Err(e) => return ProxyCheckResult::failed(proxy, e),
    };
    let client = SourceClient::with_timeout(Some(rotator), timeout);

    let start = Instant::now();
    match client.fetch(FetchRequest::get(target)).await {
        Ok(response) => {
            let latency_ms = start.elapsed().as_millis();
            debug!(status = response.status, latency_ms, "Proxy answered");
            ProxyCheckResult {
                proxy: proxy.to_string(),
                status: response.status.to_string(),
                latency_ms,
                error: String::new(),
            }
        }
        Err(e) => ProxyCheckResult::failed(proxy, e),
    }
}

fn write_results(
    out: &mut dyn Write,
    results: &[ProxyCheckResult],
    global: GlobalOptions,
) -> Result<()> {
    if global.json {
        serde_json::to_writer_pretty(&mut *out, results)?;
        writeln!(out)?;
        return Ok(());
    }

    if global.plain {
        for res in results {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                res.proxy, res.status, res.latency_ms, res.error
            )?;
        }
        return Ok(());
    }

    let rows: Vec<[String; 4]> = results
        .iter()
        .map(|res| {
            [
                res.proxy.clone(),
                res.status.clone(),
                res.latency_ms.to_string(),
                res.error.clone(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADER.map(str::len);
    for row in &rows {
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 4]| {
        let mut line = String::new();
        for (col, cell) in cells.iter().enumerate().take(3) {
            let fill = widths[col] + TABLE_PADDING - cell.chars().count();
            line.push_str(cell);
            line.push_str(&" ".repeat(fill));
        }
        line.push_str(cells[3]);
        line
    };

    writeln!(out, "{}", line(TABLE_HEADER))?;
    for row in &rows {
        writeln!(
            out,
            "{}",
            line([row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()])
        )?;
    }
    Ok(())
}
