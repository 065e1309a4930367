//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use jobcli_core::{ColorMode, JobType, LinkStyle};

const EXIT_STATUS_HELP: &str = "\
Exit status:
  0  success, including runs where some sites failed but others answered
  1  configuration or I/O error, or every selected site failed and no jobs were found";

/// Aggregate job postings from multiple listing sites.
///
/// Searches LinkedIn, Indeed, Glassdoor, ZipRecruiter and Stepstone
/// concurrently, merges the results and tracks which postings are new.
#[derive(Parser, Debug)]
#[command(name = "jobcli")]
#[command(author, version, about)]
#[command(after_help = EXIT_STATUS_HELP)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Output and logging switches accepted before or after the subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// JSON output to stdout; disables colors
    #[arg(long, global = true)]
    pub json: bool,

    /// TSV output to stdout; disables colors
    #[arg(long, global = true)]
    pub plain: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors and skip the run summary
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search job listings across sites
    Search(SearchArgs),

    /// Search LinkedIn
    #[command(name = "linkedin")]
    LinkedIn(SiteArgs),

    /// Search Indeed
    #[command(name = "indeed")]
    Indeed(SiteArgs),

    /// Search Glassdoor
    #[command(name = "glassdoor")]
    Glassdoor(SiteArgs),

    /// Search ZipRecruiter
    #[command(name = "ziprecruiter")]
    ZipRecruiter(SiteArgs),

    /// Search Google Jobs
    #[command(name = "google")]
    Google(SiteArgs),

    /// Search Stepstone
    #[command(name = "stepstone")]
    Stepstone(SiteArgs),

    /// Seen-history utilities
    Seen {
        #[command(subcommand)]
        command: SeenCommand,
    },

    /// Proxy utilities
    Proxies {
        #[command(subcommand)]
        command: ProxiesCommand,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Print version
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search query (comma-separated). Optional when --query-file is provided
    pub query: Option<String>,

    /// Comma-separated list of sites
    #[arg(long, default_value = "all")]
    pub sites: String,

    #[command(flatten)]
    pub options: SearchOptionArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Search query (comma-separated). Optional when --query-file is provided
    pub query: Option<String>,

    #[command(flatten)]
    pub options: SearchOptionArgs,
}

#[derive(Args, Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SearchOptionArgs {
    /// Job location [env: JOBCLI_DEFAULT_LOCATION]
    #[arg(long)]
    pub location: Option<String>,

    /// Country code or name for regional sites [env: JOBCLI_DEFAULT_COUNTRY]
    #[arg(long)]
    pub country: Option<String>,

    /// Maximum results per query [env: JOBCLI_DEFAULT_LIMIT]
    #[arg(long)]
    pub limit: Option<usize>,

    /// Offset for pagination
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Remote-only roles
    #[arg(long)]
    pub remote: bool,

    /// Job type filter
    #[arg(long, value_enum)]
    pub job_type: Option<JobType>,

    /// Only jobs posted in the last N hours
    #[arg(long, default_value_t = 0)]
    pub hours: u32,

    /// Output format
    #[arg(long, value_parser = ["csv", "json", "md"])]
    pub format: Option<String>,

    /// Table link display
    #[arg(long, value_enum, default_value_t = LinkStyle::Full)]
    pub links: LinkStyle,

    /// Write output to a file
    #[arg(short = 'o', long, visible_aliases = ["out", "file"])]
    pub output: Option<PathBuf>,

    /// Comma-separated proxy URLs [env: JOBCLI_PROXIES]
    #[arg(long)]
    pub proxies: Option<String>,

    /// JSON file with queries or a full search profile
    #[arg(long)]
    pub query_file: Option<PathBuf>,

    /// Seen jobs JSON file
    #[arg(long)]
    pub seen: Option<PathBuf>,

    /// Output only unseen jobs (requires --seen)
    #[arg(long)]
    pub new_only: bool,

    /// Write unseen jobs JSON to a file (requires --seen)
    #[arg(long)]
    pub new_out: Option<PathBuf>,

    /// Merge newly discovered unseen jobs into the --seen file (requires --seen)
    #[arg(long)]
    pub seen_update: bool,
}

#[derive(Subcommand, Debug)]
pub enum SeenCommand {
    /// Write unseen jobs (A minus B) to JSON
    Diff(SeenDiffArgs),
    /// Merge new jobs into seen history JSON
    Update(SeenUpdateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SeenDiffArgs {
    /// New jobs JSON file (A)
    #[arg(long = "new")]
    pub new_jobs: PathBuf,

    /// Seen jobs JSON file (B); a missing file counts as empty
    #[arg(long)]
    pub seen: PathBuf,

    /// Output path for unseen jobs JSON (C)
    #[arg(long)]
    pub out: PathBuf,

    /// Print comparison stats
    #[arg(long)]
    pub stats: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SeenUpdateArgs {
    /// Seen jobs JSON file; a missing file counts as empty
    #[arg(long)]
    pub seen: PathBuf,

    /// Jobs JSON file to merge into the history
    #[arg(long)]
    pub input: PathBuf,

    /// Output path for the updated history
    #[arg(long)]
    pub out: PathBuf,

    /// Print merge stats
    #[arg(long)]
    pub stats: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProxiesCommand {
    /// Probe each configured proxy against a target URL
    Check(ProxyCheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProxyCheckArgs {
    /// Target URL
    #[arg(long, default_value = "https://www.google.com")]
    pub target: String,

    /// Timeout in seconds (1-300)
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: u64,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommand {
    /// Write default config.json and proxies.txt
    Init,
    /// Print the config directory
    Path,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_search_defaults() {
        let cli = parse(&["jobcli", "search", "rust engineer"]);
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.query.as_deref(), Some("rust engineer"));
        assert_eq!(args.sites, "all");
        assert_eq!(args.options.links, LinkStyle::Full);
        assert_eq!(args.options.limit, None);
        assert!(!args.options.new_only);
        assert_eq!(cli.global.color, ColorMode::Auto);
    }

    #[test]
    fn test_cli_search_options() {
        let cli = parse(&[
            "jobcli",
            "search",
            "sre",
            "--sites",
            "linkedin,indeed",
            "--limit",
            "5",
            "--job-type",
            "contract",
            "--format",
            "md",
            "--links",
            "short",
            "--out",
            "jobs.md",
            "--seen",
            "seen.json",
            "--new-only",
        ]);
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.sites, "linkedin,indeed");
        assert_eq!(args.options.limit, Some(5));
        assert_eq!(args.options.job_type, Some(JobType::Contract));
        assert_eq!(args.options.format.as_deref(), Some("md"));
        assert_eq!(args.options.links, LinkStyle::Short);
        assert_eq!(args.options.output, Some(PathBuf::from("jobs.md")));
        assert!(args.options.new_only);
    }

    #[test]
    fn test_cli_output_aliases() {
        for flag in ["-o", "--output", "--file"] {
            let cli = parse(&["jobcli", "indeed", "qa", flag, "x.csv"]);
            let Command::Indeed(args) = cli.command else {
                panic!("expected indeed");
            };
            assert_eq!(args.options.output, Some(PathBuf::from("x.csv")));
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = parse(&["jobcli", "linkedin", "qa", "--json", "--color", "never", "-v"]);
        assert!(cli.global.json);
        assert!(cli.global.verbose);
        assert_eq!(cli.global.color, ColorMode::Never);
    }

    #[test]
    fn test_cli_site_commands_reject_sites_flag() {
        let err = Cli::try_parse_from(["jobcli", "google", "qa", "--sites", "indeed"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let err = Cli::try_parse_from(["jobcli", "search", "qa", "--format", "xml"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_cli_seen_diff() {
        let cli = parse(&[
            "jobcli", "seen", "diff", "--new", "a.json", "--seen", "b.json", "--out", "c.json",
            "--stats",
        ]);
        let Command::Seen {
            command: SeenCommand::Diff(args),
        } = cli.command
        else {
            panic!("expected seen diff");
        };
        assert_eq!(args.new_jobs, PathBuf::from("a.json"));
        assert!(args.stats);
    }

    #[test]
    fn test_cli_seen_update_requires_paths() {
        let err = Cli::try_parse_from(["jobcli", "seen", "update", "--seen", "b.json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_proxies_check_defaults() {
        let cli = parse(&["jobcli", "proxies", "check"]);
        let Command::Proxies {
            command: ProxiesCommand::Check(args),
        } = cli.command
        else {
            panic!("expected proxies check");
        };
        assert_eq!(args.target, "https://www.google.com");
        assert_eq!(args.timeout, 15);
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        let err = Cli::try_parse_from(["jobcli", "-q", "-v", "version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Cli::try_parse_from(["jobcli", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
