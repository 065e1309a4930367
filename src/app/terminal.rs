use jobcli_core::GlobalOptions;

pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

/// Log lines carry no ANSI when color is off or output is machine-readable.
pub(crate) fn should_disable_log_color(global: &GlobalOptions) -> bool {
    global.json
        || global.plain
        || global.color == jobcli_core::ColorMode::Never
        || no_color_env_requested()
        || is_dumb_terminal()
}

pub(crate) fn should_use_spinner(
    stderr_is_terminal: bool,
    quiet: bool,
    dumb_terminal: bool,
) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

pub(crate) fn resolve_default_log_level(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

pub(crate) fn init_tracing(default_level: &str, force_cli_level: bool, no_color: bool) {
    let filter = if force_cli_level {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_precedence() {
        assert_eq!(resolve_default_log_level(false, false), "info");
        assert_eq!(resolve_default_log_level(true, false), "debug");
        assert_eq!(resolve_default_log_level(true, true), "error");
    }

    #[test]
    fn test_spinner_needs_interactive_stderr() {
        assert!(should_use_spinner(true, false, false));
        assert!(!should_use_spinner(false, false, false));
        assert!(!should_use_spinner(true, true, false));
        assert!(!should_use_spinner(true, false, true));
    }

    #[test]
    fn test_machine_output_disables_log_color() {
        let global = GlobalOptions {
            json: true,
            ..GlobalOptions::default()
        };
        assert!(should_disable_log_color(&global));
    }
}
