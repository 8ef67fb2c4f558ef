use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PROJGRAPH_LOG";

/// Installs the stderr subscriber. `PROJGRAPH_LOG` takes precedence over the
/// verbosity flags.
pub fn init(verbose: u8, quiet: bool, ansi: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .compact()
        .try_init();
}

fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
