//! Command-line interface definitions.
//!
//! Every option can also be supplied through an environment variable, which
//! is how scheduled CI runs usually configure it.

use clap::Parser;
use std::path::PathBuf;

/// Check whether each monitored account posted inside today's window and
/// write a JSON status snapshot.
///
/// # Examples
///
/// ```sh
/// # Defaults: ./monitor.yaml in, ./docs/status.json out, dumps under ./debug
/// daily_post_check
///
/// # Custom paths, no diagnostic dumps
/// daily_post_check -c ops/monitor.yaml -o public/status.json --no-debug
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// YAML file with the schedule and the sources to check
    #[arg(short, long, env = "MONITOR_CONFIG", default_value = "monitor.yaml")]
    pub config: PathBuf,

    /// Where to write the JSON status report
    #[arg(short, long, env = "STATUS_OUTPUT", default_value = "docs/status.json")]
    pub output: PathBuf,

    /// Directory for page dumps of sources that could not be read
    #[arg(long, env = "DEBUG_DIR", default_value = "debug")]
    pub debug_dir: PathBuf,

    /// Do not write page dumps
    #[arg(long)]
    pub no_debug: bool,

    /// Override the retry count from the config file
    #[arg(long)]
    pub retries: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["daily_post_check"]);
        assert_eq!(cli.config, PathBuf::from("monitor.yaml"));
        assert_eq!(cli.output, PathBuf::from("docs/status.json"));
        assert_eq!(cli.debug_dir, PathBuf::from("debug"));
        assert!(!cli.no_debug);
        assert_eq!(cli.retries, None);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "daily_post_check",
            "-c",
            "/etc/monitor.yaml",
            "-o",
            "/tmp/status.json",
            "--no-debug",
            "--retries",
            "0",
        ]);

        assert_eq!(cli.config, PathBuf::from("/etc/monitor.yaml"));
        assert_eq!(cli.output, PathBuf::from("/tmp/status.json"));
        assert!(cli.no_debug);
        assert_eq!(cli.retries, Some(0));
    }
}
