//! Command-line interface

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reviewpulse-server", version)]
#[command(about = "ReviewPulse sentiment classification server", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        default_value = "reviewpulse.yaml",
        env = "REVIEWPULSE_CONFIG"
    )]
    pub config: PathBuf,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(flatten)]
    pub listen: ListenArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Load both artifacts, print status and exit non-zero on failure
    Check,

    /// Classify one review offline
    Predict {
        /// Review text
        #[arg(short, long)]
        text: String,
    },
}

/// Artifact location overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ArtifactArgs {
    /// Directory holding the artifact files
    #[arg(long, global = true, env = "REVIEWPULSE_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Classifier file name
    #[arg(long, global = true, env = "REVIEWPULSE_CLASSIFIER")]
    pub classifier: Option<String>,

    /// Vectorizer file name
    #[arg(long, global = true, env = "REVIEWPULSE_VECTORIZER")]
    pub vectorizer: Option<String>,
}

/// Listener overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ListenArgs {
    /// Listen address
    #[arg(short = 'l', long, global = true, env = "REVIEWPULSE_LISTEN")]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, global = true, env = "REVIEWPULSE_PORT")]
    pub port: Option<u16>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["reviewpulse-server"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_global_artifact_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "reviewpulse-server",
            "predict",
            "--text",
            "Great movie",
            "--model-dir",
            "/srv/models",
        ])
        .unwrap();
        assert_eq!(cli.artifacts.model_dir, Some(PathBuf::from("/srv/models")));
        match cli.command {
            Some(Command::Predict { text }) => assert_eq!(text, "Great movie"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_listen_overrides() {
        let cli =
            Cli::try_parse_from(["reviewpulse-server", "serve", "-l", "127.0.0.1", "-P", "9000"])
                .unwrap();
        assert!(matches!(cli.command, Some(Command::Serve)));
        assert_eq!(cli.listen.listen.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.listen.port, Some(9000));
    }
}
