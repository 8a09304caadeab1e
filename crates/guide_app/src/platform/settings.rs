//! Host configuration from the command line and environment.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use guide_engine::{
    BackendError, BackendSettings, ChatBackend, OpenAiCompatBackend, ScriptedBackend,
    DEFAULT_MODEL,
};
use guide_logging::LogDestination;

pub const ENV_ENDPOINT: &str = "CAREER_GUIDE_ENDPOINT";
pub const ENV_MODEL: &str = "CAREER_GUIDE_MODEL";
pub const ENV_API_KEY: &str = "CAREER_GUIDE_API_KEY";
pub const ENV_TIMEOUT: &str = "CAREER_GUIDE_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Parser)]
#[command(name = "career_guide")]
#[command(about = "Career guidance chat with an onboarding quiz", long_about = None)]
pub struct Cli {
    /// Custom quiz questions in RON format
    #[arg(long, value_name = "PATH")]
    pub quiz: Option<PathBuf>,

    /// Where log output goes: terminal, file or both
    #[arg(long, value_name = "DEST", default_value = "file")]
    pub log: LogDestination,

    /// OpenAI-compatible base URL; offline replies when unset
    #[arg(long, env = ENV_ENDPOINT, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Model name sent with each request
    #[arg(long, env = ENV_MODEL, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Bearer token sent to the endpoint
    #[arg(long, env = ENV_API_KEY, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Upper bound for one reply, streaming included
    #[arg(
        long,
        env = ENV_TIMEOUT,
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub model: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub quiz_path: Option<PathBuf>,
    pub log: LogDestination,
}

impl Settings {
    /// Parses the process arguments; exits with clap's message on `--help` or bad input.
    pub fn from_env() -> Self {
        Cli::parse().into()
    }

    /// Remote backend when an endpoint is configured, canned offline replies otherwise.
    pub fn backend(&self) -> Result<Arc<dyn ChatBackend>, BackendError> {
        match &self.endpoint {
            Some(endpoint) => {
                let mut backend = BackendSettings::new(endpoint.clone());
                backend.model = self.model.clone();
                backend.api_key = self.api_key.clone();
                backend.request_timeout = self.request_timeout;
                Ok(Arc::new(OpenAiCompatBackend::new(backend)?))
            }
            None => Ok(Arc::new(ScriptedBackend::offline())),
        }
    }

    pub fn describe_backend(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("model {} at {}", self.model, endpoint),
            None => "offline replies".to_string(),
        }
    }
}

/// Blank values count as unset.
impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        Self {
            endpoint: non_blank(cli.endpoint),
            model: non_blank(Some(cli.model)).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: non_blank(cli.api_key),
            request_timeout: Duration::from_secs(cli.timeout_secs),
            quiz_path: cli.quiz,
            log: cli.log,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    fn settings(args: &[&str]) -> Result<Settings, clap::Error> {
        let argv = std::iter::once("career_guide").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(Settings::from)
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn backend_options_read_the_environment() {
        let command = Cli::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id().as_str() == id)
                .and_then(|arg| arg.get_env())
                .and_then(|name| name.to_str())
                .map(str::to_string)
        };
        assert_eq!(env_of("endpoint").as_deref(), Some(ENV_ENDPOINT));
        assert_eq!(env_of("model").as_deref(), Some(ENV_MODEL));
        assert_eq!(env_of("api_key").as_deref(), Some(ENV_API_KEY));
        assert_eq!(env_of("timeout_secs").as_deref(), Some(ENV_TIMEOUT));
        assert_eq!(env_of("quiz"), None);
    }

    #[test]
    fn defaults_use_offline_backend() {
        let settings = Settings::from(Cli {
            quiz: None,
            log: LogDestination::File,
            endpoint: None,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        });
        assert_eq!(settings.endpoint, None);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.request_timeout, Duration::from_secs(60));
        assert_eq!(settings.log, LogDestination::File);
        assert_eq!(settings.describe_backend(), "offline replies");
    }

    #[test]
    fn flags_configure_the_remote_backend() {
        let settings = settings(&[
            "--quiz",
            "quiz.ron",
            "--log",
            "Both",
            "--endpoint",
            "http://localhost:11434/v1",
            "--model",
            "llama3",
            "--api-key",
            "  ",
            "--timeout-secs",
            "15",
        ])
        .expect("settings");
        assert_eq!(settings.quiz_path, Some(PathBuf::from("quiz.ron")));
        assert_eq!(settings.log, LogDestination::Both);
        assert_eq!(settings.endpoint.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(settings.model, "llama3");
        assert_eq!(settings.api_key, None);
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
        assert!(settings.backend().is_ok());
    }

    #[test]
    fn bad_input_is_rejected() {
        let unknown = settings(&["--verbose"]).expect_err("unknown flag");
        assert_eq!(unknown.kind(), ErrorKind::UnknownArgument);
        assert!(settings(&["--quiz"]).is_err());
        assert!(settings(&["--log", "syslog"]).is_err());
        assert!(settings(&["--timeout-secs", "0"]).is_err());
    }

    #[test]
    fn help_is_generated() {
        let help = settings(&["--help"]).expect_err("help exits early");
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);
        let text = Cli::command().render_long_help().to_string();
        assert!(text.contains("--quiz"));
        assert!(text.contains(ENV_ENDPOINT));
    }
}
