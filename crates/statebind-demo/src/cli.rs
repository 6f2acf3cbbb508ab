use std::io::Write;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use statebind::prelude::{PageConfig, StrategyKind};

use crate::error::Result;
use crate::logging;
use crate::session::Session;

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "statebind-demo",
    about = "Replay user interactions against a bound page and print the view",
    version
)]
pub struct Cli {
    /// Page config (`.toml` or `.json`). Defaults to the built-in counter.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the update strategy declared by the page.
    #[arg(short, long, value_name = "explicit|intercepted")]
    pub strategy: Option<StrategyKind>,

    /// Interaction to replay: `press:TARGET`, `release:TARGET` or
    /// `text:TARGET=VALUE`. Repeatable.
    #[arg(long = "step", value_name = "INPUT")]
    pub steps: Vec<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Raise the default log level (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The page config this invocation runs.
    pub fn page_config(&self) -> Result<PageConfig> {
        let mut config = match &self.config {
            Some(path) => PageConfig::load(path)?,
            None => PageConfig::counter(),
        };
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        Ok(config)
    }

    /// Replay steps; three presses of `inc` when none are given.
    #[must_use]
    pub fn steps(&self) -> Vec<String> {
        if self.steps.is_empty() {
            vec!["press:inc".to_owned(); 3]
        } else {
            self.steps.clone()
        }
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format, cli.verbose)?;
    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}

/// Run `cli` without touching the global log subscriber.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let config = cli.page_config()?;
    let mut session = Session::new(&config)?;
    session.replay(&cli.steps(), out)?;
    Ok(())
}
