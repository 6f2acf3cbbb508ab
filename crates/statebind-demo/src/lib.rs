#![forbid(unsafe_code)]

//! Scripted replay of user interactions against a statebind page.
//!
//! Loads a page (the built-in counter or a `.toml`/`.json` config), mounts
//! it, replays `--step` inputs and prints the bound view after each one.

pub mod cli;
pub mod error;
pub mod logging;
pub mod session;

pub use cli::{Cli, LogFormat, run, run_from_env};
pub use error::{DemoError, Result};
pub use session::{Session, parse_step};
