use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::config::CONFIG_FILE_NAME;

/// Print an indented content listing of a directory hierarchy.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Directory whose hierarchy is listed
    #[clap(default_value = "/")]
    pub root: PathBuf,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Listing configuration file
    #[clap(long, short, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    /// Worker threads used for directory reads, overrides the config file
    #[clap(long, short)]
    pub workers: Option<NonZeroUsize>,
}
