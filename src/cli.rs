use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "quickclean",
    about = "Reclaim disk space from temp files, the trash and browser caches",
    version
)]
pub struct Cli {
    /// Config file (defaults to <config dir>/quickclean/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List every task and whether the browser caches have any data
    List,

    /// Show the resolved base directories
    Paths,

    /// Run the cleanup
    Clean {
        /// Only clean these browser families (e.g. "chrome,firefox")
        #[arg(long, value_delimiter = ',')]
        only: Option<Vec<String>>,

        /// Leave these browser families alone
        #[arg(long, value_delimiter = ',')]
        skip: Vec<String>,

        /// Skip every browser cache
        #[arg(long)]
        no_browsers: bool,
    },
}
