use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod dispatch;

/// `llm-compiler` - plan, run tools in parallel, and answer.
#[derive(Parser, Debug)]
#[command(name = "llm-compiler")]
#[command(version)]
#[command(
    about = "Answers questions by planning parallel tool calls with a language model.",
    long_about = None
)]
pub struct Cli {
    /// Config file to use instead of ~/.llm-compiler/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a query, printing each step as it completes
    Ask {
        /// The question to answer
        query: String,

        /// Maximum number of plan/join steps before giving up
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        recursion_limit: Option<u32>,

        /// Model to use
        #[arg(long)]
        model: Option<String>,
    },

    /// Print the tasks of one planning round without running them
    Plan {
        /// The question to plan for
        query: String,

        /// Model to use
        #[arg(long)]
        model: Option<String>,
    },
}
