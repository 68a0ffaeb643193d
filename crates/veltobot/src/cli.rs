use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "velto")]
#[command(author, version, about = "Telegram onboarding bot for the Velto group", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling) and the liveness endpoint
    Run,

    /// Dump every stored user record to a CSV file
    Export {
        /// Destination file
        #[arg(short, long, default_value = "velto_users.csv")]
        output: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
