// File: chanadmin/src/main.rs
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use chanadmin::Cli;

#[tokio::main]
async fn main() {
    // Logs go to stderr so that stdout only carries the node's answer
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chanadmin=warn"));
    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            eprint!("{}", e);
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    match chanadmin::execute(cli).await {
        Ok(outcome) => {
            print!("{}", outcome.output);
            std::process::exit(outcome.exit_code);
        }
        Err(e) => {
            eprintln!("chanadmin: error: {:#}", e);
            std::process::exit(1);
        }
    }
}
