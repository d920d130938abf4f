use sl_desktop::{Cli, launch};

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match launch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("standalone-launcher: {e}");
            eprintln!("{}", e.recovery_hint());
            ExitCode::FAILURE
        }
    }
}
