// src/main.rs

use cmdchain::{cli, logging, run, RunState};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(RunState::Halted) => std::process::exit(1),
        Ok(_) => {}
        Err(err) => {
            eprintln!("cmdchain error: {err:?}");
            std::process::exit(2);
        }
    }
}

async fn run_main() -> anyhow::Result<RunState> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
