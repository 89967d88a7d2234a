use std::process::ExitCode;

use monarch_export::{args, cli};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let args = args::parse();
    let result = cli::run(args).await;
    if let Err(err) = &result {
        log::error!("{err}");
    }
    ExitCode::from(cli::exit_code(&result))
}
