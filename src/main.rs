mod aws_client;
mod check;
mod cli;
mod config;
mod poll;

use clap::error::ErrorKind;
use clap::Parser;
use cli::Cli;

use check::Checker;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let checker = match Cli::try_parse() {
        Ok(args) => check_with(args).await,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        // Usage errors are reported through the check protocol, not clap's exit code.
        Err(err) => Checker::unknown(first_line(&err.to_string())),
    };

    checker.exit()
}

async fn check_with(args: Cli) -> Checker {
    let config = args.into_config();
    log::debug!("resolved config: {:?}", config);

    match aws_client::make_client(&config).await {
        Ok(client) => check::run(&client, &config).await,
        Err(err) => Checker::unknown(format!("{err:#}")),
    }
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or_default().trim().to_string()
}
