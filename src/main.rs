// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, build the API client, hand both to the
//   dispatcher.
// - Fatal errors are printed as an error line and exit with status 1;
//   per-item failures are printed by the dispatcher and do not change the
//   exit status.

use clap::{CommandFactory, Parser};
use letscrate::cli::{Cli, VERSION_BANNER};
use letscrate::config::default_credentials_path;
use letscrate::ui::{Layout, Terminal};
use letscrate::ApiClient;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("LETSCRATE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("letscrate={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(layout: &Layout, err: &letscrate::Error) -> ! {
    eprintln!("{}", layout.error_line(&err.to_string(), err.subject().as_deref()));
    if let Some(hint) = err.hint() {
        eprintln!("{}", hint);
    }
    std::process::exit(1);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VERSION_BANNER);
        return Ok(());
    }
    init_logging(cli.verbose);

    let layout = Layout::detect();
    let quiet = cli.quiet;
    let credentials_file = default_credentials_path();

    let options = match cli.into_options(credentials_file.as_deref()) {
        Ok(Some(options)) => options,
        Ok(None) => {
            Cli::command().print_help()?;
            return Ok(());
        }
        Err(err) => fail(&layout, &err),
    };

    // Base URL comes from `LETSCRATE_API_URL` or the public endpoint.
    let api = ApiClient::from_env()?;
    tracing::debug!(base_url = api.base_url(), action = options.action.name(), "starting");

    let mut sink = Terminal::new(quiet);
    match letscrate::run(&options, &api, &layout, &mut sink) {
        Ok(summary) => {
            tracing::info!(processed = summary.processed, failed = summary.failed, "finished");
            Ok(())
        }
        Err(err) => fail(&layout, &err),
    }
}
