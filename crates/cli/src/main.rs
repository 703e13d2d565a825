mod check_commands;
mod dry_run;
mod host;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    fleet_common::{AccessLevel, BotHandle},
    fleet_config::FleetConfig,
    fleet_dispatch::{DispatchRequest, Dispatcher},
    tokio::io::{AsyncBufReadExt, BufReader},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "fleet", about = "Fleet command dispatcher")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery).
    #[arg(long, global = true, env = "FLEET_CONFIG")]
    config: Option<PathBuf>,

    /// Account the commands are sent to (defaults to the first configured).
    #[arg(long, global = true)]
    bot: Option<String>,

    /// Caller access level.
    #[arg(long, global = true, default_value = "owner")]
    access: AccessLevel,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch a single command line and print the reply.
    Run {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },
    /// Dispatch one command per stdin line (default).
    Repl,
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<FleetConfig> {
    match cli.config {
        Some(ref path) => fleet_config::load_config(path),
        None => Ok(fleet_config::discover_and_load()),
    }
}

async fn dispatch_line(
    dispatcher: &Dispatcher,
    origin: &BotHandle,
    access: AccessLevel,
    line: &str,
) {
    let request = DispatchRequest::new(origin.clone(), access, line);
    if let Some(reply) = dispatcher.dispatch(request).await {
        println!("{reply}");
    }
}

async fn repl(
    dispatcher: &Dispatcher,
    origin: &BotHandle,
    access: AccessLevel,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        dispatch_line(dispatcher, origin, access, &line).await;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "fleet starting");

    if let Some(Commands::Check { verbose }) = cli.command {
        return check_commands::check(cli.config.as_deref(), verbose);
    }

    let config = load_config(&cli)?;
    let dispatcher = host::build_dispatcher(&config)?;
    let origin = BotHandle::new(host::origin_name(&config, cli.bot.as_deref()));
    info!(bot = %origin, access = %cli.access, "dispatching");

    match cli.command {
        Some(Commands::Run { ref line }) => {
            dispatch_line(&dispatcher, &origin, cli.access, &line.join(" ")).await;
            Ok(())
        },
        None | Some(Commands::Repl) => repl(&dispatcher, &origin, cli.access).await,
        Some(Commands::Check { .. }) => Ok(()),
    }
}
