mod config_commands;
mod run_command;
mod send_command;

use std::path::PathBuf;

use {
    anyhow::Context,
    clap::{Args, Parser, Subcommand},
    ircrelay_config::RelayConfig,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "ircrelay", about = "ircrelay: relay local webhooks into an IRC channel")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true, env = "IRCRELAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

/// Values that override the config file.
#[derive(Args, Default)]
struct Overrides {
    /// Chat server as host:port.
    #[arg(long, global = true, env = "IRCRELAY_SERVER")]
    server: Option<String>,
    /// Channel to join and relay into.
    #[arg(long, global = true, env = "IRCRELAY_CHANNEL")]
    channel: Option<String>,
    /// Nickname to register with.
    #[arg(long, global = true)]
    nick: Option<String>,
    /// Address the webhook binds to.
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port the webhook listens on.
    #[arg(long, global = true)]
    port: Option<u16>,
}

impl Overrides {
    fn apply(self, config: &mut RelayConfig) {
        if let Some(server) = self.server {
            config.irc.server = server;
        }
        if let Some(channel) = self.channel {
            config.irc.channel = channel;
        }
        if let Some(nick) = self.nick {
            config.irc.nick = nick;
        }
        if let Some(bind) = self.bind {
            config.webhook.bind = bind;
        }
        if let Some(port) = self.port {
            config.webhook.port = port;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and serve the webhook (default when no subcommand is provided).
    Run,
    /// Validate the configuration and print the resolved values.
    CheckConfig {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Post a message to the running relay's webhook.
    Send {
        #[arg(short, long)]
        message: String,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load the explicit `--config` file or discover one, then apply overrides.
fn resolve_config(config: Option<&PathBuf>, overrides: Overrides) -> anyhow::Result<RelayConfig> {
    let mut resolved = match config {
        Some(path) => ircrelay_config::load_config(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ircrelay_config::discover_and_load(),
    };
    overrides.apply(&mut resolved);
    Ok(resolved)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    let config_path = cli.config.clone();
    let config = resolve_config(config_path.as_ref(), cli.overrides)?;

    match cli.command {
        None | Some(Commands::Run) => {
            info!(version = env!("CARGO_PKG_VERSION"), "ircrelay starting");
            run_command::run(config).await
        },
        Some(Commands::CheckConfig { verbose }) => {
            config_commands::check(&config, config_path.as_deref(), verbose)
        },
        Some(Commands::Send { message }) => send_command::send(&config.webhook, &message).await,
    }
}
