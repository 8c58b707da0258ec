use clap::{Parser, Subcommand};
use relay::config::Settings;
use relay::directory::{CoordinatorDirectory, Topic};

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "WhatsApp webhook relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the webhook server (GET/POST /webhook). Settings come from the config file, then env (.env is loaded first).
    Serve {
        /// Config file path (default: RELAY_CONFIG_PATH or ./relay.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from PORT, config, or 3000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Print which settings and coordinators are configured. Exits non-zero when outbound credentials are missing.
    Check {
        /// Config file path (default: RELAY_CONFIG_PATH or ./relay.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("reading .env failed: {}", e);
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("relay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Check { config }) => match run_check(config) {
            Ok(true) => {}
            Ok(false) => std::process::exit(2),
            Err(e) => {
                log::error!("check failed: {:#}", e);
                std::process::exit(1);
            }
        },
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn load_settings(config_path: Option<std::path::PathBuf>) -> anyhow::Result<Settings> {
    let (config, path) = relay::config::load_config(config_path)?;
    log::debug!("using config {}", path.display());
    Ok(relay::config::resolve_settings_from_env(&config))
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut settings = load_settings(config_path)?;
    if let Some(p) = port {
        settings.port = p;
    }
    log::info!("starting relay on {}:{}", settings.bind, settings.port);
    relay::gateway::run_gateway(settings).await
}

fn configured(value: Option<&str>) -> &'static str {
    if value.is_some() {
        "set"
    } else {
        "missing"
    }
}

/// Returns Ok(false) when outbound sends cannot work.
fn run_check(config_path: Option<std::path::PathBuf>) -> anyhow::Result<bool> {
    let settings = load_settings(config_path)?;
    let directory = CoordinatorDirectory::new(&settings.coordinators);

    println!("listen:          {}:{}", settings.bind, settings.port);
    println!(
        "messages url:    {}",
        settings.messages_url().as_deref().unwrap_or("(PHONE_NUMBER_ID missing)")
    );
    println!(
        "access token:    {}",
        configured(settings.access_token.as_deref())
    );
    for topic in Topic::ALL {
        println!(
            "coord {:<10} {}",
            format!("{}:", topic.as_str()),
            directory.topic(topic).unwrap_or("-")
        );
    }
    println!(
        "coord {:<10} {}",
        "atendente:",
        directory.attendant().unwrap_or("-")
    );

    let missing = settings.missing_credentials();
    if !missing.is_empty() {
        println!("missing:         {}", missing.join(", "));
    }
    Ok(missing.is_empty())
}
