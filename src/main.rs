use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use tidarr_send::{
    config::Settings,
    menu::MenuButton,
    models::{MediaSelection, Quality},
    request,
    tidarr::{ConnectionTest, TidarrClient},
};

#[derive(Parser)]
#[command(
    name = "tidarr-send",
    version,
    about = "Send Tidal tracks, albums and playlists to a self-hosted Tidarr instance"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send one or more items to the Tidarr download queue
    Send {
        /// Tidal share URLs or KIND:ID references (e.g. track:42, album:7)
        #[arg(required = true)]
        items: Vec<String>,
        /// Override the configured download quality (low, high, master)
        #[arg(long)]
        quality: Option<String>,
    },
    /// Test the connection to the configured Tidarr server
    Test,
    /// Show or edit the stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current settings as JSON
    Show,
    /// Set one field: server-url, admin-password, quality or debug
    Set { field: String, value: String },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Send { items, quality } => cmd_send(&items, quality.as_deref()),
        Command::Test => cmd_test(),
        Command::Config { action } => cmd_config(action),
    }
}

fn cmd_send(items: &[String], quality_override: Option<&str>) -> Result<()> {
    let settings = Settings::load()?;
    let server = settings.server();

    let selections = items
        .iter()
        .map(|item| {
            MediaSelection::parse(item).with_context(|| {
                format!("unrecognized item: {item} (expected a Tidal share URL or KIND:ID)")
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if settings.debug_mode {
        // The plugin's debug entry: dump the raw selection before sending
        println!("{}", serde_json::to_string_pretty(&selections)?);
    }

    let quality = match quality_override {
        Some(value) => value
            .parse::<Quality>()
            .map_err(|err| anyhow::anyhow!(err))?,
        None => settings.download_quality,
    };

    let requests = request::plan(&selections, quality);
    let client = TidarrClient::new();
    let mut button = MenuButton::for_requests(&requests);
    let total = requests.len();

    println!("{}", button.label());
    let results = button.click(&client, &requests, &server, |index, request, result| {
        match result {
            Ok(_) => println!(
                "  [{}/{total}] queued \"{}\" by {}",
                index + 1,
                request.title,
                request.artist
            ),
            Err(err) => eprintln!("  [{}/{total}] \"{}\": {err}", index + 1, request.title),
        }
    });
    println!("{}", button.label());

    if results.iter().all(|result| result.is_err()) {
        bail!("no items were accepted by Tidarr");
    }
    Ok(())
}

fn cmd_test() -> Result<()> {
    let settings = Settings::load()?;
    let client = TidarrClient::new();

    match client.test_connection(&settings.server()) {
        ConnectionTest::NotConfigured => {
            bail!("no Tidarr server configured; set one with `tidarr-send config set server-url <URL>`")
        }
        ConnectionTest::Success => {
            println!("Connected to {}", settings.server().url);
            Ok(())
        }
        ConnectionTest::Failure(reason) => bail!("connection test failed: {reason}"),
    }
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        ConfigAction::Set { field, value } => {
            // Edit the file as-is; env overrides stay session-local
            let mut settings = match Settings::path() {
                Some(path) if path.exists() => Settings::load_from(&path)?,
                _ => Settings::default(),
            };

            match field.as_str() {
                "server-url" => {
                    if !value.starts_with("http://") && !value.starts_with("https://") {
                        bail!("server-url must be an absolute http(s) URL");
                    }
                    settings.server_url = value;
                }
                "admin-password" => settings.admin_password = value,
                "quality" => {
                    settings.download_quality =
                        value.parse().map_err(|err: String| anyhow::anyhow!(err))?
                }
                "debug" => {
                    settings.debug_mode = value
                        .parse()
                        .with_context(|| format!("debug expects true or false, got {value}"))?
                }
                other => bail!(
                    "unknown field: {other} (expected server-url, admin-password, quality or debug)"
                ),
            }

            settings.save()?;
            println!("saved");
            Ok(())
        }
    }
}
