use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    auth::validation::{LoginForm, SignupForm},
    links::{self, ContactKind, Platform},
    region, resources, AuthSession, BlogAggregator,
};
use directory::DirectoryStore;
use serde_json::json;
use shared::{
    domain::{CenterId, Coordinates},
    error::ApiError,
};
use storage::Storage;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod simulate;

use config::{load_settings, Settings};
use simulate::{LocationScript, Step};

#[derive(Parser, Debug)]
#[command(name = "shikshan", about = "3D Shikshan learning-center directory")]
struct Cli {
    /// Config file; `shikshan.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List learning centers, optionally for one district.
    Centers {
        #[arg(long)]
        district: Option<String>,
    },
    /// Show one center with its contact and directions links.
    Center {
        id: String,
        #[arg(long, value_enum, default_value_t = PlatformArg::Android)]
        platform: PlatformArg,
    },
    Districts,
    /// Print the viewport the map would animate to.
    Frame {
        #[arg(long, conflicts_with = "center", required_unless_present = "center")]
        district: Option<String>,
        #[arg(long)]
        center: Option<String>,
    },
    /// Replay map events and print the issued commands as JSON lines.
    Simulate {
        #[arg(long, requires = "lng")]
        lat: Option<f64>,
        #[arg(long, requires = "lat")]
        lng: Option<f64>,
        /// district:<name|all>, tap:<id>, card:<id>, locate, finish:<generation>, wait:<ms>
        #[arg(long = "event")]
        events: Vec<Step>,
    },
    Blogs {
        /// Read the JSON feeds instead of the curated posts.
        #[arg(long)]
        live: bool,
        #[arg(long)]
        limit: Option<usize>,
    },
    Resources,
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        district: String,
        #[arg(long)]
        center: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Ios,
    Android,
}

impl From<PlatformArg> for Platform {
    fn from(value: PlatformArg) -> Self {
        match value {
            PlatformArg::Ios => Platform::Ios,
            PlatformArg::Android => Platform::Android,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        settings.database_url = config::normalize_database_url(&url);
    }
    let directory = Arc::new(load_directory(&settings)?);

    match cli.command {
        Command::Centers { district } => {
            if let Some(d) = &district {
                if !directory.has_district(d) {
                    bail!("unknown district '{d}'");
                }
            }
            for center in directory.filter_by_district(district.as_deref()) {
                println!("{:>3}  {}  ({})", center.id, center.name, center.district);
            }
        }
        Command::Center { id, platform } => {
            let center = directory
                .get(&CenterId::new(id.clone()))
                .with_context(|| format!("unknown center '{id}'"))?;
            println!("{}", center.name);
            println!("  {}", center.address);
            println!("  district: {}  node: {}", center.district, center.node);
            if let Some(description) = &center.description {
                println!("  {description}");
            }
            for kind in links::available_contacts(&center.contact) {
                let url = links::contact_url(&center.contact, kind)?;
                let label = match kind {
                    ContactKind::Phone => "call",
                    ContactKind::Email => "email",
                    ContactKind::Website => "website",
                };
                println!("  {label}: {url}");
            }
            println!(
                "  directions: {}",
                links::directions_url(center, platform.into())?
            );
        }
        Command::Districts => {
            for district in directory.districts() {
                let count = directory.filter_by_district(Some(district)).len();
                println!("{district}: {count}");
            }
        }
        Command::Frame { district, center } => {
            let framing = match (district, center) {
                (_, Some(id)) => {
                    let center = directory
                        .get(&CenterId::new(id.clone()))
                        .with_context(|| format!("unknown center '{id}'"))?;
                    region::frame_single(center.coordinates)?
                }
                (Some(d), None) => {
                    let centers = directory.filter_by_district(Some(&d));
                    region::frame_points(centers.iter().map(|c| c.coordinates))
                        .with_context(|| format!("no centers in district '{d}'"))?
                }
                (None, None) => bail!("pass --district or --center"),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "region": framing.region,
                    "camera": framing.camera,
                }))?
            );
        }
        Command::Simulate { lat, lng, events } => {
            let location = match (lat, lng) {
                (Some(lat), Some(lng)) => LocationScript::Fix(Coordinates::new(lat, lng)),
                _ => LocationScript::Denied,
            };
            let commands = simulate::run(
                directory.clone(),
                settings.controller_config(),
                location,
                events,
            )
            .await?;
            for command in commands {
                println!("{}", serde_json::to_string(&command)?);
            }
        }
        Command::Blogs { live, limit } => {
            let aggregator = if live || settings.live_feeds {
                BlogAggregator::live(reqwest::Client::new())
            } else {
                BlogAggregator::curated()
            };
            let aggregator = aggregator.with_excluded(settings.excluded_sources.clone());
            let posts = aggregator.fetch_all().await;
            for post in posts.iter().take(limit.unwrap_or(usize::MAX)) {
                println!(
                    "{}  [{}]  {}\n    {}",
                    post.published.format("%Y-%m-%d"),
                    post.source,
                    post.title,
                    post.url
                );
            }
        }
        Command::Resources => {
            for site in resources::SITES {
                println!("{}  {}", site.title, site.url);
                println!("    {}", site.description);
                for post in site.latest {
                    println!("    - {}  {}", post.title, post.url);
                }
            }
        }
        Command::Login { email, password } => {
            let session = open_session(&settings).await?;
            let user = session
                .login(&LoginForm { email, password })
                .await
                .map_err(ApiError::from)?;
            println!("signed in as {} <{}>", user.username, user.email);
        }
        Command::Signup {
            name,
            email,
            username,
            phone,
            address,
            district,
            center,
            password,
        } => {
            let session = open_session(&settings).await?;
            let form = SignupForm {
                name,
                username,
                phone,
                email,
                address,
                district: Some(district),
                center_id: Some(CenterId::new(center)),
                confirm_password: password.clone(),
                password,
            };
            let user = session
                .signup(&form, &directory)
                .await
                .map_err(ApiError::from)?;
            println!("account created for {} ({})", user.username, user.center.name);
        }
        Command::Logout => {
            let session = open_session(&settings).await?;
            session.logout().await.map_err(ApiError::from)?;
            println!("signed out");
        }
        Command::Whoami => match open_session(&settings).await?.user() {
            Some(user) => println!(
                "{} <{}>  {} / {}",
                user.username, user.email, user.district, user.center.name
            ),
            None => println!("not signed in"),
        },
    }

    Ok(())
}

fn load_directory(settings: &Settings) -> Result<DirectoryStore> {
    let store = match &settings.directory_path {
        Some(path) => DirectoryStore::load(path)
            .with_context(|| format!("failed to load directory '{}'", path.display()))?,
        None => DirectoryStore::reference().context("embedded directory is invalid")?,
    };
    info!(centers = store.len(), "directory loaded");
    Ok(store)
}

async fn open_session(settings: &Settings) -> Result<AuthSession> {
    let storage = Storage::new(&settings.database_url).await?;
    let session = AuthSession::new(settings.build_auth_backend()?, Arc::new(storage));
    session.restore().await;
    info!(backend = session.backend_name(), "auth session ready");
    Ok(session)
}
