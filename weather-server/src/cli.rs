use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use weather_core::{Config, OpenWeatherProvider, WeatherParams, WeatherProvider, WeatherService};

use crate::server::{self, AppState};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather proxy server")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        /// Address to bind, e.g. "127.0.0.1:8080".
        #[arg(long)]
        listen: Option<String>,
    },

    /// Look up the weather once and print the JSON payload.
    Show {
        /// City name; takes priority over coordinates.
        #[arg(long)]
        city: Option<String>,

        /// Latitude in decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,

        /// Longitude in decimal degrees.
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<String>,
    },

    /// Store the OpenWeather API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { listen } => {
                let config = Config::load_with_env(self.config.as_deref())?;
                let addr = listen.unwrap_or_else(|| config.listen_addr().to_string());
                let service = build_service(&config);
                server::serve(&addr, AppState::new(service, config)).await
            }
            Command::Show { city, lat, lng } => {
                let config = Config::load_with_env(self.config.as_deref())?;
                let service = build_service(&config);
                let params = WeatherParams { city, lat, lng };

                let payload = service
                    .current_weather(&params, config.credential())
                    .await
                    .context("Weather lookup failed")?;

                println!("{}", serde_json::to_string_pretty(&payload)?);
                Ok(())
            }
            Command::Configure => configure(self.config),
        }
    }
}

fn build_service(config: &Config) -> server::DynService {
    tracing::debug!(base_url = config.base_url(), "using OpenWeather provider");
    let provider: Box<dyn WeatherProvider> =
        Box::new(OpenWeatherProvider::with_base_url(config.base_url()));
    WeatherService::new(provider)
}

fn configure(path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::config_file_path()?,
    };
    let mut config = Config::load_from(&path)?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    config.save_to(&path)?;

    println!("Saved API key to {}", path.display());
    Ok(())
}
