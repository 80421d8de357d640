use std::{fmt, io::IsTerminal};

use anyhow::{Context, bail};
use atmos_core::{
    Config, Coordinates, Dashboard, LoadTarget, LocationStore, Place, SavedLocation,
    gateway_from_config, startup_target,
};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "atmos", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the forecast for the saved default, the given coordinates, or the
    /// configured fallback city.
    Show {
        /// Latitude of your current position.
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of your current position.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Display name to use instead of reverse geocoding.
        #[arg(long, requires = "lat")]
        name: Option<String>,

        /// Save the shown location as the default.
        #[arg(long)]
        save: bool,
    },

    /// Search for a city and show its forecast.
    Search {
        /// City name, e.g. "Portland".
        query: String,

        /// Pick the Nth result (1-based) without prompting.
        #[arg(long)]
        pick: Option<usize>,

        /// Save the picked city as the default.
        #[arg(long)]
        save: bool,
    },

    /// Print the saved default location.
    Default,

    /// Forget the saved default location.
    Forget,

    /// Interactively set the fallback city and request timeout.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let store = LocationStore::new(Config::data_dir()?);
        tracing::debug!(?config, store = %store.path().display(), "loaded configuration");

        match self.command {
            Command::Show { lat, lon, name, save } => {
                let geolocated = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                let target = match (geolocated, name) {
                    (Some(coords), Some(name)) => LoadTarget::named(coords, name),
                    (Some(coords), None) => LoadTarget::at(coords),
                    (None, _) => startup_target(&store, None, &config),
                };
                show(&config, &store, target, save).await?;
            }
            Command::Search { query, pick, save } => {
                let dashboard = dashboard(&config)?;
                let places = dashboard
                    .search(&query)
                    .await
                    .with_context(|| format!("City search for '{query}' failed"))?;

                let Some(place) = choose_place(places, pick)? else {
                    return Ok(());
                };
                show_with(&dashboard, &store, LoadTarget::from(&place), save).await?;
            }
            Command::Default => match store.load() {
                Some(saved) => println!("{} ({})", saved.name, saved.coordinates().label()),
                None => println!("No default location saved."),
            },
            Command::Forget => {
                store.clear()?;
                println!("Default location cleared.");
            }
            Command::Configure => configure(config).await?,
        }

        Ok(())
    }
}

fn dashboard(config: &Config) -> anyhow::Result<Dashboard> {
    Ok(Dashboard::new(gateway_from_config(config)?))
}

async fn show(
    config: &Config,
    store: &LocationStore,
    target: LoadTarget,
    save: bool,
) -> anyhow::Result<()> {
    let dashboard = dashboard(config)?;
    show_with(&dashboard, store, target, save).await
}

async fn show_with(
    dashboard: &Dashboard,
    store: &LocationStore,
    target: LoadTarget,
    save: bool,
) -> anyhow::Result<()> {
    if let Err(e) = dashboard.load(target).await {
        let message = e.user_message();
        return Err(anyhow::Error::new(e).context(message));
    }
    print!("{}", render::render(&dashboard.state()));

    if save && dashboard.save_current_as_default(store)? {
        println!("Saved as default location.");
        return Ok(());
    }

    let is_default = dashboard
        .state()
        .report()
        .is_some_and(|report| store.is_default(&report.weather));
    if is_default {
        println!("★ Default location");
    }

    Ok(())
}

struct PlaceChoice(Place);

impl fmt::Display for PlaceChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = self.0.region_line();
        if region.is_empty() {
            f.write_str(&self.0.name)
        } else {
            write!(f, "{} ({})", self.0.name, region)
        }
    }
}

fn choose_place(places: Vec<Place>, pick: Option<usize>) -> anyhow::Result<Option<Place>> {
    if places.is_empty() {
        print!("{}", render::render_places(&places));
        return Ok(None);
    }

    if let Some(n) = pick {
        let len = places.len();
        return match n.checked_sub(1).and_then(|i| places.into_iter().nth(i)) {
            Some(place) => Ok(Some(place)),
            None => bail!("--pick {n} is out of range; the search returned {len} result(s)"),
        };
    }

    if !std::io::stdin().is_terminal() {
        print!("{}", render::render_places(&places));
        return Ok(None);
    }

    let choices = places.into_iter().map(PlaceChoice).collect();
    let picked = Select::new("Choose a location:", choices)
        .prompt_skippable()
        .context("Location prompt failed")?;

    Ok(picked.map(|choice| choice.0))
}

async fn configure(mut config: Config) -> anyhow::Result<()> {
    let query = Text::new("Fallback city (leave empty to keep current):")
        .with_help_message(&format!("Currently: {}", config.default_location.name))
        .prompt()
        .context("City prompt failed")?;

    if !query.trim().is_empty() {
        let dashboard = dashboard(&config)?;
        let places = dashboard
            .search(&query)
            .await
            .with_context(|| format!("City search for '{query}' failed"))?;

        if let Some(place) = choose_place(places, None)? {
            config.default_location = SavedLocation {
                lat: place.latitude,
                lon: place.longitude,
                name: place.display_name(),
            };
        }
    }

    config.timeout_secs = CustomType::<u64>::new("Request timeout in seconds:")
        .with_default(config.timeout_secs)
        .with_error_message("Please enter a whole number of seconds")
        .prompt()
        .context("Timeout prompt failed")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}
