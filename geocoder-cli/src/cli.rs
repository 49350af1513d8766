use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use geocoder_core::{
    CacheStore, Config, DiskCache, Direction, DumperId, FieldValue, Geocoder, ProviderId,
    dumper_for, prepare,
};
use inquire::{Confirm, Text};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geocoder", version, about = "Geocoding CLI")]
pub struct Cli {
    /// Log provider fallbacks and cache hits to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve free text (an address or place name) to a location.
    Geocode {
        /// Address or location name.
        text: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Resolve "lat,lon" to an address.
    Reverse {
        /// Coordinates, e.g. "40.7,-74.0".
        #[arg(allow_hyphen_values = true)]
        coordinates: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// List known providers.
    Providers,

    /// List output formats.
    Dumpers,

    /// Configure credentials or endpoint for a specific provider.
    Configure {
        /// Provider short name, e.g. "mapsco" or "openstreetmap".
        provider: String,
    },

    /// Inspect or clear the on-disk result cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show where the cache lives and how much it holds.
    Info,
    /// Drop every cached result.
    Clear,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Provider to try; repeat to set the order. Defaults to the configured order.
    #[arg(short = 'p', long = "provider")]
    providers: Vec<String>,

    /// Output format, e.g. "geojson", "wkt" or "address_text".
    #[arg(short, long)]
    dumper: Option<String>,

    /// Neither read from nor write to the result cache.
    #[arg(long)]
    no_cache: bool,

    /// Print every address found instead of only the first.
    #[arg(long)]
    all: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Geocode { text, lookup } => {
                lookup.run(FieldValue::Text(text), Direction::Geocode).await?
            }
            Command::Reverse { coordinates, lookup } => {
                lookup.run(FieldValue::Text(coordinates), Direction::Reverse).await?
            }
            Command::Providers => {
                let config = Config::load()?;
                for id in ProviderId::all() {
                    let status = if config.is_provider_configured(*id) {
                        "ready"
                    } else {
                        "needs `geocoder configure`"
                    };
                    println!("{:<15} {:<28} {status}", id.as_str(), id.label());
                }
            }
            Command::Dumpers => {
                for id in DumperId::all() {
                    println!("{:<15} {}", id.as_str(), id.label());
                }
            }
            Command::Configure { provider } => configure(&provider)?,
            Command::Cache { action } => {
                let cache = DiskCache::new(Config::cache_file_path()?);
                match action {
                    CacheAction::Info => print_cache_info(&cache)?,
                    CacheAction::Clear => {
                        cache.clear()?;
                        println!("Cleared cache at {}", cache.path().display());
                    }
                }
            }
        }

        Ok(())
    }
}

impl LookupArgs {
    async fn run(self, value: FieldValue, direction: Direction) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if self.no_cache {
            config.cache = false;
        }

        let providers =
            if self.providers.is_empty() { config.enabled_providers() } else { self.providers };

        let dumper_id = match &self.dumper {
            Some(name) => DumperId::try_from(name.as_str())?,
            None => config.default_dumper_id()?,
        };
        let dumper = dumper_for(dumper_id);

        let store: Option<Arc<dyn CacheStore>> = if config.cache {
            Some(Arc::new(DiskCache::new(Config::cache_file_path()?)))
        } else {
            None
        };
        let geocoder = Geocoder::from_config(&config, store);

        let prepared = prepare(&value, direction)?;
        let result = geocoder
            .geocode_prepared(&prepared, &providers)
            .await
            .with_context(|| format!("Lookup with providers [{}] failed", providers.join(", ")))?;

        if result.is_empty() {
            eprintln!("No results from providers: {}", providers.join(", "));
            return Ok(());
        }

        let limit = if self.all { result.len() } else { 1 };
        for address in result.iter().take(limit) {
            println!("{}", dumper.dump(address)?);
        }

        Ok(())
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    match id {
        ProviderId::Test => bail!("Provider '{id}' has nothing to configure."),
        ProviderId::MapsCo => {
            let api_key = Text::new(&format!("API key for {}:", id.label()))
                .with_help_message("Get a free key at https://geocode.maps.co")
                .prompt()
                .context("Failed to read API key")?;
            if api_key.trim().is_empty() {
                bail!("API key must not be empty");
            }
            config.upsert_provider_api_key(id, api_key.trim().to_string());
        }
        ProviderId::OpenStreetMap => {
            let current = config
                .provider_base_url(id)
                .unwrap_or("https://nominatim.openstreetmap.org")
                .to_string();
            let base_url = Text::new("Nominatim base URL:")
                .with_default(&current)
                .prompt()
                .context("Failed to read base URL")?;
            config.set_provider_base_url(id, base_url.trim().to_string());
        }
    }

    let prefer = Confirm::new(&format!("Try {id} first?"))
        .with_default(true)
        .prompt()
        .context("Failed to read answer")?;
    if prefer {
        config.prefer_provider(id);
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn print_cache_info(cache: &DiskCache) -> anyhow::Result<()> {
    let entries = cache.entries()?;

    println!("Cache file: {}", cache.path().display());
    println!("Entries:    {}", entries.len());

    if let (Some((_, oldest)), Some((_, newest))) = (entries.first(), entries.last()) {
        let fmt = "%Y-%m-%d %H:%M:%S";
        println!("Oldest:     {}", oldest.with_timezone(&Local).format(fmt));
        println!("Newest:     {}", newest.with_timezone(&Local).format(fmt));
    }

    Ok(())
}
