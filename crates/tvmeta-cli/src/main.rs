//! tvmeta - TV show metadata lookup CLI.

/// Application configuration (TOML).
mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, resolve_config_path};
use tvmeta_api::provider::current_season_of;
use tvmeta_api::season;
use tvmeta_api::thetvdb::TheTvdbClient;
use tvmeta_api::tvmaze::TvMazeClient;
use tvmeta_api::{Episode, LocalTvProvider, NullableDate, Season, Show};

/// User-Agent sent to every provider.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory (default: `$TVMETA_CONFIG_DIR`, then
    /// `$XDG_CONFIG_HOME/tvmeta`, then `~/.config/tvmeta`).
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Query the TVMaze API.
    Tvmaze(TvMazeCommand),
    /// Query the TheTVDB API.
    Thetvdb(TheTvdbCommand),
    /// Show or update the config file.
    Config(ConfigCommand),
}

/// Arguments for the `tvmaze` subcommand.
#[derive(clap::Args)]
struct TvMazeCommand {
    /// TVMaze subcommand to run.
    #[command(subcommand)]
    command: TvMazeSubcommands,
}

/// Available TVMaze subcommands.
#[derive(Subcommand)]
enum TvMazeSubcommands {
    /// Operations every provider supports.
    #[command(flatten)]
    Show(ShowSubcommands),
    /// Look a show up by a TVRage or TheTVDB id.
    Lookup(LookupArgs),
    /// List one page of the show index.
    Index(IndexArgs),
}

/// Arguments for the `thetvdb` subcommand.
#[derive(clap::Args)]
struct TheTvdbCommand {
    /// TheTVDB API key (falls back to `[thetvdb] api_key` in config.toml).
    #[arg(long, env = "TVMETA_THETVDB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// TheTVDB subcommand to run.
    #[command(subcommand)]
    command: ShowSubcommands,
}

/// Show, season and episode lookups shared by all providers.
#[derive(Subcommand)]
enum ShowSubcommands {
    /// Search shows by name.
    Search(NameArgs),
    /// Show the best match for a name.
    Show(NameArgs),
    /// Re-fetch a show by id.
    Refresh(IdArgs),
    /// List every episode of a show.
    Episodes(IdArgs),
    /// Show one episode.
    Episode(EpisodeArgs),
    /// List the seasons of a show.
    Seasons(IdArgs),
    /// Show one season.
    Season(SeasonArgs),
    /// Show the most recent season that has premiered.
    CurrentSeason(IdArgs),
    /// Show the season airing on a given date.
    ActiveSeason(ActiveSeasonArgs),
    /// Show the next episode to air.
    NextEpisode(IdArgs),
}

/// `--name` argument.
#[derive(clap::Args)]
struct NameArgs {
    /// Show name (e.g. "Archer").
    #[arg(long, required = true)]
    name: String,
}

/// `--id` argument.
#[derive(clap::Args)]
struct IdArgs {
    /// Provider show ID.
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `episode` subcommand.
#[derive(clap::Args)]
struct EpisodeArgs {
    /// Provider show ID.
    #[arg(long, required = true)]
    id: u64,
    /// Season number.
    #[arg(long, required = true)]
    season: u32,
    /// Episode number within the season.
    #[arg(long, required = true)]
    number: u32,
}

/// Arguments for the `season` subcommand.
#[derive(clap::Args)]
struct SeasonArgs {
    /// Provider show ID.
    #[arg(long, required = true)]
    id: u64,
    /// Season number.
    #[arg(long, required = true)]
    number: u32,
}

/// Arguments for the `active-season` subcommand.
#[derive(clap::Args)]
struct ActiveSeasonArgs {
    /// Provider show ID.
    #[arg(long, required = true)]
    id: u64,
    /// Probe date, YYYY-MM-DD.
    #[arg(long, required = true, value_parser = parse_probe_date)]
    date: DateTime<Utc>,
}

/// Arguments for the `tvmaze lookup` subcommand.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct LookupArgs {
    /// TVRage show ID.
    #[arg(long)]
    tvrage: Option<u64>,
    /// TheTVDB series ID.
    #[arg(long)]
    thetvdb: Option<u64>,
}

/// Arguments for the `tvmaze index` subcommand.
#[derive(clap::Args)]
struct IndexArgs {
    /// Page number, starting at 0.
    #[arg(long, default_value_t = 0)]
    page: u32,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the config file location and settings.
    Show,
    /// Update settings and write the config file.
    Set(ConfigSetArgs),
}

/// Arguments for the `config set` subcommand.
#[derive(clap::Args)]
#[group(required = true, multiple = true)]
struct ConfigSetArgs {
    /// TheTVDB API key.
    #[arg(long)]
    thetvdb_api_key: Option<String>,
    /// TheTVDB XML mirror URL.
    #[arg(long)]
    thetvdb_base_url: Option<String>,
    /// TVMaze API base URL.
    #[arg(long)]
    tvmaze_base_url: Option<String>,
}

/// Parses `--date` into the instant `active-season` probes with.
fn parse_probe_date(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    raw.parse::<NullableDate>()
        .map_err(|e| e.to_string())?
        .instant()
        .ok_or_else(|| String::from("expected YYYY-MM-DD"))
}

/// Placeholder for a show known only by id. Episode lookups read nothing
/// but the id.
fn show_ref(id: u64) -> Show {
    Show {
        id,
        ..Show::default()
    }
}

/// Show handle for season lookups. TheTVDB derives seasons from the
/// episode list and takes their network from the show, so it needs the
/// full record.
#[allow(clippy::future_not_send)]
async fn season_show(api: &(impl LocalTvProvider + Sync), id: u64, full: bool) -> Result<Show> {
    if full {
        api.refresh_show(id).await.context("failed to fetch show")
    } else {
        Ok(show_ref(id))
    }
}

/// Renders an optional value, `-` when absent.
fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Renders a date, `-` when invalid.
fn date_or_dash(date: NullableDate) -> String {
    if date.is_valid() {
        date.to_string()
    } else {
        String::from("-")
    }
}

fn log_show(show: &Show) {
    tracing::info!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        show.id,
        show.name,
        date_or_dash(show.premiered),
        or_dash(&show.network),
        or_dash(&show.country),
        or_dash(&show.status),
    );
}

fn log_show_detail(show: &Show) {
    tracing::info!("ID:\t\t{}", show.id);
    tracing::info!("Name:\t\t{}", show.name);
    tracing::info!("Type:\t\t{}", or_dash(&show.kind));
    tracing::info!("Status:\t\t{}", or_dash(&show.status));
    tracing::info!("Language:\t{}", or_dash(&show.locale));
    tracing::info!("Genres:\t\t{}", or_dash(&show.genres.join(", ")));
    tracing::info!(
        "Network:\t{}{}",
        or_dash(&show.network),
        if show.web_only { " (web)" } else { "" }
    );
    tracing::info!("Country:\t{}", or_dash(&show.country));
    tracing::info!("Premiered:\t{}", date_or_dash(show.premiered));
    tracing::info!("Ended:\t\t{}", date_or_dash(show.ended));
    tracing::info!(
        "Runtime:\t{}",
        show.runtime
            .map_or_else(|| String::from("-"), |r| format!("{r} min"))
    );
    tracing::info!(
        "IDs:\t\ttvrage={} thetvdb={} imdb={}",
        show.tvrage_id(),
        show.thetvdb_id(),
        or_dash(&show.imdb_id()),
    );
    tracing::info!("Poster:\t\t{}", or_dash(show.original_poster()));
    tracing::info!("URL:\t\t{}", or_dash(&show.url));
    if !show.seasons.is_empty() {
        tracing::info!("Seasons:\t{}", show.seasons.len());
    }
}

fn log_season(season: &Season) {
    tracing::info!(
        "{}\t{}\t{}\t{:?}\t{}\t{}",
        season.number,
        date_or_dash(season.premiere),
        date_or_dash(season.end),
        season.state(Utc::now()),
        season
            .episode_order
            .map_or_else(|| String::from("-"), |n| n.to_string()),
        or_dash(&season.network.name),
    );
}

fn log_episode(episode: &Episode) {
    tracing::info!(
        "S{:02}E{:02}\t{}\t{}\t{}",
        episode.season,
        episode.number,
        episode.id,
        episode
            .air_stamp
            .map_or_else(|| date_or_dash(episode.air_date), |t| t.to_rfc3339()),
        episode.name,
    );
}

/// Runs a show, season or episode lookup against any provider.
/// `full_show` makes season lookups fetch the show record first.
///
/// # Errors
///
/// Returns an error if the provider request fails or nothing matches.
#[allow(clippy::future_not_send)]
#[instrument(skip_all)]
async fn run_show_command(
    api: &(impl LocalTvProvider + Sync),
    command: &ShowSubcommands,
    full_show: bool,
) -> Result<()> {
    match command {
        ShowSubcommands::Search(args) => {
            let shows = api
                .find_show(&args.name)
                .await
                .context("failed to search shows")?;
            tracing::info!("ID\tName\tPremiered\tNetwork\tCountry\tStatus");
            for show in &shows {
                log_show(show);
            }
            tracing::info!("Total: {} shows", shows.len());
        }
        ShowSubcommands::Show(args) => {
            let show = api
                .get_show(&args.name)
                .await
                .context("failed to fetch show")?;
            log_show_detail(&show);
        }
        ShowSubcommands::Refresh(args) => {
            let show = api
                .refresh_show(args.id)
                .await
                .context("failed to refresh show")?;
            log_show_detail(&show);
        }
        ShowSubcommands::Episodes(args) => {
            let episodes = api
                .get_episodes(&show_ref(args.id))
                .await
                .context("failed to fetch episodes")?;
            tracing::info!("Episode\tID\tAired\tName");
            for episode in &episodes {
                log_episode(episode);
            }
            tracing::info!("Total: {} episodes", episodes.len());
        }
        ShowSubcommands::Episode(args) => {
            let episode = api
                .get_episode(&show_ref(args.id), args.season, args.number)
                .await
                .context("failed to fetch episode")?;
            log_episode(&episode);
            if !episode.description.is_empty() {
                tracing::info!("{}", episode.description);
            }
        }
        ShowSubcommands::Seasons(args) => {
            let show = season_show(api, args.id, full_show).await?;
            let seasons = api
                .get_seasons(&show)
                .await
                .context("failed to fetch seasons")?;
            tracing::info!("Season\tPremiere\tEnd\tState\tEpisodes\tNetwork");
            for season in &seasons {
                log_season(season);
            }
            tracing::info!("Total: {} seasons", seasons.len());
        }
        ShowSubcommands::Season(args) => {
            let show = season_show(api, args.id, full_show).await?;
            let season = api
                .get_season(&show, args.number)
                .await
                .context("failed to fetch season")?;
            log_season(&season);
        }
        ShowSubcommands::CurrentSeason(args) => {
            let show = season_show(api, args.id, full_show).await?;
            let season = current_season_of(api, &show)
                .await
                .context("failed to resolve current season")?;
            log_season(&season);
        }
        ShowSubcommands::ActiveSeason(args) => {
            let show = season_show(api, args.id, full_show).await?;
            let seasons = api
                .get_seasons(&show)
                .await
                .context("failed to fetch seasons")?;
            let season = season::active_season(&seasons, args.date)
                .context("failed to resolve active season")?;
            log_season(season);
        }
        ShowSubcommands::NextEpisode(args) => {
            let next = api
                .get_next_episode(&show_ref(args.id))
                .await
                .context("failed to fetch next episode")?;
            match next {
                Some(episode) => log_episode(&episode),
                None => tracing::info!("No upcoming episode"),
            }
        }
    }
    Ok(())
}

/// Builds a TVMaze client from config.
///
/// # Errors
///
/// Returns an error if the configured base URL is invalid or the client
/// fails to build.
fn build_tvmaze_client(config: &AppConfig) -> Result<TvMazeClient> {
    let mut builder = TvMazeClient::builder().user_agent(USER_AGENT);
    if let Some(url) = config.tvmaze.base_url()? {
        builder = builder.base_url(url);
    }
    builder.build().context("failed to build TVMaze client")
}

/// Builds a TheTVDB client, resolving the mirror unless one is configured.
///
/// # Errors
///
/// Returns an error if no API key is available, the configured base URL
/// is invalid, or mirror resolution fails.
async fn build_thetvdb_client(api_key: Option<&str>, config: &AppConfig) -> Result<TheTvdbClient> {
    let api_key = api_key
        .or(config.thetvdb.api_key.as_deref())
        .filter(|k| !k.trim().is_empty())
        .context(
            "TheTVDB API key is required (--api-key, TVMETA_THETVDB_API_KEY, or [thetvdb] api_key in config.toml)",
        )?;
    let mut builder = TheTvdbClient::builder()
        .api_key(api_key)
        .user_agent(USER_AGENT);
    if let Some(url) = config.thetvdb.base_url()? {
        builder = builder.base_url(url);
    }
    builder
        .connect()
        .await
        .context("failed to build TheTVDB client")
}

/// Runs the `tvmaze` subcommand.
///
/// # Errors
///
/// Returns an error if config loading, client construction, or the API
/// request fails.
#[instrument(skip_all)]
async fn run_tvmaze(cmd: &TvMazeCommand, config: &AppConfig) -> Result<()> {
    let client = build_tvmaze_client(config)?;
    match &cmd.command {
        TvMazeSubcommands::Show(command) => run_show_command(&client, command, false).await,
        TvMazeSubcommands::Lookup(args) => {
            let show = match (args.tvrage, args.thetvdb) {
                (Some(id), _) => client.show_by_tvrage_id(id).await,
                (None, Some(id)) => client.show_by_thetvdb_id(id).await,
                (None, None) => anyhow::bail!("either --tvrage or --thetvdb is required"),
            }
            .context("failed to look up show")?;
            log_show_detail(&show);
            Ok(())
        }
        TvMazeSubcommands::Index(args) => {
            let page = client
                .shows_page(args.page)
                .await
                .context("failed to fetch show index")?;
            match page {
                Some(shows) => {
                    tracing::info!("ID\tName\tPremiered\tNetwork\tCountry\tStatus");
                    for show in &shows {
                        log_show(show);
                    }
                    tracing::info!("Total: {} shows on page {}", shows.len(), args.page);
                }
                None => tracing::info!("Page {} is past the end of the index", args.page),
            }
            Ok(())
        }
    }
}

/// Runs the `thetvdb` subcommand.
///
/// # Errors
///
/// Returns an error if no API key is available, client construction
/// fails, or the API request fails.
#[instrument(skip_all)]
async fn run_thetvdb(cmd: &TheTvdbCommand, config: &AppConfig) -> Result<()> {
    let client = build_thetvdb_client(cmd.api_key.as_deref(), config).await?;
    run_show_command(&client, &cmd.command, true).await
}

/// Runs the `config` subcommand.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or written, or a
/// URL setting is invalid.
#[instrument(skip_all)]
fn run_config(cmd: &ConfigCommand, config_path: &Path) -> Result<()> {
    let mut config = AppConfig::load(config_path).context("failed to load config")?;
    match &cmd.command {
        ConfigSubcommands::Show => {
            tracing::info!("Config file: {}", config_path.display());
            tracing::info!(
                "[tvmaze] base_url = {}",
                config.tvmaze.base_url.as_deref().unwrap_or("(default)")
            );
            tracing::info!(
                "[thetvdb] api_key = {}",
                if config.thetvdb.api_key.is_some() { "(set)" } else { "(unset)" }
            );
            tracing::info!(
                "[thetvdb] base_url = {}",
                config.thetvdb.base_url.as_deref().unwrap_or("(mirror list)")
            );
        }
        ConfigSubcommands::Set(args) => {
            if let Some(key) = &args.thetvdb_api_key {
                config.thetvdb.api_key = Some(key.clone());
            }
            if let Some(url) = &args.thetvdb_base_url {
                config.thetvdb.base_url = Some(url.clone());
            }
            if let Some(url) = &args.tvmaze_base_url {
                config.tvmaze.base_url = Some(url.clone());
            }
            config.tvmaze.base_url()?;
            config.thetvdb.base_url()?;
            config.save(config_path).context("failed to save config")?;
            tracing::info!("Saved {}", config_path.display());
        }
    }
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let config_path =
        resolve_config_path(cli.dir.as_ref()).context("failed to resolve config path")?;
    match cli.command {
        Commands::Tvmaze(cmd) => {
            let config = AppConfig::load(&config_path).context("failed to load config")?;
            run_tvmaze(&cmd, &config).await
        }
        Commands::Thetvdb(cmd) => {
            let config = AppConfig::load(&config_path).context("failed to load config")?;
            run_thetvdb(&cmd, &config).await
        }
        Commands::Config(cmd) => run_config(&cmd, &config_path),
    }
}
