use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sporltag::{cli, config, error, smart::CriteriaParams, types::PkceToken};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default())
        .placeholder(AnsiColor::BrightBlue.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Serve the JSON API for the tagging front-end
    Serve(ServeOptions),

    /// Load liked songs and show how many are tagged
    Cache,

    /// Search liked songs by name or artist
    Search(SearchOptions),

    /// List all tags
    Tags,

    /// Handle smart playlists
    #[command(subcommand)]
    Smart(SmartCommand),

    /// Save every track of the given playlists (or all of yours) to liked songs
    Import(ImportOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Load liked songs before accepting requests
    #[clap(long)]
    pub warm: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// At least two characters, matched against name and artist
    pub query: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SmartCommand {
    /// List smart playlists and their criteria
    List,

    /// Create a playlist from the liked songs matching the criteria
    Create(SmartCreateOptions),

    /// Add newly matching liked songs to smart playlists
    Refresh(SmartRefreshOptions),
}

#[derive(Parser, Debug, Clone)]
pub struct SmartCreateOptions {
    #[clap(long)]
    pub name: String,

    #[clap(long, default_value = "")]
    pub description: String,

    /// Create the playlist as private
    #[clap(long)]
    pub private: bool,

    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub tempo_min: Option<u8>,
    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub tempo_max: Option<u8>,
    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub energy_min: Option<u8>,
    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub energy_max: Option<u8>,
    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub mood_min: Option<u8>,
    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub mood_max: Option<u8>,

    /// Comma-separated tag ids every song must carry
    #[clap(long)]
    pub include: Option<String>,

    /// Comma-separated tag ids no song may carry
    #[clap(long)]
    pub exclude: Option<String>,
}

#[derive(Parser, Debug, Clone)]
#[command(group = clap::ArgGroup::new("target").required(true).args(["playlist", "all"]))]
pub struct SmartRefreshOptions {
    /// Playlist id to refresh
    #[clap(long)]
    pub playlist: Option<String>,

    /// Refresh every smart playlist you own
    #[clap(long)]
    pub all: bool,
}

#[derive(Parser, Debug, Clone)]
#[command(group = clap::ArgGroup::new("source").required(true).args(["playlist_ids", "all"]))]
pub struct ImportOptions {
    /// Playlist ids
    pub playlist_ids: Vec<String>,

    /// Import every playlist you own
    #[clap(long)]
    pub all: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Serve(opt) => cli::serve(opt.warm).await,
        Command::Cache => cli::cache().await,
        Command::Search(opt) => cli::search(opt.query).await,
        Command::Tags => cli::tags().await,
        Command::Smart(SmartCommand::List) => cli::smart_list().await,
        Command::Smart(SmartCommand::Create(opt)) => {
            cli::smart_create(cli::SmartCreateArgs {
                name: opt.name,
                description: opt.description,
                private: opt.private,
                criteria: CriteriaParams {
                    tempo_min: opt.tempo_min,
                    tempo_max: opt.tempo_max,
                    energy_min: opt.energy_min,
                    energy_max: opt.energy_max,
                    mood_min: opt.mood_min,
                    mood_max: opt.mood_max,
                    ..CriteriaParams::default()
                },
                include: opt.include,
                exclude: opt.exclude,
            })
            .await
        }
        Command::Smart(SmartCommand::Refresh(opt)) => {
            cli::smart_refresh(opt.playlist, opt.all).await
        }
        Command::Import(opt) => cli::import(opt.playlist_ids, opt.all).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
