mod config;
mod infrastructure;

use std::pin::pin;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use karaoke_audio::{CpalHost, ReverbConfig};
use karaoke_core::domain::{Song, SongId, format_clock};
use karaoke_core::ports::ConnectivitySignal;
use karaoke_core::services::CatalogService;
use karaoke_player::{PlayerConfig, PlayerSession, SessionEvent};
use karaoke_storage::{KeyValueStore, MemoryStore, SongCacheStore, SqliteStore, StorageConfig};
use tracing::{info, warn};

use crate::config::SettingsDto;
use infrastructure::oracle::DisconnectedOracle;
use infrastructure::output::HeadlessOutput;

/// Type alias to simplify the generic signature of the Service.
type Catalog = CatalogService<DisconnectedOracle, SongCacheStore<Box<dyn KeyValueStore>>, ConnectivitySignal>;

/// How often the session loop wakes up.
const TICK: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "karaoke")]
#[command(about = "Karaoke catalog with live vocal reverb", long_about = None)]
pub struct Cli {
  /// Never call the song oracle.
  #[arg(long, global = true)]
  pub offline: bool,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
  /// Search songs by title or artist
  Search { query: String },

  /// Famous songs for the home screen
  Hits,

  /// Songs saved for offline use, most recent first
  Songs,

  /// Print the lyrics of a known song
  Lyrics { id: String },

  /// Open the player for a known song
  Sing {
    id: String,

    /// Session length in seconds
    #[arg(short, long, default_value = "30")]
    seconds: u64,

    /// Assumed length of file-based instrumentals, in seconds
    #[arg(long, default_value = "180")]
    duration: f64,

    /// Reverb level, 0 to 100
    #[arg(short, long)]
    reverb: Option<f32>,

    /// Instrumental volume, 0 to 100
    #[arg(short, long)]
    volume: Option<f32>,

    /// Switch to this source index after opening
    #[arg(long)]
    source: Option<usize>,
  },

  /// Print the effective configuration
  Config,
}

/// Application state built once at startup.
struct App {
  catalog: Catalog,
  player: PlayerConfig,
  reverb: ReverbConfig,
}

impl App {
  fn build(offline: bool) -> anyhow::Result<Self> {
    // --- Dependency Injection Phase ---

    // 1. Persistence adapter. A broken database must not keep the catalog down.
    let store: Box<dyn KeyValueStore> = match SqliteStore::new_from_config() {
      Ok(store) => Box::new(store),
      Err(e) => {
        warn!("Song cache falls back to memory: {e}");
        Box::new(MemoryStore::new())
      }
    };
    let cache = SongCacheStore::new(store);

    // 2. Oracle and connectivity.
    let connectivity = ConnectivitySignal::new(!offline);

    // 3. Service wiring.
    let catalog = CatalogService::new(DisconnectedOracle, cache, connectivity);

    let player = PlayerConfig::load().context("loading [player] settings")?;
    let reverb = ReverbConfig::load().context("loading [reverb] settings")?;

    Ok(Self { catalog, player, reverb })
  }

  /// Looks a song up in the offline collection, then in the world hits.
  async fn find_song(&self, id: &str) -> anyhow::Result<Song> {
    let id = SongId::from(id);
    if let Some(song) = self.catalog.offline_songs().into_iter().find(|s| s.id == id) {
      return Ok(song);
    }
    match self.catalog.world_hits().await.into_iter().find(|s| s.id == id) {
      Some(song) => Ok(song),
      None => bail!("unknown song id {id}"),
    }
  }

  fn remember(&self, song: &Song) {
    if let Err(e) = self.catalog.remember(song) {
      warn!(song = %song.id, "Could not save song: {e}");
    }
  }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
  if let Command::Config = cli.command {
    let storage = StorageConfig::load().context("loading [storage] settings")?;
    let dto = SettingsDto::from((storage, PlayerConfig::load()?, ReverbConfig::load()?));
    println!("{}", serde_json::to_string_pretty(&dto)?);
    return Ok(());
  }

  let app = App::build(cli.offline)?;

  match cli.command {
    Command::Search { query } => print_songs(&app.catalog.search(&query).await),
    Command::Hits => print_songs(&app.catalog.world_hits().await),
    Command::Songs => print_songs(&app.catalog.offline_songs()),
    Command::Lyrics { id } => {
      let song = app.find_song(&id).await?;
      let lyrics = app.catalog.lyrics(&song.title, &song.artist, Some(&song.id)).await;
      println!("{}", lyrics.text);
      for reference in &lyrics.references {
        println!("  [{}] {}", reference.title, reference.uri);
      }
      if lyrics.is_persistable() {
        app.remember(&song.with_lyrics(lyrics.text));
      }
    }
    Command::Sing { id, seconds, duration, reverb, volume, source } => {
      let song = app.find_song(&id).await?;
      let options = SingOptions { seconds, duration, reverb, volume, source };
      sing(&app, song, options).await?;
    }
    Command::Config => {}
  }

  Ok(())
}

struct SingOptions {
  seconds: u64,
  duration: f64,
  reverb: Option<f32>,
  volume: Option<f32>,
  source: Option<usize>,
}

/// Headless session: launch messages, lyric lines and connectivity
/// changes go to stdout until the time is up or Ctrl-C.
async fn sing(app: &App, song: Song, options: SingOptions) -> anyhow::Result<()> {
  let (id, title, artist) = (song.id.clone(), song.title.clone(), song.artist.clone());
  let started = Instant::now();
  let deadline = started + Duration::from_secs(options.seconds);

  let host = CpalHost::new(&app.reverb);
  let mut session = PlayerSession::open(
    song,
    HeadlessOutput::new(),
    host,
    app.catalog.connectivity(),
    &app.player,
    &app.reverb,
    started,
  );

  if let Some(level) = options.reverb {
    session.set_reverb(level);
  }
  if let Some(level) = options.volume {
    session.set_volume(level);
  }
  if let Some(index) = options.source {
    let outcome = session.switch_to(index, Instant::now());
    info!(index, ?outcome, "Source switch requested");
  }

  println!("{title} - {artist}");
  if !session.vocals_active() {
    println!("(microphone unavailable, playing without vocal effects)");
  }

  let mut lyrics = pin!(app.catalog.lyrics(&title, &artist, Some(&id)));
  let mut lyrics_pending = true;
  let mut ticker = tokio::time::interval(TICK);
  let mut last_line = None;

  loop {
    tokio::select! {
      fetched = &mut lyrics, if lyrics_pending => {
        lyrics_pending = false;
        if let Some(to_save) = session.attach_lyrics(&id, fetched) {
          app.remember(&to_save);
        }
        last_line = None;
      }
      _ = ticker.tick() => {}
      _ = tokio::signal::ctrl_c() => break,
    }

    let now = Instant::now();
    for event in session.advance(now) {
      match event {
        SessionEvent::BootMessage(message) => println!("{message}"),
        SessionEvent::SourceActivated(source) => println!("Now playing: {}", source.title),
        SessionEvent::ConnectivityChanged(online) => println!("{}", if online { "Back online" } else { "Offline" }),
      }
    }

    if session.output().is_playing() {
      let position = session.output().position();
      session.on_metadata_loaded(options.duration);
      session.on_time_update(position);
    }

    let line = session.current_line();
    if !lyrics_pending && last_line != Some(line) {
      last_line = Some(line);
      println!("[{}] {}", session.clock().display(), session.visible_lines().join("  /  "));
    }

    if now >= deadline {
      break;
    }
  }

  if let Some(song) = session.close() {
    app.remember(&song);
  }
  info!(elapsed = %format_clock(started.elapsed().as_secs_f64()), "Session finished");

  Ok(())
}

fn print_songs(songs: &[Song]) {
  if songs.is_empty() {
    println!("No songs found.");
    return;
  }
  for song in songs {
    println!("{}  {} - {} ({} sources)", song.id, song.title, song.artist, song.instrumental_sources.len());
  }
}
