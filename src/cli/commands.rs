use std::sync::Arc;

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use anyhow::{Context, Result};

use crate::config::Config;
use crate::db::DbConnection;
use crate::guard;
use crate::live::client::{send_change_notice, send_intent, watch};
use crate::live::server::shutdown_signal;
use crate::live::{ChangeNotice, ConnectionHub, LiveFlagBroadcaster, LiveServer, SqliteRosterStore, ToggleIntent};
use crate::models::{AccessKey, ContestantPatch, NewContestant, Role, ToggleAxis};
use crate::repo::{AccessKeyRepo, ContestantRepo};
use crate::cli::output::{format_contestant_summary, format_roster_json, format_roster_table, is_tty, RosterView};
use crate::cli::error::{user_error, validate_access_key, validate_media_url, validate_non_empty, validate_stage_name};
use crate::utils::{format_time, parse_time_expr};

#[derive(Parser)]
#[command(name = "cosboard")]
#[command(about = "Cosplay Board - roster and live stage flags for cosplay competitions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Roster management commands
    Roster {
        #[command(subcommand)]
        subcommand: RosterCommands,
    },
    /// Access key commands
    Keys {
        #[command(subcommand)]
        subcommand: KeyCommands,
    },
    /// Show the schedule entry linked to an access key
    Profile {
        /// Personal access key
        #[arg(long)]
        key: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Run the live flag server
    Serve {
        /// Address to listen on (overrides live.listen)
        #[arg(long)]
        listen: Option<String>,
    },
    /// Flip one live flag of a contestant on the running server
    Toggle {
        /// Stage name of the contestant
        stage_name: String,
        /// Flag to flip: crossout-main, glow-main, crossout-prejudge, glow-prejudge
        #[arg(value_parser = parse_axis)]
        axis: ToggleAxis,
        /// Admin key, needed when the server requires keys
        #[arg(long)]
        key: Option<String>,
        /// Server address (overrides live.listen)
        #[arg(long)]
        connect: Option<String>,
    },
    /// Re-print the schedule every time the roster changes
    Watch {
        /// Access key; user keys see stage names and times only
        #[arg(long)]
        key: Option<String>,
        /// Show the pre-judging schedule
        #[arg(long, conflicts_with = "all")]
        prejudge: bool,
        /// Show every contestant with pre-judging slots
        #[arg(long)]
        all: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Server address (overrides live.listen)
        #[arg(long)]
        connect: Option<String>,
        /// Exit after this many notifications
        #[arg(long)]
        count: Option<usize>,
    },
}

#[derive(Subcommand)]
pub enum RosterCommands {
    /// Add a contestant
    Add {
        /// Unique stage name
        stage_name: String,
        /// Character being cosplayed
        #[arg(long)]
        character: String,
        /// Performance time (e.g., "2026-10-18 14:30" or "14:30")
        #[arg(long)]
        time: String,
        /// Pre-judging time; also marks the contestant for pre-judging
        #[arg(long)]
        prejudge_time: Option<String>,
        /// Free-form comment
        #[arg(long)]
        comment: Option<String>,
        /// Audio track URL
        #[arg(long)]
        audio: Option<String>,
        /// Video URL
        #[arg(long)]
        video: Option<String>,
        /// Admin access key
        #[arg(long)]
        key: Option<String>,
    },
    /// List the schedule
    List {
        /// Access key; user keys see stage names and times only
        #[arg(long)]
        key: Option<String>,
        /// Show the pre-judging schedule
        #[arg(long, conflicts_with = "all")]
        prejudge: bool,
        /// Show every contestant with pre-judging slots
        #[arg(long)]
        all: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show one contestant
    Show {
        stage_name: String,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
        /// Admin access key
        #[arg(long)]
        key: Option<String>,
    },
    /// Modify a contestant's details
    Modify {
        stage_name: String,
        #[arg(long)]
        character: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long, conflicts_with = "no_prejudge")]
        prejudge_time: Option<String>,
        /// Remove the pre-judging slot
        #[arg(long)]
        no_prejudge: bool,
        /// New comment (empty string clears it)
        #[arg(long)]
        comment: Option<String>,
        /// New audio URL (empty string clears it)
        #[arg(long)]
        audio: Option<String>,
        /// New video URL (empty string clears it)
        #[arg(long)]
        video: Option<String>,
        /// Admin access key
        #[arg(long)]
        key: Option<String>,
    },
    /// Delete a contestant
    Delete {
        stage_name: String,
        /// Admin access key
        #[arg(long)]
        key: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// Register an access key. The first key registered must be an admin key.
    Add {
        /// Key to register
        #[arg(value_name = "NEW_KEY")]
        new_key: String,
        /// Role granted by the key
        #[arg(long, default_value = "user", value_parser = parse_role)]
        role: Role,
        /// Contestant the key belongs to
        #[arg(long)]
        stage_name: Option<String>,
        /// Admin access key (not needed for the first admin key)
        #[arg(long)]
        key: Option<String>,
    },
    /// Check a key and print its role
    Verify {
        key: String,
    },
    /// Remove an access key
    Remove {
        /// Key to remove
        #[arg(value_name = "OLD_KEY")]
        old_key: String,
        /// Admin access key
        #[arg(long)]
        key: Option<String>,
    },
}

fn parse_axis(s: &str) -> Result<ToggleAxis, String> {
    ToggleAxis::from_str(s).ok_or_else(|| {
        let valid: Vec<&str> = ToggleAxis::ALL.iter().map(|a| a.as_str()).collect();
        format!("unknown flag '{}'. Expected one of: {}", s, valid.join(", "))
    })
}

fn parse_role(s: &str) -> Result<Role, String> {
    Role::from_str(s).ok_or_else(|| format!("unknown role '{}'. Expected user or admin", s))
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Roster { subcommand } => handle_roster(subcommand),
        Commands::Keys { subcommand } => handle_keys(subcommand),
        Commands::Profile { key, json } => handle_profile(&key, json),
        Commands::Serve { listen } => handle_serve(listen),
        Commands::Toggle { stage_name, axis, key, connect } => handle_toggle(stage_name, axis, key, connect),
        Commands::Watch { key, prejudge, all, json, connect, count } => {
            handle_watch(key, RosterSelection { prejudge, all, json }, connect, count)
        }
    }
}

fn open_db() -> Result<(Config, Connection)> {
    let config = Config::load()?;
    let conn = DbConnection::connect(&config)
        .context("Failed to connect to database")?;
    Ok((config, conn))
}

/// Authenticate `key` or exit with a user error
fn authenticate_or_exit(conn: &Connection, key: Option<&str>) -> AccessKey {
    guard::authenticate(conn, key).unwrap_or_else(|e| user_error(&e.to_string()))
}

/// Authenticate `key` and require the admin role, or exit with a user error
fn authorize_admin_or_exit(conn: &Connection, key: Option<&str>) {
    let access = authenticate_or_exit(conn, key);
    if let Err(e) = guard::require_admin(&access) {
        user_error(&e.to_string());
    }
}

/// Best-effort notice to a running live server after a roster edit.
/// An unreachable server is only logged.
fn announce_change(config: &Config, key: Option<&str>) {
    let notice = ChangeNotice::new(key.map(str::to_string));
    let result = runtime().and_then(|rt| rt.block_on(send_change_notice(&config.listen, &notice)));
    match result {
        Ok(()) => log::debug!("Notified live server at {}", config.listen),
        Err(e) => log::warn!("Live viewers were not notified: {:#}", e),
    }
}

/// Which roster view to render and how
#[derive(Debug, Clone, Copy)]
struct RosterSelection {
    prejudge: bool,
    all: bool,
    json: bool,
}

fn render_roster(conn: &Connection, role: Role, selection: RosterSelection) -> Result<String> {
    let view = match (role, selection.prejudge, selection.all) {
        (Role::User, true, _) => RosterView::PublicPrejudge,
        (Role::User, false, _) => RosterView::Public,
        (Role::Admin, true, _) => RosterView::Prejudge,
        (Role::Admin, false, true) => RosterView::All,
        (Role::Admin, false, false) => RosterView::Main,
    };

    let contestants = if selection.prejudge {
        ContestantRepo::list_prejudge(conn)
    } else {
        ContestantRepo::list_all(conn)
    }
    .context("Failed to list contestants")?;

    if selection.json {
        format_roster_json(&contestants, view)
    } else {
        Ok(format_roster_table(&contestants, view, is_tty()))
    }
}

fn parse_time_or_exit(expr: &str) -> i64 {
    parse_time_expr(expr).unwrap_or_else(|e| user_error(&e.to_string()))
}

/// Empty string means "clear"; anything else must be a valid URL
fn optional_url(value: Option<String>, field_name: &str) -> Option<Option<String>> {
    value.map(|url| {
        if url.is_empty() {
            None
        } else {
            if let Err(e) = validate_media_url(&url, field_name) {
                user_error(&e);
            }
            Some(url)
        }
    })
}

fn handle_roster(cmd: RosterCommands) -> Result<()> {
    let (config, conn) = open_db()?;

    match cmd {
        RosterCommands::Add { stage_name, character, time, prejudge_time, comment, audio, video, key } => {
            authorize_admin_or_exit(&conn, key.as_deref());
            if let Err(e) = validate_stage_name(&stage_name) {
                user_error(&e);
            }
            if let Err(e) = validate_non_empty(&character, "Character") {
                user_error(&e);
            }

            let mut new = NewContestant::new(&stage_name, &character, parse_time_or_exit(&time));
            new.prejudge_ts = prejudge_time.as_deref().map(parse_time_or_exit);
            new.comment = comment.filter(|c| !c.trim().is_empty());
            new.audio_url = optional_url(audio, "audio").flatten();
            new.video_url = optional_url(video, "video").flatten();

            let contestant = ContestantRepo::create(&conn, &new)?;
            log::info!("Added contestant '{}'", contestant.stage_name);
            println!(
                "Added contestant '{}' at {}",
                contestant.stage_name,
                format_time(contestant.cosplay_ts)
            );
            announce_change(&config, key.as_deref());
            Ok(())
        }
        RosterCommands::List { key, prejudge, all, json } => {
            let access = authenticate_or_exit(&conn, key.as_deref());
            println!("{}", render_roster(&conn, access.role, RosterSelection { prejudge, all, json })?);
            Ok(())
        }
        RosterCommands::Show { stage_name, json, key } => {
            authorize_admin_or_exit(&conn, key.as_deref());
            let contestant = ContestantRepo::get_by_stage_name(&conn, &stage_name)?
                .unwrap_or_else(|| user_error(&format!("Contestant '{}' not found", stage_name)));

            if json {
                println!("{}", serde_json::to_string_pretty(&contestant)?);
            } else {
                println!("{}", format_contestant_summary(&contestant));
            }
            Ok(())
        }
        RosterCommands::Modify { stage_name, character, time, prejudge_time, no_prejudge, comment, audio, video, key } => {
            authorize_admin_or_exit(&conn, key.as_deref());
            if let Some(character) = &character {
                if let Err(e) = validate_non_empty(character, "Character") {
                    user_error(&e);
                }
            }

            let prejudge_ts = if no_prejudge {
                Some(None)
            } else {
                prejudge_time.as_deref().map(|t| Some(parse_time_or_exit(t)))
            };

            let patch = ContestantPatch {
                character,
                cosplay_ts: time.as_deref().map(parse_time_or_exit),
                prejudge_ts,
                comment: comment.map(|c| if c.trim().is_empty() { None } else { Some(c) }),
                audio_url: optional_url(audio, "audio"),
                video_url: optional_url(video, "video"),
            };
            if patch.is_empty() {
                user_error("No changes specified");
            }

            let contestant = ContestantRepo::update(&conn, &stage_name, &patch)?;
            log::info!("Modified contestant '{}'", contestant.stage_name);
            println!("Modified contestant '{}'", contestant.stage_name);
            announce_change(&config, key.as_deref());
            Ok(())
        }
        RosterCommands::Delete { stage_name, key } => {
            authorize_admin_or_exit(&conn, key.as_deref());
            if !ContestantRepo::delete(&conn, &stage_name)? {
                user_error(&format!("Contestant '{}' not found", stage_name));
            }
            log::info!("Deleted contestant '{}'", stage_name);
            println!("Deleted contestant '{}'", stage_name);
            announce_change(&config, key.as_deref());
            Ok(())
        }
    }
}

fn handle_keys(cmd: KeyCommands) -> Result<()> {
    let (_config, conn) = open_db()?;

    match cmd {
        KeyCommands::Add { new_key, role, stage_name, key } => {
            if AccessKeyRepo::has_admin(&conn)? {
                authorize_admin_or_exit(&conn, key.as_deref());
            } else if role != Role::Admin {
                user_error("No admin key exists yet. Register an admin key first with --role admin");
            }
            if let Err(e) = validate_access_key(&new_key) {
                user_error(&e);
            }
            let access = AccessKeyRepo::register(&conn, &new_key, role, stage_name.as_deref())?;
            match &access.stage_name {
                Some(name) => println!("Registered {} key for '{}'", access.role.as_str(), name),
                None => println!("Registered {} key", access.role.as_str()),
            }
            Ok(())
        }
        KeyCommands::Verify { key } => {
            let access = authenticate_or_exit(&conn, Some(&key));
            println!("Role: {}", access.role.as_str());
            if let Some(name) = access.stage_name {
                println!("Stage name: {}", name);
            }
            Ok(())
        }
        KeyCommands::Remove { old_key, key } => {
            authorize_admin_or_exit(&conn, key.as_deref());
            if !AccessKeyRepo::remove(&conn, &old_key)? {
                user_error("Invalid access key");
            }
            println!("Removed access key");
            Ok(())
        }
    }
}

fn handle_profile(key: &str, json: bool) -> Result<()> {
    let (_config, conn) = open_db()?;

    let access = authenticate_or_exit(&conn, Some(key));
    if let Err(e) = guard::require_user(&access) {
        user_error(&e.to_string());
    }

    let stage_name = access.stage_name
        .unwrap_or_else(|| user_error("No contestant is linked to this key"));
    let contestant = ContestantRepo::get_by_stage_name(&conn, &stage_name)?
        .unwrap_or_else(|| user_error(&format!("Contestant '{}' not found", stage_name)));

    if json {
        println!("{}", serde_json::to_string_pretty(&contestant)?);
    } else {
        println!("{}", format_contestant_summary(&contestant));
    }
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn handle_serve(listen: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let addr = listen.unwrap_or_else(|| config.listen.clone());

    let store = SqliteRosterStore::open(&config.data_location)
        .context("Failed to connect to database")?;
    let hub = ConnectionHub::default();
    let broadcaster = Arc::new(
        LiveFlagBroadcaster::new(Arc::new(store), hub).with_require_key(config.require_key),
    );
    if config.require_key {
        log::info!("Toggle intents require an admin key");
    }

    runtime()?.block_on(async move {
        let server = LiveServer::bind(&addr, broadcaster)
            .await
            .with_context(|| format!("Failed to listen on {}", addr))?;
        println!("Live server listening on {}", server.local_addr()?);
        server.run_until(shutdown_signal()).await?;
        Ok::<(), anyhow::Error>(())
    })
}

fn handle_toggle(stage_name: String, axis: ToggleAxis, key: Option<String>, connect: Option<String>) -> Result<()> {
    let addr = match connect {
        Some(addr) => addr,
        None => Config::load()?.listen,
    };
    let intent = ToggleIntent { event: axis, stage_name, key };

    runtime()?.block_on(send_intent(&addr, &intent))?;
    println!("Sent {} for '{}'", intent.event, intent.stage_name);
    Ok(())
}

fn handle_watch(
    key: Option<String>,
    selection: RosterSelection,
    connect: Option<String>,
    count: Option<usize>,
) -> Result<()> {
    let (config, conn) = open_db()?;
    let access = authenticate_or_exit(&conn, key.as_deref());
    let addr = connect.unwrap_or(config.listen);

    // Notifications carry no data: re-read the roster on each one
    runtime()?.block_on(watch(&addr, count, |_event| {
        println!("{}", render_roster(&conn, access.role, selection)?);
        Ok(())
    }))?;
    Ok(())
}
