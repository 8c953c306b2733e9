mod cli;
mod tui;

use crate::cli::{Cli, Commands};
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vidshelf::config::Config;
use vidshelf::core::{
    Collection, CollectionId, FileGateway, OwnerCache, PinSync, StaticIdentity, UserId,
};
use vidshelf::{Error, Result};

type Shelf = PinSync<FileGateway>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?.with_overrides(cli.data_dir.clone(), cli.user.clone());

    let gateway = Arc::new(FileGateway::open(&config.data_dir)?);
    let tui_mode = matches!(cli.command, None | Some(Commands::Tui));
    init_tracing(&config, tui_mode)?;
    tracing::debug!(data = %gateway.path().display(), "shelf opened");

    let session = OwnerCache::new(StaticIdentity::new(config.user.clone()), config.identity_ttl);
    let owner = session.owner().await.inspect_err(|_| {
        eprintln!("No user configured. Set VIDSHELF_USER or pass --user <id>.");
    })?;
    let shelf = Arc::new(PinSync::new(gateway));

    match cli.command {
        Some(Commands::Create { name, description }) => {
            let collection = shelf
                .gateway()
                .create_collection(&owner, &name, description)
                .await?;
            println!("Created collection {} ({})", collection.name, collection.id);
        }
        Some(Commands::Rename { collection, name }) => {
            let target = resolve(&shelf, &owner, &collection).await?;
            let renamed = shelf
                .gateway()
                .rename_collection(&owner, &target.id, &name)
                .await?;
            println!("Renamed {} to {}", target.name, renamed.name);
        }
        Some(Commands::Delete { collection }) => {
            let target = resolve(&shelf, &owner, &collection).await?;
            shelf.gateway().delete_collection(&owner, &target.id).await?;
            println!("Deleted collection {}", target.name);
        }
        Some(Commands::Collections) => run_collections(&shelf, &owner).await?,
        Some(Commands::Add { collection, video }) => {
            let target = resolve(&shelf, &owner, &collection).await?;
            let (video_id, added) = shelf.gateway().add_video(&owner, &target.id, &video).await?;
            if added {
                println!("Added {video_id} to {}", target.name);
            } else {
                println!("{video_id} is already in {}", target.name);
            }
        }
        Some(Commands::Remove { collection, video }) => {
            let target = resolve(&shelf, &owner, &collection).await?;
            if shelf.gateway().remove_video(&owner, &target.id, &video).await? {
                println!("Removed {video} from {}", target.name);
            } else {
                println!("{video} was not in {}", target.name);
            }
        }
        Some(Commands::Videos { collection }) => {
            let target = resolve(&shelf, &owner, &collection).await?;
            print_videos(&shelf, &owner, &target).await?;
        }
        Some(Commands::Open { collection }) => {
            let target = resolve(&shelf, &owner, &collection).await?;
            shelf.recency().touch(&owner, &target.id).await;
            print_videos(&shelf, &owner, &target).await?;
        }
        Some(Commands::Pin { collection }) => {
            let target = resolve(&shelf, &owner, &collection).await?;
            match shelf.pin(&owner, &target.id).await {
                Ok(()) => println!("Pinned {}", target.name),
                Err(err) if err.is_pin_limit() => {
                    eprintln!("{err}. Current pins:");
                    print_pinned(&shelf, &owner);
                    eprintln!("Use `vidshelf replace <old> {}` to swap one out.", target.id);
                    return Err(err);
                }
                Err(err) => return Err(err),
            }
        }
        Some(Commands::Unpin { collection }) => {
            let target = resolve(&shelf, &owner, &collection).await?;
            shelf.unpin(&owner, &target.id).await?;
            println!("Unpinned {}", target.name);
        }
        Some(Commands::Replace { old, new }) => {
            let old = resolve(&shelf, &owner, &old).await?;
            let new = resolve(&shelf, &owner, &new).await?;
            shelf.replace(&owner, &old.id, &new.id).await?;
            println!("Replaced {} with {}", old.name, new.name);
        }
        Some(Commands::Move { from, to }) => {
            shelf.refresh(&owner).await?;
            let len = shelf.view(&owner).pinned.len();
            let (Some(from_idx), Some(to_idx)) = (from.checked_sub(1), to.checked_sub(1)) else {
                return Err(Error::InvalidMove { from, to, len });
            };
            shelf.move_pin(&owner, from_idx, to_idx).await?;
            print_pinned(&shelf, &owner);
        }
        Some(Commands::Pinned) => {
            shelf.refresh(&owner).await?;
            print_pinned(&shelf, &owner);
        }
        Some(Commands::Recent) => {
            let view = shelf.refresh(&owner).await?;
            if view.recent.is_empty() {
                println!("No recently opened collections.");
            }
            for collection in view.recent {
                let opened = collection
                    .last_accessed_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("{:<30} {:<18} {}", collection.name, opened, collection.id);
            }
        }
        Some(Commands::Tui) | None => tui::run(shelf, owner)?,
    }

    Ok(())
}

fn init_tracing(config: &Config, tui_mode: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "vidshelf=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // The TUI owns the terminal, so its logs go to a file.
    if tui_mode {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(config.log_path())?;
        registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

/// Find a collection by exact id, or else by case-insensitive name.
async fn resolve(shelf: &Shelf, owner: &UserId, input: &str) -> Result<Collection> {
    let collections = shelf.gateway().list_collections(owner).await?;
    let id = CollectionId::from(input.trim());
    if let Some(found) = collections.iter().find(|c| c.id == id) {
        return Ok(found.clone());
    }

    let mut by_name = collections
        .into_iter()
        .filter(|c| c.name.eq_ignore_ascii_case(input.trim()));
    match (by_name.next(), by_name.next()) {
        (Some(found), None) => Ok(found),
        (Some(_), Some(_)) => Err(Error::validation(format!(
            "Several collections are named {input:?}; use the collection id"
        ))),
        (None, _) => Err(Error::not_found("Collection", input.trim())),
    }
}

async fn run_collections(shelf: &Shelf, owner: &UserId) -> Result<()> {
    let collections = shelf.gateway().list_collections(owner).await?;
    shelf.refresh(owner).await?;

    if collections.is_empty() {
        println!("No collections yet. Create one with `vidshelf create <name>`.");
        return Ok(());
    }

    println!("Found {} collections:", collections.len());
    println!();
    for collection in collections {
        let pinned = if shelf.is_pinned(owner, &collection.id) {
            "pinned"
        } else {
            ""
        };
        println!("{:<30} {:<8} {}", collection.name, pinned, collection.id);
    }
    Ok(())
}

fn print_pinned(shelf: &Shelf, owner: &UserId) {
    let view = shelf.view(owner);
    if view.pinned.is_empty() {
        println!("Nothing pinned.");
    }
    for (i, pinned) in view.pinned.iter().enumerate() {
        println!("{:>2}. {:<30} {}", i + 1, pinned.name(), pinned.collection_id());
    }
}

async fn print_videos(shelf: &Shelf, owner: &UserId, collection: &Collection) -> Result<()> {
    let videos = shelf.gateway().list_videos(owner, &collection.id).await?;
    println!("{} ({} videos)", collection.name, videos.len());
    if let Some(description) = &collection.description {
        println!("{description}");
    }
    for video in videos {
        println!(
            "  https://youtu.be/{:<16} added {}",
            video.video_id,
            video.added_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}
