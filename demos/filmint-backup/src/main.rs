//! Filmint Backup
//!
//! Command-line access to a local record store:
//!
//! ```text
//! filmint-backup stats  <owner>
//! filmint-backup list   <owner>
//! filmint-backup export <owner> <file.ron|file.json>
//! filmint-backup import <file.ron|file.json>
//! filmint-backup clear  <owner>
//! ```
//!
//! The store configuration is read from the RON file named by
//! `FILMINT_CONFIG`, falling back to `./filmint-nft-db.redb`. Log verbosity
//! follows `RUST_LOG` (default `info`).

use filmint_core::Address;
use filmint_db::{read_snapshot, write_snapshot, LocalDatabase, SnapshotFormat, StoreConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const USAGE: &str = "usage: filmint-backup <stats|list|clear> <owner> | export <owner> <file> | import <file>";

/// A validated command line
#[derive(Debug, PartialEq)]
enum Command {
    Stats(Address),
    List(Address),
    Export(Address, String),
    Import(String),
    Clear(Address),
}

impl Command {
    fn parse(args: &[String]) -> Option<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["stats", owner] => Some(Command::Stats(Address::new(owner))),
            ["list", owner] => Some(Command::List(Address::new(owner))),
            ["export", owner, file] => Some(Command::Export(Address::new(owner), file.to_string())),
            ["import", file] => Some(Command::Import(file.to_string())),
            ["clear", owner] => Some(Command::Clear(Address::new(owner))),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = Command::parse(&args) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::var("FILMINT_CONFIG") {
        Ok(path) => {
            info!(%path, "loading store configuration");
            StoreConfig::load(&path)?
        }
        Err(_) => StoreConfig::default(),
    };

    let db = LocalDatabase::new(config);
    db.init().await?;

    match command {
        Command::Stats(owner) => {
            let stats = db.user_stats(owner.clone()).await?;
            println!("{}: {}", owner, stats);
        }
        Command::List(owner) => {
            for collection in db.recent_collections_by_owner(owner).await? {
                println!(
                    "{}  {:<24} {:<10} items={} contract={}",
                    collection.id,
                    collection.name,
                    collection.status,
                    collection.item_count,
                    collection
                        .contract_address
                        .as_ref()
                        .map(|a| a.as_str())
                        .unwrap_or("-")
                );
                for mint in db.recent_mints_by_collection(collection.id.clone()).await? {
                    println!("    #{:<8} {:<24} {}", mint.token_id, mint.name, mint.status);
                }
            }
        }
        Command::Export(owner, file) => {
            let snapshot = db.export_user_data(owner).await?;
            write_snapshot(&snapshot, &file, SnapshotFormat::from_path(&file))?;
            println!(
                "Exported {} collections and {} mints to {}",
                snapshot.collections.len(),
                snapshot.mints.len(),
                file
            );
        }
        Command::Import(file) => {
            let snapshot = read_snapshot(&file, SnapshotFormat::from_path(&file))?;
            let (collections, mints) = (snapshot.collections.len(), snapshot.mints.len());
            let owner = snapshot.address.clone();
            db.import_user_data(snapshot).await?;
            println!("Imported {} collections and {} mints for {}", collections, mints, owner);
        }
        Command::Clear(owner) => {
            let cleared = db.clear_user_data(owner).await?;
            println!(
                "Removed {} collections and {} mints",
                cleared.collections, cleared.mints
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse(&args("stats 0xABC")),
            Some(Command::Stats(Address::new("0xabc")))
        );
        assert_eq!(
            Command::parse(&args("export 0xabc backup.json")),
            Some(Command::Export(Address::new("0xabc"), "backup.json".to_string()))
        );
        assert_eq!(
            Command::parse(&args("import backup.ron")),
            Some(Command::Import("backup.ron".to_string()))
        );
    }

    #[test]
    fn test_usage_errors_are_rejected() {
        assert_eq!(Command::parse(&[]), None);
        assert_eq!(Command::parse(&args("stats")), None);
        assert_eq!(Command::parse(&args("wipe 0xabc")), None);
        assert_eq!(Command::parse(&args("import a.ron b.ron")), None);
    }
}
