use anyhow::{Context, Result};
use clap::Parser;
use playlog_etl::{pipeline, SqliteWarehouse};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite warehouse database file (created if missing).
    #[clap(value_parser = parse_path)]
    pub warehouse_db: PathBuf,

    /// Root directory of the song catalog JSON files.
    #[clap(value_parser = parse_path)]
    pub song_data: PathBuf,

    /// Root directory of the user activity log JSON files.
    #[clap(value_parser = parse_path)]
    pub log_data: PathBuf,

    /// Abort the run on the first failed database write instead of
    /// logging it and continuing with the next record.
    #[clap(long, default_value_t = false)]
    pub fail_fast: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    info!(
        "Opening warehouse database at {:?}...",
        cli_args.warehouse_db
    );
    let warehouse = SqliteWarehouse::open(&cli_args.warehouse_db)?;

    let stats = pipeline::run(
        &warehouse,
        &cli_args.song_data,
        &cli_args.log_data,
        cli_args.fail_fast,
    )?;

    info!("");
    info!("Run Summary");
    info!("===========");
    info!("Catalog files processed: {}", stats.catalog_files);
    info!("Event files processed: {}", stats.event_files);
    info!("Songs inserted: {}", stats.songs_inserted);
    info!("Artists inserted: {}", stats.artists_inserted);
    info!("Time rows inserted: {}", stats.time_rows_inserted);
    info!("User rows upserted: {}", stats.users_upserted);
    info!("Songplays inserted: {}", stats.songplays_inserted);
    info!("Key conflicts ignored: {}", stats.conflicts_ignored);
    info!(
        "Catalog lookups: {} hits, {} misses",
        stats.lookup_hits, stats.lookup_misses
    );
    if stats.write_errors > 0 {
        warn!("Write errors: {}", stats.write_errors);
    }

    let counts = warehouse.table_counts()?;
    info!("");
    info!("Warehouse contains:");
    info!("  {} songs", counts.songs);
    info!("  {} artists", counts.artists);
    info!("  {} time rows", counts.time);
    info!("  {} users", counts.users);
    info!("  {} songplays", counts.songplays);

    Ok(())
}
