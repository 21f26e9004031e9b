//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `idvault_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use idvault_core::db::open_store;
use idvault_core::{default_log_level, init_logging, RecordService, SqliteRecordRepository};
use std::error::Error;
use std::path::PathBuf;

const STORE_FILE_NAME: &str = "idvault_smoke.sqlite3";

fn main() -> Result<(), Box<dyn Error>> {
    println!("idvault_core ping={}", idvault_core::ping());
    println!("idvault_core version={}", idvault_core::core_version());

    let log_dir = std::env::temp_dir().join("idvault-cli-logs");
    if let Err(err) = init_logging(default_log_level(), &log_dir.to_string_lossy()) {
        eprintln!("logging disabled: {err}");
    }

    // One round-trip over the full stack: store, repository, service,
    // attribute projection.
    let store_path = resolve_store_path();
    let mut conn = open_store(&store_path)?;
    let repo = SqliteRecordRepository::try_new(&mut conn)?;
    let mut service = RecordService::new(repo);

    let id = format!("smoke-{}", std::process::id());
    let user = service.create_user(id.as_str())?;
    service.set_attribute(user.id(), "roles", vec!["admin", "user"])?;

    println!("record key={}", user.key());
    if let Some(roles) = service.attribute(user.id(), "roles")? {
        println!("roles={}", roles.value.values().join(","));
    }
    service.delete_record(user.id())?;

    Ok(())
}

fn resolve_store_path() -> PathBuf {
    if let Ok(raw) = std::env::var("IDVAULT_DB_PATH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(STORE_FILE_NAME)
}
