pub mod auth;
pub mod collection;
pub mod config;
pub mod diagnose;
pub mod goal;
pub mod habit;
pub mod lantern;
pub mod reflect;
pub mod spirit;

use serde::Serialize;
use shadowlantern_core::{AppContext, Config, Database};
use tracing::debug;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Loaded stores plus the database they came from.
pub struct Workspace {
    pub db: Database,
    pub config: Config,
    pub app: AppContext,
}

impl Workspace {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let db = Database::open()?;
        let app = AppContext::load(&db, &config)?;
        debug!(habit_active = app.habit.is_active(), "stores loaded");
        Ok(Self { db, config, app })
    }

    pub fn save(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.app.save(&mut self.db)?;
        Ok(())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
