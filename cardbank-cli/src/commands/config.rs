//! Config command - show or change the saved database file

use anyhow::{Context, Result};

use cardbank_core::config::Config;

use super::get_data_dir;
use crate::output;

pub fn run(db_file: Option<&str>) -> Result<()> {
    let data_dir = get_data_dir()?;
    let mut config = Config::load(&data_dir)?;

    if let Some(name) = db_file {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create cardbank directory: {:?}", data_dir))?;
        config.set_db_file(name)?;
        config.save(&data_dir)?;
        output::success(&format!("Database file set to {}", config.db_file));
    }

    println!("Database: {}", config.db_path(&data_dir).display());
    Ok(())
}
