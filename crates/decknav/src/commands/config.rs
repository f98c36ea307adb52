use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    println!();
    println!(
        "  {:<22} {}",
        "defaults.theme".cyan(),
        config.theme().unwrap_or("light (document default)")
    );
    println!(
        "  {:<22} {}",
        "defaults.start_mode".cyan(),
        config.start_mode()
    );
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {} = {} ({})",
        "Saved".green(),
        key,
        value,
        path.display()
    );
    Ok(())
}
