use anyhow::Result;
use clap::Subcommand;
use std::path::Path;

use formaid::config::Config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as JSON
    Show,

    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_config(command: ConfigCommands, config: &Config, path: &Path) -> Result<()> {
    match command {
        ConfigCommands::Show => println!("{}", serde_json::to_string_pretty(config)?),
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file {} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            config.save(path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
