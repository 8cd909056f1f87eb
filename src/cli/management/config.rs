use clap::{Args, Subcommand};

use crate::config::{Config as AppConfig, EnvParser, EnvVars};
use crate::error::Result;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// List all configuration keys and their environment variables
    Keys,
}

const KEYS: &[(&str, &str, &str)] = &[
    ("database_path", EnvVars::DATABASE_PATH, "Content database file"),
    ("site_url", EnvVars::SITE_URL, "Public site URL used to resolve asset URLs"),
    ("uploads_path", EnvVars::UPLOADS_PATH, "Path under the site URL serving uploads"),
    ("label_attribute", EnvVars::LABEL_ATTRIBUTE, "Attribute key holding ALT text"),
    ("featured_attribute", EnvVars::FEATURED_ATTRIBUTE, "Attribute key holding the featured asset id"),
    ("embed_marker_prefix", EnvVars::EMBED_MARKER_PREFIX, "Body marker prefix embedding an asset id"),
    ("default_limit", EnvVars::DEFAULT_LIMIT, "Assets listed per page (1-1000)"),
];

pub async fn execute(args: ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            println!("🔧 Current configuration:");
            println!("  📁 database_path: {}", config.database_path.display());
            println!("  🌐 site_url: {}", config.site_url);
            println!("  📂 uploads_path: {}", config.uploads_path);
            println!("  🏷️  label_attribute: {}", config.label_attribute);
            println!("  ⭐ featured_attribute: {}", config.featured_attribute);
            println!("  🔖 embed_marker_prefix: {}", config.embed_marker_prefix);
            println!("  📦 default_limit: {}", config.default_limit);

            let env_vars = EnvParser::get_all_altfill_vars();
            if !env_vars.is_empty() {
                println!("\n🌍 Environment overrides:");
                for (key, value) in env_vars {
                    println!("  {} = {}", key, value);
                }
            }
        }

        ConfigCommands::Path => {
            println!("{}", AppConfig::config_path()?.display());
        }

        ConfigCommands::Keys => {
            println!("🔑 Configuration keys:");
            for (key, env_var, description) in KEYS {
                println!("  {:<22} {:<30} {}", key, env_var, description);
            }
        }
    }

    Ok(())
}
