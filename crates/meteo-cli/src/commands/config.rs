//! Config command - inspect and initialize the configuration file.

use anyhow::{Context, Result, bail};

use crate::cli::ConfigAction;
use crate::commands::RunContext;
use crate::config::Config;
use crate::format::as_json;
use crate::util::write_output;

pub fn cmd_config(action: ConfigAction, ctx: &RunContext) -> Result<()> {
    match action {
        ConfigAction::Path => {
            write_output(ctx.output(), &format!("{}\n", ctx.config_path.display()))
        }
        ConfigAction::Show => {
            let content = if ctx.json {
                as_json(&ctx.config)?
            } else {
                toml::to_string_pretty(&ctx.config).context("Failed to serialize config")?
            };
            write_output(ctx.output(), &content)
        }
        ConfigAction::Init { force } => {
            if ctx.config_path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    ctx.config_path.display()
                );
            }
            Config::default().save(&ctx.config_path)?;
            if !ctx.quiet {
                println!("Wrote default configuration to {}", ctx.config_path.display());
            }
            Ok(())
        }
    }
}
