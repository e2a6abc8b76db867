// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scrivener — batch image-to-document OCR
//
// Entry point. Initialises logging, loads the configuration, applies flag
// overrides, and dispatches the subcommand.

mod cli;
mod commands;
mod progress;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use scrivener_core::config::default_config_path;
use scrivener_core::human_errors::humanize_error;
use scrivener_core::{AppConfig, ScrivenerError};

use cli::{Cli, Commands};

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    tracing::debug!(path = %config_path.display(), "Scrivener starting");

    match run(cli, &config_path) {
        Ok(code) => Ok(code),
        Err(err) => match err.downcast_ref::<ScrivenerError>() {
            Some(failure) => {
                tracing::error!(error = %format!("{err:#}"), kind = %failure.kind(), "command failed");
                let human = humanize_error(failure);
                eprintln!("{}", human.message);
                eprintln!("{}", human.suggestion);
                Ok(ExitCode::FAILURE)
            }
            None => Err(err),
        },
    }
}

fn run(cli: Cli, config_path: &Path) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    match cli.command {
        Commands::Convert {
            input,
            output,
            overrides,
        } => {
            let config = overrides.apply(config)?;
            let pipeline = commands::build_pipeline(cli.engine, &config.engine)?;
            Ok(commands::convert(&pipeline, &config, &input, output)?)
        }

        Commands::Batch {
            inputs,
            out_dir,
            overrides,
        } => {
            let config = overrides.apply(config)?;
            let pipeline = commands::build_pipeline(cli.engine, &config.engine)?;
            Ok(commands::batch(pipeline, &config, &inputs, &out_dir)?)
        }

        Commands::Text { input, overrides } => {
            let config = overrides.apply(config)?;
            let pipeline = commands::build_pipeline(cli.engine, &config.engine)?;
            Ok(commands::text(&pipeline, &config, &input)?)
        }

        Commands::Languages { installed } => Ok(commands::languages(&config.engine, installed)?),

        Commands::Fonts => Ok(commands::fonts()?),

        Commands::InitConfig { overrides } => {
            let config = overrides.apply(config)?;
            Ok(commands::init_config(&config, config_path)?)
        }
    }
}
