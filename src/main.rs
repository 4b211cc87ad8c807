mod analyze;
mod cli;
mod config;
mod error;
mod report;
mod scan;
mod types;

use crate::analyze::{external, ExternalInputs};
use crate::error::KwaliteeError;
use crate::types::index::ExternalScore;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const STRUCTURAL_ERRORS: i32 = 1;
    pub const BELOW_THRESHOLD: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kwalitee={level}")));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run() -> Result<i32, KwaliteeError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        cli::Commands::Score(cmd) => {
            let loaded = config::load_config(&cmd.path, cmd.config.as_deref())?;

            let mut inputs = ExternalInputs {
                scores: Vec::new(),
                lint_rating: cmd.lint_rating,
                style_counts: cmd.style_errors.zip(cmd.style_warnings),
            };
            if let Some(path) = &cmd.scores {
                inputs.scores.extend(external::load_scores(path)?);
            }
            for raw in &cmd.score {
                inputs.scores.push(raw.parse::<ExternalScore>()?);
            }

            let mut model = scan::discover(&cmd.path, &loaded)?;
            let kwalitee_report = analyze::analyze(&mut model, &inputs, &loaded)?;

            if cli.quiet {
                println!("{}", report::text::summary_line(&kwalitee_report));
            } else {
                let output_format = match cmd.format {
                    cli::ReportFormat::Text => report::OutputFormat::Text,
                    cli::ReportFormat::Json => report::OutputFormat::Json,
                };
                let rendered = report::render(&kwalitee_report, output_format, cli.verbose > 0)?;
                println!("{}", rendered.trim_end());
            }

            if let Some(threshold) = cmd.fail_under {
                if kwalitee_report.relative < threshold {
                    eprintln!(
                        "kwalitee index {}% is below the required {}%",
                        kwalitee_report.relative, threshold
                    );
                    return Ok(exit_code::BELOW_THRESHOLD);
                }
            }
            if kwalitee_report.structural_errors.is_empty() {
                Ok(exit_code::SUCCESS)
            } else {
                Ok(exit_code::STRUCTURAL_ERRORS)
            }
        }
        cli::Commands::Docstrings(cmd) => {
            let loaded = config::load_config(&cmd.path, cmd.config.as_deref())?;
            let mut model = scan::discover(&cmd.path, &loaded)?;
            let coverage = analyze::classify_and_reduce(&mut model, &loaded)?;

            let [modules, classes, functions, methods] =
                report::text::kind_counts(&model.forest).map(|(_, count)| count);
            tracing::info!(modules, classes, functions, methods, "entities discovered");

            let listed = if cli.quiet { &[][..] } else { &model.forest[..] };
            print!("{}", report::text::entities_to_text(listed, &coverage));
            for error in &model.structural_errors {
                eprintln!("{}: {}", error.path.display(), error.message);
            }

            if model.structural_errors.is_empty() {
                Ok(exit_code::SUCCESS)
            } else {
                Ok(exit_code::STRUCTURAL_ERRORS)
            }
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
