//! Command-line interface for the `splice` binary.
//!
//! The CLI is the rendering collaborator: the engine never formats its own
//! diagnostics, so everything user-facing (miette reports for fatal errors,
//! human or JSON lines for non-fatal diagnostics) happens here.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use walkdir::WalkDir;

use crate::diagnostics::{Diagnostic, EngineError};
use crate::engine::expand_source;
use crate::expand::Config;
use crate::syntax::parser;

/// File extension of Splice sources.
const SOURCE_EXTENSION: &str = "spl";

#[derive(Debug, Parser)]
#[command(
    name = "splice",
    version,
    about = "A compile-time macro-expansion engine: marked generic functions are inlined at their call sites."
)]
pub struct SpliceArgs {
    #[command(subcommand)]
    pub command: ArgsCommand,

    /// Macro-recognition marker carried by definition names.
    #[arg(long, global = true)]
    pub marker: Option<String>,

    /// JSON configuration file; `--marker` overrides its marker.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    /// Expand a source file (or every source file under a directory) and
    /// print the transformed output.
    Expand {
        /// File or directory to expand.
        path: PathBuf,
    },
    /// Run the pipeline and report diagnostics without printing output.
    Check {
        /// File or directory to check.
        path: PathBuf,
        /// Emit diagnostics as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the parsed AST of a source file.
    Ast {
        /// File to parse.
        file: PathBuf,
    },
}

/// CLI entry point; returns the process exit code.
pub fn run() -> ExitCode {
    let args = SpliceArgs::parse();
    let config = match load_config(args.config.as_deref(), args.marker.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{:?}", miette::Report::new(error));
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        ArgsCommand::Expand { path } => cmd_expand(&path, &config),
        ArgsCommand::Check { path, json } => cmd_check(&path, &config, json),
        ArgsCommand::Ast { file } => cmd_ast(&file),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{:?}", miette::Report::new(error));
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

fn cmd_expand(path: &Path, config: &Config) -> Result<ExitCode, EngineError> {
    let files = discover_sources(path)?;
    let many = files.len() > 1;
    for file in files {
        let source = read_source(&file)?;
        let name = file.display().to_string();
        let (output, diagnostics) = expand_source(&source, &name, config.clone())?;
        if many {
            println!("// ==> {}", name);
        }
        print!("{}", output);
        for diagnostic in &diagnostics {
            eprintln!("{}", render_diagnostic(diagnostic, &name));
        }
    }
    // degraded output is still output; expand succeeds
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(path: &Path, config: &Config, json: bool) -> Result<ExitCode, EngineError> {
    let files = discover_sources(path)?;
    let mut all: Vec<(String, Vec<Diagnostic>)> = Vec::new();
    for file in files {
        let source = read_source(&file)?;
        let name = file.display().to_string();
        let (_, diagnostics) = expand_source(&source, &name, config.clone())?;
        all.push((name, diagnostics));
    }

    let clean = all.iter().all(|(_, diags)| diags.is_empty());
    if json {
        let flattened: Vec<serde_json::Value> = all
            .iter()
            .flat_map(|(name, diags)| {
                diags.iter().map(move |d| {
                    serde_json::json!({
                        "file": name,
                        "code": d.code.number(),
                        "severity": d.severity,
                        "message": d.message,
                        "span": d.span,
                    })
                })
            })
            .collect();
        // serialization of plain data cannot fail
        println!(
            "{}",
            serde_json::to_string_pretty(&flattened).expect("diagnostics serialize")
        );
    } else {
        for (name, diags) in &all {
            for diagnostic in diags {
                println!("{}", render_diagnostic(diagnostic, name));
            }
        }
        if clean {
            println!("ok");
        }
    }

    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_ast(file: &Path) -> Result<ExitCode, EngineError> {
    let source = read_source(file)?;
    let unit = parser::parse(&source, &file.display().to_string())?;
    println!("{:#?}", unit);
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// HELPERS
// ============================================================================

fn load_config(
    file: Option<&Path>,
    marker: Option<&str>,
) -> Result<Config, EngineError> {
    let mut config = match file {
        Some(path) => {
            let text = read_source(path)?;
            serde_json::from_str(&text).map_err(|e| EngineError::Io {
                operation: "parse",
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        }
        None => Config::default(),
    };
    if let Some(marker) = marker {
        config.macro_marker = marker.to_string();
    }
    Ok(config)
}

fn render_diagnostic(diagnostic: &Diagnostic, name: &str) -> String {
    format!(
        "error[{}]: {} ({}:{}..{})",
        diagnostic.code.number(),
        diagnostic.message,
        name,
        diagnostic.span.start,
        diagnostic.span.end
    )
}

fn read_source(path: &Path) -> Result<String, EngineError> {
    fs::read_to_string(path).map_err(|e| EngineError::Io {
        operation: "read",
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// A single file, or every `.spl` file under a directory.
fn discover_sources(path: &Path) -> Result<Vec<PathBuf>, EngineError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(EngineError::Io {
            operation: "read",
            path: path.display().to_string(),
            reason: "no such file or directory".to_string(),
        });
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext == SOURCE_EXTENSION)
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
