// Ordo
// Copyright (C) 2025 Ordo contributors

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Command-line front end for the Ordo complexity analyzer.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ordo_core::analyze_source;
use std::path::PathBuf;
use tracing::Level;

/// CLI for pseudocode complexity analysis
#[derive(Parser, Debug)]
#[command(name = "ordo", about = "Asymptotic complexity analysis of pseudocode")]
pub struct Cli {
    /// Enable verbose analysis logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a pseudocode file and print the complexity result as JSON
    Analyze {
        /// Path to the pseudocode source file
        file: PathBuf,
        /// Algorithm name (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
        /// Print a short human-readable summary instead of JSON
        #[arg(long)]
        summary: bool,
    },
    /// Print the token stream of a pseudocode file
    Tokens {
        /// Path to the pseudocode source file
        file: PathBuf,
    },
    /// Print the parsed AST of a pseudocode file as JSON
    Ast {
        /// Path to the pseudocode source file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).with_target(false).init();

    match cli.command {
        Commands::Analyze { file, name, summary } => {
            let source = read_source(&file)?;
            let name = name.unwrap_or_else(|| file_stem(&file));
            let result = analyze_source(&name, &source).with_context(|| format!("failed to analyze {}", file.display()))?;

            if summary {
                println!("{} ({:?})", result.algorithm, result.kind);
                println!("  best:    {}  [{}]", result.best.bound(), result.best.method);
                println!("  worst:   {}  [{}]", result.worst.bound(), result.worst.method);
                println!("  average: {}  [{}]", result.average.bound(), result.average.method);
                if !result.warnings.is_empty() {
                    println!("  warnings:");
                    for warning in &result.warnings {
                        println!("    - {}", warning);
                    }
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Commands::Tokens { file } => {
            let source = read_source(&file)?;
            let tokens = ordo_parser::Lexer::new(&source).tokenize().map_err(|e| anyhow::anyhow!(e.to_string()))?;
            for token in tokens {
                println!("{}  {}", token.span, token);
            }
        }
        Commands::Ast { file } => {
            let source = read_source(&file)?;
            let ast = ordo_parser::parse(&source).map_err(|e| anyhow::anyhow!(e.to_string()))?;
            println!("{}", serde_json::to_string_pretty(&ast)?);
        }
    }

    Ok(())
}

fn read_source(path: &PathBuf) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn file_stem(path: &PathBuf) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "algorithm".to_string())
}
