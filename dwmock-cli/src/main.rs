//! dwmock CLI - コマンドラインインターフェース
//!
//! ELFバイナリのDWARF情報から関数プロトタイプとモック用ヘッダを生成する

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dwmock_core::{GeneratorConfig, HeaderGenerator};
use dwmock_dwarf::DebugInfoIndex;
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// dwmock - DWARF based mock header generator
#[derive(Parser)]
#[command(name = "dwmock")]
#[command(version = "0.1.0")]
#[command(about = "Generate C prototypes and mock headers from DWARF debug info", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: GenerateCommand,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Print typedefs and function prototypes
    Protos {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print a mock header with parameter-check structs
    Mock {
        #[command(flatten)]
        input: InputArgs,

        /// Prefix for generated mock structs and functions
        #[arg(long, default_value = "mock_")]
        prefix: String,

        /// Do not emit `#pragma once`
        #[arg(long)]
        no_pragma: bool,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Path to the binary with DWARF debug info
    binary: PathBuf,

    /// Only keep functions whose name matches this regular expression
    #[arg(short, long)]
    filter: Option<String>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        GenerateCommand::Protos { input } => {
            let index = load_index(&input)?;
            let config = GeneratorConfig::default();
            let text = HeaderGenerator::new(&index, &config).prototypes()?;
            write_output(&input, &text)?;
        }
        GenerateCommand::Mock {
            input,
            prefix,
            no_pragma,
        } => {
            let index = load_index(&input)?;
            let config = GeneratorConfig {
                mock_prefix: prefix,
                pragma_once: !no_pragma,
                ..GeneratorConfig::default()
            };
            let text = HeaderGenerator::new(&index, &config).mock_header()?;
            write_output(&input, &text)?;
        }
    }

    Ok(())
}

/// ログは標準エラー出力へ（標準出力は生成結果のみ）
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// バイナリを読み込み、必要なら関数名で絞り込む
fn load_index(input: &InputArgs) -> Result<DebugInfoIndex> {
    let mut index = DebugInfoIndex::load(&input.binary)
        .with_context(|| format!("Failed to index {}", input.binary.display()))?;

    if let Some(pattern) = &input.filter {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid filter pattern '{}'", pattern))?;
        index.retain_functions(|function| regex.is_match(&function.name));
        info!(
            "{} functions match filter '{}'",
            index.function_count(),
            pattern
        );
    }

    Ok(index)
}

fn write_output(input: &InputArgs, text: &str) -> Result<()> {
    match &input.output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
