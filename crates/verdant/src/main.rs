use std::process::ExitCode;

use anyhow::Context as _;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use salsa::DatabaseImpl;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use verdant_analysis::check_file;
use verdant_errors::{Renderer, Severity};
use verdant_inputs::File;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Lossless incremental parser and language server for verdant sources.
#[derive(Parser)]
#[command(version)]
enum Options {
    /// Reports syntax errors and unresolved names.
    Check { path: Utf8PathBuf },
    /// Prints the syntax tree.
    Dump { path: Utf8PathBuf },
    /// Serves the language server protocol over stdio.
    Lsp,
}

fn main() -> anyhow::Result<ExitCode> {
    init_logging();

    match Options::parse() {
        Options::Check { path } => check(path),
        Options::Dump { path } => {
            let text = read(&path)?;
            let parse = verdant_parse::parse(&text);
            print!("{}", parse.syntax_tree(&text).debug_tree());
            Ok(ExitCode::SUCCESS)
        }
        Options::Lsp => {
            let _span = tracing::info_span!("lsp", pid = std::process::id()).entered();
            verdant_ide::Server::new().context("language server failed to initialize")?.run()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr; stdout carries LSP traffic.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("VERDANT_LOG")
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn read(path: &Utf8Path) -> anyhow::Result<String> {
    tracing::debug!(%path, "reading source");
    std::fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))
}

fn check(path: Utf8PathBuf) -> anyhow::Result<ExitCode> {
    let db = DatabaseImpl::default();
    let text = read(&path)?;
    let file = File::new(&db, path, text);

    let renderer = Renderer::styled();
    let diagnostics = check_file(&db, file);
    tracing::info!(count = diagnostics.len(), "checked `{}`", file.path(&db));
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic.render(&renderer, file.path(&db).as_str(), file.text(&db)));
    }

    let failed = diagnostics.iter().any(|diagnostic| diagnostic.severity() == Severity::Error);
    Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}
