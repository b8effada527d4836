//! brilrun Interpreter Library
//!
//! A reference interpreter for Bril, a small compiler IR made of functions,
//! labels and typed instructions. Programs are loaded from the canonical JSON
//! form or from the text form, then `main` is executed with command-line
//! arguments bound to its parameters.
//!
//! ```
//! let program = brilrun::load_source(
//!     "main (a: int) (b: int) { c: int = add a b; print c; }",
//!     brilrun::Format::Text,
//! )?;
//! let mut out: Vec<u8> = Vec::new();
//! let args = ["3".to_string(), "4".to_string()];
//! brilrun::run(&program, &args, &brilrun::RunConfig::default(), &mut out)?;
//! assert_eq!(out, b"7\n");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod env;
pub mod error;
mod interpreter;
pub mod program;
pub mod runner;
pub mod value;

pub use error::InterpError;
pub use program::Program;
pub use runner::{RunConfig, RunStats, parse_args, run_program};
pub use value::Value;

use anyhow::{Context, Result};
use program::raw::RawProgram;
use std::collections::{HashSet, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Source encodings understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Canonical JSON.
    Json,
    /// Human-editable text form.
    Text,
}

impl Format {
    /// `.bril` files are text, everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext == "bril" => Format::Text,
            _ => Format::Json,
        }
    }

    fn parse(self, src: &str) -> Result<RawProgram> {
        match self {
            Format::Json => Ok(serde_json::from_str(src)?),
            Format::Text => program::text::parse(src),
        }
    }
}

/// Loads a program from an in-memory source.
///
/// Sources loaded this way cannot import other modules.
pub fn load_source(src: &str, format: Format) -> Result<Program> {
    match format {
        Format::Json => Program::from_json(src),
        Format::Text => Program::from_text(src),
    }
}

/// Loads a program from a file, following its imports.
///
/// `import name;` reads `name.bril` from the directory of the importing file.
/// Every module is loaded once and its functions are appended after the
/// importer's. Two modules defining the same function are rejected when the
/// program runs.
///
/// # Arguments
/// * `path` - The root module
/// * `format` - Encoding of the root module; inferred from the extension if absent
pub fn load_file(path: &Path, format: Option<Format>) -> Result<Program> {
    let format = format.unwrap_or_else(|| Format::from_path(path));
    let mut root = read_module(path, format)?;

    let mut seen = HashSet::new();
    if let Some(stem) = path.file_stem() {
        seen.insert(stem.to_string_lossy().into_owned());
    }
    let mut pending: VecDeque<(PathBuf, String)> = VecDeque::new();
    let base = path.parent().unwrap_or(Path::new("")).to_path_buf();
    queue_imports(&base, std::mem::take(&mut root.imports), &mut seen, &mut pending);

    while let Some((dir, name)) = pending.pop_front() {
        let module_path = dir.join(format!("{name}.bril"));
        debug!("Importing `{}` from {}", name, module_path.display());
        let mut module = read_module(&module_path, Format::Text)
            .with_context(|| format!("while importing `{name}`"))?;
        let module_dir = module_path.parent().unwrap_or(Path::new("")).to_path_buf();
        queue_imports(&module_dir, std::mem::take(&mut module.imports), &mut seen, &mut pending);
        root.functions.append(&mut module.functions);
    }

    info!("Loaded {} function(s) from {}", root.functions.len(), path.display());
    root.into_program()
        .with_context(|| format!("invalid program in {}", path.display()))
}

fn read_module(path: &Path, format: Format) -> Result<RawProgram> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    format
        .parse(&src)
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn queue_imports(
    dir: &Path,
    imports: Vec<String>,
    seen: &mut HashSet<String>,
    pending: &mut VecDeque<(PathBuf, String)>,
) {
    for name in imports {
        if seen.insert(name.clone()) {
            pending.push_back((dir.to_path_buf(), name));
        }
    }
}

/// Parses `raw_args` and runs `program`, writing its output to `out`.
pub fn run(
    program: &Program,
    raw_args: &[String],
    config: &RunConfig,
    out: &mut dyn Write,
) -> Result<RunStats> {
    let args = parse_args(raw_args)?;
    Ok(run_program(program, args, config, out)?)
}
