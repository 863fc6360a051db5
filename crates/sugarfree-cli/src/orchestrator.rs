//! Main orchestration logic.

use crate::cli::Args;
use crate::config::{ConfigError, ProjectConfig};
use crate::output::{FileDiagnostic, Formatter, RunSummary};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use miette::Diagnostic;
use rayon::prelude::*;
use std::fs;
use std::time::Instant;
use sugarfree_transformer::{transform, Transform, TransformOptions};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions picked up from the source directory.
pub const SOURCE_EXTENSIONS: [&str; 7] = ["ts", "tsx", "js", "jsx", "mjs", "cjs", "flow"];

const DEFAULT_IGNORES: [&str; 1] = ["**/node_modules/**"];

/// Errors that stop a run before any file is written.
#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    /// The source directory is missing.
    #[error("source directory `{0}` does not exist")]
    #[diagnostic(code(sugarfree::missing_source_dir))]
    MissingSourceDir(Utf8PathBuf),

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    #[diagnostic(code(sugarfree::invalid_glob))]
    InvalidGlob(String),

    /// The requested config file could not be used.
    #[error(transparent)]
    #[diagnostic(code(sugarfree::config))]
    Config(#[from] ConfigError),
}

/// Why a single file produced no output.
enum Failure {
    Transform(Box<FileDiagnostic>),
    Io(String),
}

/// Transpiles every source under `args.src_dir` into `args.out_dir`.
pub fn run(args: &Args) -> Result<RunSummary, OrchestratorError> {
    if !args.src_dir.is_dir() {
        return Err(OrchestratorError::MissingSourceDir(args.src_dir.clone()));
    }

    let config = match &args.config {
        Some(path) => ProjectConfig::load(path)?,
        None => ProjectConfig::discover(&args.src_dir),
    };
    let options = resolve_options(args, &config);
    if options.transforms.is_empty() {
        tracing::warn!("no transforms enabled; sources are copied unchanged");
    }
    let out_extension = args
        .out_extension
        .as_deref()
        .or(config.out_extension.as_deref())
        .unwrap_or("js")
        .trim_start_matches('.')
        .to_string();
    let ignores = build_ignores(args.ignore.iter().chain(&config.ignore))?;

    let scan_start = Instant::now();
    let files = discover(&args.src_dir, &args.out_dir, &ignores);
    tracing::info!(
        files = files.len(),
        elapsed_ms = scan_start.elapsed().as_millis() as u64,
        "discovered sources"
    );

    let outcomes: Vec<(Utf8PathBuf, Result<(), Failure>)> = files
        .par_iter()
        .map(|relative| {
            let outcome = transpile_file(args, &options, &out_extension, relative);
            (relative.clone(), outcome)
        })
        .collect();

    let formatter = Formatter::new();
    let mut summary = RunSummary::default();
    for (relative, outcome) in outcomes {
        match outcome {
            Ok(()) => summary.written += 1,
            Err(Failure::Transform(diagnostic)) => {
                summary.failed += 1;
                eprint!("{}", formatter.render(&diagnostic));
            }
            Err(Failure::Io(message)) => {
                summary.failed += 1;
                eprintln!("Error: {}: {}", relative, message);
            }
        }
    }
    Ok(summary)
}

/// Config file values overridden by command-line flags.
fn resolve_options(args: &Args, config: &ProjectConfig) -> TransformOptions {
    let mut options = config.options.clone();
    if !args.transforms.is_empty() {
        options.transforms = args.transforms.clone();
    }
    if let Some(pragma) = &args.jsx_pragma {
        options.jsx_pragma = pragma.clone();
    }
    if let Some(pragma) = &args.jsx_fragment_pragma {
        options.jsx_fragment_pragma = pragma.clone();
    }
    options.source_maps |= args.source_maps;
    options
}

fn build_ignores<'a>(
    patterns: impl Iterator<Item = &'a String>,
) -> Result<GlobSet, OrchestratorError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns.map(String::as_str).chain(DEFAULT_IGNORES) {
        let glob = Glob::new(pattern).map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| OrchestratorError::InvalidGlob(e.to_string()))
}

/// Source files below `src_dir`, relative to it and sorted.
fn discover(src_dir: &Utf8Path, out_dir: &Utf8Path, ignores: &GlobSet) -> Vec<Utf8PathBuf> {
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(src_dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.path() != out_dir.as_std_path())
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
        .filter(|p| is_source(p))
        .filter_map(|p| p.strip_prefix(src_dir).ok().map(Utf8Path::to_path_buf))
        .filter(|relative| !ignores.is_match(relative.as_str()))
        .collect();
    files.sort();
    files
}

fn is_source(path: &Utf8Path) -> bool {
    let file_name = path.file_name().unwrap_or("");
    !file_name.ends_with(".d.ts")
        && path
            .extension()
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Options for one file; `.ts` files never contain JSX.
fn file_options(base: &TransformOptions, relative: &Utf8Path) -> TransformOptions {
    let mut options = base.clone();
    options.file_path = Some(relative.to_string());
    if options.dialect.is_none()
        && options.has(Transform::Typescript)
        && relative.extension() == Some("ts")
    {
        options.transforms.retain(|t| *t != Transform::Jsx);
    }
    options
}

/// Output location mirroring `relative` under the output directory.
fn output_path(out_dir: &Utf8Path, relative: &Utf8Path, extension: &str) -> Utf8PathBuf {
    out_dir.join(relative).with_extension(extension)
}

fn transpile_file(
    args: &Args,
    base: &TransformOptions,
    out_extension: &str,
    relative: &Utf8Path,
) -> Result<(), Failure> {
    let source_path = args.src_dir.join(relative);
    let source = fs::read_to_string(&source_path).map_err(|e| Failure::Io(e.to_string()))?;
    let options = file_options(base, relative);

    let result = match transform(&source, &options) {
        Ok(result) => result,
        Err(error) => {
            tracing::debug!(file = %relative, code = error.code(), "transform failed");
            let diagnostic = FileDiagnostic::new(&source_path, source, &error);
            return Err(Failure::Transform(Box::new(diagnostic)));
        }
    };

    let out_path = output_path(&args.out_dir, relative, out_extension);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Failure::Io(e.to_string()))?;
    }
    fs::write(&out_path, &result.code).map_err(|e| Failure::Io(e.to_string()))?;

    if let Some(map) = result.source_map {
        let json = serde_json::to_string_pretty(&map.deltas())
            .map_err(|e| Failure::Io(e.to_string()))?;
        fs::write(format!("{out_path}.map.json"), json).map_err(|e| Failure::Io(e.to_string()))?;
    }
    tracing::debug!(file = %relative, out = %out_path, "transpiled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_source() {
        assert!(is_source(Utf8Path::new("a/b.tsx")));
        assert!(is_source(Utf8Path::new("index.mjs")));
        assert!(is_source(Utf8Path::new("lib.js.flow")));
        assert!(!is_source(Utf8Path::new("types.d.ts")));
        assert!(!is_source(Utf8Path::new("style.css")));
        assert!(!is_source(Utf8Path::new("Makefile")));
    }

    #[test]
    fn test_output_path_swaps_extension() {
        assert_eq!(
            output_path(Utf8Path::new("dist"), Utf8Path::new("ui/App.tsx"), "js"),
            Utf8PathBuf::from("dist/ui/App.js")
        );
        assert_eq!(
            output_path(Utf8Path::new("out"), Utf8Path::new("main.ts"), "cjs"),
            Utf8PathBuf::from("out/main.cjs")
        );
    }

    #[test]
    fn test_ts_files_do_not_lower_jsx() {
        let base = TransformOptions::from_transforms(&[Transform::Typescript, Transform::Jsx]);
        let ts = file_options(&base, Utf8Path::new("a.ts"));
        assert_eq!(ts.transforms, vec![Transform::Typescript]);
        assert_eq!(ts.file_path.as_deref(), Some("a.ts"));
        let tsx = file_options(&base, Utf8Path::new("a.tsx"));
        assert_eq!(tsx.transforms, base.transforms);
    }

    #[test]
    fn test_default_ignores_apply() {
        let ignores = build_ignores(["**/gen/**".to_string()].iter()).unwrap();
        assert!(ignores.is_match("node_modules/x/index.js"));
        assert!(ignores.is_match("a/gen/b.js"));
        assert!(!ignores.is_match("src/index.js"));
    }

    #[test]
    fn test_invalid_glob() {
        let result = build_ignores(["a/[".to_string()].iter());
        assert!(matches!(result, Err(OrchestratorError::InvalidGlob(_))));
    }
}
