//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};
use sugarfree_transformer::Transform;

/// Fast transpiler that strips TypeScript and Flow types, lowers JSX and
/// rewrites ES modules to CommonJS.
#[derive(Debug, Parser)]
#[command(name = "sugarfree")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory containing the sources to transpile
    pub src_dir: Utf8PathBuf,

    /// Directory the transpiled files are written to
    #[arg(long = "out-dir", short = 'd')]
    pub out_dir: Utf8PathBuf,

    /// Transforms to apply (comma-separated: typescript,flow,jsx,imports,jest,react-hot-loader)
    #[arg(long, short = 't', value_delimiter = ',')]
    pub transforms: Vec<Transform>,

    /// Factory expression for JSX elements
    #[arg(long = "jsx-pragma")]
    pub jsx_pragma: Option<String>,

    /// Expression naming the JSX fragment component
    #[arg(long = "jsx-fragment-pragma")]
    pub jsx_fragment_pragma: Option<String>,

    /// Extension of the written files, without the dot
    #[arg(long = "out-extension")]
    pub out_extension: Option<String>,

    /// Glob patterns to ignore, relative to the source directory
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Write a position table next to each output file
    #[arg(long = "source-maps")]
    pub source_maps: bool,

    /// Path to a sugarfree.json project file
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Suppress the summary line
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_args() {
        let args = Args::parse_from(["sugarfree", "src", "--out-dir", "dist"]);
        assert_eq!(args.src_dir.as_str(), "src");
        assert_eq!(args.out_dir.as_str(), "dist");
        assert!(args.transforms.is_empty());
        assert!(args.out_extension.is_none());
        assert!(!args.source_maps);
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_transform_list() {
        let args = Args::parse_from([
            "sugarfree",
            "src",
            "-d",
            "dist",
            "--transforms",
            "typescript,jsx,react-hot-loader",
        ]);
        assert_eq!(
            args.transforms,
            vec![Transform::Typescript, Transform::Jsx, Transform::ReactHotLoader]
        );
    }

    #[test]
    fn test_unknown_transform_is_rejected() {
        let result = Args::try_parse_from(["sugarfree", "src", "-d", "dist", "-t", "coffee"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_repeated_ignores_and_verbosity() {
        let args = Args::parse_from([
            "sugarfree",
            "src",
            "-d",
            "dist",
            "--ignore",
            "**/fixtures/**",
            "--ignore",
            "*.test.js",
            "-vv",
        ]);
        assert_eq!(args.ignore, vec!["**/fixtures/**", "*.test.js"]);
        assert_eq!(args.log_level(), "debug");
    }
}
