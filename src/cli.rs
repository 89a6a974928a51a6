use clap::Parser;
use std::path::PathBuf;

/// libdoc-cache - Libdoc cache for Robot Framework libraries
///
/// Resolves keyword libraries, keeps their libdoc XML in a cache directory
/// (regenerated when the library source is newer) and prints a JSON report.
#[derive(Parser, Debug)]
#[command(name = "libdoc-cache")]
#[command(author = "Tuist Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Libdoc cache for Robot Framework libraries", long_about = None)]
pub struct Cli {
    /// Library names or paths to .py files, comma-separated (blank entries are skipped)
    pub libraries: String,

    /// Additional module search paths, comma-separated (may be empty)
    pub search_paths: String,

    /// Directory holding the cached libdoc files
    pub cache_dir: PathBuf,

    /// Python interpreter (name in PATH or path)
    #[arg(long, env = "LIBDOC_CACHE_PYTHON")]
    pub python: Option<String>,

    /// Config file path
    #[arg(short = 'c', long, env = "LIBDOC_CACHE_CONFIG")]
    pub config: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from([
            "libdoc-cache",
            "BuiltIn,/tmp/custom.py",
            "",
            "/tmp/libdoc",
        ])
        .unwrap();

        assert_eq!(cli.libraries, "BuiltIn,/tmp/custom.py");
        assert_eq!(cli.search_paths, "");
        assert_eq!(cli.cache_dir, PathBuf::from("/tmp/libdoc"));
        assert!(!cli.pretty);
    }

    #[test]
    fn test_wrong_argument_count() {
        assert!(Cli::try_parse_from(["libdoc-cache", "BuiltIn", "/tmp/libdoc"]).is_err());
        assert!(Cli::try_parse_from(["libdoc-cache", "a", "b", "c", "d"]).is_err());
    }

    #[test]
    fn test_libraries_help_mentions_skipped_entries() {
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("blank entries are skipped"));
    }
}
