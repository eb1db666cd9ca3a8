//! Command line interface.

use clap::{Args, Parser, Subcommand, ValueEnum};
use pmmgen_config::{LibrarySettings, Settings};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}
impl LogLevel {
    /// Directive for [`tracing_subscriber::EnvFilter`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pmmgen", version, about = "Generate Plex Meta Manager configuration files from a media library")]
pub struct Cli {
    /// Configuration file, instead of `config.yaml` in the working directory.
    #[arg(short, long, global = true, env = "PMMGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level. `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Walk the configured libraries and generate files and reports.
    Generate(GenerateArgs),
    /// Load a folder of existing Plex Meta Manager files and look entries up.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Catalog snapshot to read libraries from (overrides `plex.catalog`).
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Only process this library; repeat for several.
    #[arg(long = "library", value_name = "NAME")]
    pub libraries: Vec<String>,

    /// Output directory (overrides `output.path`).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace files that already exist.
    #[arg(long)]
    pub overwrite: bool,

    /// Skip collections and items that already have an entry in the library's
    /// Plex Meta Manager folder.
    #[arg(long)]
    pub delta_only: bool,
}
impl GenerateArgs {
    /// Fold the command line overrides into `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(catalog) = &self.catalog {
            settings.plex.catalog = Some(catalog.clone());
        }
        if let Some(output) = &self.output {
            settings.output.path = output.clone();
        }
        if self.overwrite {
            settings.output.overwrite = true;
        }
        if !self.libraries.is_empty() {
            let configured = settings.plex.libraries.take().unwrap_or_default();
            let selected = self
                .libraries
                .iter()
                .map(|name| {
                    configured.iter().find(|l| &l.name == name).cloned().unwrap_or_else(|| LibrarySettings::new(name))
                })
                .collect();
            settings.plex.libraries = Some(selected);
        }
        if self.delta_only {
            for library in settings.plex.libraries.iter_mut().flatten() {
                library.pmm_delta = true;
            }
        }
    }
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Folder of existing Plex Meta Manager files.
    pub folder: PathBuf,

    /// Print the merged view of this collection.
    #[arg(long)]
    pub collection: Option<String>,

    /// Print the merged view of this movie or show.
    #[arg(long)]
    pub metadata: Option<String>,

    /// Year of the `--metadata` item, matched within one year.
    #[arg(long, requires = "metadata")]
    pub year: Option<i64>,

    /// Print the poster of this season of the `--metadata` show.
    #[arg(long, requires = "metadata")]
    pub season: Option<u32>,

    /// Write every ingested entry to this YAML file.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn generate(args: &[&str]) -> GenerateArgs {
        let cli = Cli::try_parse_from([&["pmmgen", "generate"][..], args].concat()).unwrap();
        match cli.command {
            Command::Generate(args) => args,
            Command::Inspect(_) => panic!("expected generate"),
        }
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["pmmgen", "generate"], LogLevel::Info)]
    #[case(&["pmmgen", "--log-level", "debug", "generate"], LogLevel::Debug)]
    #[case(&["pmmgen", "generate", "-l", "warn"], LogLevel::Warn)]
    fn test_log_level(#[case] args: &[&str], #[case] expected: LogLevel) {
        assert_eq!(Cli::try_parse_from(args).unwrap().log_level, expected);
    }

    #[test]
    fn test_inspect_requires_metadata_for_year() {
        assert!(Cli::try_parse_from(["pmmgen", "inspect", "pmm", "--year", "1979"]).is_err());
        assert!(Cli::try_parse_from(["pmmgen", "inspect", "pmm", "--metadata", "Alien", "--year", "1979"]).is_ok());
    }

    #[test]
    fn test_apply_overrides() {
        let mut settings = Settings::default();
        settings.plex.libraries = Some(vec![LibrarySettings {
            pmm_path: Some(PathBuf::from("/pmm/movies")),
            ..LibrarySettings::new("Movies")
        }]);
        let args = generate(&["--library", "Movies", "--library", "TV Shows", "--output", "/out", "--delta-only"]);
        args.apply(&mut settings);

        let libraries = settings.plex.libraries.unwrap();
        assert_eq!(libraries.len(), 2);
        assert_eq!(libraries[0].pmm_path.as_deref(), Some(std::path::Path::new("/pmm/movies")));
        assert_eq!(libraries[1].name, "TV Shows");
        assert!(libraries.iter().all(|l| l.pmm_delta));
        assert_eq!(settings.output.path, PathBuf::from("/out"));
        assert!(!settings.output.overwrite);
    }

    #[test]
    fn test_no_overrides() {
        let mut settings = Settings::default();
        generate(&[]).apply(&mut settings);
        assert!(settings.plex.libraries.is_none());
        assert_eq!(settings.output.path, Settings::default().output.path);
    }
}
