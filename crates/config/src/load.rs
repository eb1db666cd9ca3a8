use crate::Settings;
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::{Path, PathBuf};

const FILE_NAME: &str = "config.yaml";
const ENV_PREFIX: &str = "PMMGEN_";

impl Settings {
    /// Loads, merges and validates the configuration.
    ///
    /// When `explicit` is given it replaces the working-directory
    /// `config.yaml` and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit
            && !path.is_file()
        {
            exn::bail!(ErrorKind::Invalid(format!("configuration file not found: {}", path.display())));
        }
        Self::from_figment(Self::figment(explicit))
    }

    /// Builds the layered provider without extracting it.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(user) = user_config_path() {
            tracing::debug!(path = %user.display(), "Merging user configuration");
            figment = figment.merge(Yaml::file(user));
        }
        let local = explicit.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(FILE_NAME));
        tracing::debug!(path = %local.display(), "Merging configuration file");
        figment.merge(Yaml::file(local)).merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extracts and validates settings from an already-built provider.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract().or_raise(|| ErrorKind::Load)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Location of the per-user configuration file, if the platform has one.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pmmgen").map(|dirs| dirs.config_dir().join(FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_when_no_sources() {
        Jail::expect_with(|_jail| {
            let settings = Settings::from_figment(Settings::figment(None)).unwrap();
            assert_eq!(settings.output.path, PathBuf::from("./data"));
            assert!(settings.plex.libraries.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
plex:
  server_url: http://plex.local:32400
  libraries:
    - name: Movies
      pmm_path: /pmm/movies
      pmm_delta: true
output:
  path: /srv/out
  overwrite: true
"#,
            )?;
            let settings = Settings::from_figment(Settings::figment(None)).unwrap();
            assert_eq!(settings.plex.server_url, "http://plex.local:32400");
            assert_eq!(settings.output.path, PathBuf::from("/srv/out"));
            assert!(settings.output.overwrite);
            let libraries = settings.plex.libraries.unwrap();
            assert_eq!(libraries.len(), 1);
            assert_eq!(libraries[0].name, "Movies");
            assert_eq!(libraries[0].pmm_path.as_deref(), Some(Path::new("/pmm/movies")));
            assert!(libraries[0].pmm_delta);
            // Untouched sections keep their defaults.
            assert!(!settings.generate.formats.is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "plex:\n  token: from-file\n")?;
            jail.set_env("PMMGEN_PLEX__TOKEN", "from-env");
            let settings = Settings::from_figment(Settings::figment(None)).unwrap();
            assert_eq!(settings.plex.token, "from-env");
            Ok(())
        });
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_invalid_format_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "generate:\n  formats: [yaml, pdf]\n")?;
            let err = Settings::from_figment(Settings::figment(None)).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
            Ok(())
        });
    }
}
