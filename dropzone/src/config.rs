//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `DROPZONE_CONFIG`
//! environment variable. A missing file is not an error: every field has a default.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `DROPZONE_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `DROPZONE_UPLOADS__DIRECTORY=/srv/uploads` sets the `uploads.directory` field.
//!
//! ## Example
//!
//! ```yaml
//! host: 127.0.0.1
//! port: 8080
//! uploads:
//!   directory: upload/
//!   serve_files: true
//!   files:
//!     mode: single
//!     field: file
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;
use crate::upload::FileSelector;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "DROPZONE_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without creating the upload directory or starting the server
    #[arg(long)]
    pub validate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Directory uploaded files are written into. Created at startup if missing.
    pub directory: PathBuf,
    /// Which multipart fields may carry files
    pub files: FileSelector,
    /// Serve stored files back under `/files/{filename}`
    pub serve_files: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("upload/"),
            files: FileSelector::Any,
            serve_files: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            enable_otel_export: false,
            uploads: UploadConfig::default(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // DROPZONE_CONFIG names the file itself and is read by clap
            .merge(Env::prefixed("DROPZONE_").ignore(&["CONFIG"]).split("__"))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.uploads.directory.as_os_str().is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: uploads.directory cannot be empty".to_string(),
            });
        }

        self.uploads.files.validate().map_err(|reason| Error::Internal {
            operation: format!("Config validation: invalid uploads.files selector: {reason}"),
        })?;

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::FieldLimit;
    use figment::Jail;

    fn args(config: &str) -> Args {
        Args {
            config: config.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(&args("missing.yaml"))?;

            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 3001);
            assert_eq!(config.uploads.directory, PathBuf::from("upload/"));
            assert_eq!(config.uploads.files, FileSelector::Any);
            assert!(!config.uploads.serve_files);
            assert!(!config.enable_otel_export);

            Ok(())
        });
    }

    #[test]
    fn test_yaml_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
port: 8080
uploads:
  directory: /srv/dropzone
  serve_files: true
  files:
    mode: fields
    fields:
      - name: avatar
        max_count: 1
      - name: gallery
"#,
            )?;

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.port, 8080);
            assert_eq!(config.uploads.directory, PathBuf::from("/srv/dropzone"));
            assert!(config.uploads.serve_files);
            assert_eq!(
                config.uploads.files,
                FileSelector::Fields {
                    fields: vec![
                        FieldLimit {
                            name: "avatar".to_string(),
                            max_count: Some(1),
                        },
                        FieldLimit {
                            name: "gallery".to_string(),
                            max_count: None,
                        },
                    ]
                }
            );

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
host: 0.0.0.0
uploads:
  directory: from-yaml/
"#,
            )?;

            jail.set_env("DROPZONE_HOST", "127.0.0.1");
            jail.set_env("DROPZONE_PORT", "9090");
            jail.set_env("DROPZONE_UPLOADS__DIRECTORY", "from-env/");

            let config = Config::load(&args("test.yaml"))?;

            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 9090);
            assert_eq!(config.uploads.directory, PathBuf::from("from-env/"));
            assert_eq!(config.bind_address(), "127.0.0.1:9090");

            Ok(())
        });
    }

    #[test]
    fn test_config_path_env_is_not_a_config_key() {
        Jail::expect_with(|jail| {
            jail.set_env("DROPZONE_CONFIG", "elsewhere.yaml");

            let config = Config::load(&args("missing.yaml"))?;
            assert_eq!(config.port, 3001);

            Ok(())
        });
    }

    #[test]
    fn test_unknown_fields_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
uploads:
  dir: typo/
"#,
            )?;

            assert!(Config::load(&args("test.yaml")).is_err());

            Ok(())
        });
    }

    #[test]
    fn test_invalid_selector_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
uploads:
  files:
    mode: array
    field: photos
    max_count: 0
"#,
            )?;

            let result = Config::load(&args("test.yaml"));
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("max_count"));

            Ok(())
        });
    }

    #[test]
    fn test_validation_empty_directory() {
        let mut config = Config::default();
        config.uploads.directory = PathBuf::new();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("uploads.directory"));
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(Config::default().validate().is_ok());
    }
}
