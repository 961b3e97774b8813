//! Batch configuration and database connection establishment.
//!
//! The driver is configured by a JSON file carrying the database connection
//! parameters, the destination schema, the collision policy, and the list of
//! dataset names to replicate. The file is read once; the resulting value is
//! passed by parameter into the per-dataset orchestrator.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use postgres::{Client, NoTls};
use serde::Deserialize;

use geosink_core::CollisionPolicy;

/// Batch driver configuration, deserialized from a JSON file.
#[derive(Debug, Deserialize)]
pub struct BatchConfig {
    /// Database server host
    pub host: String,
    /// Database server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Target database name
    pub database: String,
    /// Database user
    pub user: String,
    /// Password for the database user
    pub password: String,
    /// Requested SSL mode; accepted for compatibility, but only modes that
    /// permit plain TCP are supported
    #[serde(default)]
    pub sslmode: Option<String>,
    /// Destination schema for all tables in this batch
    pub schema: String,
    /// Collision policy applied to every table in this batch
    #[serde(default = "default_policy")]
    pub if_exists: String,
    /// Dataset names to replicate; each maps to `<data_dir>/<name>.csv`
    pub table_list: Vec<String>,
    /// Directory holding the downloaded dataset files (default: current dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_port() -> u16 {
    5432
}

fn default_policy() -> String {
    "replace".to_string()
}

impl BatchConfig {
    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: BatchConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Parse the configured collision policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not `fail` or `replace`.
    pub fn policy(&self) -> Result<CollisionPolicy> {
        Ok(self.if_exists.parse::<CollisionPolicy>()?)
    }

    /// Local file path for a named dataset.
    #[must_use]
    pub fn dataset_path(&self, name: &str) -> PathBuf {
        let file = format!("{name}.csv");
        match &self.data_dir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }

    /// Open a database session from the configured connection parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured sslmode requires TLS (unsupported
    /// transport) or the connection attempt fails.
    pub fn connect(&self) -> Result<Client> {
        if let Some(mode) = &self.sslmode
            && matches!(mode.as_str(), "require" | "verify-ca" | "verify-full")
        {
            bail!("sslmode '{mode}' requires TLS, which this build does not support");
        }

        let client = postgres::Config::new()
            .host(&self.host)
            .port(self.port)
            .dbname(&self.database)
            .user(&self.user)
            .password(&self.password)
            .connect(NoTls)
            .with_context(|| {
                format!(
                    "failed to connect to database '{}' on {}:{}",
                    self.database, self.host, self.port
                )
            })?;

        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        let mut file = File::create(&path).unwrap();
        write!(file, "{content}").unwrap();
        path
    }

    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "host": "db.example.com",
                "port": 5433,
                "database": "gis",
                "user": "loader",
                "password": "secret",
                "schema": "carto",
                "if_exists": "fail",
                "table_list": ["roads", "rivers"],
                "data_dir": "/tmp/datasets"
            }"#,
        );

        let config = BatchConfig::load(&path).unwrap();
        assert_eq!(config.port, 5433);
        assert_eq!(config.policy().unwrap(), CollisionPolicy::Fail);
        assert_eq!(config.table_list, vec!["roads", "rivers"]);
        assert_eq!(
            config.dataset_path("roads"),
            PathBuf::from("/tmp/datasets/roads.csv")
        );
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "host": "localhost",
                "database": "gis",
                "user": "loader",
                "password": "secret",
                "schema": "public",
                "table_list": []
            }"#,
        );

        let config = BatchConfig::load(&path).unwrap();
        assert_eq!(config.port, 5432);
        assert_eq!(config.policy().unwrap(), CollisionPolicy::Replace);
        assert_eq!(config.dataset_path("roads"), PathBuf::from("roads.csv"));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "host": "localhost",
                "database": "gis",
                "user": "loader",
                "password": "secret",
                "schema": "public",
                "if_exists": "append",
                "table_list": []
            }"#,
        );

        let config = BatchConfig::load(&path).unwrap();
        assert!(config.policy().is_err());
    }

    #[test]
    fn test_tls_sslmode_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{
                "host": "localhost",
                "database": "gis",
                "user": "loader",
                "password": "secret",
                "sslmode": "require",
                "schema": "public",
                "table_list": []
            }"#,
        );

        let config = BatchConfig::load(&path).unwrap();
        let result = config.connect();
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("requires TLS"));
    }

    #[test]
    fn test_malformed_config_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "not json");
        assert!(BatchConfig::load(&path).is_err());
    }
}
