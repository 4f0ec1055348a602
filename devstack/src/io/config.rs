//! Launcher configuration stored in `devstack.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::container::{ContainerSpec, EnvVar, PortBinding};

pub const DEFAULT_CONFIG_FILE: &str = "devstack.toml";

/// Launcher configuration (TOML).
///
/// Every field is optional in the file; missing fields take the values the
/// local development setup has always used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DevstackConfig {
    /// Wait for Enter before exiting.
    pub pause: bool,

    pub container: ContainerConfig,

    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContainerConfig {
    /// Container runtime CLI (e.g. `docker`).
    pub runtime: String,

    pub name: String,

    pub image: String,

    pub tag: String,

    /// Base URL printed after a successful start. Never requested.
    pub url: String,

    /// Kill a runtime command after this many seconds. Unset waits forever.
    pub command_timeout_secs: Option<u64>,

    pub ports: Vec<PortBinding>,

    pub env: Vec<EnvVar>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            name: "opensearch".to_string(),
            image: "opensearchproject/opensearch".to_string(),
            tag: "latest".to_string(),
            url: "http://localhost:9200".to_string(),
            command_timeout_secs: None,
            ports: vec![PortBinding::same(9200), PortBinding::same(9600)],
            env: vec![
                EnvVar::new("discovery.type", "single-node"),
                EnvVar::new("OPENSEARCH_JAVA_OPTS", "-Xms512m -Xmx512m"),
            ],
        }
    }
}

impl ContainerConfig {
    pub fn spec(&self) -> ContainerSpec {
        ContainerSpec {
            name: self.name.clone(),
            image: self.image.clone(),
            tag: self.tag.clone(),
            ports: self.ports.clone(),
            env: self.env.clone(),
        }
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }

    fn validate(&self) -> Result<()> {
        non_empty("container.runtime", &self.runtime)?;
        non_empty("container.name", &self.name)?;
        non_empty("container.image", &self.image)?;
        non_empty("container.tag", &self.tag)?;
        http_url("container.url", &self.url)?;
        if self.command_timeout_secs == Some(0) {
            return Err(anyhow!("container.command_timeout_secs must be > 0"));
        }
        for port in &self.ports {
            if port.host == 0 || port.container == 0 {
                return Err(anyhow!("container.ports must not contain port 0 ({port})"));
            }
        }
        for var in &self.env {
            if var.key.trim().is_empty() || var.key.contains('=') {
                return Err(anyhow!(
                    "container.env key '{}' must be non-empty and must not contain '='",
                    var.key
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Virtual environment directory, relative to the working directory.
    pub venv_dir: PathBuf,

    /// Interpreter to run (looked up on the activated `PATH`).
    pub python: String,

    /// Entry-point script, relative to the working directory.
    pub entry_point: String,

    /// Extra arguments after the entry point.
    pub args: Vec<String>,

    /// Base URL printed before the server starts. Never requested.
    pub url: String,

    /// Environment variable echoed before the server starts.
    pub env_var: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            venv_dir: PathBuf::from("venv"),
            python: "python".to_string(),
            entry_point: "main.py".to_string(),
            args: Vec::new(),
            url: "http://localhost:8000".to_string(),
            env_var: "VIRTUAL_ENV".to_string(),
        }
    }
}

impl ServerConfig {
    /// Interpreter arguments: entry point first, then extras.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![self.entry_point.clone()];
        args.extend(self.args.iter().cloned());
        args
    }

    fn validate(&self) -> Result<()> {
        if self.venv_dir.as_os_str().is_empty() {
            return Err(anyhow!("server.venv_dir must be non-empty"));
        }
        non_empty("server.python", &self.python)?;
        non_empty("server.entry_point", &self.entry_point)?;
        non_empty("server.env_var", &self.env_var)?;
        http_url("server.url", &self.url)?;
        Ok(())
    }
}

impl Default for DevstackConfig {
    fn default() -> Self {
        Self {
            pause: true,
            container: ContainerConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl DevstackConfig {
    pub fn validate(&self) -> Result<()> {
        self.container.validate()?;
        self.server.validate()?;
        Ok(())
    }
}

fn non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("{field} must be non-empty"));
    }
    Ok(())
}

fn http_url(field: &str, value: &str) -> Result<()> {
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(anyhow!("{field} must start with http:// or https:// (got '{value}')"));
    }
    Ok(())
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `DevstackConfig::default()`.
pub fn load_config(path: &Path) -> Result<DevstackConfig> {
    if !path.exists() {
        let cfg = DevstackConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: DevstackConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}

/// Serialize config as the TOML `init` writes and `config` prints.
pub fn render_config(cfg: &DevstackConfig) -> Result<String> {
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    if !buf.ends_with('\n') {
        buf.push('\n');
    }
    Ok(buf)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &DevstackConfig) -> Result<()> {
    cfg.validate()?;
    let buf = render_config(cfg)?;
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, DevstackConfig::default());
    }

    #[test]
    fn defaults_match_local_setup() {
        let cfg = DevstackConfig::default();
        assert!(cfg.pause);
        assert_eq!(
            cfg.container.spec().run_args(),
            vec![
                "run",
                "-d",
                "--name",
                "opensearch",
                "-p",
                "9200:9200",
                "-p",
                "9600:9600",
                "-e",
                "discovery.type=single-node",
                "-e",
                "OPENSEARCH_JAVA_OPTS=-Xms512m -Xmx512m",
                "opensearchproject/opensearch:latest",
            ]
        );
        assert_eq!(cfg.container.command_timeout(), None);
        assert_eq!(cfg.server.command_args(), vec!["main.py"]);
        assert_eq!(cfg.server.env_var, "VIRTUAL_ENV");
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("devstack.toml");
        let mut cfg = DevstackConfig::default();
        cfg.container.command_timeout_secs = Some(120);
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("devstack.toml");
        fs::write(
            &path,
            "pause = false\n\n[container]\nruntime = \"podman\"\n\n[server]\nargs = [\"--reload\"]\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert!(!cfg.pause);
        assert_eq!(cfg.container.runtime, "podman");
        assert_eq!(cfg.container.name, "opensearch");
        assert_eq!(cfg.container.ports.len(), 2);
        assert_eq!(cfg.server.command_args(), vec!["main.py", "--reload"]);
    }

    #[test]
    fn rejects_invalid_values() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("devstack.toml");
        fs::write(&path, "[container]\ncommand_timeout_secs = 0\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("command_timeout_secs must be > 0"));

        fs::write(&path, "[server]\nurl = \"localhost:8000\"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("server.url must start with http://"));

        fs::write(&path, "[[container.env]]\nkey = \"A=B\"\nvalue = \"c\"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("must not contain '='"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("devstack.toml");
        fs::write(&path, "pause = \"sometimes\"\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parse"));
    }
}
