//! Container definition and the runtime argv it renders to.
//!
//! Arguments are passed to the runtime without a shell, so an env value with
//! spaces (`OPENSEARCH_JAVA_OPTS=-Xms512m -Xmx512m`) stays a single argument.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A `-p host:container` port publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    pub host: u16,
    pub container: u16,
}

impl PortBinding {
    /// Publish `port` on the same host port.
    pub fn same(port: u16) -> Self {
        Self {
            host: port,
            container: port,
        }
    }
}

impl fmt::Display for PortBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.container)
    }
}

/// A `-e KEY=VALUE` environment variable for the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Everything needed to (re)create the named container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub tag: String,
    pub ports: Vec<PortBinding>,
    pub env: Vec<EnvVar>,
}

impl ContainerSpec {
    /// `image:tag` reference passed to `run`.
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    /// Host ports published by this container, in declaration order.
    pub fn host_ports(&self) -> Vec<u16> {
        self.ports.iter().map(|port| port.host).collect()
    }

    pub fn stop_args(&self) -> Vec<String> {
        vec!["stop".to_string(), self.name.clone()]
    }

    pub fn rm_args(&self) -> Vec<String> {
        vec!["rm".to_string(), self.name.clone()]
    }

    /// `run -d --name <name> -p .. -e .. <image>:<tag>`
    pub fn run_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];
        for port in &self.ports {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        for var in &self.env {
            args.push("-e".to_string());
            args.push(var.to_string());
        }
        args.push(self.image_ref());
        args
    }
}
