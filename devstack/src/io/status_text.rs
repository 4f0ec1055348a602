//! Operator-facing status text rendered from embedded templates.

use anyhow::{Context, Result};
use minijinja::Environment;
use serde::Serialize;

use crate::core::container::ContainerSpec;
use crate::io::config::{ContainerConfig, ServerConfig};

const CONTAINER_CLEANUP: &str = include_str!("../templates/container_cleanup.txt");
const CONTAINER_START: &str = include_str!("../templates/container_start.txt");
const CONTAINER_SUCCESS: &str = include_str!("../templates/container_success.txt");
const CONTAINER_FAILURE: &str = include_str!("../templates/container_failure.txt");
const SERVER_BANNER: &str = include_str!("../templates/server_banner.txt");

/// Command suggested after OpenSearch is up.
pub const NEXT_COMMAND: &str = "devstack serve";

/// Values shown around a container restart.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerContext {
    pub runtime: String,
    pub name: String,
    pub image: String,
    pub ports: Vec<u16>,
    pub url: String,
    pub health_url: String,
    pub next_command: String,
}

impl ContainerContext {
    pub fn new(config: &ContainerConfig, spec: &ContainerSpec) -> Self {
        let url = config.url.trim_end_matches('/').to_string();
        Self {
            runtime: config.runtime.clone(),
            name: spec.name.clone(),
            image: spec.image_ref(),
            ports: spec.host_ports(),
            health_url: format!("{url}/_cluster/health"),
            url,
            next_command: NEXT_COMMAND.to_string(),
        }
    }
}

/// URLs shown before the API server starts.
#[derive(Debug, Clone, Serialize)]
pub struct ServerContext {
    pub url: String,
    pub docs_url: String,
    pub redoc_url: String,
}

impl ServerContext {
    pub fn new(config: &ServerConfig) -> Self {
        let url = config.url.trim_end_matches('/').to_string();
        Self {
            docs_url: format!("{url}/docs"),
            redoc_url: format!("{url}/redoc"),
            url,
        }
    }
}

/// Template engine wrapper around minijinja.
pub struct StatusText {
    env: Environment<'static>,
}

impl StatusText {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in [
            ("container_cleanup", CONTAINER_CLEANUP),
            ("container_start", CONTAINER_START),
            ("container_success", CONTAINER_SUCCESS),
            ("container_failure", CONTAINER_FAILURE),
            ("server_banner", SERVER_BANNER),
        ] {
            env.add_template(name, source)
                .with_context(|| format!("load template {name}"))?;
        }
        Ok(Self { env })
    }

    pub fn container_cleanup(&self, ctx: &ContainerContext) -> Result<String> {
        self.render("container_cleanup", ctx)
    }

    pub fn container_start(&self, ctx: &ContainerContext) -> Result<String> {
        self.render("container_start", ctx)
    }

    pub fn container_success(&self, ctx: &ContainerContext) -> Result<String> {
        self.render("container_success", ctx)
    }

    pub fn container_failure(&self, ctx: &ContainerContext) -> Result<String> {
        self.render("container_failure", ctx)
    }

    pub fn server_banner(&self, ctx: &ServerContext) -> Result<String> {
        self.render("server_banner", ctx)
    }

    fn render<S: Serialize>(&self, name: &str, ctx: &S) -> Result<String> {
        let template = self.env.get_template(name)?;
        template
            .render(ctx)
            .with_context(|| format!("render {name}"))
    }
}
