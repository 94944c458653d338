use serde::{Deserialize, Serialize};
use crate::errors::RetryConfig;
use crate::models::Repository;

/// Contents of the optional YAML config file. Every field can also come from the CLI.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RemediatorConfig {
    pub repository: Option<Repository>,
    pub base_branch: Option<String>,
    /// Only remediate alerts in this package ecosystem.
    pub ecosystem: Option<String>,
    pub dry_run: Option<bool>,
    pub concurrency: Option<usize>,
    pub branch_prefix: Option<String>,
    /// REST API root, for GitHub Enterprise Server.
    pub api_url: Option<String>,
    /// Literal token or `$VAR` reference.
    pub token: Option<String>,
    pub retry: Option<RetryConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
