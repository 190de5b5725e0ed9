// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use jobdash_client::DEFAULT_APPLICATIONS_PATH;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "jobdash";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT: &str = "10s";
const CONFIG_PATH_ENV: &str = "JOBDASH_CONFIG_PATH";
const SESSION_COOKIE_ENV: &str = "JOBDASH_SESSION_COOKIE";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            export: Export::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    pub applications_path: Option<String>,
    pub timeout: Option<String>,
    pub session_cookie: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            applications_path: Some(DEFAULT_APPLICATIONS_PATH.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
            session_cookie: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Export {
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [server], [export], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.server.base_url
            && base_url.trim().is_empty()
        {
            bail!("server.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.server.timeout {
            let parsed = parse_duration(timeout)
                .with_context(|| format!("server.timeout in {}", path.display()))?;
            if parsed.is_zero() {
                bail!(
                    "server.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(directory) = &self.export.directory
            && directory.trim().is_empty()
        {
            bail!("export.directory in {} must not be empty", path.display());
        }

        if let Some(file) = &self.log.file
            && file.trim().is_empty()
        {
            bail!("log.file in {} must not be empty", path.display());
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.server
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn applications_path(&self) -> &str {
        self.server
            .applications_path
            .as_deref()
            .unwrap_or(DEFAULT_APPLICATIONS_PATH)
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.server.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// Config value first, then `JOBDASH_SESSION_COOKIE`.
    pub fn session_cookie(&self) -> Option<String> {
        self.server
            .session_cookie
            .clone()
            .or_else(|| env::var(SESSION_COOKIE_ENV).ok())
            .filter(|cookie| !cookie.trim().is_empty())
    }

    pub fn export_dir(&self) -> Result<PathBuf> {
        if let Some(directory) = &self.export.directory {
            return Ok(PathBuf::from(directory));
        }
        if let Some(downloads) = dirs::download_dir() {
            return Ok(downloads);
        }
        Ok(data_dir()?.join("exports"))
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(file) => Ok(PathBuf::from(file)),
            None => Ok(data_dir()?.join(format!("{APP_NAME}.log"))),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# jobdash config\n# Place this file at: {}\n\nversion = 1\n\n[server]\nbase_url = \"{}\"\napplications_path = \"{}\"\ntimeout = \"{}\"\n# Sent as the Cookie header. {} is read when this is unset.\n# session_cookie = \"JSESSIONID=...\"\n\n[export]\n# Optional. Default is the platform downloads directory.\n# directory = \"/absolute/path/to/exports\"\n\n[log]\n# Optional. Default is the platform data dir (for example ~/.local/share/jobdash/jobdash.log)\n# file = \"/absolute/path/to/jobdash.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_APPLICATIONS_PATH,
            DEFAULT_TIMEOUT,
            SESSION_COOKIE_ENV,
        )
    }
}

fn data_dir() -> Result<PathBuf> {
    let root = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("cannot resolve local data directory; set [log].file and [export].directory"))?;
    Ok(root.join(APP_NAME))
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
