use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::commands::QueryFormat;
use crate::error::{ReportError, Result};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
    #[serde(default)]
    pub query: Option<QueryConfig>,
    #[serde(default)]
    pub summary: Option<SummaryConfig>,
    #[serde(default)]
    pub serve: Option<ServeConfig>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FetchConfig {
    pub base: Option<String>,
    pub partition: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub compact: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryConfig {
    pub format: Option<QueryFormat>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SummaryConfig {
    pub name: Option<String>,
    pub output: Option<PathBuf>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServeConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedConfig {
    pub fetch: ResolvedFetchConfig,
    pub query: ResolvedQueryConfig,
    pub summary: ResolvedSummaryConfig,
    pub serve: ResolvedServeConfig,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedFetchConfig {
    pub base: String,
    pub partition: Option<u32>,
    pub timeout_secs: u64,
    pub compact: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedQueryConfig {
    pub format: QueryFormat,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedSummaryConfig {
    pub name: String,
    pub output: Option<PathBuf>,
    pub title: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedServeConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            fetch: ResolvedFetchConfig::default(),
            query: ResolvedQueryConfig::default(),
            summary: ResolvedSummaryConfig::default(),
            serve: ResolvedServeConfig::default(),
        }
    }
}

impl Default for ResolvedFetchConfig {
    fn default() -> Self {
        Self {
            base: ".".to_string(),
            partition: None,
            timeout_secs: 30,
            compact: false,
        }
    }
}

impl Default for ResolvedQueryConfig {
    fn default() -> Self {
        Self {
            format: QueryFormat::Table,
        }
    }
}

impl Default for ResolvedSummaryConfig {
    fn default() -> Self {
        Self {
            name: "index".to_string(),
            output: None,
            title: "Test results".to_string(),
        }
    }
}

impl Default for ResolvedServeConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ResolvedConfig {
    pub fn from_config(config: &Config) -> Self {
        let mut resolved = Self::default();
        if let Some(cfg) = &config.fetch {
            resolved.fetch.apply(cfg);
        }
        if let Some(cfg) = &config.query {
            resolved.query.apply(cfg);
        }
        if let Some(cfg) = &config.summary {
            resolved.summary.apply(cfg);
        }
        if let Some(cfg) = &config.serve {
            resolved.serve.apply(cfg);
        }
        resolved
    }
}

impl ResolvedFetchConfig {
    fn apply(&mut self, cfg: &FetchConfig) {
        if let Some(value) = cfg.base.clone() {
            self.base = value;
        }
        if let Some(value) = cfg.partition {
            self.partition = Some(value);
        }
        if let Some(value) = cfg.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = cfg.compact {
            self.compact = value;
        }
    }
}

impl ResolvedQueryConfig {
    fn apply(&mut self, cfg: &QueryConfig) {
        if let Some(value) = cfg.format {
            self.format = value;
        }
    }
}

impl ResolvedSummaryConfig {
    fn apply(&mut self, cfg: &SummaryConfig) {
        if let Some(value) = cfg.name.clone() {
            self.name = value;
        }
        if let Some(value) = cfg.output.clone() {
            self.output = Some(value);
        }
        if let Some(value) = cfg.title.clone() {
            self.title = value;
        }
    }
}

impl ResolvedServeConfig {
    fn apply(&mut self, cfg: &ServeConfig) {
        if let Some(value) = cfg.bind.clone() {
            self.bind = value;
        }
        if let Some(value) = cfg.port {
            self.port = value;
        }
    }
}

pub fn load_config() -> Result<Config> {
    let mut config = Config::default();
    let paths = config_search_paths()?;
    for path in paths {
        if !path.exists() {
            continue;
        }
        let contents = fs::read_to_string(&path)?;
        let parsed = parse_config(&contents).map_err(|err| {
            ReportError::InvalidArgs(format!(
                "Failed to parse config {}: {}",
                path.display(),
                err
            ))
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        merge_config(&mut config, parsed);
    }
    Ok(config)
}

fn parse_config(contents: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(contents)
}

fn merge_config(base: &mut Config, other: Config) {
    merge_section(&mut base.fetch, other.fetch, FetchConfig::merge);
    merge_section(&mut base.query, other.query, QueryConfig::merge);
    merge_section(&mut base.summary, other.summary, SummaryConfig::merge);
    merge_section(&mut base.serve, other.serve, ServeConfig::merge);
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
    if let Some(other_section) = other {
        match base {
            Some(existing) => merge(existing, other_section),
            None => *base = Some(other_section),
        }
    }
}

impl FetchConfig {
    fn merge(&mut self, other: FetchConfig) {
        merge_opt(&mut self.base, other.base);
        merge_opt(&mut self.partition, other.partition);
        merge_opt(&mut self.timeout_secs, other.timeout_secs);
        merge_opt(&mut self.compact, other.compact);
    }
}

impl QueryConfig {
    fn merge(&mut self, other: QueryConfig) {
        merge_opt(&mut self.format, other.format);
    }
}

impl SummaryConfig {
    fn merge(&mut self, other: SummaryConfig) {
        merge_opt(&mut self.name, other.name);
        merge_opt(&mut self.output, other.output);
        merge_opt(&mut self.title, other.title);
    }
}

impl ServeConfig {
    fn merge(&mut self, other: ServeConfig) {
        merge_opt(&mut self.bind, other.bind);
        merge_opt(&mut self.port, other.port);
    }
}

fn merge_opt<T>(base: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *base = other;
    }
}

fn config_search_paths() -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    if let Some(home) = home_dir() {
        if let Some(config_home) = config_home_dir(&home) {
            paths.push(config_home.join("resultview").join("resultview.toml"));
        }
        if let Some(appdata) = env::var_os("APPDATA") {
            paths.push(PathBuf::from(appdata).join("resultview").join("resultview.toml"));
        }
        paths.push(home.join(".resultviewrc"));
    }

    if let Ok(cwd) = env::current_dir() {
        let mut dirs = Vec::new();
        let mut current: Option<&Path> = Some(cwd.as_path());
        while let Some(dir) = current {
            dirs.push(dir.to_path_buf());
            current = dir.parent();
        }
        dirs.reverse();
        for dir in dirs {
            paths.push(dir.join(".resultviewrc"));
            paths.push(dir.join("resultview.toml"));
        }
    }

    Ok(paths)
}

fn config_home_dir(home: &Path) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg));
    }
    Some(home.join(".config"))
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
}

pub fn render_config(config: &ResolvedConfig) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|err| ReportError::InvalidArgs(format!("Failed to render config: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_files_override_earlier_fields() {
        let mut config = parse_config(
            r#"
            [fetch]
            base = "http://ci.example.com/report/"
            timeout_secs = 5

            [serve]
            port = 9000
            "#,
        )
        .unwrap();
        let local = parse_config(
            r#"
            [fetch]
            partition = 3
            timeout_secs = 10
            "#,
        )
        .unwrap();
        merge_config(&mut config, local);

        let resolved = ResolvedConfig::from_config(&config);
        assert_eq!(resolved.fetch.base, "http://ci.example.com/report/");
        assert_eq!(resolved.fetch.partition, Some(3));
        assert_eq!(resolved.fetch.timeout_secs, 10);
        assert_eq!(resolved.serve.port, 9000);
        assert_eq!(resolved.serve.bind, "127.0.0.1");
    }

    #[test]
    fn defaults_render_as_toml() {
        let rendered = render_config(&ResolvedConfig::default()).unwrap();
        assert!(rendered.contains("[fetch]"));
        assert!(rendered.contains("name = \"index\""));
        assert!(rendered.contains("format = \"table\""));
    }

    #[test]
    fn rejects_unknown_query_format() {
        assert!(parse_config("[query]\nformat = \"xml\"\n").is_err());
    }
}
