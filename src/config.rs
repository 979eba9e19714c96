use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::{GenerateArgs, OutputFormat};
use crate::license::cascade::{IgnoreSet, ResolveOptions};

/// Root configuration structure, deserialized from `.license-gen/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for `generate`; command-line values take precedence.
    pub generate: GenerateDefaults,
    pub network: NetworkConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GenerateDefaults {
    pub cache_file: Option<PathBuf>,
    pub ignore: Vec<String>,
    pub formats: Vec<OutputFormat>,
    pub output_name: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub production: bool,
    pub links: bool,
    pub readme: bool,
    pub readme_parse: bool,
    pub download: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Upper bound for every HTTP request, in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: format!("license-gen/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.license-gen/config.toml`
/// 3. `~/.config/license-gen/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-gen").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("license-gen").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    tracing::debug!(path = %path.display(), "loading config");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}

/// Fully merged settings for one `generate` run.
#[derive(Debug)]
pub struct GenerateSettings {
    pub cache_file: Option<PathBuf>,
    pub ignore: IgnoreSet,
    pub formats: Vec<OutputFormat>,
    pub output_name: String,
    pub out_dir: PathBuf,
    pub production: bool,
    pub links: bool,
    pub options: ResolveOptions,
}

impl GenerateSettings {
    /// Command-line values win; boolean flags are OR-ed with the config.
    pub fn merge(args: &GenerateArgs, config: &Config) -> Self {
        let defaults = &config.generate;

        let ignore = match args.ignore.as_deref() {
            Some(list) => IgnoreSet::parse(list),
            None => IgnoreSet::from_names(&defaults.ignore),
        };

        let formats = if !args.formats.is_empty() {
            args.formats.clone()
        } else if !defaults.formats.is_empty() {
            defaults.formats.clone()
        } else {
            vec![OutputFormat::Text, OutputFormat::Json]
        };

        Self {
            cache_file: args.cache_file.clone().or_else(|| defaults.cache_file.clone()),
            ignore,
            formats,
            output_name: args
                .name
                .clone()
                .or_else(|| defaults.output_name.clone())
                .unwrap_or_else(|| "output".to_string()),
            out_dir: args
                .out_dir
                .clone()
                .or_else(|| defaults.out_dir.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            production: args.production || defaults.production,
            links: args.links || defaults.links,
            options: ResolveOptions {
                use_readme: args.readme || defaults.readme,
                parse_readme: args.readme_parse || defaults.readme_parse,
                attempt_download: args.download || defaults.download,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["license-gen", "generate"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Command::Generate(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
[generate]
ignore = ["internal-a", "internal-b"]
formats = ["json", "html"]
readme_parse = true

[network]
timeout_secs = 3
"#,
        )
        .unwrap();
        assert_eq!(config.generate.ignore.len(), 2);
        assert_eq!(config.generate.formats, vec![OutputFormat::Json, OutputFormat::Html]);
        assert_eq!(config.network.timeout(), Duration::from_secs(3));
        assert!(config.network.user_agent.starts_with("license-gen/"));
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = GenerateSettings::merge(&generate_args(&[]), &Config::default());
        assert_eq!(settings.formats, vec![OutputFormat::Text, OutputFormat::Json]);
        assert_eq!(settings.output_name, "output");
        assert!(!settings.options.use_readme && !settings.links);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config: Config = toml::from_str(
            "[generate]\nignore = [\"from-config\"]\noutput_name = \"cfg\"\ndownload = true\n",
        )
        .unwrap();

        let settings = GenerateSettings::merge(&generate_args(&["--ignore", "cli"]), &config);
        assert!(settings.ignore.contains("cli"));
        assert!(!settings.ignore.contains("from-config"));
        assert_eq!(settings.output_name, "cfg");
        assert!(settings.options.attempt_download);

        let settings = GenerateSettings::merge(&generate_args(&[]), &config);
        assert!(settings.ignore.contains("from-config"));
    }

    #[test]
    fn test_load_config_override_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join(".license-gen");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("config.toml"), "[generate]\nlinks = true\n").unwrap();
        assert!(load_config(dir.path(), None).unwrap().generate.links);

        let other = dir.path().join("other.toml");
        std::fs::write(&other, "[generate]\nreadme = true\n").unwrap();
        let config = load_config(dir.path(), Some(&other)).unwrap();
        assert!(config.generate.readme && !config.generate.links);

        std::fs::write(&other, "not = [valid").unwrap();
        assert!(load_config(dir.path(), Some(&other)).is_err());
    }
}
