use anyhow::Result;
use clap::Parser;
use serde_derive::Deserialize;

#[derive(Debug, Parser)]
#[command(name = "lodemq", version, about = "Memcache protocol compatible message queue server")]
pub(crate) struct CliConfig {
    /// Path to the config file
    #[arg(short = 'c', long = "config", value_name = "FILE", default_value = "lodemq.toml")]
    pub(crate) config_file_path: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Config {
    pub(crate) network: Network,
    /// Queues to be declared at start.
    #[serde(default)]
    pub(crate) queues: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Network {
    pub(crate) listen: String,
    pub(crate) http_listen: String,
}

pub(crate) fn parse_config(path: &str) -> Result<Config> {
    let cfg = std::fs::read_to_string(path)?;

    from_str(&cfg)
}

fn from_str(cfg: &str) -> Result<Config> {
    let config: Config = toml::from_str(cfg)?;

    if let Some(name) = config.queues.iter().find(|q| q.is_empty() || q.contains(['/', ':'])) {
        anyhow::bail!("Invalid queue name {name:?}, it cannot be empty or contain '/' or ':'");
    }

    Ok(config)
}

pub(crate) fn cli() -> CliConfig {
    CliConfig::parse()
}
