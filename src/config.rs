use crate::registry::ServerRecord;
use log::warn;
use serde::Deserialize;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    servers: Vec<ServerRecord>,
}

/// Read the server list from a JSON config file. Called once at startup;
/// the resulting records seed the read-only registry.
///
/// Duplicate names (case-insensitive) are a configuration defect. Lookups
/// take the first match, so later duplicates are unreachable; warn about
/// them here rather than failing the whole load.
pub fn load_servers(path: &Path) -> Result<Vec<ServerRecord>, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: ConfigFile = serde_json::from_str(&contents)?;
    for (i, server) in config.servers.iter().enumerate() {
        if config.servers[..i]
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(&server.name))
        {
            warn!("duplicate server name in config: {}", server.name);
        }
    }
    Ok(config.servers)
}
