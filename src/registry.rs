use serde::{Deserialize, Serialize};

/// A wakeable machine as configured by the operator.
///
/// `mac_address` and `gateway_ip` are kept as the configured strings and
/// only parsed on the dispatch path, so a typo in one entry does not stop
/// the rest of the registry from loading.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub name: String,
    pub pretty_name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub mac_address: String,
    pub gateway_ip: String,
}

fn default_active() -> bool {
    true
}

/// Public projection of a [`ServerRecord`].
///
/// MAC address and gateway never leave the dispatch path; the listing API
/// only ever sees this type.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSummary {
    pub name: String,
    pub pretty_name: String,
    pub is_active: bool,
}

/// Read-only set of wakeable targets, populated once at startup.
pub struct ServerRegistry {
    servers: Vec<ServerRecord>,
}

impl ServerRegistry {
    pub fn new(servers: Vec<ServerRecord>) -> Self {
        ServerRegistry { servers }
    }

    /// Every configured server, in configuration order, projected to its
    /// public summary. Clones each record's public fields into a fresh
    /// Vec on every call.
    pub fn list(&self) -> Vec<ServerSummary> {
        self.servers
            .iter()
            .map(|s| ServerSummary {
                name: s.name.clone(),
                pretty_name: s.pretty_name.clone(),
                is_active: s.is_active,
            })
            .collect()
    }

    /// Case-insensitive exact lookup by name. First match wins if the
    /// configuration holds duplicates.
    pub fn find(&self, name: &str) -> Option<&ServerRecord> {
        self.servers
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::*;

    fn record(name: &str, active: bool) -> ServerRecord {
        ServerRecord {
            name: name.to_string(),
            pretty_name: format!("The {}", name),
            is_active: active,
            mac_address: "AA:BB:CC:DD:EE:FF".to_string(),
            gateway_ip: "192.168.1.255".to_string(),
        }
    }

    #[test]
    fn find_is_case_insensitive() {
        let registry = ServerRegistry::new(vec![record("web-server", true)]);
        assert!(registry.find("Web-Server").is_some());
        assert!(registry.find("WEB-SERVER").is_some());
        assert!(registry.find("web-serve").is_none());
    }

    #[test]
    fn find_returns_first_match_for_duplicates() {
        let registry = ServerRegistry::new(vec![record("nas", false), record("NAS", true)]);
        let found = registry.find("nas").unwrap();
        assert_eq!(found.name, "nas");
        assert!(!found.is_active);
    }

    #[test]
    fn list_preserves_configured_order() {
        let registry = ServerRegistry::new(vec![record("b", true), record("a", false)]);
        let names: Vec<String> = registry.list().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn summaries_never_expose_mac_or_gateway() {
        let registry = ServerRegistry::new(vec![record("nas", true)]);
        let json = serde_json::to_value(registry.list()).unwrap();
        let entry = &json[0];
        assert_eq!(entry["name"], "nas");
        assert_eq!(entry["prettyName"], "The nas");
        assert_eq!(entry["isActive"], true);
        assert!(entry.get("macAddress").is_none());
        assert!(entry.get("gatewayIp").is_none());
        assert_eq!(entry.as_object().unwrap().len(), 3);
    }
}
