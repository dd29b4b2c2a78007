//! # Peer Directory
//!
//! Static mapping from jurisdiction code to the peer instance's base URL,
//! read from configuration as a comma-separated list of
//! `jurisdiction=baseURL` pairs. Malformed items are skipped with a
//! warning rather than failing the whole directory.

use std::collections::HashMap;

/// Jurisdiction → base URL directory for federation peers.
#[derive(Debug, Clone, Default)]
pub struct PeerDirectory {
    peers: HashMap<String, String>,
}

impl PeerDirectory {
    /// Parse a `jurisdiction=baseURL` CSV, lowercasing jurisdiction codes
    /// and stripping trailing slashes from base URLs.
    pub fn from_csv(raw: &str) -> Self {
        let mut peers = HashMap::new();
        for item in raw.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match item.split_once('=') {
                Some((jurisdiction, base)) if !jurisdiction.trim().is_empty() => {
                    peers.insert(
                        jurisdiction.trim().to_ascii_lowercase(),
                        base.trim().trim_end_matches('/').to_string(),
                    );
                }
                _ => {
                    tracing::warn!(item, "skipping malformed peer entry");
                }
            }
        }
        Self { peers }
    }

    /// The base URL for a jurisdiction's peer, if one is configured.
    pub fn base_url(&self, jurisdiction: &str) -> Option<&str> {
        self.peers
            .get(&jurisdiction.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Number of configured peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether no peers are configured.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_normalizes() {
        let dir = PeerDirectory::from_csv("NRW=https://nrw.example/, by=https://by.example");
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.base_url("nrw"), Some("https://nrw.example"));
        assert_eq!(dir.base_url("BY"), Some("https://by.example"));
        assert_eq!(dir.base_url("hh"), None);
    }

    #[test]
    fn skips_malformed_items() {
        let dir = PeerDirectory::from_csv("nrw=https://nrw.example,, broken , =https://x");
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.base_url("nrw"), Some("https://nrw.example"));
    }

    #[test]
    fn empty_input_yields_empty_directory() {
        assert!(PeerDirectory::from_csv("").is_empty());
    }
}
