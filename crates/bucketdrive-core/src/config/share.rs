//! Shared link configuration.

use serde::{Deserialize, Serialize};

/// Settings for public shared links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Public origin used to assemble `{origin}/share/{token}` URLs.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
        }
    }
}

impl ShareConfig {
    /// Builds the public URL for a share token.
    pub fn share_url(&self, token: &str) -> String {
        format!("{}/share/{token}", self.public_base_url.trim_end_matches('/'))
    }
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}
