// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Server configuration: a YAML file overlaid with `MAS_`-prefixed
//! environment variables, loaded through `figment` the same way the rest
//! of this workspace's `mas-cli` loads every other config section.

use std::time::Duration;

use camino::Utf8PathBuf;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

fn default_session_ttl() -> i64 {
    14 * 24 * 3600
}

fn default_code_ttl() -> i64 {
    60
}

fn default_par_ttl() -> i64 {
    60
}

fn default_challenge_ttl() -> i64 {
    600
}

fn default_https_request_uri_timeout_ms() -> u64 {
    2_000
}

fn default_https_request_uri_max_bytes() -> usize {
    16 * 1024
}

/// RFC 9101 `request_uri` fetching policy: disabled unless explicitly
/// turned on, and even then bounded by a timeout, a size limit, and a
/// host allowlist so the authorization endpoint can't be used as an SSRF
/// proxy against a client-supplied URL.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HttpsRequestUriConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub allowed_hosts: Vec<String>,

    #[serde(default = "default_https_request_uri_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_https_request_uri_max_bytes")]
    pub max_bytes: usize,
}

impl Default for HttpsRequestUriConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_hosts: Vec::new(),
            timeout_ms: default_https_request_uri_timeout_ms(),
            max_bytes: default_https_request_uri_max_bytes(),
        }
    }
}

impl HttpsRequestUriConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn allows_host(&self, host: &str) -> bool {
        self.enabled && self.allowed_hosts.iter().any(|h| h == host)
    }
}

/// The authorization endpoint's tunable policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuthorizationEndpointConfig {
    /// The `iss` this server identifies itself as, both in `.well-known`
    /// metadata and in the `iss` authorization response parameter
    /// (RFC 9207).
    pub issuer_url: Url,

    /// Where the login/consent UI lives; challenges redirect here.
    pub ui_url: Url,

    /// Accept a plain-HTTP `redirect_uri` for non-loopback clients. Only
    /// ever meant for local development.
    #[serde(default)]
    pub allow_http_redirect: bool,

    /// Accept `alg=none` on an unsigned JAR request object.
    #[serde(default)]
    pub allow_none_algorithm: bool,

    /// Reject any `/authorize` call whose parameters did not arrive via a
    /// prior PAR push.
    #[serde(default)]
    pub require_par: bool,

    /// Allow clients registered with `token_endpoint_auth_method: none`
    /// to use the authorization code flow (PKCE is still mandatory for
    /// them regardless of this flag).
    #[serde(default = "default_true")]
    pub allow_public_clients: bool,

    #[serde(default)]
    pub https_request_uri: HttpsRequestUriConfig,

    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: i64,

    #[serde(default = "default_code_ttl")]
    pub code_ttl_seconds: i64,

    #[serde(default = "default_par_ttl")]
    pub par_ttl_seconds: i64,

    #[serde(default = "default_challenge_ttl")]
    pub challenge_ttl_seconds: i64,
}

fn default_true() -> bool {
    true
}

impl AuthorizationEndpointConfig {
    #[must_use]
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_seconds)
    }

    #[must_use]
    pub fn code_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.code_ttl_seconds)
    }

    #[must_use]
    pub fn par_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.par_ttl_seconds)
    }

    #[must_use]
    pub fn challenge_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.challenge_ttl_seconds)
    }
}

/// Where the server listens.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HttpConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    8080
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    pub http: HttpConfig,
    pub authorization_endpoint: AuthorizationEndpointConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

impl Config {
    /// Load from an optional YAML file, overlaid by `MAS_`-prefixed
    /// environment variables (e.g. `MAS_AUTHORIZATION_ENDPOINT__REQUIRE_PAR=true`).
    pub fn load(path: Option<&Utf8PathBuf>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path.as_str()));
        }
        figment = figment.merge(Env::prefixed("MAS_").split("__"));
        Ok(figment.extract()?)
    }

    #[cfg(any(test, feature = "test-utils"))]
    #[must_use]
    pub fn test_default() -> Self {
        Self {
            http: HttpConfig::default(),
            authorization_endpoint: AuthorizationEndpointConfig {
                issuer_url: "https://auth.example.com".parse().unwrap(),
                ui_url: "https://auth.example.com/ui".parse().unwrap(),
                allow_http_redirect: false,
                allow_none_algorithm: false,
                require_par: false,
                allow_public_clients: true,
                https_request_uri: HttpsRequestUriConfig::default(),
                session_ttl_seconds: default_session_ttl(),
                code_ttl_seconds: default_code_ttl(),
                par_ttl_seconds: default_par_ttl(),
                challenge_ttl_seconds: default_challenge_ttl(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let config = Config::test_default();
        assert!(!config.authorization_endpoint.allow_http_redirect);
        assert!(!config.authorization_endpoint.allow_none_algorithm);
        assert!(!config.authorization_endpoint.https_request_uri.enabled);
    }

    #[test]
    fn env_overlay_overrides_file_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "mas-config.yaml",
                "http:\n  port: 8080\nauthorization_endpoint:\n  issuer_url: https://auth.example.com\n  ui_url: https://auth.example.com/ui\n",
            )?;
            jail.set_env("MAS_AUTHORIZATION_ENDPOINT__REQUIRE_PAR", "true");

            let config = Config::load(Some(&Utf8PathBuf::from("mas-config.yaml"))).unwrap();
            assert!(config.authorization_endpoint.require_par);
            Ok(())
        });
    }
}
