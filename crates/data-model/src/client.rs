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

//! A registered OAuth 2.0 / OIDC client and the metadata the authorization
//! endpoint checks a request against.

use mas_iana::jose::{JsonWebEncryptionAlg, JsonWebEncryptionEnc, JsonWebSignatureAlg};
use oauth2_types::response_type::ResponseTypeSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// How a client authenticates to the token endpoint. Kept here because it
/// decides whether PKCE is mandatory for this client at the authorization
/// endpoint too: `None` (public clients) can't hold a client secret, so a
/// code without PKCE is stealable in transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    None,
    ClientSecretBasic,
    ClientSecretPost,
    PrivateKeyJwt,
}

impl TokenEndpointAuthMethod {
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::None)
    }
}

/// JARM response signing/encryption the client has registered for, if any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationSigningPreferences {
    pub authorization_signed_response_alg: Option<JsonWebSignatureAlg>,
    pub authorization_encrypted_response_alg: Option<JsonWebEncryptionAlg>,
    pub authorization_encrypted_response_enc: Option<JsonWebEncryptionEnc>,
}

impl AuthorizationSigningPreferences {
    #[must_use]
    pub fn wants_jarm(&self) -> bool {
        self.authorization_signed_response_alg.is_some()
    }

    #[must_use]
    pub fn wants_encryption(&self) -> bool {
        self.authorization_encrypted_response_alg.is_some()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientMetadataError {
    #[error("client has no registered redirect_uris")]
    NoRedirectUris,

    #[error("redirect_uri must not carry a fragment")]
    RedirectUriHasFragment,

    #[error("encrypted authorization responses require authorization_encrypted_response_enc")]
    MissingJarmEnc,
}

/// The registered shape of a client, as the authorization endpoint needs
/// it. A full client registration carries more (logo, contacts, terms of
/// service URIs); this is the subset that gates `/authorize` behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub client_id: String,
    pub redirect_uris: Vec<Url>,
    pub response_types: Vec<ResponseTypeSet>,
    pub token_endpoint_auth_method: TokenEndpointAuthMethod,
    pub default_max_age: Option<i64>,
    pub require_auth_time: bool,
    pub require_pushed_authorization_requests: bool,
    pub request_object_signing_alg: Option<JsonWebSignatureAlg>,
    pub jwks: Option<jsonwebtoken::jwk::JwkSet>,
    #[serde(default)]
    pub jarm: AuthorizationSigningPreferences,
}

impl ClientMetadata {
    /// Sanity-check the metadata as it would be checked at registration
    /// time; the authorization endpoint trusts a stored client passed this
    /// once and doesn't re-run it per request.
    pub fn validate(&self) -> Result<(), ClientMetadataError> {
        if self.redirect_uris.is_empty() {
            return Err(ClientMetadataError::NoRedirectUris);
        }

        if self.redirect_uris.iter().any(|u| u.fragment().is_some()) {
            return Err(ClientMetadataError::RedirectUriHasFragment);
        }

        if self.jarm.wants_encryption() && self.jarm.authorization_encrypted_response_enc.is_none() {
            return Err(ClientMetadataError::MissingJarmEnc);
        }

        Ok(())
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.token_endpoint_auth_method.is_public()
    }

    #[must_use]
    pub fn allows_response_type(&self, requested: &ResponseTypeSet) -> bool {
        self.response_types.iter().any(|rt| rt == requested)
    }

    #[must_use]
    pub fn allows_redirect_uri(&self, candidate: &Url) -> bool {
        self.redirect_uris.iter().any(|registered| registered == candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_client() -> ClientMetadata {
        ClientMetadata {
            client_id: "client1".to_owned(),
            redirect_uris: vec![Url::parse("https://app.example/callback").unwrap()],
            response_types: vec!["code".parse().unwrap()],
            token_endpoint_auth_method: TokenEndpointAuthMethod::ClientSecretBasic,
            default_max_age: None,
            require_auth_time: false,
            require_pushed_authorization_requests: false,
            request_object_signing_alg: None,
            jwks: None,
            jarm: AuthorizationSigningPreferences::default(),
        }
    }

    #[test]
    fn rejects_client_with_no_redirect_uris() {
        let mut client = base_client();
        client.redirect_uris.clear();
        assert_eq!(client.validate(), Err(ClientMetadataError::NoRedirectUris));
    }

    #[test]
    fn rejects_fragment_in_redirect_uri() {
        let mut client = base_client();
        client.redirect_uris = vec![Url::parse("https://app.example/callback#frag").unwrap()];
        assert_eq!(client.validate(), Err(ClientMetadataError::RedirectUriHasFragment));
    }

    #[test]
    fn public_client_is_detected() {
        let mut client = base_client();
        client.token_endpoint_auth_method = TokenEndpointAuthMethod::None;
        assert!(client.is_public());
    }

    #[test]
    fn jarm_encryption_requires_enc() {
        let mut client = base_client();
        client.jarm.authorization_encrypted_response_alg = Some(JsonWebEncryptionAlg::RsaOaep256);
        assert_eq!(client.validate(), Err(ClientMetadataError::MissingJarmEnc));
    }
}
