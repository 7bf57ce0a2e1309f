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

//! Pushed Authorization Requests (RFC 9126): the record created by a POST
//! to `/par` and redeemed once, by `request_uri`, at `/authorize`.

use chrono::{DateTime, Utc};
use oauth2_types::requests::RawAuthorizationRequest;
use serde::{Deserialize, Serialize};

/// A pushed request, still in its raw, unvalidated wire shape: validation
/// happens uniformly at `/authorize`, whether the parameters arrived
/// directly, via PAR, or via JAR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushedAuthorizationRequest {
    pub request_uri: String,
    pub client_id: String,
    pub params: RawAuthorizationRequest,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PushedAuthorizationRequest {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// `urn:ietf:params:oauth:request_uri:<random>`, per RFC 9126 §2.2.
#[must_use]
pub fn generate_request_uri(rng: &mut impl rand::RngCore) -> String {
    let mut bytes = [0u8; 24];
    rng.fill_bytes(&mut bytes);
    format!(
        "urn:ietf:params:oauth:request_uri:{}",
        data_encoding::BASE64URL_NOPAD.encode(&bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn request_uri_has_the_registered_urn_prefix() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        let uri = generate_request_uri(&mut rng);
        assert!(uri.starts_with("urn:ietf:params:oauth:request_uri:"));
    }
}
