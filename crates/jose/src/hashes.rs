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

//! `c_hash` / `at_hash` (OIDC Core §3.3.2.11) and `session_state`
//! (OIDC Session Management) computations: all SHA-256-left-half or
//! SHA-256-then-concat base64url digests.

use data_encoding::BASE64URL_NOPAD;
use sha2::{Digest, Sha256};

/// `BASE64URL(SHA-256(value)[0..16])`, used for both `c_hash` and
/// `at_hash`.
#[must_use]
pub fn left_half_hash(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    BASE64URL_NOPAD.encode(&digest[..16])
}

/// `BASE64URL(SHA-256(client_id ' ' origin ' ' session_id ' ' salt)) + '.' + salt`.
#[must_use]
pub fn session_state(client_id: &str, origin: &str, session_id: &str, salt: &str) -> String {
    let input = format!("{client_id} {origin} {session_id} {salt}");
    let digest = Sha256::digest(input.as_bytes());
    format!("{}.{}", BASE64URL_NOPAD.encode(&digest), salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_half_hash_is_16_bytes_of_sha256() {
        let hash = left_half_hash("some-authorization-code");
        let expected_len = BASE64URL_NOPAD.encode(&[0u8; 16]).len();
        assert_eq!(hash.len(), expected_len);
    }

    #[test]
    fn session_state_round_trips_salt() {
        let s = session_state("client1", "https://app.example", "sess-1", "abcd");
        assert!(s.ends_with(".abcd"));
    }
}
