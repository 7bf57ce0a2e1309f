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

//! The key used to seal the private cookie jar that carries the browser
//! session and CSRF token across the login/consent redirect chain.

use cookie::Key;

/// Wraps a [`cookie::Key`] derived from a configured secret, so callers
/// thread it through `PrivateCookieJar<Encrypter>` without depending on
/// `cookie` themselves.
#[derive(Clone)]
pub struct Encrypter(Key);

impl Encrypter {
    /// Derive a cookie signing/encryption key from arbitrary secret
    /// material. The secret should be at least 64 bytes of real entropy;
    /// `Key::derive_from` stretches shorter input but that isn't a
    /// substitute for a long configured secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self(Key::derive_from(secret))
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Key::generate())
    }
}

impl AsRef<Key> for Encrypter {
    fn as_ref(&self) -> &Key {
        &self.0
    }
}

impl From<Encrypter> for Key {
    fn from(encrypter: Encrypter) -> Self {
        encrypter.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_deterministically_from_the_same_secret() {
        let secret = b"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
        let a = Encrypter::new(secret);
        let b = Encrypter::new(secret);
        assert_eq!(a.as_ref().master(), b.as_ref().master());
    }
}
