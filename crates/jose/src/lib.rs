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

//! JOSE primitives for the authorization server: JWS signing and
//! verification, compact JWE for encrypted request objects and responses,
//! JWK(Set) lookup, the signing key manager contract, and the hash
//! computations that bind codes and tokens to ID tokens.

pub mod crypto;
pub mod hashes;
pub mod jwa;
pub mod jwe;
pub mod jwk;
pub mod jwt;
pub mod keys;

pub use crypto::{CryptoError, CryptoService};
pub use keys::{ActiveKey, KeyError, KeyManager};
