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

//! Mapping between the IANA `alg` registry and the algorithm enum the
//! signing backend understands.

use jsonwebtoken::Algorithm;
use mas_iana::jose::JsonWebSignatureAlg;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unsupported signature algorithm: {0}")]
pub struct UnsupportedAlgorithm(pub JsonWebSignatureAlg);

/// The signing algorithms this authorization server is willing to use or
/// accept. `none` is handled separately by the JAR verifier, since it must
/// never reach the signature backend.
pub const SUPPORTED_SIGNING_ALGORITHMS: &[JsonWebSignatureAlg] = &[
    JsonWebSignatureAlg::Rs256,
    JsonWebSignatureAlg::Rs384,
    JsonWebSignatureAlg::Rs512,
    JsonWebSignatureAlg::Ps256,
    JsonWebSignatureAlg::Ps384,
    JsonWebSignatureAlg::Ps512,
    JsonWebSignatureAlg::Es256,
    JsonWebSignatureAlg::Es384,
    JsonWebSignatureAlg::Hs256,
    JsonWebSignatureAlg::Hs384,
    JsonWebSignatureAlg::Hs512,
];

pub fn to_backend_algorithm(alg: JsonWebSignatureAlg) -> Result<Algorithm, UnsupportedAlgorithm> {
    Ok(match alg {
        JsonWebSignatureAlg::Hs256 => Algorithm::HS256,
        JsonWebSignatureAlg::Hs384 => Algorithm::HS384,
        JsonWebSignatureAlg::Hs512 => Algorithm::HS512,
        JsonWebSignatureAlg::Rs256 => Algorithm::RS256,
        JsonWebSignatureAlg::Rs384 => Algorithm::RS384,
        JsonWebSignatureAlg::Rs512 => Algorithm::RS512,
        JsonWebSignatureAlg::Ps256 => Algorithm::PS256,
        JsonWebSignatureAlg::Ps384 => Algorithm::PS384,
        JsonWebSignatureAlg::Ps512 => Algorithm::PS512,
        JsonWebSignatureAlg::Es256 => Algorithm::ES256,
        JsonWebSignatureAlg::Es384 => Algorithm::ES384,
        other => return Err(UnsupportedAlgorithm(other)),
    })
}
