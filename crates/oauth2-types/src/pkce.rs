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

//! Proof Key for Code Exchange (RFC 7636).

use std::{fmt, str::FromStr};

use data_encoding::BASE64URL_NOPAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// `code_challenge_method`. Only `S256` is accepted by this authorization
/// server; `plain` is rejected at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeChallengeMethod {
    #[serde(rename = "S256")]
    S256,
    #[serde(rename = "plain")]
    Plain,
}

#[derive(Debug, Error)]
#[error("unknown code_challenge_method {0:?}")]
pub struct UnknownCodeChallengeMethod(String);

impl FromStr for CodeChallengeMethod {
    type Err = UnknownCodeChallengeMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S256" => Ok(Self::S256),
            "plain" => Ok(Self::Plain),
            other => Err(UnknownCodeChallengeMethod(other.to_owned())),
        }
    }
}

impl fmt::Display for CodeChallengeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::S256 => "S256",
            Self::Plain => "plain",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PkceError {
    #[error("code_challenge must be 43-128 characters, got {0}")]
    InvalidLength(usize),

    #[error("code_challenge_method must be S256")]
    UnsupportedMethod,

    #[error("code_verifier does not match the stored code_challenge")]
    VerificationFailed,
}

/// The `code_challenge` + `code_challenge_method` pair bound to an
/// authorization code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeChallenge {
    pub code_challenge: String,
    pub code_challenge_method: CodeChallengeMethod,
}

impl CodeChallenge {
    /// Validate shape per RFC 7636 §4.1 and this server's policy that only
    /// S256 is accepted.
    pub fn validate(challenge: &str, method: CodeChallengeMethod) -> Result<Self, PkceError> {
        if !(43..=128).contains(&challenge.len()) {
            return Err(PkceError::InvalidLength(challenge.len()));
        }

        if method != CodeChallengeMethod::S256 {
            return Err(PkceError::UnsupportedMethod);
        }

        Ok(Self {
            code_challenge: challenge.to_owned(),
            code_challenge_method: method,
        })
    }

    /// Verify a `code_verifier` presented at the token endpoint against this
    /// challenge.
    pub fn verify(&self, verifier: &str) -> Result<(), PkceError> {
        let computed = compute_challenge(verifier);
        if computed == self.code_challenge {
            Ok(())
        } else {
            Err(PkceError::VerificationFailed)
        }
    }
}

/// Compute `BASE64URL-ENCODE(SHA256(ASCII(code_verifier)))`.
#[must_use]
pub fn compute_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    BASE64URL_NOPAD.encode(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc7636_appendix_b_vector() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let challenge = compute_challenge(verifier);
        assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
    }

    #[test]
    fn boundary_lengths() {
        assert!(CodeChallenge::validate(&"a".repeat(42), CodeChallengeMethod::S256).is_err());
        assert!(CodeChallenge::validate(&"a".repeat(43), CodeChallengeMethod::S256).is_ok());
        assert!(CodeChallenge::validate(&"a".repeat(128), CodeChallengeMethod::S256).is_ok());
        assert!(CodeChallenge::validate(&"a".repeat(129), CodeChallengeMethod::S256).is_err());
    }

    #[test]
    fn plain_method_rejected() {
        assert_eq!(
            CodeChallenge::validate(&"a".repeat(43), CodeChallengeMethod::Plain),
            Err(PkceError::UnsupportedMethod)
        );
    }

    #[test]
    fn wrong_verifier_fails() {
        let cc = CodeChallenge::validate(
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM",
            CodeChallengeMethod::S256,
        )
        .unwrap();
        assert!(cc.verify("wrong-verifier-wrong-verifier-wrong-verifi").is_err());
        assert!(cc
            .verify("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk")
            .is_ok());
    }
}
