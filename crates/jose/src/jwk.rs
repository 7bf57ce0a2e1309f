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

//! JSON Web Key (set) lookup helpers: selecting a signing key by `kid`,
//! an encryption key by `use=enc`, and computing the RFC 7638 thumbprint
//! used to bind a DPoP proof to its code.

use data_encoding::BASE64URL_NOPAD;
use jsonwebtoken::{
    jwk::{AlgorithmParameters, Jwk, JwkSet},
    DecodingKey,
};
use rsa::{BigUint, RsaPublicKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwkLookupError {
    #[error("no usable signing key found in the key set")]
    NoSigningKey,
    #[error("no usable encryption key found in the key set")]
    NoEncryptionKey,
    #[error("key with kid {0:?} not found")]
    KidNotFound(String),
    #[error("JWK is not an RSA key, or its parameters are malformed")]
    NotAUsableRsaKey,
    #[error("could not build a decoding key from the selected JWK: {0}")]
    Undecodable(#[from] jsonwebtoken::errors::Error),
}

/// Pick the verification key the signing JWT's header names, falling back
/// to the first key marked `use=sig` or with no `use` at all.
pub fn select_signing_key<'a>(jwks: &'a JwkSet, kid: Option<&str>) -> Result<&'a Jwk, JwkLookupError> {
    if let Some(kid) = kid {
        return jwks
            .find(kid)
            .ok_or_else(|| JwkLookupError::KidNotFound(kid.to_owned()));
    }

    jwks.keys
        .iter()
        .find(|k| {
            k.common
                .public_key_use
                .as_ref()
                .map_or(true, |u| matches!(u, jsonwebtoken::jwk::PublicKeyUse::Signature))
        })
        .ok_or(JwkLookupError::NoSigningKey)
}

/// Pick the client's encryption key (`use=enc`) for JARM response
/// encryption.
pub fn select_encryption_key(jwks: &JwkSet) -> Result<&Jwk, JwkLookupError> {
    jwks.keys
        .iter()
        .find(|k| {
            matches!(
                k.common.public_key_use,
                Some(jsonwebtoken::jwk::PublicKeyUse::Encryption)
            )
        })
        .ok_or(JwkLookupError::NoEncryptionKey)
}

pub fn decoding_key_from_jwk(jwk: &Jwk) -> Result<DecodingKey, JwkLookupError> {
    Ok(DecodingKey::from_jwk(jwk)?)
}

/// Rebuild an [`RsaPublicKey`] from a JWK's `n`/`e` members, for JARM
/// response encryption against a client's published encryption key.
pub fn rsa_public_key_from_jwk(jwk: &Jwk) -> Result<RsaPublicKey, JwkLookupError> {
    let AlgorithmParameters::RSA(params) = &jwk.algorithm else {
        return Err(JwkLookupError::NotAUsableRsaKey);
    };
    let n = BASE64URL_NOPAD
        .decode(params.n.as_bytes())
        .map_err(|_| JwkLookupError::NotAUsableRsaKey)?;
    let e = BASE64URL_NOPAD
        .decode(params.e.as_bytes())
        .map_err(|_| JwkLookupError::NotAUsableRsaKey)?;
    RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
        .map_err(|_| JwkLookupError::NotAUsableRsaKey)
}

/// RFC 7638 JWK thumbprint, base64url-encoded, used as the DPoP `jkt`
/// bound into an authorization code.
pub fn thumbprint(jwk: &Jwk) -> String {
    // The thumbprint input is the canonical JSON of the *required* members
    // for the key type, lexicographically ordered.
    let canonical = match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            format!(
                r#"{{"e":"{}","kty":"RSA","n":"{}"}}"#,
                rsa.e, rsa.n
            )
        }
        AlgorithmParameters::EllipticCurve(ec) => {
            format!(
                r#"{{"crv":"{:?}","kty":"EC","x":"{}","y":"{}"}}"#,
                ec.curve, ec.x, ec.y
            )
        }
        AlgorithmParameters::OctetKeyPair(okp) => {
            format!(
                r#"{{"crv":"{:?}","kty":"OKP","x":"{}"}}"#,
                okp.curve, okp.x
            )
        }
        AlgorithmParameters::OctetKey(oct) => {
            format!(r#"{{"k":"{}","kty":"oct"}}"#, oct.value)
        }
    };

    let digest = Sha256::digest(canonical.as_bytes());
    BASE64URL_NOPAD.encode(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::jwk::{CommonParameters, RSAKeyParameters, RSAKeyType};

    fn sample_rsa_jwk(kid: &str) -> Jwk {
        Jwk {
            common: CommonParameters {
                key_id: Some(kid.to_owned()),
                public_key_use: Some(jsonwebtoken::jwk::PublicKeyUse::Signature),
                ..Default::default()
            },
            algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
                key_type: RSAKeyType::RSA,
                n: "n-value".to_owned(),
                e: "AQAB".to_owned(),
            }),
        }
    }

    #[test]
    fn selects_by_kid() {
        let jwks = JwkSet {
            keys: vec![sample_rsa_jwk("a"), sample_rsa_jwk("b")],
        };
        let key = select_signing_key(&jwks, Some("b")).unwrap();
        assert_eq!(key.common.key_id.as_deref(), Some("b"));
    }

    #[test]
    fn falls_back_to_first_sig_key() {
        let jwks = JwkSet {
            keys: vec![sample_rsa_jwk("only")],
        };
        let key = select_signing_key(&jwks, None).unwrap();
        assert_eq!(key.common.key_id.as_deref(), Some("only"));
    }

    #[test]
    fn thumbprint_is_deterministic() {
        let jwk = sample_rsa_jwk("x");
        assert_eq!(thumbprint(&jwk), thumbprint(&jwk));
    }
}
