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

//! Compact JWE support, narrowed to the interoperable profile this
//! authorization server actually needs: RSA-OAEP / RSA-OAEP-256 key
//! management wrapping an A128GCM / A256GCM content encryption key. This
//! covers both encrypted JAR request objects and encrypted JARM
//! responses.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes128Gcm, Aes256Gcm, Nonce,
};
use data_encoding::BASE64URL_NOPAD;
use mas_iana::jose::{JsonWebEncryptionAlg, JsonWebEncryptionEnc};
use rand::RngCore;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JweError {
    #[error("malformed compact JWE: expected 5 segments")]
    Malformed,

    #[error("unsupported key management algorithm {0:?}")]
    UnsupportedAlg(JsonWebEncryptionAlg),

    #[error("unsupported content encryption {0:?}")]
    UnsupportedEnc(JsonWebEncryptionEnc),

    #[error("RSA key unwrap failed")]
    KeyUnwrap,

    #[error("content decryption failed")]
    ContentDecrypt,

    #[error("base64url decode error")]
    Base64,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

struct Header {
    alg: JsonWebEncryptionAlg,
    enc: JsonWebEncryptionEnc,
    kid: Option<String>,
}

fn decode_header(segment: &str) -> Result<(Header, Value), JweError> {
    let bytes = BASE64URL_NOPAD
        .decode(segment.as_bytes())
        .map_err(|_| JweError::Base64)?;
    let raw: Value = serde_json::from_slice(&bytes)?;
    let alg_str = raw.get("alg").and_then(Value::as_str).unwrap_or_default();
    let enc_str = raw.get("enc").and_then(Value::as_str).unwrap_or_default();
    let alg: JsonWebEncryptionAlg = alg_str
        .parse()
        .map_err(|_| JweError::UnsupportedAlg(JsonWebEncryptionAlg::Unknown(alg_str.to_owned())))?;
    let enc: JsonWebEncryptionEnc = enc_str
        .parse()
        .map_err(|_| JweError::UnsupportedEnc(JsonWebEncryptionEnc::Unknown(enc_str.to_owned())))?;
    let kid = raw.get("kid").and_then(Value::as_str).map(str::to_owned);
    Ok((Header { alg, enc, kid }, raw))
}

/// Decrypt a compact JWE whose content encryption key is RSA-OAEP wrapped,
/// returning the inner plaintext bytes (a JWS or raw JSON).
pub fn decrypt(token: &str, private_key: &RsaPrivateKey) -> Result<Vec<u8>, JweError> {
    let parts: Vec<&str> = token.split('.').collect();
    let [header_seg, enc_key_seg, iv_seg, ciphertext_seg, tag_seg] = parts[..] else {
        return Err(JweError::Malformed);
    };

    let (header, _raw) = decode_header(header_seg)?;

    let encrypted_key = BASE64URL_NOPAD
        .decode(enc_key_seg.as_bytes())
        .map_err(|_| JweError::Base64)?;
    let iv = BASE64URL_NOPAD
        .decode(iv_seg.as_bytes())
        .map_err(|_| JweError::Base64)?;
    let ciphertext = BASE64URL_NOPAD
        .decode(ciphertext_seg.as_bytes())
        .map_err(|_| JweError::Base64)?;
    let tag = BASE64URL_NOPAD
        .decode(tag_seg.as_bytes())
        .map_err(|_| JweError::Base64)?;

    let cek = match header.alg {
        JsonWebEncryptionAlg::RsaOaep => private_key
            .decrypt(Oaep::new::<sha2::Sha1>(), &encrypted_key)
            .map_err(|_| JweError::KeyUnwrap)?,
        JsonWebEncryptionAlg::RsaOaep256 => private_key
            .decrypt(Oaep::new::<Sha256>(), &encrypted_key)
            .map_err(|_| JweError::KeyUnwrap)?,
        other => return Err(JweError::UnsupportedAlg(other)),
    };

    let aad = header_seg.as_bytes();
    let mut combined = ciphertext;
    combined.extend_from_slice(&tag);

    let plaintext = match header.enc {
        JsonWebEncryptionEnc::A128Gcm => {
            let cipher = Aes128Gcm::new_from_slice(&cek).map_err(|_| JweError::ContentDecrypt)?;
            cipher
                .decrypt(
                    Nonce::from_slice(&iv),
                    Payload {
                        msg: &combined,
                        aad,
                    },
                )
                .map_err(|_| JweError::ContentDecrypt)?
        }
        JsonWebEncryptionEnc::A256Gcm => {
            let cipher = Aes256Gcm::new_from_slice(&cek).map_err(|_| JweError::ContentDecrypt)?;
            cipher
                .decrypt(
                    Nonce::from_slice(&iv),
                    Payload {
                        msg: &combined,
                        aad,
                    },
                )
                .map_err(|_| JweError::ContentDecrypt)?
        }
        other => return Err(JweError::UnsupportedEnc(other)),
    };

    Ok(plaintext)
}

/// Encrypt `claims` into a compact JWE for a client's encryption key
/// (JARM response encryption).
pub fn encrypt<T: Serialize>(
    claims: &T,
    kid: Option<&str>,
    alg: JsonWebEncryptionAlg,
    enc: JsonWebEncryptionEnc,
    public_key: &RsaPublicKey,
) -> Result<String, JweError> {
    let plaintext = serde_json::to_vec(claims)?;
    encrypt_bytes(&plaintext, kid, alg, enc, public_key)
}

/// Encrypt raw `plaintext` into a compact JWE. Used for nested JWEs whose
/// payload is itself a compact JWS, which must not be re-serialized as a
/// JSON string.
pub fn encrypt_bytes(
    plaintext: &[u8],
    kid: Option<&str>,
    alg: JsonWebEncryptionAlg,
    enc: JsonWebEncryptionEnc,
    public_key: &RsaPublicKey,
) -> Result<String, JweError> {
    let mut header = serde_json::json!({
        "alg": alg.to_string(),
        "enc": enc.to_string(),
    });
    if let Some(kid) = kid {
        header["kid"] = Value::String(kid.to_owned());
    }
    let header_json = serde_json::to_vec(&header)?;
    let header_seg = BASE64URL_NOPAD.encode(&header_json);

    let mut rng = rand::thread_rng();
    let (key_len, mut iv) = match enc {
        JsonWebEncryptionEnc::A128Gcm => (16usize, [0u8; 12]),
        JsonWebEncryptionEnc::A256Gcm => (32usize, [0u8; 12]),
        other => return Err(JweError::UnsupportedEnc(other)),
    };
    rng.fill_bytes(&mut iv);

    let mut cek = vec![0u8; key_len];
    rng.fill_bytes(&mut cek);

    let encrypted_key = match alg {
        JsonWebEncryptionAlg::RsaOaep => public_key
            .encrypt(&mut rng, Oaep::new::<sha2::Sha1>(), &cek)
            .map_err(|_| JweError::KeyUnwrap)?,
        JsonWebEncryptionAlg::RsaOaep256 => public_key
            .encrypt(&mut rng, Oaep::new::<Sha256>(), &cek)
            .map_err(|_| JweError::KeyUnwrap)?,
        other => return Err(JweError::UnsupportedAlg(other)),
    };

    let aad = header_seg.as_bytes();

    let sealed = match enc {
        JsonWebEncryptionEnc::A128Gcm => {
            let cipher = Aes128Gcm::new_from_slice(&cek).map_err(|_| JweError::ContentDecrypt)?;
            cipher
                .encrypt(
                    Nonce::from_slice(&iv),
                    Payload {
                        msg: plaintext,
                        aad,
                    },
                )
                .map_err(|_| JweError::ContentDecrypt)?
        }
        JsonWebEncryptionEnc::A256Gcm => {
            let cipher = Aes256Gcm::new_from_slice(&cek).map_err(|_| JweError::ContentDecrypt)?;
            cipher
                .encrypt(
                    Nonce::from_slice(&iv),
                    Payload {
                        msg: plaintext,
                        aad,
                    },
                )
                .map_err(|_| JweError::ContentDecrypt)?
        }
        other => return Err(JweError::UnsupportedEnc(other)),
    };

    // AES-GCM output is ciphertext || 16-byte tag; JWE serializes them as
    // separate segments.
    let tag_offset = sealed.len() - 16;
    let (ciphertext, tag) = sealed.split_at(tag_offset);

    Ok(format!(
        "{header_seg}.{}.{}.{}.{}",
        BASE64URL_NOPAD.encode(&encrypted_key),
        BASE64URL_NOPAD.encode(&iv),
        BASE64URL_NOPAD.encode(ciphertext),
        BASE64URL_NOPAD.encode(tag),
    ))
}
