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

//! Minting and persisting the single-use authorization code, bound to
//! the request, the session, and (optionally) a DPoP key.

use chrono::Utc;
use mas_config::Config;
use mas_data_model::{generate_code_value, AuthorizationCode};
use mas_storage::memory::MemoryStores;
use oauth2_types::pkce::CodeChallenge;
use ulid::Ulid;
use url::Url;

#[allow(clippy::too_many_arguments)]
pub async fn issue_code(
    config: &Config,
    stores: &MemoryStores,
    request_id: Ulid,
    client_id: &str,
    user_id: &str,
    session_id: Ulid,
    redirect_uri: Url,
    scope: oauth2_types::scope::Scope,
    nonce: Option<String>,
    auth_time: chrono::DateTime<Utc>,
    code_challenge: Option<CodeChallenge>,
    dpop_jkt: Option<String>,
) -> Result<String, mas_storage::StorageError> {
    let mut rng = rand::thread_rng();
    let code_value = generate_code_value(&mut rng);
    let now = Utc::now();

    let code = AuthorizationCode {
        code: code_value.clone(),
        request_id,
        client_id: client_id.to_owned(),
        user_id: user_id.to_owned(),
        session_id,
        redirect_uri,
        scope,
        nonce,
        auth_time,
        code_challenge,
        dpop_jkt,
        created_at: now,
        expires_at: now + config.authorization_endpoint.code_ttl(),
    };

    stores.codes.insert(code).await?;
    Ok(code_value)
}

#[cfg(test)]
mod tests {
    use mas_storage::memory::MemoryStores;

    use super::*;

    #[tokio::test]
    async fn issued_code_is_single_use() {
        let config = mas_config::Config::test_default();
        let stores = MemoryStores::new(Vec::new());

        let code_value = issue_code(
            &config,
            &stores,
            Ulid::new(),
            "client1",
            "user1",
            Ulid::new(),
            "https://app.example/callback".parse().unwrap(),
            "openid".parse().unwrap(),
            None,
            Utc::now(),
            None,
            None,
        )
        .await
        .unwrap();

        let now = Utc::now();
        let consumed = stores.codes.consume(&code_value, now).await.unwrap();
        assert_eq!(consumed.client_id, "client1");
        assert_eq!(consumed.user_id, "user1");

        assert!(stores.codes.consume(&code_value, now).await.is_err());
    }
}
