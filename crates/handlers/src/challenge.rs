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

//! Issuing a challenge: handing the in-flight request off to the
//! login/consent UI, and getting a redirect there.

use chrono::Utc;
use mas_config::Config;
use mas_data_model::{Challenge, ChallengeKind};
use mas_storage::memory::MemoryStores;
use ulid::Ulid;
use url::Url;

pub async fn issue_challenge(
    config: &Config,
    stores: &MemoryStores,
    request_id: Ulid,
    kind: ChallengeKind,
) -> Result<Url, mas_storage::StorageError> {
    let now = Utc::now();
    let challenge = Challenge {
        id: Ulid::new(),
        request_id,
        kind,
        created_at: now,
        expires_at: now + config.authorization_endpoint.challenge_ttl(),
    };

    let id = challenge.id;
    stores.challenges.insert(challenge).await?;

    Ok(mas_router::challenge_url(
        &config.authorization_endpoint.ui_url,
        id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issued_challenge_is_redeemable_exactly_once() {
        let config = Config::test_default();
        let stores = MemoryStores::new(Vec::new());
        let request_id = Ulid::new();

        let url = issue_challenge(&config, &stores, request_id, ChallengeKind::Login)
            .await
            .unwrap();

        let id: Ulid = url.path_segments().unwrap().last().unwrap().parse().unwrap();
        let challenge = stores.challenges.consume(id, Utc::now()).await.unwrap();
        assert_eq!(challenge.request_id, request_id);
        assert_eq!(challenge.kind, ChallengeKind::Login);

        assert!(stores.challenges.consume(id, Utc::now()).await.is_err());
    }
}
