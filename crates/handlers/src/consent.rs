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

//! Whether an already-authenticated user still needs to be asked for
//! consent before a code or token is handed to the client.

use chrono::Utc;
use mas_storage::memory::MemoryStores;
use oauth2_types::{prompt::PromptSet, scope::Scope};

pub async fn needs_consent(
    stores: &MemoryStores,
    client_id: &str,
    user_id: &str,
    requested_scope: &Scope,
    prompt: &PromptSet,
) -> bool {
    if prompt.contains(oauth2_types::prompt::Prompt::Consent) {
        return true;
    }

    match stores.consents.get(client_id, user_id).await {
        Some(record) => !record.covers(requested_scope),
        None => true,
    }
}

pub async fn record_consent(
    stores: &MemoryStores,
    client_id: &str,
    user_id: &str,
    scope: Scope,
) {
    stores
        .consents
        .upsert(mas_data_model::ConsentRecord {
            client_id: client_id.to_owned(),
            user_id: user_id.to_owned(),
            scope,
            granted_at: Utc::now(),
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_authorization_always_needs_consent() {
        let stores = MemoryStores::new(Vec::new());
        let scope: Scope = "openid".parse().unwrap();
        let prompt = PromptSet::default();

        assert!(needs_consent(&stores, "client1", "user1", &scope, &prompt).await);
    }

    #[tokio::test]
    async fn recorded_consent_covers_a_repeat_request() {
        let stores = MemoryStores::new(Vec::new());
        let scope: Scope = "openid profile".parse().unwrap();
        let prompt = PromptSet::default();

        record_consent(&stores, "client1", "user1", scope.clone()).await;
        assert!(!needs_consent(&stores, "client1", "user1", &scope, &prompt).await);
    }

    #[tokio::test]
    async fn a_broader_scope_request_still_needs_consent() {
        let stores = MemoryStores::new(Vec::new());
        let granted: Scope = "openid".parse().unwrap();
        let requested: Scope = "openid profile".parse().unwrap();
        let prompt = PromptSet::default();

        record_consent(&stores, "client1", "user1", granted).await;
        assert!(needs_consent(&stores, "client1", "user1", &requested, &prompt).await);
    }

    #[tokio::test]
    async fn prompt_consent_always_forces_a_fresh_ask() {
        let stores = MemoryStores::new(Vec::new());
        let scope: Scope = "openid".parse().unwrap();
        record_consent(&stores, "client1", "user1", scope.clone()).await;

        let prompt: PromptSet = "consent".parse().unwrap();
        assert!(needs_consent(&stores, "client1", "user1", &scope, &prompt).await);
    }
}
