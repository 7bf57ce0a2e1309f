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

//! In-memory store implementations. Every collaborator interface in
//! [`crate::traits`] gets exactly one of these; there is no database in
//! this process.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mas_data_model::{
    AuthorizationCode, AuthorizationRequest, Challenge, ClientMetadata, ConsentRecord,
    PushedAuthorizationRequest, Session,
};
use tracing::instrument;
use ulid::Ulid;

use crate::{
    error::StorageError,
    traits::{
        AuthorizationCodeStore, AuthorizationRequestStore, ChallengeStore, ClientStore,
        ConsentStore, DPoPReplayStore, ParStore, SessionStore,
    },
    ttl::TtlStore,
};

/// A static registry of known clients, seeded at startup. Client
/// registration itself is out of scope here; this just answers lookups.
#[derive(Default)]
pub struct StaticClientStore {
    clients: DashMap<String, ClientMetadata>,
}

impl StaticClientStore {
    #[must_use]
    pub fn new(clients: impl IntoIterator<Item = ClientMetadata>) -> Self {
        let map = DashMap::new();
        for client in clients {
            map.insert(client.client_id.clone(), client);
        }
        Self { clients: map }
    }
}

#[async_trait]
impl ClientStore for StaticClientStore {
    #[instrument(skip_all, fields(client.id = client_id))]
    async fn lookup(&self, client_id: &str) -> Option<ClientMetadata> {
        self.clients.get(client_id).map(|entry| entry.clone())
    }
}

#[derive(Default)]
pub struct MemoryAuthorizationRequestStore {
    requests: DashMap<Ulid, AuthorizationRequest>,
}

#[async_trait]
impl AuthorizationRequestStore for MemoryAuthorizationRequestStore {
    #[instrument(skip_all, fields(request.id = %request.id), err)]
    async fn insert(&self, request: AuthorizationRequest) -> Result<(), StorageError> {
        self.requests.insert(request.id, request);
        Ok(())
    }

    #[instrument(skip_all, fields(request.id = %id), err)]
    async fn get(&self, id: Ulid) -> Result<AuthorizationRequest, StorageError> {
        self.requests
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(StorageError::NotFound)
    }

    #[instrument(skip_all, fields(request.id = %request.id), err)]
    async fn update(&self, request: AuthorizationRequest) -> Result<(), StorageError> {
        if !self.requests.contains_key(&request.id) {
            return Err(StorageError::NotFound);
        }
        self.requests.insert(request.id, request);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAuthorizationCodeStore {
    codes: TtlStore<String, AuthorizationCode>,
}

#[async_trait]
impl AuthorizationCodeStore for MemoryAuthorizationCodeStore {
    #[instrument(skip_all, fields(request.id = %code.request_id), err)]
    async fn insert(&self, code: AuthorizationCode) -> Result<(), StorageError> {
        let expires_at = code.expires_at;
        self.codes.insert(code.code.clone(), code, expires_at);
        Ok(())
    }

    #[instrument(skip_all, err)]
    async fn consume(&self, code: &str, now: DateTime<Utc>) -> Result<AuthorizationCode, StorageError> {
        self.codes
            .take(&code.to_owned(), now)
            .ok_or(StorageError::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryParStore {
    records: TtlStore<String, PushedAuthorizationRequest>,
}

#[async_trait]
impl ParStore for MemoryParStore {
    #[instrument(skip_all, fields(client.id = par.client_id), err)]
    async fn insert(&self, par: PushedAuthorizationRequest) -> Result<(), StorageError> {
        let expires_at = par.expires_at;
        self.records.insert(par.request_uri.clone(), par, expires_at);
        Ok(())
    }

    #[instrument(skip_all, err)]
    async fn consume(
        &self,
        request_uri: &str,
        now: DateTime<Utc>,
    ) -> Result<PushedAuthorizationRequest, StorageError> {
        self.records
            .take(&request_uri.to_owned(), now)
            .ok_or(StorageError::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryChallengeStore {
    challenges: TtlStore<Ulid, Challenge>,
}

#[async_trait]
impl ChallengeStore for MemoryChallengeStore {
    #[instrument(skip_all, fields(challenge.id = %challenge.id), err)]
    async fn insert(&self, challenge: Challenge) -> Result<(), StorageError> {
        let expires_at = challenge.expires_at;
        self.challenges.insert(challenge.id, challenge, expires_at);
        Ok(())
    }

    #[instrument(skip_all, fields(challenge.id = %id), err)]
    async fn consume(&self, id: Ulid, now: DateTime<Utc>) -> Result<Challenge, StorageError> {
        self.challenges.take(&id, now).ok_or(StorageError::NotFound)
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<Ulid, Session>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: Ulid) -> Option<Session> {
        self.sessions.get(&id).map(|entry| entry.clone())
    }

    async fn insert(&self, session: Session) {
        self.sessions.insert(session.id, session);
    }
}

#[derive(Default)]
pub struct MemoryConsentStore {
    grants: DashMap<(String, String), ConsentRecord>,
}

#[async_trait]
impl ConsentStore for MemoryConsentStore {
    async fn get(&self, client_id: &str, user_id: &str) -> Option<ConsentRecord> {
        self.grants
            .get(&(client_id.to_owned(), user_id.to_owned()))
            .map(|entry| entry.clone())
    }

    async fn upsert(&self, record: ConsentRecord) {
        self.grants
            .insert((record.client_id.clone(), record.user_id.clone()), record);
    }
}

#[derive(Default)]
pub struct MemoryDPoPReplayStore {
    seen: TtlStore<String, ()>,
}

#[async_trait]
impl DPoPReplayStore for MemoryDPoPReplayStore {
    async fn observe(&self, jti: &str, expires_at: DateTime<Utc>) -> bool {
        let now = Utc::now();
        if self.seen.peek(&jti.to_owned(), now).is_some() {
            return false;
        }
        self.seen.insert(jti.to_owned(), (), expires_at);
        true
    }
}

/// Every in-memory collaborator store, bundled for convenient
/// construction at startup and periodic sweeping.
pub struct MemoryStores {
    pub clients: Arc<StaticClientStore>,
    pub requests: Arc<MemoryAuthorizationRequestStore>,
    pub codes: Arc<MemoryAuthorizationCodeStore>,
    pub par: Arc<MemoryParStore>,
    pub challenges: Arc<MemoryChallengeStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub consents: Arc<MemoryConsentStore>,
    pub dpop_replay: Arc<MemoryDPoPReplayStore>,
}

impl MemoryStores {
    #[must_use]
    pub fn new(clients: impl IntoIterator<Item = ClientMetadata>) -> Self {
        Self {
            clients: Arc::new(StaticClientStore::new(clients)),
            requests: Arc::new(MemoryAuthorizationRequestStore::default()),
            codes: Arc::new(MemoryAuthorizationCodeStore::default()),
            par: Arc::new(MemoryParStore::default()),
            challenges: Arc::new(MemoryChallengeStore::default()),
            sessions: Arc::new(MemorySessionStore::default()),
            consents: Arc::new(MemoryConsentStore::default()),
            dpop_replay: Arc::new(MemoryDPoPReplayStore::default()),
        }
    }

    /// Drop expired codes, PAR records, and challenges. Meant to be
    /// driven by a periodic background task; correctness never depends
    /// on it having run.
    pub fn sweep_expired(&self, now: DateTime<Utc>) {
        let codes = self.codes.codes.sweep_expired(now);
        let par = self.par.records.sweep_expired(now);
        let challenges = self.challenges.challenges.sweep_expired(now);
        let dpop = self.dpop_replay.seen.sweep_expired(now);
        tracing::debug!(codes, par, challenges, dpop, "swept expired in-memory records");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mas_data_model::generate_code_value;

    fn sample_code(code: &str, expires_in_seconds: i64) -> AuthorizationCode {
        let now = Utc::now();
        AuthorizationCode {
            code: code.to_owned(),
            request_id: Ulid::new(),
            client_id: "client1".to_owned(),
            user_id: "user1".to_owned(),
            session_id: Ulid::new(),
            redirect_uri: "https://app.example/callback".parse().unwrap(),
            scope: "openid".parse().unwrap(),
            nonce: None,
            auth_time: now,
            code_challenge: None,
            dpop_jkt: None,
            created_at: now,
            expires_at: now + chrono::Duration::seconds(expires_in_seconds),
        }
    }

    #[tokio::test]
    async fn code_can_only_be_consumed_once() {
        let store = MemoryAuthorizationCodeStore::default();
        let code = sample_code("abc", 60);
        store.insert(code).await.unwrap();

        let now = Utc::now();
        assert!(store.consume("abc", now).await.is_ok());
        assert_eq!(store.consume("abc", now).await, Err(StorageError::NotFound));
    }

    #[tokio::test]
    async fn expired_code_cannot_be_consumed() {
        let store = MemoryAuthorizationCodeStore::default();
        store.insert(sample_code("abc", -1)).await.unwrap();

        assert_eq!(
            store.consume("abc", Utc::now()).await,
            Err(StorageError::NotFound)
        );
    }

    #[tokio::test]
    async fn dpop_jti_replay_is_detected() {
        let store = MemoryDPoPReplayStore::default();
        let expires_at = Utc::now() + chrono::Duration::seconds(60);
        assert!(store.observe("jti-1", expires_at).await);
        assert!(!store.observe("jti-1", expires_at).await);
    }

    #[test]
    fn code_values_use_the_full_alphabet() {
        let mut rng = rand::thread_rng();
        let v = generate_code_value(&mut rng);
        assert_eq!(v.len(), 43);
    }
}
