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

//! The storage seams the authorization endpoint is written against. Each
//! trait is implemented once, in-memory, in [`crate::memory`]; a
//! database-backed implementation could replace any of them without the
//! handlers crate changing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mas_data_model::{
    AuthorizationCode, AuthorizationRequest, Challenge, ClientMetadata, ConsentRecord,
    PushedAuthorizationRequest, Session,
};
use ulid::Ulid;

use crate::error::StorageError;

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn lookup(&self, client_id: &str) -> Option<ClientMetadata>;
}

#[async_trait]
pub trait AuthorizationRequestStore: Send + Sync {
    async fn insert(&self, request: AuthorizationRequest) -> Result<(), StorageError>;
    async fn get(&self, id: Ulid) -> Result<AuthorizationRequest, StorageError>;
    async fn update(&self, request: AuthorizationRequest) -> Result<(), StorageError>;
}

#[async_trait]
pub trait AuthorizationCodeStore: Send + Sync {
    async fn insert(&self, code: AuthorizationCode) -> Result<(), StorageError>;

    /// Atomically look up and invalidate a code in one step: the token
    /// endpoint must never be able to redeem the same code twice, even
    /// under concurrent requests.
    async fn consume(&self, code: &str, now: DateTime<Utc>) -> Result<AuthorizationCode, StorageError>;
}

#[async_trait]
pub trait ParStore: Send + Sync {
    async fn insert(&self, par: PushedAuthorizationRequest) -> Result<(), StorageError>;
    async fn consume(
        &self,
        request_uri: &str,
        now: DateTime<Utc>,
    ) -> Result<PushedAuthorizationRequest, StorageError>;
}

#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn insert(&self, challenge: Challenge) -> Result<(), StorageError>;
    async fn consume(&self, id: Ulid, now: DateTime<Utc>) -> Result<Challenge, StorageError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: Ulid) -> Option<Session>;
    async fn insert(&self, session: Session);
}

#[async_trait]
pub trait ConsentStore: Send + Sync {
    async fn get(&self, client_id: &str, user_id: &str) -> Option<ConsentRecord>;
    async fn upsert(&self, record: ConsentRecord);
}

/// Replay protection for DPoP proofs (RFC 9449 §11.1): each proof's `jti`
/// may be seen at most once within its validity window.
#[async_trait]
pub trait DPoPReplayStore: Send + Sync {
    /// Returns `true` if `jti` had not been seen before and is now
    /// recorded; `false` if it was already present (a replay).
    async fn observe(&self, jti: &str, expires_at: DateTime<Utc>) -> bool;
}
