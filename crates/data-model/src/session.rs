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

//! The browser-facing login session: who is signed in, and when they
//! last proved it, which the authorization endpoint compares against a
//! request's `max_age`/`prompt=login`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Ulid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub last_authentication: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn auth_age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.last_authentication
    }

    /// Whether this session satisfies a request's `max_age` (seconds) and
    /// `require_auth_time` constraints without a fresh reauth.
    #[must_use]
    pub fn satisfies_max_age(&self, now: DateTime<Utc>, max_age_seconds: Option<i64>) -> bool {
        match max_age_seconds {
            Some(max_age) => self.auth_age(now) <= chrono::Duration::seconds(max_age),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_age_zero_always_requires_reauth() {
        let now = Utc::now();
        let session = Session {
            id: Ulid::new(),
            user_id: "u1".to_owned(),
            created_at: now,
            last_authentication: now - chrono::Duration::seconds(1),
        };
        assert!(!session.satisfies_max_age(now, Some(0)));
    }

    #[test]
    fn no_max_age_is_always_satisfied() {
        let now = Utc::now();
        let session = Session {
            id: Ulid::new(),
            user_id: "u1".to_owned(),
            created_at: now - chrono::Duration::days(30),
            last_authentication: now - chrono::Duration::days(30),
        };
        assert!(session.satisfies_max_age(now, None));
    }
}
