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

//! Standing consent: what scope a user has already granted a client, so
//! a repeat authorization doesn't have to prompt again unless the client
//! asks for more or the request forces `prompt=consent`.

use chrono::{DateTime, Utc};
use oauth2_types::scope::Scope;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub client_id: String,
    pub user_id: String,
    pub scope: Scope,
    pub granted_at: DateTime<Utc>,
}

impl ConsentRecord {
    #[must_use]
    pub fn covers(&self, requested: &Scope) -> bool {
        requested.is_subset_of(&self.scope)
    }
}
