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

//! Loading the static client registry from a YAML file at startup.

use camino::Utf8Path;
use mas_data_model::ClientMetadata;

pub fn load(path: &Utf8Path) -> anyhow::Result<Vec<ClientMetadata>> {
    let content = std::fs::read_to_string(path)?;
    let clients: Vec<ClientMetadata> = serde_yaml::from_str(&content)?;

    for client in &clients {
        client
            .validate()
            .map_err(|err| anyhow::anyhow!("client {:?} is misconfigured: {err}", client.client_id))?;
    }

    Ok(clients)
}
