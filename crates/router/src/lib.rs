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

//! Path constants and typed URI builders shared between the handlers
//! that emit redirects and the templates that render links. Keeping
//! these in one crate means a path never gets hand-typed twice.

use ulid::Ulid;

pub const AUTHORIZATION_PATH: &str = "/authorize";
pub const PAR_PATH: &str = "/par";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";
pub const OIDC_DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

/// `/authorize`, as POSTed back from the login/consent UI after a
/// challenge is resolved: the UI appends the resolved parameters as a
/// query string on top of this path.
#[must_use]
pub fn authorization_endpoint() -> &'static str {
    AUTHORIZATION_PATH
}

/// Where the login/consent UI is sent to resolve a challenge.
#[must_use]
pub fn challenge_url(ui_base: &url::Url, challenge_id: Ulid) -> url::Url {
    let mut url = ui_base.clone();
    {
        let mut segments = url.path_segments_mut().expect("ui_url is not a base URL");
        segments.push("challenge");
        segments.push(&challenge_id.to_string());
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_url_appends_id_as_path_segment() {
        let base = url::Url::parse("https://auth.example.com/ui").unwrap();
        let id = Ulid::new();
        let built = challenge_url(&base, id);
        assert_eq!(built.path(), format!("/ui/challenge/{id}"));
    }
}
