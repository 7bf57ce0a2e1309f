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

//! Resolving the browser's session cookie into a [`Session`], and
//! deciding whether it's fresh enough for the request at hand.

use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    PrivateCookieJar,
};
use chrono::Utc;
use mas_data_model::{ClientMetadata, Session};
use mas_keystore::Encrypter;
use mas_storage::memory::MemoryStores;
use ulid::Ulid;

const SESSION_COOKIE: &str = "mas_session";

/// What the current browser session means for this particular request.
pub enum SessionOutcome {
    /// No session cookie, or it named a session that no longer exists.
    NoSession,
    /// A session exists but doesn't satisfy the request's freshness
    /// requirements (`max_age`, `require_auth_time`, `prompt=login`).
    StaleSession(Session),
    /// The session is usable as-is.
    Usable(Session),
}

pub async fn resolve_session(
    stores: &MemoryStores,
    jar: &PrivateCookieJar<Encrypter>,
) -> Option<Session> {
    let id: Ulid = jar.get(SESSION_COOKIE)?.value().parse().ok()?;
    stores.sessions.get(id).await
}

pub async fn evaluate_session(
    stores: &MemoryStores,
    jar: &PrivateCookieJar<Encrypter>,
    client: &ClientMetadata,
    max_age: Option<i64>,
    force_login: bool,
) -> SessionOutcome {
    let Some(session) = resolve_session(stores, jar).await else {
        return SessionOutcome::NoSession;
    };

    if force_login {
        return SessionOutcome::StaleSession(session);
    }

    let now = Utc::now();
    let required_max_age = max_age.or({
        if client.require_auth_time {
            Some(0)
        } else {
            None
        }
    });

    if session.satisfies_max_age(now, required_max_age) {
        SessionOutcome::Usable(session)
    } else {
        SessionOutcome::StaleSession(session)
    }
}

pub fn set_session_cookie(
    jar: PrivateCookieJar<Encrypter>,
    session: &Session,
) -> PrivateCookieJar<Encrypter> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session.id.to_string());
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    jar.add(cookie)
}

#[cfg(test)]
mod tests {
    use mas_data_model::TokenEndpointAuthMethod;

    use super::*;

    fn client() -> ClientMetadata {
        ClientMetadata {
            client_id: "client1".to_owned(),
            redirect_uris: vec!["https://app.example/callback".parse().unwrap()],
            response_types: vec!["code".parse().unwrap()],
            token_endpoint_auth_method: TokenEndpointAuthMethod::ClientSecretBasic,
            default_max_age: None,
            require_auth_time: false,
            require_pushed_authorization_requests: false,
            request_object_signing_alg: None,
            jwks: None,
            jarm: Default::default(),
        }
    }

    fn session(last_authentication: chrono::DateTime<Utc>) -> Session {
        Session {
            id: Ulid::new(),
            user_id: "user1".to_owned(),
            created_at: last_authentication,
            last_authentication,
        }
    }

    #[tokio::test]
    async fn no_cookie_means_no_session() {
        let stores = MemoryStores::new(Vec::new());
        let jar = PrivateCookieJar::new(Encrypter::generate());

        let outcome = evaluate_session(&stores, &jar, &client(), None, false).await;
        assert!(matches!(outcome, SessionOutcome::NoSession));
    }

    #[tokio::test]
    async fn a_fresh_session_is_usable() {
        let stores = MemoryStores::new(Vec::new());
        let session = session(Utc::now());
        stores.sessions.insert(session.clone()).await;

        let jar = set_session_cookie(PrivateCookieJar::new(Encrypter::generate()), &session);

        let outcome = evaluate_session(&stores, &jar, &client(), None, false).await;
        assert!(matches!(outcome, SessionOutcome::Usable(_)));
    }

    #[tokio::test]
    async fn force_login_always_demands_reauth_even_if_fresh() {
        let stores = MemoryStores::new(Vec::new());
        let session = session(Utc::now());
        stores.sessions.insert(session.clone()).await;

        let jar = set_session_cookie(PrivateCookieJar::new(Encrypter::generate()), &session);

        let outcome = evaluate_session(&stores, &jar, &client(), None, true).await;
        assert!(matches!(outcome, SessionOutcome::StaleSession(_)));
    }

    #[tokio::test]
    async fn max_age_rejects_an_old_authentication() {
        let stores = MemoryStores::new(Vec::new());
        let session = session(Utc::now() - chrono::Duration::seconds(120));
        stores.sessions.insert(session.clone()).await;

        let jar = set_session_cookie(PrivateCookieJar::new(Encrypter::generate()), &session);

        let outcome = evaluate_session(&stores, &jar, &client(), Some(30), false).await;
        assert!(matches!(outcome, SessionOutcome::StaleSession(_)));
    }
}
