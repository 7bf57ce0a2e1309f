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

//! The axum handlers wiring every module in this crate into the
//! authorization endpoint and its adjacent routes.

use axum::{
    extract::{Form, Query, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::PrivateCookieJar;
use chrono::Utc;
use mas_data_model::{AuthorizationRequest, ChallengeKind, RequestStage};
use mas_keystore::Encrypter;
use oauth2_types::{errors::ProtocolError, requests::RawAuthorizationRequest};
use serde::Serialize;
use ulid::Ulid;

use crate::{
    challenge, code, consent, dpop,
    error::{RouteError, TerminalError},
    resolve, response, session,
    state::AppState,
    tokens, validate,
};

/// `GET /authorize`.
pub async fn get_authorize(
    State(app_state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    Query(draft): Query<RawAuthorizationRequest>,
    jar: PrivateCookieJar<Encrypter>,
) -> Response {
    authorize(app_state, draft, jar, method, headers).await
}

/// `POST /authorize`, used for the internal resume-after-challenge
/// redirect: the login/consent UI posts the resolved parameters back,
/// including the `_confirmed`/`_session_user_id` continuation fields.
pub async fn post_authorize(
    State(app_state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    jar: PrivateCookieJar<Encrypter>,
    Form(draft): Form<RawAuthorizationRequest>,
) -> Response {
    authorize(app_state, draft, jar, method, headers).await
}

#[derive(Serialize)]
pub struct ParResponse {
    request_uri: String,
    expires_in: i64,
}

/// `POST /par` (RFC 9126): push the request parameters server-side and
/// hand back a `request_uri` the client redeems once at `/authorize`.
pub async fn par(
    State(app_state): State<AppState>,
    Form(params): Form<RawAuthorizationRequest>,
) -> Result<Json<ParResponse>, Response> {
    let client_id = params
        .client_id
        .clone()
        .ok_or_else(|| error_json(ProtocolError::invalid_client()))?;

    app_state
        .stores
        .clients
        .lookup(&client_id)
        .await
        .ok_or_else(|| error_json(ProtocolError::invalid_client()))?;

    let mut rng = rand::thread_rng();
    let request_uri = mas_data_model::generate_request_uri(&mut rng);
    let now = Utc::now();
    let par_ttl = app_state.config.authorization_endpoint.par_ttl();

    let record = mas_data_model::PushedAuthorizationRequest {
        request_uri: request_uri.clone(),
        client_id,
        params,
        created_at: now,
        expires_at: now + par_ttl,
    };

    app_state
        .stores
        .par
        .insert(record)
        .await
        .map_err(|_| error_json(ProtocolError::server_error()))?;

    Ok(Json(ParResponse {
        request_uri,
        expires_in: par_ttl.num_seconds(),
    }))
}

fn error_json(error: ProtocolError) -> Response {
    (
        axum::http::StatusCode::BAD_REQUEST,
        Json(oauth2_types::errors::ErrorResponse::from_error(&error, None)),
    )
        .into_response()
}

async fn authorize(
    app_state: AppState,
    draft: RawAuthorizationRequest,
    jar: PrivateCookieJar<Encrypter>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    match authorize_inner(&app_state, draft, &jar, &method, &headers).await {
        Ok(response) => response,
        Err(err) => err.into_response(&app_state).await,
    }
}

async fn authorize_inner(
    app_state: &AppState,
    draft: RawAuthorizationRequest,
    jar: &PrivateCookieJar<Encrypter>,
    method: &Method,
    headers: &HeaderMap,
) -> Result<Response, RouteError> {
    // A request only ever names its client directly or via a pushed
    // record; resolve the PAR overlay first since it may itself carry a
    // `client_id` the draft didn't.
    let draft = resolve::resolve_request_uri(&app_state.stores, draft)
        .await
        .map_err(protocol_error_from_resolve)?;

    let client_id = draft.client_id.clone().ok_or(TerminalError::UnknownClient)?;
    let client = app_state
        .stores
        .clients
        .lookup(&client_id)
        .await
        .ok_or(TerminalError::UnknownClient)?;

    let redirect_uri =
        validate::resolve_redirect_uri(&client, &draft).map_err(|_| TerminalError::UnregisteredRedirectUri)?;

    if app_state.config.authorization_endpoint.require_par && draft.request_uri.is_none() {
        return Err(RouteError::redirectable(
            client.clone(),
            redirect_uri,
            validate::best_effort_response_mode(&draft),
            draft.state.clone(),
            ProtocolError::invalid_request().with_description("PAR is required"),
        ));
    }

    let draft = resolve::resolve_request_object(
        &app_state.crypto,
        &client,
        app_state.config.authorization_endpoint.allow_none_algorithm,
        draft,
    )
    .await
    .map_err(protocol_error_from_resolve)?;

    // A JAR request object may itself carry `redirect_uri`, so resolve it
    // again now that it's merged in.
    let redirect_uri =
        validate::resolve_redirect_uri(&client, &draft).map_err(|_| TerminalError::UnregisteredRedirectUri)?;

    let validated = match validate::validate(&client, &draft, redirect_uri.clone()) {
        Ok(v) => v,
        Err((err, response_mode)) => {
            return Err(RouteError::redirectable(
                client.clone(),
                redirect_uri,
                response_mode,
                draft.state.clone(),
                protocol_error_from_validation(&err),
            ));
        }
    };

    // From here on, redirect_uri and response_mode are trusted: every
    // remaining failure is reported to the client, not shown locally.
    let redirect_uri = validated.redirect_uri.clone();
    let response_mode = validated.response_mode;
    let state = validated.state.clone();

    let request_id = Ulid::new();
    let now = Utc::now();
    let request = AuthorizationRequest {
        id: request_id,
        client_id: client_id.clone(),
        redirect_uri: redirect_uri.clone(),
        response_type: validated.response_type.clone(),
        response_mode,
        scope: validated.scope.clone(),
        state: state.clone(),
        nonce: validated.nonce.clone(),
        code_challenge: validated.code_challenge.clone(),
        prompt: validated.prompt.clone(),
        max_age: validated.max_age,
        login_hint: validated.login_hint.clone(),
        acr_values: validated.acr_values.clone(),
        org_id: validated.org_id.clone(),
        acting_as: validated.acting_as.clone(),
        dpop_jkt: validated.dpop_jkt.clone(),
        stage: RequestStage::Pending,
        created_at: now,
        expires_at: now + app_state.config.authorization_endpoint.session_ttl(),
    };

    let force_login = validated.prompt.contains(oauth2_types::prompt::Prompt::Login);
    let prompt_none = validated.prompt.contains(oauth2_types::prompt::Prompt::None);

    let outcome =
        session::evaluate_session(&app_state.stores, jar, &client, validated.max_age, force_login)
            .await;

    let authenticated_session = match outcome {
        session::SessionOutcome::Usable(session) => session,
        session::SessionOutcome::NoSession | session::SessionOutcome::StaleSession(_) => {
            if prompt_none {
                return Err(RouteError::redirectable(
                    client.clone(),
                    redirect_uri,
                    response_mode,
                    state,
                    ProtocolError::login_required(),
                ));
            }

            app_state.stores.requests.insert(request).await?;
            let challenge_url = challenge::issue_challenge(
                &app_state.config,
                &app_state.stores,
                request_id,
                ChallengeKind::Login,
            )
            .await?;

            return Ok(axum::response::Redirect::to(challenge_url.as_str()).into_response());
        }
    };

    let needs_consent = consent::needs_consent(
        &app_state.stores,
        &client_id,
        &authenticated_session.user_id,
        &validated.scope,
        &validated.prompt,
    )
    .await;

    if needs_consent {
        if prompt_none {
            return Err(RouteError::redirectable(
                client.clone(),
                redirect_uri,
                response_mode,
                state,
                ProtocolError::consent_required(),
            ));
        }

        app_state.stores.requests.insert(request).await?;
        let challenge_url = challenge::issue_challenge(
            &app_state.config,
            &app_state.stores,
            request_id,
            ChallengeKind::Consent,
        )
        .await?;

        return Ok(axum::response::Redirect::to(challenge_url.as_str()).into_response());
    }

    consent::record_consent(
        &app_state.stores,
        &client_id,
        &authenticated_session.user_id,
        validated.scope.clone(),
    )
    .await;

    fulfil(
        app_state,
        &client,
        &validated,
        request_id,
        &authenticated_session,
        redirect_uri,
        response_mode,
        state,
        method,
        headers,
    )
    .await
}

#[allow(clippy::too_many_arguments)]
async fn fulfil(
    app_state: &AppState,
    client: &mas_data_model::ClientMetadata,
    validated: &validate::ValidatedRequest,
    request_id: Ulid,
    authenticated_session: &mas_data_model::Session,
    redirect_uri: url::Url,
    response_mode: oauth2_types::response_mode::ResponseMode,
    state: Option<String>,
    method: &Method,
    headers: &HeaderMap,
) -> Result<Response, RouteError> {
    let client_id = client.client_id.as_str();
    let mut params = serde_json::Map::new();
    if let Some(state) = &state {
        params.insert("state".to_owned(), serde_json::Value::String(state.clone()));
    }
    params.insert(
        "iss".to_owned(),
        serde_json::Value::String(app_state.config.authorization_endpoint.issuer_url.to_string()),
    );

    if let Some(origin) = origin_of(&redirect_uri) {
        let salt = mas_data_model::generate_code_value(&mut rand::thread_rng());
        let session_state = mas_jose::crypto::CryptoService::<dyn mas_jose::keys::KeyManager>::session_state(
            client_id,
            &origin,
            &authenticated_session.id.to_string(),
            &salt,
        );
        params.insert("session_state".to_owned(), serde_json::Value::String(session_state));
    }

    let htu = app_state
        .config
        .authorization_endpoint
        .issuer_url
        .join(mas_router::AUTHORIZATION_PATH)
        .map(|u| u.to_string())
        .unwrap_or_default();
    let dpop_jkt = dpop::resolve_jkt(&app_state.stores, headers, method, &htu)
        .await
        .or_else(|| validated.dpop_jkt.clone());

    let mut code_value = None;

    if validated.response_type.has_code() {
        let code = code::issue_code(
            &app_state.config,
            &app_state.stores,
            request_id,
            client_id,
            &authenticated_session.user_id,
            authenticated_session.id,
            redirect_uri.clone(),
            validated.scope.clone(),
            validated.nonce.clone(),
            authenticated_session.last_authentication,
            validated.code_challenge.clone(),
            dpop_jkt,
        )
        .await?;
        params.insert("code".to_owned(), serde_json::Value::String(code.clone()));
        code_value = Some(code);
    }

    let access_token = if validated.response_type.has_token() {
        Some(
            tokens::mint_access_token(
                &app_state.crypto,
                app_state.config.authorization_endpoint.issuer_url.as_str(),
                &authenticated_session.user_id,
                client_id,
                &validated.scope,
            )
            .await?,
        )
    } else {
        None
    };

    let id_token = if validated.response_type.has_id_token() {
        Some(
            tokens::mint_id_token(
                &app_state.crypto,
                app_state.config.authorization_endpoint.issuer_url.as_str(),
                &authenticated_session.user_id,
                client_id,
                authenticated_session.last_authentication,
                validated.nonce.clone(),
                None,
                code_value.as_deref(),
                access_token.as_deref(),
                Some(authenticated_session.id.to_string()),
                chrono::Duration::minutes(5),
            )
            .await?,
        )
    } else {
        None
    };

    let artifacts = tokens::artifacts_as_params(id_token, access_token, Some(tokens::ACCESS_TOKEN_TTL_SECONDS));
    params.extend(artifacts);

    Ok(response::deliver(
        app_state,
        client,
        &redirect_uri,
        response_mode,
        &serde_json::Value::Object(params),
    )
    .await
    .map_err(TerminalError::Delivery)?)
}

/// The scheme+host(+port) component `session_state` binds to, per OIDC
/// Session Management — `None` for a redirect_uri with no meaningful
/// origin (shouldn't happen for `http(s)` URLs, which is all this server
/// accepts).
fn origin_of(url: &url::Url) -> Option<String> {
    url.host_str().map(|host| match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

fn protocol_error_from_resolve(err: resolve::ResolveError) -> TerminalError {
    TerminalError::InvalidRequestObject(err.to_string())
}

fn protocol_error_from_validation(err: &validate::ValidationError) -> ProtocolError {
    use validate::ValidationError as V;
    match err {
        V::InvalidResponseType | V::UnregisteredResponseType(_) => {
            ProtocolError::unsupported_response_type()
        }
        V::InvalidScope | V::MissingOpenidScope => ProtocolError::invalid_scope(),
        _ => ProtocolError::invalid_request(),
    }
}
