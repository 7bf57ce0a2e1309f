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

//! Turning a merged, still-untyped [`RawAuthorizationRequest`] into a
//! validated [`ValidatedRequest`], against a resolved client.

use mas_data_model::ClientMetadata;
use oauth2_types::{
    pkce::{CodeChallenge, CodeChallengeMethod, PkceError},
    prompt::{Prompt, PromptSet},
    requests::RawAuthorizationRequest,
    response_mode::ResponseMode,
    response_type::ResponseTypeSet,
    scope::{Scope, OPENID},
};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum RedirectUriError {
    #[error("redirect_uri is not a valid URL")]
    Unparseable,

    #[error("redirect_uri is not registered for this client")]
    Unregistered,

    #[error("redirect_uri is missing and this client has no single default to fall back to")]
    AmbiguousDefault,
}

/// Resolve the `redirect_uri` a request names, against a client's
/// registration: an explicit URI must match one already registered; an
/// absent one defaults to the client's sole registered URI, and is only
/// an error when the client has zero or more than one.
pub fn resolve_redirect_uri(client: &ClientMetadata, raw: &RawAuthorizationRequest) -> Result<Url, RedirectUriError> {
    match raw.redirect_uri.as_deref() {
        Some(candidate) => {
            let url = Url::parse(candidate).map_err(|_| RedirectUriError::Unparseable)?;
            if !client.allows_redirect_uri(&url) {
                return Err(RedirectUriError::Unregistered);
            }
            Ok(url)
        }
        None => match client.redirect_uris.as_slice() {
            [only] => Ok(only.clone()),
            _ => Err(RedirectUriError::AmbiguousDefault),
        },
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("response_type is missing or unparseable")]
    InvalidResponseType,

    #[error("this client is not registered for response_type {0:?}")]
    UnregisteredResponseType(String),

    #[error("scope is missing or unparseable")]
    InvalidScope,

    #[error("openid scope is required when response_type includes id_token")]
    MissingOpenidScope,

    #[error("nonce is required when response_type includes id_token")]
    MissingNonce,

    #[error(transparent)]
    Pkce(#[from] PkceError),

    #[error("PKCE is required for this client")]
    PkceRequired,

    #[error("response_mode query is not permitted for an implicit or hybrid response_type")]
    UnsafeResponseMode,

    #[error("response_mode is unparseable")]
    InvalidResponseMode,

    #[error("prompt is unparseable")]
    InvalidPrompt,

    #[error("prompt=none cannot be combined with prompt=login or prompt=consent")]
    ConflictingPrompt,
}

/// Everything about a request that has been checked against its client's
/// registration and this server's protocol rules, but not yet against a
/// user session.
pub struct ValidatedRequest {
    pub response_type: ResponseTypeSet,
    pub redirect_uri: Url,
    pub response_mode: ResponseMode,
    pub scope: Scope,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub code_challenge: Option<CodeChallenge>,
    pub prompt: PromptSet,
    pub max_age: Option<i64>,
    pub login_hint: Option<String>,
    pub acr_values: Option<String>,
    pub org_id: Option<String>,
    pub acting_as: Option<String>,
    pub dpop_jkt: Option<String>,
}

/// The default, safe `response_mode` for a given `response_type` when the
/// client didn't name one explicitly.
fn default_response_mode(response_type: &ResponseTypeSet) -> ResponseMode {
    if response_type.is_implicit_or_hybrid() {
        ResponseMode::Fragment
    } else {
        ResponseMode::Query
    }
}

/// Best-known `response_mode` for a request that hasn't been through
/// [`validate`] yet (e.g. a PAR-required rejection) — parses what it can
/// and falls back to `query` for anything unparseable or absent.
#[must_use]
pub fn best_effort_response_mode(raw: &RawAuthorizationRequest) -> ResponseMode {
    if let Some(mode) = raw.response_mode.as_deref().and_then(|s| s.parse().ok()) {
        return mode;
    }
    raw.response_type
        .as_deref()
        .and_then(|s| s.parse::<ResponseTypeSet>().ok())
        .map_or(ResponseMode::Query, |rt| default_response_mode(&rt))
}

/// Validate a request against its client, given a `redirect_uri` already
/// resolved by [`resolve_redirect_uri`]. On failure, also returns the
/// best `response_mode` known at the point of failure, so the caller can
/// bounce the error back to the right place on the client.
pub fn validate(
    client: &ClientMetadata,
    raw: &RawAuthorizationRequest,
    redirect_uri: Url,
) -> Result<ValidatedRequest, (ValidationError, ResponseMode)> {
    let response_type: ResponseTypeSet = raw
        .response_type
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or((ValidationError::InvalidResponseType, ResponseMode::Query))?;

    if !client.allows_response_type(&response_type) {
        return Err((
            ValidationError::UnregisteredResponseType(response_type.to_string()),
            default_response_mode(&response_type),
        ));
    }

    let response_mode = match raw.response_mode.as_deref() {
        Some(s) => s
            .parse()
            .map_err(|_| (ValidationError::InvalidResponseMode, default_response_mode(&response_type)))?,
        None => default_response_mode(&response_type),
    };

    if response_type.is_implicit_or_hybrid() && response_mode.base() == oauth2_types::response_mode::ResponseModeBase::Query
    {
        return Err((ValidationError::UnsafeResponseMode, response_mode));
    }

    let scope: Scope = raw
        .scope
        .as_deref()
        .and_then(|s| s.parse().ok())
        .ok_or((ValidationError::InvalidScope, response_mode))?;

    if response_type.has_id_token() && !scope.contains(OPENID) {
        return Err((ValidationError::MissingOpenidScope, response_mode));
    }

    if response_type.has_id_token() && raw.nonce.is_none() {
        return Err((ValidationError::MissingNonce, response_mode));
    }

    let code_challenge = match (&raw.code_challenge, &raw.code_challenge_method) {
        (Some(challenge), Some(method)) => {
            let method: CodeChallengeMethod = method.parse().map_err(|e: PkceError| (e.into(), response_mode))?;
            Some(CodeChallenge::validate(challenge, method).map_err(|e| (e.into(), response_mode))?)
        }
        (Some(_), None) => return Err((PkceError::UnsupportedMethod.into(), response_mode)),
        (None, _) => None,
    };

    if response_type.has_code() && client.is_public() && code_challenge.is_none() {
        return Err((ValidationError::PkceRequired, response_mode));
    }

    let prompt: PromptSet = match raw.prompt.as_deref() {
        Some(s) => s.parse().map_err(|_| (ValidationError::InvalidPrompt, response_mode))?,
        None => PromptSet::default(),
    };

    if prompt.contains(Prompt::None) && (prompt.contains(Prompt::Login) || prompt.contains(Prompt::Consent)) {
        return Err((ValidationError::ConflictingPrompt, response_mode));
    }

    Ok(ValidatedRequest {
        response_type,
        redirect_uri,
        response_mode,
        scope,
        state: raw.state.clone(),
        nonce: raw.nonce.clone(),
        code_challenge,
        prompt,
        max_age: raw.max_age.or(client.default_max_age),
        login_hint: raw.login_hint.clone(),
        acr_values: raw.acr_values.clone(),
        org_id: raw.org_id.clone(),
        acting_as: raw.acting_as.clone(),
        dpop_jkt: raw.dpop_jkt.clone(),
    })
}

#[cfg(test)]
mod tests {
    use mas_data_model::TokenEndpointAuthMethod;

    use super::*;

    fn client() -> ClientMetadata {
        ClientMetadata {
            client_id: "client1".to_owned(),
            redirect_uris: vec![Url::parse("https://app.example/callback").unwrap()],
            response_types: vec!["code".parse().unwrap(), "code id_token".parse().unwrap()],
            token_endpoint_auth_method: TokenEndpointAuthMethod::None,
            default_max_age: None,
            require_auth_time: false,
            require_pushed_authorization_requests: false,
            request_object_signing_alg: None,
            jwks: None,
            jarm: Default::default(),
        }
    }

    fn raw(response_type: &str) -> RawAuthorizationRequest {
        RawAuthorizationRequest {
            response_type: Some(response_type.to_owned()),
            redirect_uri: Some("https://app.example/callback".to_owned()),
            scope: Some("openid".to_owned()),
            nonce: Some("n1".to_owned()),
            code_challenge: Some("a".repeat(43)),
            code_challenge_method: Some("S256".to_owned()),
            ..Default::default()
        }
    }

    fn default_redirect_uri() -> Url {
        Url::parse("https://app.example/callback").unwrap()
    }

    #[test]
    fn public_client_without_pkce_is_rejected() {
        let mut request = raw("code");
        request.code_challenge = None;
        request.code_challenge_method = None;
        let client = client();
        assert!(matches!(
            validate(&client, &request, default_redirect_uri()),
            Err((ValidationError::PkceRequired, _))
        ));
    }

    #[test]
    fn id_token_without_nonce_is_rejected() {
        let mut request = raw("code id_token");
        request.nonce = None;
        assert!(matches!(
            validate(&client(), &request, default_redirect_uri()),
            Err((ValidationError::MissingNonce, _))
        ));
    }

    #[test]
    fn implicit_response_type_cannot_use_query_mode() {
        let mut request = raw("code id_token");
        request.response_mode = Some("query".to_owned());
        assert!(matches!(
            validate(&client(), &request, default_redirect_uri()),
            Err((ValidationError::UnsafeResponseMode, _))
        ));
    }

    #[test]
    fn hybrid_request_validates_successfully() {
        let request = raw("code id_token");
        let validated = validate(&client(), &request, default_redirect_uri()).unwrap();
        assert_eq!(validated.response_mode, ResponseMode::Fragment);
    }

    #[test]
    fn unregistered_response_type_is_rejected() {
        let request = raw("token");
        assert!(matches!(
            validate(&client(), &request, default_redirect_uri()),
            Err((ValidationError::UnregisteredResponseType(_), _))
        ));
    }

    #[test]
    fn redirect_uri_defaults_to_the_single_registered_uri() {
        let request = raw("code");
        let resolved = resolve_redirect_uri(&client(), &request).unwrap();
        assert_eq!(resolved, default_redirect_uri());
    }

    #[test]
    fn absent_redirect_uri_defaults_silently_when_unambiguous() {
        let mut request = raw("code");
        request.redirect_uri = None;
        let resolved = resolve_redirect_uri(&client(), &request).unwrap();
        assert_eq!(resolved, default_redirect_uri());
    }

    #[test]
    fn unregistered_redirect_uri_is_rejected() {
        let mut request = raw("code");
        request.redirect_uri = Some("https://evil.example/cb".to_owned());
        assert!(matches!(
            resolve_redirect_uri(&client(), &request),
            Err(RedirectUriError::Unregistered)
        ));
    }

    #[test]
    fn absent_redirect_uri_is_ambiguous_with_multiple_registered() {
        let mut c = client();
        c.redirect_uris.push(Url::parse("https://app.example/other").unwrap());
        let mut request = raw("code");
        request.redirect_uri = None;
        assert!(matches!(
            resolve_redirect_uri(&c, &request),
            Err(RedirectUriError::AmbiguousDefault)
        ));
    }
}
