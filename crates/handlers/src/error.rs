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

//! The error router: every way the authorization endpoint can fail,
//! and where each failure is allowed to be shown.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use mas_data_model::ClientMetadata;
use oauth2_types::{errors::ProtocolError, response_mode::ResponseMode};
use thiserror::Error;
use url::Url;

use crate::{response::deliver, state::AppState};

/// A failure that can still be redirected to the client, because its
/// `redirect_uri` and `response_mode` are already known and trusted.
pub struct RedirectableError {
    pub client: ClientMetadata,
    pub redirect_uri: Url,
    pub response_mode: ResponseMode,
    pub state: Option<String>,
    pub error: ProtocolError,
}

/// A failure discovered before `redirect_uri` could be trusted: the
/// client itself is unknown, or the one registered redirect_uri doesn't
/// match. These can only ever be shown on an authorization-server-hosted
/// page, never bounced back to an attacker-controlled URL.
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("unknown client")]
    UnknownClient,

    #[error("redirect_uri does not match any registered for this client")]
    UnregisteredRedirectUri,

    #[error("request object could not be verified: {0}")]
    InvalidRequestObject(String),

    #[error(transparent)]
    Storage(#[from] mas_storage::StorageError),

    #[error(transparent)]
    Crypto(#[from] mas_jose::crypto::CryptoError),

    #[error(transparent)]
    Delivery(#[from] crate::response::DeliveryError),
}

pub enum RouteError {
    Redirectable(Box<RedirectableError>),
    Terminal(TerminalError),
}

impl From<TerminalError> for RouteError {
    fn from(err: TerminalError) -> Self {
        Self::Terminal(err)
    }
}

impl From<mas_storage::StorageError> for RouteError {
    fn from(err: mas_storage::StorageError) -> Self {
        Self::Terminal(TerminalError::Storage(err))
    }
}

impl From<mas_jose::crypto::CryptoError> for RouteError {
    fn from(err: mas_jose::crypto::CryptoError) -> Self {
        Self::Terminal(TerminalError::Crypto(err))
    }
}

impl RouteError {
    #[must_use]
    pub fn redirectable(
        client: ClientMetadata,
        redirect_uri: Url,
        response_mode: ResponseMode,
        state: Option<String>,
        error: ProtocolError,
    ) -> Self {
        Self::Redirectable(Box::new(RedirectableError {
            client,
            redirect_uri,
            response_mode,
            state,
            error,
        }))
    }

    pub async fn into_response(self, app_state: &AppState) -> Response {
        match self {
            Self::Redirectable(err) => {
                let params = oauth2_types::errors::ErrorResponse::from_error(&err.error, err.state);
                match deliver(app_state, &err.client, &err.redirect_uri, err.response_mode, &params).await {
                    Ok(response) => response,
                    Err(_) => {
                        terminal_page(app_state, StatusCode::INTERNAL_SERVER_ERROR, &ProtocolError::server_error())
                            .await
                    }
                }
            }
            Self::Terminal(err) => {
                tracing::warn!(error = %err, "authorization request could not be routed to the client");
                let status = match &err {
                    TerminalError::Storage(_) | TerminalError::Crypto(_) | TerminalError::Delivery(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                    _ => StatusCode::BAD_REQUEST,
                };
                let protocol_error = match err {
                    TerminalError::UnknownClient | TerminalError::UnregisteredRedirectUri => {
                        ProtocolError::invalid_client()
                    }
                    TerminalError::InvalidRequestObject(description) => {
                        ProtocolError::invalid_request_object().with_description(description)
                    }
                    TerminalError::Storage(_) | TerminalError::Crypto(_) | TerminalError::Delivery(_) => {
                        ProtocolError::server_error()
                    }
                };
                terminal_page(app_state, status, &protocol_error).await
            }
        }
    }
}

async fn terminal_page(app_state: &AppState, status: StatusCode, error: &ProtocolError) -> Response {
    let body = app_state
        .templates
        .render_error(&error.code.to_string(), error.description.as_deref())
        .unwrap_or_else(|_| "internal server error".to_owned());
    (status, Html(body)).into_response()
}
