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

//! Protocol-level error codes, shared between the error router and the
//! JSON/redirect/JARM surfaces it renders them through.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The `error` parameter values this authorization server can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    InvalidRequestObject,
    InvalidRequestUri,
    RequestUriNotSupported,
    InvalidClient,
    InvalidScope,
    UnsupportedResponseType,
    LoginRequired,
    ConsentRequired,
    AccountSelectionRequired,
    ServerError,
}

impl ErrorCode {
    /// Whether this error may only be surfaced once `redirect_uri` has been
    /// validated against the client's registered set.
    #[must_use]
    pub fn is_redirectable(self) -> bool {
        !matches!(self, Self::InvalidClient)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidRequestObject => "invalid_request_object",
            Self::InvalidRequestUri => "invalid_request_uri",
            Self::RequestUriNotSupported => "request_uri_not_supported",
            Self::InvalidClient => "invalid_client",
            Self::InvalidScope => "invalid_scope",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::LoginRequired => "login_required",
            Self::ConsentRequired => "consent_required",
            Self::AccountSelectionRequired => "account_selection_required",
            Self::ServerError => "server_error",
        };
        f.write_str(s)
    }
}

/// A structured protocol error, carrying an optional human-readable
/// description. This is the value threaded through the orchestrator; the
/// error router decides *how* to surface it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}{}", description.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
pub struct ProtocolError {
    pub code: ErrorCode,
    pub description: Option<String>,
}

impl ProtocolError {
    #[must_use]
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

macro_rules! ctor {
    ($name:ident, $code:ident) => {
        #[must_use]
        pub fn $name() -> Self {
            Self::new(ErrorCode::$code)
        }
    };
}

impl ProtocolError {
    ctor!(invalid_request, InvalidRequest);
    ctor!(invalid_request_object, InvalidRequestObject);
    ctor!(invalid_request_uri, InvalidRequestUri);
    ctor!(request_uri_not_supported, RequestUriNotSupported);
    ctor!(invalid_client, InvalidClient);
    ctor!(invalid_scope, InvalidScope);
    ctor!(unsupported_response_type, UnsupportedResponseType);
    ctor!(login_required, LoginRequired);
    ctor!(consent_required, ConsentRequired);
    ctor!(account_selection_required, AccountSelectionRequired);
    ctor!(server_error, ServerError);
}

/// The wire shape of `{error, error_description, state}`, as serialized in
/// a JSON body, a redirect query/fragment, or the claims of a JARM JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorCode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ErrorResponse {
    #[must_use]
    pub fn from_error(error: &ProtocolError, state: Option<String>) -> Self {
        Self {
            error: error.code,
            error_description: error.description.clone(),
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_snake_case() {
        let e = ProtocolError::login_required();
        let resp = ErrorResponse::from_error(&e, Some("s1".to_owned()));
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["error"], "login_required");
        assert_eq!(v["state"], "s1");
        assert!(v.get("error_description").is_none());
    }
}
