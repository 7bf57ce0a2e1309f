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

use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// The `response_mode` parameter, including the JARM variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub enum ResponseMode {
    Query,
    Fragment,
    FormPost,
    QueryJwt,
    FragmentJwt,
    FormPostJwt,
    Jwt,
}

impl ResponseMode {
    /// The base (non-JARM) mode the final parameters are serialized into.
    #[must_use]
    pub fn base(self) -> ResponseModeBase {
        match self {
            Self::Query | Self::QueryJwt => ResponseModeBase::Query,
            Self::Fragment | Self::FragmentJwt => ResponseModeBase::Fragment,
            Self::FormPost | Self::FormPostJwt => ResponseModeBase::FormPost,
            // Bare `jwt` defaults to fragment for implicit/hybrid flows and
            // query for code-only, resolved by the caller who knows the
            // response_type; fall back to fragment as the safer default.
            Self::Jwt => ResponseModeBase::Fragment,
        }
    }

    #[must_use]
    pub fn is_jarm(self) -> bool {
        matches!(
            self,
            Self::QueryJwt | Self::FragmentJwt | Self::FormPostJwt | Self::Jwt
        )
    }
}

/// The three wire shapes a response can take once JARM wrapping (if any)
/// has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseModeBase {
    Query,
    Fragment,
    FormPost,
}

#[derive(Debug, Error)]
#[error("unknown response_mode {0:?}")]
pub struct UnknownResponseMode(String);

impl FromStr for ResponseMode {
    type Err = UnknownResponseMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(Self::Query),
            "fragment" => Ok(Self::Fragment),
            "form_post" => Ok(Self::FormPost),
            "query.jwt" => Ok(Self::QueryJwt),
            "fragment.jwt" => Ok(Self::FragmentJwt),
            "form_post.jwt" => Ok(Self::FormPostJwt),
            "jwt" => Ok(Self::Jwt),
            other => Err(UnknownResponseMode(other.to_owned())),
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Query => "query",
            Self::Fragment => "fragment",
            Self::FormPost => "form_post",
            Self::QueryJwt => "query.jwt",
            Self::FragmentJwt => "fragment.jwt",
            Self::FormPostJwt => "form_post.jwt",
            Self::Jwt => "jwt",
        };
        f.write_str(s)
    }
}
