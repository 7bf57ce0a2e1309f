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

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// A single member of the space-separated `response_type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResponseType {
    Code,
    IdToken,
    Token,
}

#[derive(Debug, Error)]
#[error("unknown response_type member {0:?}")]
pub struct UnknownResponseType(String);

impl FromStr for ResponseType {
    type Err = UnknownResponseType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(Self::Code),
            "id_token" => Ok(Self::IdToken),
            "token" => Ok(Self::Token),
            other => Err(UnknownResponseType(other.to_owned())),
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Code => "code",
            Self::IdToken => "id_token",
            Self::Token => "token",
        };
        f.write_str(s)
    }
}

/// The parsed, space-separated `response_type` set.
#[derive(Debug, Clone, Default, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct ResponseTypeSet(BTreeSet<ResponseType>);

impl ResponseTypeSet {
    #[must_use]
    pub fn contains(&self, member: ResponseType) -> bool {
        self.0.contains(&member)
    }

    #[must_use]
    pub fn has_code(&self) -> bool {
        self.contains(ResponseType::Code)
    }

    #[must_use]
    pub fn has_id_token(&self) -> bool {
        self.contains(ResponseType::IdToken)
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.contains(ResponseType::Token)
    }

    /// Whether this response type returns any artifact directly in the
    /// authorization response, rather than only via a code.
    #[must_use]
    pub fn is_implicit_or_hybrid(&self) -> bool {
        self.has_id_token() || self.has_token()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for ResponseTypeSet {
    type Err = UnknownResponseType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let members = s
            .split_whitespace()
            .map(ResponseType::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self(members))
    }
}

impl fmt::Display for ResponseTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for member in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            fmt::Display::fmt(member, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hybrid_detection() {
        let rt: ResponseTypeSet = "code id_token".parse().unwrap();
        assert!(rt.has_code());
        assert!(rt.has_id_token());
        assert!(!rt.has_token());
        assert!(rt.is_implicit_or_hybrid());
    }

    #[test]
    fn code_only_is_not_implicit() {
        let rt: ResponseTypeSet = "code".parse().unwrap();
        assert!(!rt.is_implicit_or_hybrid());
    }
}
