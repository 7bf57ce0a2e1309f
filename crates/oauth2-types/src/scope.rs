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

//! The space-separated `scope` parameter, as a set of tokens.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// A single scope token, e.g. `openid` or `urn:matrix:org.matrix.msc2967.client:api:*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeToken(String);

/// The well-known `openid` scope token.
pub const OPENID: &str = "openid";
pub const PROFILE: &str = "profile";
pub const EMAIL: &str = "email";
pub const ADDRESS: &str = "address";
pub const PHONE: &str = "phone";
pub const OFFLINE_ACCESS: &str = "offline_access";

#[derive(Debug, Error)]
#[error("invalid scope token {0:?}")]
pub struct InvalidScopeToken(String);

impl FromStr for ScopeToken {
    type Err = InvalidScopeToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.contains(char::is_whitespace) {
            return Err(InvalidScopeToken(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }
}

impl fmt::Display for ScopeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ScopeToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A parsed, de-duplicated `scope` parameter.
///
/// Duplicate tokens collapse into one: the source is a space-separated
/// string and nothing in the protocol gives duplicates meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct Scope(BTreeSet<ScopeToken>);

impl Scope {
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t.as_ref() == token)
    }

    #[must_use]
    pub fn is_subset_of(&self, other: &Scope) -> bool {
        self.0.iter().all(|t| other.0.contains(t))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopeToken> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ScopeToken> for Scope {
    fn from_iter<T: IntoIterator<Item = ScopeToken>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for Scope {
    type Err = InvalidScopeToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = s
            .split_whitespace()
            .map(ScopeToken::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self(tokens))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for token in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            fmt::Display::fmt(token, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_dedupes() {
        let scope: Scope = "openid openid profile".parse().unwrap();
        assert_eq!(scope.iter().count(), 2);
        assert!(scope.contains(OPENID));
        assert!(scope.contains(PROFILE));
    }

    #[test]
    fn subset_check() {
        let requested: Scope = "openid profile".parse().unwrap();
        let granted: Scope = "openid profile email".parse().unwrap();
        assert!(requested.is_subset_of(&granted));
        assert!(!granted.is_subset_of(&requested));
    }

    #[test]
    fn rejects_embedded_whitespace_in_token() {
        assert!(ScopeToken::from_str("foo bar").is_err());
    }
}
