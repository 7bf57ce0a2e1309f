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

/// A single member of the space-separated `prompt` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Prompt {
    None,
    Login,
    Consent,
    SelectAccount,
}

#[derive(Debug, Error)]
#[error("unknown prompt value {0:?}")]
pub struct UnknownPrompt(String);

impl FromStr for Prompt {
    type Err = UnknownPrompt;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "login" => Ok(Self::Login),
            "consent" => Ok(Self::Consent),
            "select_account" => Ok(Self::SelectAccount),
            other => Err(UnknownPrompt(other.to_owned())),
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Login => "login",
            Self::Consent => "consent",
            Self::SelectAccount => "select_account",
        };
        f.write_str(s)
    }
}

/// The parsed `prompt` set.
#[derive(Debug, Clone, Default, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct PromptSet(BTreeSet<Prompt>);

impl PromptSet {
    #[must_use]
    pub fn contains(&self, member: Prompt) -> bool {
        self.0.contains(&member)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prompt> {
        self.0.iter()
    }
}

impl FromStr for PromptSet {
    type Err = UnknownPrompt;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let members = s
            .split_whitespace()
            .map(Prompt::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self(members))
    }
}

impl fmt::Display for PromptSet {
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
    fn none_alone_is_common_case() {
        let p: PromptSet = "none".parse().unwrap();
        assert!(p.contains(Prompt::None));
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn rejects_unknown_value() {
        assert!(PromptSet::from_str("none bogus").is_err());
    }
}
