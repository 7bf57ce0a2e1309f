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

//! Shared OAuth 2.0 / OIDC wire types: request and response shapes, scope
//! and prompt parsing, PKCE, and the protocol error taxonomy.

pub mod errors;
pub mod pkce;
pub mod prompt;
pub mod requests;
pub mod response_mode;
pub mod response_type;
pub mod scope;
