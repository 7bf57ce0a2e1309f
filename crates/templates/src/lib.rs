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

//! The handful of HTML surfaces the authorization endpoint renders
//! itself, rather than handing off to the login/consent UI: the
//! `form_post` response-mode auto-submitting form, and the terminal
//! error page for errors that can't be redirected to a client.

use std::collections::BTreeMap;

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

const FORM_POST_TEMPLATE: &str = include_str!("../templates/form_post.html");
const ERROR_TEMPLATE: &str = include_str!("../templates/error.html");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Tera(#[from] tera::Error),
}

#[derive(Serialize)]
struct FormPostContext<'a> {
    redirect_uri: &'a str,
    params: &'a BTreeMap<String, String>,
    csp_nonce: &'a str,
}

#[derive(Serialize)]
struct ErrorContext<'a> {
    error: &'a str,
    error_description: Option<&'a str>,
}

/// Owns the compiled template set. Built once at startup; `Tera::render`
/// is safe to call concurrently from many request handlers.
#[derive(Clone)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn load() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_template("form_post.html", FORM_POST_TEMPLATE)?;
        tera.add_raw_template("error.html", ERROR_TEMPLATE)?;
        Ok(Self { tera })
    }

    /// Render the `form_post` response mode body (OAuth 2.0 Form Post
    /// Response Mode): an HTML page that submits `params` to
    /// `redirect_uri` via a hidden form, auto-triggered by JavaScript
    /// allowed under `csp_nonce`.
    pub fn render_form_post(
        &self,
        redirect_uri: &str,
        params: &BTreeMap<String, String>,
        csp_nonce: &str,
    ) -> Result<String, TemplateError> {
        let context = Context::from_serialize(FormPostContext {
            redirect_uri,
            params,
            csp_nonce,
        })?;
        Ok(self.tera.render("form_post.html", &context)?)
    }

    /// Render the terminal error page shown when an error can't be
    /// redirected back to the client (unknown client, unregistered
    /// redirect_uri).
    pub fn render_error(
        &self,
        error: &str,
        error_description: Option<&str>,
    ) -> Result<String, TemplateError> {
        let context = Context::from_serialize(ErrorContext {
            error,
            error_description,
        })?;
        Ok(self.tera.render("error.html", &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_post_embeds_every_param_as_a_hidden_input() {
        let templates = Templates::load().unwrap();
        let mut params = BTreeMap::new();
        params.insert("code".to_owned(), "abc".to_owned());
        params.insert("state".to_owned(), "xyz".to_owned());

        let html = templates
            .render_form_post("https://app.example/callback", &params, "nonce123")
            .unwrap();

        assert!(html.contains(r#"name="code""#));
        assert!(html.contains(r#"value="abc""#));
        assert!(html.contains("nonce123"));
        assert!(html.contains("https://app.example/callback"));
    }

    #[test]
    fn error_page_renders_description_when_present() {
        let templates = Templates::load().unwrap();
        let html = templates
            .render_error("invalid_client", Some("unknown client_id"))
            .unwrap();
        assert!(html.contains("invalid_client"));
        assert!(html.contains("unknown client_id"));
    }
}
