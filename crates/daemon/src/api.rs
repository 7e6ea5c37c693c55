// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! [`RemoteClient`] implementations over the HTTP API.

use futures_util::future::{self, BoxFuture, FutureExt};
use reqwest::Method;
use serde::Serialize;
use serde_json::json;

use ferry_core::{
    Attachment, Email, EmailFilter, EmailFlag, Persona, PersonaFilter, PersonaFlag, RemoteClient,
    RemoteError, RemoteResult,
};

use crate::http::HttpClient;

type Query = Vec<(&'static str, String)>;

/// Body of `POST emails/send`.
#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    to: &'a [String],
    cc: &'a [String],
    bcc: &'a [String],
    subject: Option<&'a str>,
    body: Option<&'a str>,
    body_plain: Option<&'a str>,
    in_reply_to: Option<&'a str>,
    persona_id: Option<&'a str>,
    attachments: &'a [Attachment],
}

impl<'a> From<&'a Email> for SendEmailBody<'a> {
    fn from(email: &'a Email) -> Self {
        SendEmailBody {
            to: &email.to,
            cc: &email.cc,
            bcc: &email.bcc,
            subject: email.subject.as_deref(),
            body: email.body.as_deref(),
            body_plain: email.body_plain.as_deref(),
            in_reply_to: email.in_reply_to.as_deref(),
            persona_id: email.persona_id.as_deref(),
            attachments: &email.attachments,
        }
    }
}

/// Body of `POST personas` and `PUT personas/{id}`.
#[derive(Debug, Serialize)]
struct PersonaBody<'a> {
    name: &'a str,
    email: &'a str,
    phone: Option<&'a str>,
    image_url: Option<&'a str>,
    bio: Option<&'a str>,
}

impl<'a> From<&'a Persona> for PersonaBody<'a> {
    fn from(persona: &'a Persona) -> Self {
        PersonaBody {
            name: &persona.name,
            email: &persona.email,
            phone: persona.phone.as_deref(),
            image_url: persona.image_url.as_deref(),
            bio: persona.bio.as_deref(),
        }
    }
}

fn page_query(page: u32, per_page: u32, search: Option<&String>) -> Query {
    let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
    if let Some(search) = search {
        query.push(("search", search.clone()));
    }
    query
}

/// Path and query for an email listing.
pub(crate) fn email_listing(filter: &EmailFilter) -> (String, Query) {
    let mut query = page_query(filter.page, filter.per_page, filter.search.as_ref());
    if let Some(from) = &filter.from {
        query.push(("from", from.clone()));
    }
    if let Some(status) = filter.status {
        query.push(("status", status.as_str().to_string()));
    }
    if let Some(starred) = filter.starred {
        query.push(("starred", starred.to_string()));
    }
    (format!("emails/{}", filter.mailbox), query)
}

/// Path and query for a persona listing.
pub(crate) fn persona_listing(filter: &PersonaFilter) -> (String, Query) {
    let mut query = page_query(filter.page, filter.per_page, filter.search.as_ref());
    if filter.trashed_only {
        return ("personas/trashed".to_string(), query);
    }
    if filter.with_trashed {
        query.push(("with_trashed", "true".to_string()));
    }
    ("personas".to_string(), query)
}

/// Email endpoints.
#[derive(Clone)]
pub struct EmailApi {
    http: HttpClient,
}

impl EmailApi {
    pub fn new(http: HttpClient) -> Self {
        EmailApi { http }
    }
}

impl RemoteClient<Email, EmailFilter> for EmailApi {
    fn fetch(&self, filter: &EmailFilter) -> BoxFuture<'_, RemoteResult<Vec<Email>>> {
        let (path, query) = email_listing(filter);
        Box::pin(async move { self.http.get(&path, &query).await })
    }

    fn fetch_one(&self, id: &str) -> BoxFuture<'_, RemoteResult<Email>> {
        let path = format!("emails/{id}");
        Box::pin(async move { self.http.get(&path, &[]).await })
    }

    fn create(&self, record: Email) -> BoxFuture<'_, RemoteResult<Email>> {
        Box::pin(async move {
            self.http
                .send(Method::POST, "emails/send", &SendEmailBody::from(&record))
                .await
        })
    }

    fn update(&self, id: &str, _record: Email) -> BoxFuture<'_, RemoteResult<Email>> {
        future::ready(Err(RemoteError::Unknown(format!(
            "email {id} cannot be edited on the server"
        ))))
        .boxed()
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, RemoteResult<Option<Email>>> {
        let path = format!("emails/{id}");
        Box::pin(async move { self.http.send_optional(Method::DELETE, &path, None).await })
    }

    fn toggle_flag(
        &self,
        id: &str,
        flag: EmailFlag,
        enabled: bool,
    ) -> BoxFuture<'_, RemoteResult<Option<Email>>> {
        let (path, body) = match flag {
            EmailFlag::Starred => (format!("emails/{id}/star"), json!({ "starred": enabled })),
            EmailFlag::Spam => (format!("emails/{id}/spam"), json!({ "spam": enabled })),
        };
        Box::pin(async move {
            self.http
                .send_optional(Method::POST, &path, Some(&body))
                .await
        })
    }
}

/// Persona endpoints.
#[derive(Clone)]
pub struct PersonaApi {
    http: HttpClient,
}

impl PersonaApi {
    pub fn new(http: HttpClient) -> Self {
        PersonaApi { http }
    }
}

impl RemoteClient<Persona, PersonaFilter> for PersonaApi {
    fn fetch(&self, filter: &PersonaFilter) -> BoxFuture<'_, RemoteResult<Vec<Persona>>> {
        let (path, query) = persona_listing(filter);
        Box::pin(async move { self.http.get(&path, &query).await })
    }

    fn fetch_one(&self, id: &str) -> BoxFuture<'_, RemoteResult<Persona>> {
        let path = format!("personas/{id}");
        Box::pin(async move { self.http.get(&path, &[]).await })
    }

    fn create(&self, record: Persona) -> BoxFuture<'_, RemoteResult<Persona>> {
        Box::pin(async move {
            self.http
                .send(Method::POST, "personas", &PersonaBody::from(&record))
                .await
        })
    }

    fn update(&self, id: &str, record: Persona) -> BoxFuture<'_, RemoteResult<Persona>> {
        let path = format!("personas/{id}");
        Box::pin(async move {
            self.http
                .send(Method::PUT, &path, &PersonaBody::from(&record))
                .await
        })
    }

    /// Permanent delete.
    fn delete(&self, id: &str) -> BoxFuture<'_, RemoteResult<Option<Persona>>> {
        let path = format!("personas/{id}/force");
        Box::pin(async move { self.http.send_optional(Method::DELETE, &path, None).await })
    }

    /// Trashing is a plain DELETE; un-trashing goes through `restore`.
    fn toggle_flag(
        &self,
        id: &str,
        flag: PersonaFlag,
        enabled: bool,
    ) -> BoxFuture<'_, RemoteResult<Option<Persona>>> {
        let (method, path) = match (flag, enabled) {
            (PersonaFlag::Trashed, true) => (Method::DELETE, format!("personas/{id}")),
            (PersonaFlag::Trashed, false) => (Method::POST, format!("personas/{id}/restore")),
        };
        Box::pin(async move { self.http.send_optional(method, &path, None).await })
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
