// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Email operations on top of the sync engine.

use chrono::{Duration, Utc};
use futures_util::stream::BoxStream;

use ferry_core::{
    Email, EmailFilter, EmailFlag, Error, Mailbox, OutgoingEmail, Record, Result, SyncState,
};

use crate::engine::{DomainSyncEngine, Mutation};
use crate::refresh::{outcome_of, RefreshReport, RefreshTarget};

pub type EmailEngine = DomainSyncEngine<Email, EmailFilter>;

#[derive(Clone)]
pub struct EmailSync {
    engine: EmailEngine,
}

impl EmailSync {
    pub fn new(engine: EmailEngine) -> Self {
        EmailSync { engine }
    }

    pub fn engine(&self) -> &EmailEngine {
        &self.engine
    }

    /// Emails matching `filter`, in its mailbox.
    pub async fn list(&self, filter: &EmailFilter) -> Result<Vec<Email>> {
        self.engine.fetch(filter).await
    }

    pub async fn inbox(&self, filter: EmailFilter) -> Result<Vec<Email>> {
        self.list(&in_mailbox(filter, Mailbox::Inbox)).await
    }

    pub async fn outbox(&self, filter: EmailFilter) -> Result<Vec<Email>> {
        self.list(&in_mailbox(filter, Mailbox::Outbox)).await
    }

    pub async fn drafts(&self, filter: EmailFilter) -> Result<Vec<Email>> {
        self.list(&in_mailbox(filter, Mailbox::Drafts)).await
    }

    pub async fn starred(&self, filter: EmailFilter) -> Result<Vec<Email>> {
        self.list(&in_mailbox(filter, Mailbox::Starred)).await
    }

    pub async fn email(&self, id: &str) -> Result<Email> {
        self.engine.fetch_one(id).await
    }

    /// Compose an email. Drafts are kept on this device; anything else is
    /// sent when the network allows.
    pub async fn send(&self, content: OutgoingEmail, is_draft: bool) -> Result<Email> {
        let record = Email::outgoing(content, is_draft, Utc::now());
        self.engine
            .mutate(Mutation::Create {
                record,
                draft: is_draft,
            })
            .await
    }

    /// Replace the content of a local draft.
    pub async fn update_draft(&self, id: &str, content: OutgoingEmail) -> Result<Email> {
        let mut draft = self
            .engine
            .cached(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("email {id}")))?;
        if !draft.is_draft() {
            return Err(Error::InvalidInput(format!(
                "email {id} is not a draft\n  hint: only drafts can be edited"
            )));
        }

        draft.to = content.to;
        draft.cc = content.cc;
        draft.bcc = content.bcc;
        draft.subject = Some(content.subject);
        draft.body = Some(content.body);
        draft.body_plain = content.body_plain;
        draft.in_reply_to = content.in_reply_to;
        draft.persona_id = content.persona_id;
        draft.attachments = content.attachments;
        draft.updated_at = Utc::now();

        self.engine
            .mutate(Mutation::Update {
                id: id.to_string(),
                record: draft,
            })
            .await
    }

    pub async fn toggle_star(&self, id: &str) -> Result<Email> {
        self.toggle(id, EmailFlag::Starred).await
    }

    pub async fn toggle_spam(&self, id: &str) -> Result<Email> {
        self.toggle(id, EmailFlag::Spam).await
    }

    async fn toggle(&self, id: &str, flag: EmailFlag) -> Result<Email> {
        self.engine
            .mutate(Mutation::ToggleFlag {
                id: id.to_string(),
                flag,
            })
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Email> {
        self.engine
            .mutate(Mutation::Delete { id: id.to_string() })
            .await
    }

    /// Drop cached emails not synced within `max_age`.
    pub async fn prune(&self, max_age: Duration) -> Result<usize> {
        self.engine.prune(Utc::now() - max_age).await
    }

    /// Unsent emails still waiting for the server.
    pub async fn pending(&self) -> Result<Vec<Email>> {
        let outbox = self.engine.store().query(&EmailFilter::outbox()).await?;
        Ok(outbox
            .into_iter()
            .filter(|e| !e.is_draft() && e.sync_state() != SyncState::Synced)
            .collect())
    }

    pub fn observe(&self, filter: EmailFilter) -> BoxStream<'static, Result<Vec<Email>>> {
        self.engine.observe(filter)
    }

    /// Refresh every mailbox in order; each failure is logged and recorded.
    pub async fn refresh_all(&self) -> RefreshReport {
        let mut report = RefreshReport::new(ferry_core::Domain::Email);
        for mailbox in Mailbox::ALL {
            let fetched = self
                .engine
                .fetch_with_source(&EmailFilter::mailbox(mailbox))
                .await;
            report.push(outcome_of(RefreshTarget::Mailbox(mailbox), fetched));
        }
        report
    }
}

fn in_mailbox(mut filter: EmailFilter, mailbox: Mailbox) -> EmailFilter {
    filter.mailbox = mailbox;
    filter
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
