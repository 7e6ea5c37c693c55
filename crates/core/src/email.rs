// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Email records and mailbox filters.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{contains_ci, Domain, Filter, Record, SyncState};

/// Direction of an email relative to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailType {
    Incoming,
    Outgoing,
}

impl EmailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailType::Incoming => "incoming",
            EmailType::Outgoing => "outgoing",
        }
    }
}

impl fmt::Display for EmailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EmailType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "incoming" => Ok(EmailType::Incoming),
            "outgoing" => Ok(EmailType::Outgoing),
            _ => Err(Error::InvalidInput(format!(
                "invalid email type: '{s}'\n  hint: valid types are: incoming, outgoing"
            ))),
        }
    }
}

/// Delivery status of an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Draft,
    Sent,
    Delivered,
    Failed,
    Read,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Draft => "draft",
            EmailStatus::Sent => "sent",
            EmailStatus::Delivered => "delivered",
            EmailStatus::Failed => "failed",
            EmailStatus::Read => "read",
        }
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EmailStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(EmailStatus::Draft),
            "sent" => Ok(EmailStatus::Sent),
            "delivered" => Ok(EmailStatus::Delivered),
            "failed" => Ok(EmailStatus::Failed),
            "read" => Ok(EmailStatus::Read),
            _ => Err(Error::InvalidInput(format!(
                "invalid email status: '{s}'\n  hint: valid statuses are: draft, sent, delivered, failed, read"
            ))),
        }
    }
}

/// File attached to an email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: Option<String>,
    pub url: Option<String>,
    pub size: u64,
    pub mime_type: String,
}

/// Flags that can be toggled on an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailFlag {
    Starred,
    Spam,
}

/// A cached email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub sender_id: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub body_plain: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub email_type: EmailType,
    pub status: EmailStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub message_id: Option<String>,
    pub in_reply_to: Option<String>,
    pub persona_id: Option<String>,
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub spam: bool,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub sync_state: SyncState,
    #[serde(default)]
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Content of an email composed on this device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub body_plain: Option<String>,
    pub in_reply_to: Option<String>,
    pub persona_id: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl Email {
    /// Build an outgoing email from composed content.
    ///
    /// The id is left empty; the sync engine assigns a local id when the
    /// record is first stored.
    pub fn outgoing(content: OutgoingEmail, is_draft: bool, now: DateTime<Utc>) -> Self {
        Email {
            id: String::new(),
            sender_id: None,
            from_email: None,
            from_name: None,
            to: content.to,
            cc: content.cc,
            bcc: content.bcc,
            subject: Some(content.subject),
            body: Some(content.body),
            body_plain: content.body_plain,
            attachments: content.attachments,
            email_type: EmailType::Outgoing,
            status: if is_draft {
                EmailStatus::Draft
            } else {
                EmailStatus::Sent
            },
            sent_at: if is_draft { None } else { Some(now) },
            message_id: None,
            in_reply_to: content.in_reply_to,
            persona_id: content.persona_id,
            starred: false,
            spam: false,
            read: true,
            created_at: now,
            updated_at: now,
            sync_state: SyncState::LocalOnly,
            last_synced_at: None,
        }
    }

    /// Returns true if this email is an unsent draft.
    pub fn is_draft(&self) -> bool {
        self.status == EmailStatus::Draft
    }
}

impl Record for Email {
    type Flag = EmailFlag;

    const DOMAIN: Domain = Domain::Email;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn sync_state(&self) -> SyncState {
        self.sync_state
    }

    fn set_sync_state(&mut self, state: SyncState) {
        self.sync_state = state;
    }

    fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    fn set_last_synced_at(&mut self, at: Option<DateTime<Utc>>) {
        self.last_synced_at = at;
    }

    fn flag(&self, flag: EmailFlag) -> bool {
        match flag {
            EmailFlag::Starred => self.starred,
            EmailFlag::Spam => self.spam,
        }
    }

    fn set_flag(&mut self, flag: EmailFlag, value: bool) {
        match flag {
            EmailFlag::Starred => self.starred = value,
            EmailFlag::Spam => self.spam = value,
        }
    }
}

/// Mailbox view an email query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mailbox {
    Inbox,
    Outbox,
    Drafts,
    Starred,
}

impl Mailbox {
    /// Refresh order used by background sync.
    pub const ALL: [Mailbox; 4] = [
        Mailbox::Inbox,
        Mailbox::Outbox,
        Mailbox::Drafts,
        Mailbox::Starred,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mailbox::Inbox => "inbox",
            Mailbox::Outbox => "outbox",
            Mailbox::Drafts => "drafts",
            Mailbox::Starred => "starred",
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mailbox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "inbox" => Ok(Mailbox::Inbox),
            "outbox" | "sent" => Ok(Mailbox::Outbox),
            "drafts" | "draft" => Ok(Mailbox::Drafts),
            "starred" => Ok(Mailbox::Starred),
            _ => Err(Error::InvalidInput(format!(
                "invalid mailbox: '{s}'\n  hint: valid mailboxes are: inbox, outbox, drafts, starred"
            ))),
        }
    }
}

/// Query over cached or remote emails.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailFilter {
    pub mailbox: Mailbox,
    pub search: Option<String>,
    pub from: Option<String>,
    pub status: Option<EmailStatus>,
    pub starred: Option<bool>,
    pub page: u32,
    pub per_page: u32,
}

impl EmailFilter {
    pub const DEFAULT_PER_PAGE: u32 = 20;

    pub fn mailbox(mailbox: Mailbox) -> Self {
        EmailFilter {
            mailbox,
            search: None,
            from: None,
            status: None,
            starred: None,
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }

    pub fn inbox() -> Self {
        Self::mailbox(Mailbox::Inbox)
    }

    pub fn outbox() -> Self {
        Self::mailbox(Mailbox::Outbox)
    }

    pub fn drafts() -> Self {
        Self::mailbox(Mailbox::Drafts)
    }

    pub fn starred() -> Self {
        Self::mailbox(Mailbox::Starred)
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_status(mut self, status: EmailStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_starred(mut self, starred: bool) -> Self {
        self.starred = Some(starred);
        self
    }

    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.max(1);
        self
    }
}

impl Filter<Email> for EmailFilter {
    fn matches(&self, email: &Email) -> bool {
        let in_mailbox = match self.mailbox {
            Mailbox::Inbox => email.email_type == EmailType::Incoming,
            Mailbox::Outbox => email.email_type == EmailType::Outgoing,
            Mailbox::Drafts => email.status == EmailStatus::Draft,
            Mailbox::Starred => email.starred,
        };
        if !in_mailbox {
            return false;
        }

        if let Some(search) = &self.search {
            if !contains_ci(email.subject.as_deref(), search)
                && !contains_ci(email.body.as_deref(), search)
            {
                return false;
            }
        }
        if let Some(from) = &self.from {
            if !contains_ci(email.from_email.as_deref(), from) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != email.status) {
            return false;
        }
        if self.starred.is_some_and(|s| s != email.starred) {
            return false;
        }
        true
    }

    fn compare(&self, a: &Email, b: &Email) -> Ordering {
        // Newest first; drafts by last edit
        let by_time = match self.mailbox {
            Mailbox::Drafts => b.updated_at.cmp(&a.updated_at),
            _ => b.created_at.cmp(&a.created_at),
        };
        by_time.then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
