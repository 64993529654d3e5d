//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use trackmail::db::account_repo::{self, AccountRow};
use trackmail::db::Database;
use trackmail::{Classifier, EmailContent, Extractor, IngestPipeline, PatternConfig};

/// Builder for `EmailContent` instances.
pub struct EmailBuilder {
    sender: String,
    subject: String,
    text_body: String,
    html_body: String,
    received_at: DateTime<Utc>,
}

impl EmailBuilder {
    /// Creates a builder with a plausible application-confirmation email.
    pub fn new() -> Self {
        Self {
            sender: "jobs@acme.com".to_string(),
            subject: "Application Received - Software Engineer".to_string(),
            text_body: "Thank you for applying to Acme. We received your application."
                .to_string(),
            html_body: String::new(),
            received_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
        }
    }

    pub fn sender(mut self, sender: &str) -> Self {
        self.sender = sender.to_string();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    pub fn text_body(mut self, body: &str) -> Self {
        self.text_body = body.to_string();
        self
    }

    pub fn html_body(mut self, body: &str) -> Self {
        self.html_body = body.to_string();
        self
    }

    pub fn received_at(mut self, when: DateTime<Utc>) -> Self {
        self.received_at = when;
        self
    }

    pub fn build(self) -> EmailContent {
        EmailContent::new(
            self.sender,
            self.subject,
            self.text_body,
            self.html_body,
            self.received_at,
        )
    }
}

impl Default for EmailBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Opens an in-memory database with one account seeded.
pub fn test_db(account_id: &str, plan_limit: Option<i64>) -> Database {
    let db = Database::open_in_memory().expect("Failed to create test database");
    seed_account(&db, account_id, plan_limit);
    db
}

/// Inserts an account row.
pub fn seed_account(db: &Database, account_id: &str, plan_limit: Option<i64>) {
    account_repo::insert(
        db,
        &AccountRow {
            id: account_id.to_string(),
            email: format!("{account_id}@example.com"),
            plan_limit,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        },
    )
    .expect("Failed to seed account");
}

/// Builds a pipeline over `db` using the embedded pattern tables and no
/// AI path, so classification is fully deterministic.
pub fn test_pipeline(db: Database) -> IngestPipeline {
    let config = Arc::new(PatternConfig::embedded().expect("embedded patterns load"));
    let extractor = Extractor::new(config.clone());
    let classifier = Classifier::without_ai(config);
    IngestPipeline::new(db, extractor, classifier)
}

/// A bulk job-alert body with more outbound links than the filter
/// threshold.
pub fn job_alert_body() -> String {
    (1..=8)
        .map(|n| format!("https://jobs.example.com/view/{n}"))
        .collect::<Vec<_>>()
        .join("\n")
}
