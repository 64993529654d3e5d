//! Canonical inbound email representation.

use std::borrow::Cow;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use mail_parser::MessageParser;
use regex::Regex;

use super::error::{EmailError, Result};

/// Canonical email content, immutable once constructed. One instance is
/// produced per ingestion call and never persisted verbatim.
#[derive(Debug, Clone)]
pub struct EmailContent {
    /// Raw From header value, e.g. `"Acme Hiring Team" <jobs@acme.com>`.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body (may be empty when only HTML was provided).
    pub text_body: String,
    /// HTML body (may be empty).
    pub html_body: String,
    /// When the email was received.
    pub received_at: DateTime<Utc>,
}

impl EmailContent {
    /// Builds normalized content from pre-split parts, trimming whitespace.
    pub fn new(
        sender: impl Into<String>,
        subject: impl Into<String>,
        text_body: impl Into<String>,
        html_body: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sender: sender.into().trim().to_string(),
            subject: subject.into().trim().to_string(),
            text_body: text_body.into(),
            html_body: html_body.into(),
            received_at,
        }
    }

    /// Parses a raw RFC 5322 message into canonical content.
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        let message = MessageParser::default()
            .parse(raw)
            .ok_or_else(|| EmailError::ParseError("Failed to parse email message".to_string()))?;

        let sender = message
            .from()
            .and_then(|addr| addr.first())
            .map(|addr| {
                if let Some(name) = addr.name() {
                    format!("{} <{}>", name, addr.address().unwrap_or_default())
                } else {
                    addr.address().unwrap_or_default().to_string()
                }
            })
            .unwrap_or_default();

        let subject = message.subject().unwrap_or_default().to_string();
        let text_body = message.body_text(0).unwrap_or_default().to_string();
        let html_body = message.body_html(0).unwrap_or_default().to_string();

        let received_at = message
            .date()
            .and_then(|d| DateTime::parse_from_rfc3339(&d.to_rfc3339()).ok())
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(Self::new(sender, subject, text_body, html_body, received_at))
    }

    /// Checks the caller contract: sender, subject, and at least one body
    /// part must be present.
    pub fn validate(&self) -> Result<()> {
        if self.sender.is_empty() {
            return Err(EmailError::MissingField("sender"));
        }
        if self.subject.is_empty() {
            return Err(EmailError::MissingField("subject"));
        }
        if self.text_body.trim().is_empty() && self.html_body.trim().is_empty() {
            return Err(EmailError::MissingField("body"));
        }
        Ok(())
    }

    /// Returns the best available plain text: the text body when present,
    /// otherwise the HTML body stripped of markup.
    pub fn text(&self) -> Cow<'_, str> {
        if !self.text_body.trim().is_empty() {
            Cow::Borrowed(&self.text_body)
        } else {
            Cow::Owned(html_to_text(&self.html_body))
        }
    }

    /// Returns the bare address portion of the sender.
    pub fn sender_address(&self) -> &str {
        match (self.sender.find('<'), self.sender.rfind('>')) {
            (Some(start), Some(end)) if start < end => self.sender[start + 1..end].trim(),
            _ => self.sender.trim(),
        }
    }

    /// Returns the display-name portion of the sender, if any.
    pub fn sender_display_name(&self) -> Option<&str> {
        let start = self.sender.find('<')?;
        let name = self.sender[..start].trim().trim_matches('"').trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Returns the domain of the sender address.
    pub fn sender_domain(&self) -> Option<&str> {
        self.sender_address()
            .split_once('@')
            .map(|(_, domain)| domain)
            .filter(|d| !d.is_empty())
    }
}

/// Strips HTML down to plain text: removes script/style blocks and tags,
/// decodes common entities, and collapses whitespace.
pub fn html_to_text(html: &str) -> String {
    static BLOCKS: OnceLock<Regex> = OnceLock::new();
    static BREAKS: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let blocks = BLOCKS.get_or_init(|| {
        Regex::new(r"(?is)<(script|style|head)\b[^>]*>.*?</(script|style|head)>")
            .expect("static regex")
    });
    let breaks = BREAKS.get_or_init(|| {
        Regex::new(r"(?i)<(?:br\s*/?|/p|/div|/tr|/li|/h[1-6])>")
            .expect("static regex")
    });
    let tags =
        TAGS.get_or_init(|| Regex::new(r"<[^>]+>").expect("static regex"));
    let spaces = SPACES
        .get_or_init(|| Regex::new(r"[ \t]+").expect("static regex"));

    let without_blocks = blocks.replace_all(html, " ");
    let with_breaks = breaks.replace_all(&without_blocks, "\n");
    let without_tags = tags.replace_all(&with_breaks, " ");

    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let collapsed = spaces.replace_all(&decoded, " ");
    collapsed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
