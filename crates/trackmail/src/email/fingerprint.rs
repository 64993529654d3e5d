//! Content fingerprinting for deduplication.

use sha2::{Digest, Sha256};

use super::content::EmailContent;

/// Computes the stable deduplication fingerprint for an email.
///
/// The fingerprint is a SHA-256 over `(sender, subject, received day)`;
/// identical `(sender, subject, day)` triples always produce the same
/// value and are treated as the same email.
pub fn fingerprint(email: &EmailContent) -> String {
    let day = email.received_at.format("%Y-%m-%d");
    let canonical = format!(
        "{}|{}|{}",
        email.sender.trim().to_lowercase(),
        email.subject.trim(),
        day
    );

    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(digest)
}
