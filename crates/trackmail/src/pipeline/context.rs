use crate::email::EmailContent;

/// Input carried through one ingestion run.
pub struct IngestContext {
    pub account_id: String,
    pub email: EmailContent,
}

impl IngestContext {
    pub fn new(account_id: impl Into<String>, email: EmailContent) -> Self {
        Self {
            account_id: account_id.into(),
            email,
        }
    }
}
