use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::classifier::{ClassificationResult, Classifier};
use crate::config::PatternConfig;
use crate::db::application_repo::{self, ApplicationRow};
use crate::db::event_repo::{self, EventRow};
use crate::db::{Database, DatabaseError};
use crate::email::{fingerprint, EmailContent};
use crate::entitlement::EntitlementGate;
use crate::extractor::Extractor;

use super::context::IngestContext;
use super::error::PipelineError;
use super::{IngestOutcome, IngestResult};

/// Placeholders stored when no candidate resolved for a field. Never
/// empty strings.
const UNKNOWN_COMPANY: &str = "Unknown Company";
const UNKNOWN_POSITION: &str = "Unknown Position";

/// Event source recorded for every pipeline-produced event.
const EVENT_SOURCE: &str = "email";

pub struct IngestPipeline {
    db: Database,
    extractor: Extractor,
    classifier: Classifier,
    gate: EntitlementGate,
}

impl IngestPipeline {
    /// Production constructor, builds all sub-components from config.
    pub fn from_config(db: Database, config: Arc<PatternConfig>) -> Self {
        let extractor = Extractor::new(config.clone());
        let classifier = Classifier::new(config);
        let gate = EntitlementGate::new(db.clone());
        Self {
            db,
            extractor,
            classifier,
            gate,
        }
    }

    /// Constructor with an injected classifier, used by tests to pin the
    /// fallback path.
    pub fn new(db: Database, extractor: Extractor, classifier: Classifier) -> Self {
        let gate = EntitlementGate::new(db.clone());
        Self {
            db,
            extractor,
            classifier,
            gate,
        }
    }

    /// Runs the full pipeline for one email. The four expected terminal
    /// outcomes are `Ok`; `Err` means invalid input or a storage fault,
    /// raised before any side effect.
    pub async fn ingest(
        &self,
        account_id: &str,
        email: EmailContent,
    ) -> Result<IngestResult, PipelineError> {
        let span = info_span!("ingest",
            account_id = %account_id,
            subject = %email.subject,
        );
        self.run_stages(IngestContext::new(account_id, email))
            .instrument(span)
            .await
    }

    async fn run_stages(&self, ctx: IngestContext) -> Result<IngestResult, PipelineError> {
        // Step 1: validate required fields.
        ctx.email.validate()?;

        // Step 2: fingerprint and dedup lookup. A lookup failure aborts;
        // proceeding blind could create a second record.
        let fp = fingerprint(&ctx.email);
        let existing = {
            let _step = info_span!("dedup").entered();
            application_repo::find_by_fingerprint(&self.db, &ctx.account_id, &fp)?
        };

        // Step 3: duplicate handling.
        if let Some(existing) = existing {
            return self.note_duplicate(&ctx, existing).await;
        }

        // Step 4: entitlement gate, immediately before the first write.
        let decision = {
            let _step = info_span!("entitlement").entered();
            self.gate.can_create(&ctx.account_id)
        };
        if !decision.allowed {
            debug!(
                "Ingestion denied for account {}: {:?}",
                ctx.account_id, decision.reason
            );
            return Ok(IngestResult {
                outcome: IngestOutcome::LimitExceeded,
                application_id: None,
                duplicate: false,
                status: None,
                reason: decision.reason,
                current_count: Some(decision.current_count),
                limit: decision.limit,
            });
        }

        // Step 5: extraction and classification.
        let extraction = {
            let _step = info_span!("extract").entered();
            self.extractor.extract(&ctx.email)
        };
        let company = extraction.company.as_ref().map(|c| c.value.as_str());
        let position = extraction.position.as_ref().map(|c| c.value.as_str());
        let classification = self
            .classifier
            .classify(&ctx.email, company, position)
            .instrument(info_span!("classify"))
            .await;

        // Step 6: not-job-related is a normal terminal outcome.
        if !classification.is_job_related {
            debug!(
                "Email not job-related ({}, confidence {})",
                classification.method.as_str(),
                classification.confidence
            );
            return Ok(IngestResult::outcome_only(
                IngestOutcome::NotJobRelated,
                "not_job_related",
            ));
        }

        // Step 7: commit the application and its initial event.
        let _step = info_span!("commit").entered();
        self.create_application(&ctx.account_id, &fp, &extraction, &classification)
    }

    fn create_application(
        &self,
        account_id: &str,
        fingerprint: &str,
        extraction: &crate::extractor::Extraction,
        classification: &ClassificationResult,
    ) -> Result<IngestResult, PipelineError> {
        let now = Utc::now().to_rfc3339();
        let application_id = Uuid::new_v4().to_string();
        let row = ApplicationRow {
            id: application_id.clone(),
            account_id: account_id.to_string(),
            fingerprint: fingerprint.to_string(),
            company: candidate_value(
                extraction.company.as_ref().map(|c| c.value.as_str()),
                UNKNOWN_COMPANY,
            ),
            position: candidate_value(
                extraction.position.as_ref().map(|c| c.value.as_str()),
                UNKNOWN_POSITION,
            ),
            source_url: extraction.source_url.as_ref().map(|c| c.value.clone()),
            status: classification.status.as_str().to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };
        let event = EventRow {
            id: Uuid::new_v4().to_string(),
            application_id: application_id.clone(),
            status: classification.status.as_str().to_string(),
            source: EVENT_SOURCE.to_string(),
            metadata: Some(serde_json::to_string(classification)?),
            created_at: now,
        };

        // Row and initial event land in one transaction, so a fault
        // between the two inserts leaves no half-written application.
        let committed = self.db.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            application_repo::insert_with(&tx, &row)?;
            event_repo::insert_with(&tx, &event)?;
            tx.commit()?;
            Ok(())
        });
        match committed {
            Ok(()) => {}
            Err(DatabaseError::DuplicateFingerprint { .. }) => {
                // Lost a concurrent create race; the winner's record is
                // the application.
                let winner =
                    application_repo::find_by_fingerprint(&self.db, account_id, fingerprint)?
                        .ok_or(DatabaseError::NotFound {
                            entity: "application",
                            id: fingerprint.to_string(),
                        })?;
                info!(
                    "Concurrent ingestion race for fingerprint {}, reusing application {}",
                    fingerprint, winner.id
                );
                let status = winner.status.clone();
                return Ok(duplicate_result(&winner, &status));
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            "Created application {} ({} / {}) with status {}",
            application_id, row.company, row.position, classification.status
        );

        Ok(IngestResult {
            outcome: IngestOutcome::Created,
            application_id: Some(application_id),
            duplicate: false,
            status: Some(classification.status),
            reason: None,
            current_count: None,
            limit: None,
        })
    }

    /// Handles a known fingerprint: classify the follow-up and append an
    /// event only when the status actually changed.
    async fn note_duplicate(
        &self,
        ctx: &IngestContext,
        existing: ApplicationRow,
    ) -> Result<IngestResult, PipelineError> {
        let company = (existing.company != UNKNOWN_COMPANY).then_some(existing.company.as_str());
        let position =
            (existing.position != UNKNOWN_POSITION).then_some(existing.position.as_str());
        let classification = self
            .classifier
            .classify(&ctx.email, company, position)
            .instrument(info_span!("classify"))
            .await;

        let mut recorded_status = existing.status.clone();
        if classification.is_job_related
            && classification.status.as_str() != existing.status.as_str()
        {
            let now = Utc::now().to_rfc3339();
            let event = EventRow {
                id: Uuid::new_v4().to_string(),
                application_id: existing.id.clone(),
                status: classification.status.as_str().to_string(),
                source: EVENT_SOURCE.to_string(),
                metadata: Some(serde_json::to_string(&classification)?),
                created_at: now.clone(),
            };
            // Event append and status update commit together; a fault
            // must not leave the row's last-known status stale.
            self.db.with_conn(|conn| {
                let tx = conn.unchecked_transaction()?;
                event_repo::insert_with(&tx, &event)?;
                application_repo::update_status_with(
                    &tx,
                    &existing.id,
                    classification.status.as_str(),
                    &now,
                )?;
                tx.commit()?;
                Ok(())
            })?;
            info!(
                "Duplicate email advanced application {} from {} to {}",
                existing.id, existing.status, classification.status
            );
            recorded_status = classification.status.as_str().to_string();
        } else {
            debug!(
                "Duplicate email for application {} brought no status change",
                existing.id
            );
        }

        Ok(duplicate_result(&existing, &recorded_status))
    }
}

fn candidate_value(value: Option<&str>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

fn duplicate_result(existing: &ApplicationRow, status: &str) -> IngestResult {
    IngestResult {
        outcome: IngestOutcome::Duplicate,
        application_id: Some(existing.id.clone()),
        duplicate: true,
        status: crate::classifier::ApplicationStatus::parse(status),
        reason: None,
        current_count: None,
        limit: None,
    }
}

