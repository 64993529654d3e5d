//! End-to-end ingestion tests: dedup idempotence, entitlement limits,
//! fail-secure denial, and terminal outcomes.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{job_alert_body, test_db, test_pipeline, EmailBuilder};
use trackmail::db::{application_repo, event_repo};
use trackmail::{ApplicationStatus, IngestOutcome, PipelineError};

#[tokio::test]
async fn test_first_ingestion_creates_application() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    let result = pipeline.ingest("a1", EmailBuilder::new().build()).await.unwrap();

    assert_eq!(result.outcome, IngestOutcome::Created);
    assert!(!result.duplicate);
    assert_eq!(result.status, Some(ApplicationStatus::Applied));
    let application_id = result.application_id.expect("application id");

    let row = application_repo::find_by_fingerprint(
        &db,
        "a1",
        &trackmail::fingerprint(&EmailBuilder::new().build()),
    )
    .unwrap()
    .expect("application row");
    assert_eq!(row.id, application_id);
    assert_eq!(row.company, "Acme");
    assert_eq!(row.position, "Software Engineer");
    assert_eq!(row.status, "applied");

    let events = event_repo::list_by_application(&db, &application_id).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status, "applied");
    assert_eq!(events[0].source, "email");
}

#[tokio::test]
async fn test_second_ingestion_is_duplicate_with_same_id() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    let first = pipeline.ingest("a1", EmailBuilder::new().build()).await.unwrap();
    let second = pipeline.ingest("a1", EmailBuilder::new().build()).await.unwrap();

    assert_eq!(first.outcome, IngestOutcome::Created);
    assert_eq!(second.outcome, IngestOutcome::Duplicate);
    assert!(second.duplicate);
    assert_eq!(second.application_id, first.application_id);

    // No second application row.
    assert_eq!(application_repo::count_by_account(&db, "a1").unwrap(), 1);
}

#[tokio::test]
async fn test_same_day_resend_is_duplicate_despite_time_difference() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    let morning = Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap();
    let first = pipeline
        .ingest("a1", EmailBuilder::new().received_at(morning).build())
        .await
        .unwrap();
    let second = pipeline
        .ingest(
            "a1",
            EmailBuilder::new()
                .received_at(morning + Duration::hours(9))
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(first.outcome, IngestOutcome::Created);
    assert_eq!(second.outcome, IngestOutcome::Duplicate);
}

#[tokio::test]
async fn test_duplicate_with_status_change_appends_event() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    let first = pipeline.ingest("a1", EmailBuilder::new().build()).await.unwrap();
    let application_id = first.application_id.clone().unwrap();

    // Same (sender, subject, day) triple, now carrying rejection language.
    let rejection = EmailBuilder::new()
        .text_body(
            "Thank you for your interest. Unfortunately, we have decided to \
             pursue other candidates for this position.",
        )
        .build();
    let second = pipeline.ingest("a1", rejection).await.unwrap();

    assert_eq!(second.outcome, IngestOutcome::Duplicate);
    assert_eq!(second.status, Some(ApplicationStatus::Rejected));

    let events = event_repo::list_by_application(&db, &application_id).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].status, "rejected");

    let row = application_repo::find_by_fingerprint(
        &db,
        "a1",
        &trackmail::fingerprint(&EmailBuilder::new().build()),
    )
    .unwrap()
    .unwrap();
    assert_eq!(row.status, "rejected");
}

#[tokio::test]
async fn test_duplicate_without_status_change_appends_nothing() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    let first = pipeline.ingest("a1", EmailBuilder::new().build()).await.unwrap();
    let second = pipeline.ingest("a1", EmailBuilder::new().build()).await.unwrap();
    assert_eq!(second.outcome, IngestOutcome::Duplicate);

    let events =
        event_repo::list_by_application(&db, &first.application_id.unwrap()).unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_account_at_limit_is_denied() {
    let db = test_db("a1", Some(1));
    let pipeline = test_pipeline(db.clone());

    let first = pipeline.ingest("a1", EmailBuilder::new().build()).await.unwrap();
    assert_eq!(first.outcome, IngestOutcome::Created);

    let other = EmailBuilder::new()
        .sender("careers@globex.com")
        .subject("Thank You for Applying to Globex!")
        .text_body("We received your application for Data Analyst.")
        .build();
    let second = pipeline.ingest("a1", other).await.unwrap();

    assert_eq!(second.outcome, IngestOutcome::LimitExceeded);
    assert_eq!(second.reason.as_deref(), Some("limit_reached"));
    assert_eq!(second.current_count, Some(1));
    assert_eq!(second.limit, Some(1));
    assert!(second.application_id.is_none());

    // No partial writes.
    assert_eq!(application_repo::count_by_account(&db, "a1").unwrap(), 1);
}

#[tokio::test]
async fn test_null_limit_is_unlimited() {
    let db = test_db("a1", None);
    let pipeline = test_pipeline(db.clone());

    for n in 0..30 {
        let email = EmailBuilder::new()
            .subject(&format!("Application Received - Engineer {n}"))
            .build();
        let result = pipeline.ingest("a1", email).await.unwrap();
        assert_eq!(result.outcome, IngestOutcome::Created);
    }
    assert_eq!(application_repo::count_by_account(&db, "a1").unwrap(), 30);
}

#[tokio::test]
async fn test_entitlement_fault_denies_instead_of_erroring() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    // Break the accounts table so the gate's read fails.
    db.with_conn(|conn| {
        conn.execute_batch("DROP TABLE accounts;")?;
        Ok(())
    })
    .unwrap();

    let result = pipeline.ingest("a1", EmailBuilder::new().build()).await.unwrap();
    assert_eq!(result.outcome, IngestOutcome::LimitExceeded);
    assert_eq!(result.reason.as_deref(), Some("entitlement_check_failed"));
}

#[tokio::test]
async fn test_bulk_job_alert_is_not_job_related() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    let alert = EmailBuilder::new()
        .sender("jobs-noreply@linkedin.com")
        .subject("8 new jobs matched your preferences")
        .text_body(&job_alert_body())
        .build();
    let result = pipeline.ingest("a1", alert).await.unwrap();

    assert_eq!(result.outcome, IngestOutcome::NotJobRelated);
    assert_eq!(result.reason.as_deref(), Some("not_job_related"));
    assert!(result.application_id.is_none());
    assert_eq!(application_repo::count_by_account(&db, "a1").unwrap(), 0);
}

#[tokio::test]
async fn test_unrelated_email_creates_nothing() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    let email = EmailBuilder::new()
        .sender("friend@example.com")
        .subject("Lunch on Friday?")
        .text_body("Want to grab lunch at noon?")
        .build();
    let result = pipeline.ingest("a1", email).await.unwrap();

    assert_eq!(result.outcome, IngestOutcome::NotJobRelated);
    assert_eq!(application_repo::count_by_account(&db, "a1").unwrap(), 0);
}

#[tokio::test]
async fn test_missing_subject_is_an_input_error() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    let email = EmailBuilder::new().subject("").build();
    let err = pipeline.ingest("a1", email).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));

    assert_eq!(application_repo::count_by_account(&db, "a1").unwrap(), 0);
}

#[tokio::test]
async fn test_unresolved_fields_use_unknown_placeholder() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    // Relay sender, no extractable company or position, but clear
    // application language.
    let email = EmailBuilder::new()
        .sender("noreply@myworkday.com")
        .subject("Your update")
        .text_body("Your application has been received.")
        .build();
    let result = pipeline.ingest("a1", email).await.unwrap();

    assert_eq!(result.outcome, IngestOutcome::Created);
    let row = application_repo::find_by_fingerprint(
        &db,
        "a1",
        &trackmail::fingerprint(
            &EmailBuilder::new()
                .sender("noreply@myworkday.com")
                .subject("Your update")
                .text_body("Your application has been received.")
                .build(),
        ),
    )
    .unwrap()
    .unwrap();
    assert_eq!(row.company, "Unknown Company");
    assert_eq!(row.position, "Unknown Position");
}

#[tokio::test]
async fn test_failed_event_insert_leaves_no_application_row() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    // Break the events table so the commit's second insert fails.
    db.with_conn(|conn| {
        conn.execute_batch("DROP TABLE application_events;")?;
        Ok(())
    })
    .unwrap();

    let err = pipeline.ingest("a1", EmailBuilder::new().build()).await.unwrap_err();
    assert!(matches!(err, PipelineError::Database(_)));

    // The transaction rolled back; no orphaned application without an
    // initial event.
    assert_eq!(application_repo::count_by_account(&db, "a1").unwrap(), 0);
}

#[tokio::test]
async fn test_failed_duplicate_append_keeps_status_in_sync() {
    let db = test_db("a1", Some(25));
    let pipeline = test_pipeline(db.clone());

    let first = pipeline.ingest("a1", EmailBuilder::new().build()).await.unwrap();
    assert_eq!(first.outcome, IngestOutcome::Created);

    db.with_conn(|conn| {
        conn.execute_batch("DROP TABLE application_events;")?;
        Ok(())
    })
    .unwrap();

    let rejection = EmailBuilder::new()
        .text_body(
            "Unfortunately, we have decided to pursue other candidates \
             for this position.",
        )
        .build();
    let err = pipeline.ingest("a1", rejection).await.unwrap_err();
    assert!(matches!(err, PipelineError::Database(_)));

    // The status update rolled back with the event append.
    let row = application_repo::find_by_fingerprint(
        &db,
        "a1",
        &trackmail::fingerprint(&EmailBuilder::new().build()),
    )
    .unwrap()
    .unwrap();
    assert_eq!(row.status, "applied");
}
