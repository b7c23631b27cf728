//! End-to-end intake scenarios against an in-memory backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use quotedesk_core::attribution::{self, MemoryStore};
use quotedesk_core::collaborators::{
    AccountDirectory, CodeDelivery, CollaboratorError, JobStore, Notifier, VerifyOutcome,
};
use quotedesk_core::flow::{IntakeFlow, Phase};
use quotedesk_core::identity::BindOutcome;
use quotedesk_core::models::{AuthSubject, JobCategory, JobRecord, ListingRef, NewJob};
use quotedesk_core::otp::VerifyAttempt;
use quotedesk_core::wizard::steps::{field, sentinel};
use quotedesk_core::wizard::WizardAction;

/// In-memory stand-in for every collaborator at once.
#[derive(Default)]
struct TestBackend {
    /// email → (password, user id)
    accounts: Mutex<HashMap<String, (String, String)>>,
    /// email → last issued code
    codes: Mutex<HashMap<String, String>>,
    issued: AtomicU32,
    listings: Mutex<HashMap<String, String>>, // slug → listing id
    jobs: Mutex<Vec<(String, NewJob)>>,       // (id, payload)
    notify_calls: AtomicU32,
    notify_error: Mutex<Option<String>>,
}

impl TestBackend {
    fn with_account(self, email: &str, password: &str, id: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.into(), (password.into(), id.into()));
        self
    }

    fn with_listing(self, slug: &str, id: &str) -> Self {
        self.listings.lock().unwrap().insert(slug.into(), id.into());
        self
    }

    fn failing_notifier(self, detail: &str) -> Self {
        *self.notify_error.lock().unwrap() = Some(detail.into());
        self
    }
}

#[async_trait]
impl CodeDelivery for TestBackend {
    async fn issue(&self, email: &str, _pending_ref: Option<&str>) -> Result<(), CollaboratorError> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        self.codes
            .lock()
            .unwrap()
            .insert(email.to_string(), "123456".to_string());
        Ok(())
    }

    async fn verify(
        &self,
        email: &str,
        code: &str,
        _pending_ref: Option<&str>,
    ) -> Result<VerifyOutcome, CollaboratorError> {
        match self.codes.lock().unwrap().get(email) {
            Some(expected) if expected == code => Ok(VerifyOutcome::Accepted),
            Some(_) => Err(CollaboratorError::Rejected("Incorrect password".into())),
            None => Ok(VerifyOutcome::Rejected(Some("No code issued".into()))),
        }
    }
}

#[async_trait]
impl AccountDirectory for TestBackend {
    async fn exists(&self, email: &str) -> Result<bool, CollaboratorError> {
        Ok(self.accounts.lock().unwrap().contains_key(email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSubject, CollaboratorError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((stored, id)) if stored == password => Ok(AuthSubject {
                id: id.clone(),
                email: email.to_string(),
                display_name: None,
            }),
            _ => Err(CollaboratorError::Rejected("Invalid credentials".into())),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        _role: &str,
    ) -> Result<AuthSubject, CollaboratorError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(CollaboratorError::Rejected("Email already registered".into()));
        }
        let id = format!("user-{}", accounts.len() + 1);
        accounts.insert(email.to_string(), (password.to_string(), id.clone()));
        Ok(AuthSubject {
            id,
            email: email.to_string(),
            display_name: Some(display_name.to_string()),
        })
    }
}

#[async_trait]
impl JobStore for TestBackend {
    async fn insert_job(&self, job: &NewJob) -> Result<JobRecord, CollaboratorError> {
        let mut jobs = self.jobs.lock().unwrap();
        let id = format!("job-{}", jobs.len() + 1);
        jobs.push((id.clone(), job.clone()));
        Ok(JobRecord {
            id,
            category: job.category,
            submitter_id: job.submitter_id.clone(),
            created_at: Utc::now(),
        })
    }

    async fn resolve_referral(&self, slug: &str) -> Result<ListingRef, CollaboratorError> {
        self.listings
            .lock()
            .unwrap()
            .get(slug)
            .map(|id| ListingRef { id: id.clone() })
            .ok_or_else(|| CollaboratorError::Rejected("unknown listing".into()))
    }
}

#[async_trait]
impl Notifier for TestBackend {
    async fn notify_job_live(
        &self,
        _email: &str,
        _name: &str,
        _region: &str,
        _job_id: &str,
        _category: JobCategory,
    ) -> Result<(), CollaboratorError> {
        self.notify_calls.fetch_add(1, Ordering::SeqCst);
        match self.notify_error.lock().unwrap().clone() {
            Some(detail) => Err(CollaboratorError::Rejected(detail)),
            None => Ok(()),
        }
    }
}

/// Logging is opt-in via `RUST_LOG`; repeated init calls across tests are
/// fine.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,quotedesk_core=debug".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

fn set(flow: &mut IntakeFlow, f: &str, v: &str) {
    flow.dispatch(WizardAction::SetField {
        field: f.into(),
        value: v.into(),
    });
}

/// Drive the wizard through a complete domestic draft.
fn fill_domestic(flow: &mut IntakeFlow, email: &str) {
    flow.dispatch(WizardAction::SelectCategory(JobCategory::Domestic));
    set(flow, field::PROPERTY_TYPE, "Semi-detached house");
    set(flow, field::BEDROOMS, "3");
    flow.dispatch(WizardAction::ToggleOption {
        field: field::FEATURES.into(),
        value: sentinel::NO_FEATURES.into(),
    });
    set(flow, field::COUNTY, "Galway");
    set(flow, field::TIMEFRAME, "Within 2 weeks");
    flow.dispatch(WizardAction::SetContact {
        name: Some("Ada Byrne".into()),
        email: Some(email.into()),
        phone: Some("0851234567".into()),
        postcode: Some("H91 XY23".into()),
    });
}

#[tokio::test]
async fn anonymous_new_email_domestic_submission() {
    init_tracing();
    let backend = Arc::new(TestBackend::default());
    let store = MemoryStore::default();
    let now = Utc::now();

    let mut flow = IntakeFlow::new();
    fill_domestic(&mut flow, "ada@example.com");

    assert!(flow.finish_collection(backend.as_ref(), now).await);
    assert_eq!(Phase::Verifying, flow.phase());
    assert_eq!(1, backend.issued.load(Ordering::SeqCst));

    // Enter the issued code.
    flow.verification_mut().unwrap().cells_mut().paste("123456");
    let attempt = flow.submit_code(backend.as_ref()).await.unwrap();
    assert_eq!(VerifyAttempt::Verified, attempt);
    assert_eq!(Phase::Identifying, flow.phase());

    // New email: fails toward sign-up.
    assert_eq!(Some(false), flow.resolve_identity(backend.as_ref()).await);
    let outcome = flow
        .submit_credentials(backend.as_ref(), "s3cretpass")
        .await
        .unwrap();
    assert!(matches!(outcome, BindOutcome::Bound(_)));
    assert_eq!(Phase::Submitting, flow.phase());
    assert!(backend.accounts.lock().unwrap().contains_key("ada@example.com"));

    let receipt = flow
        .submit(backend.as_ref(), backend.clone(), &store, now)
        .await
        .expect("submission succeeds");
    assert_eq!(Phase::Confirmed, flow.phase());

    let jobs = backend.jobs.lock().unwrap();
    assert_eq!(1, jobs.len());
    let (_, job) = &jobs[0];
    assert_eq!(JobCategory::Domestic, job.category);
    assert_eq!("domestic", job.attributes["category"]);
    assert_eq!(None, job.referred_by_listing_id);
    drop(jobs);

    // Notification succeeded: no email error on the confirmation.
    let email_result = receipt.email_result.await.unwrap();
    assert_eq!(None, email_result);
    assert_eq!("Ada Byrne", receipt.confirmation.name);
    assert_eq!("Galway", receipt.confirmation.region);
}

#[tokio::test]
async fn notification_failure_surfaces_banner_but_keeps_job() {
    init_tracing();
    let backend = Arc::new(TestBackend::default().failing_notifier("smtp refused"));
    let store = MemoryStore::default();
    let now = Utc::now();

    let mut flow = IntakeFlow::new();
    fill_domestic(&mut flow, "ada@example.com");
    flow.finish_collection(backend.as_ref(), now).await;
    flow.verification_mut().unwrap().cells_mut().paste("123456");
    flow.submit_code(backend.as_ref()).await;
    flow.submit_credentials(backend.as_ref(), "s3cretpass").await;

    let receipt = flow
        .submit(backend.as_ref(), backend.clone(), &store, now)
        .await
        .expect("job is live despite the email");
    let job_id = receipt.confirmation.job_id.clone();

    let mut confirmation = receipt.confirmation;
    confirmation.merge_email_result(receipt.email_result.await.unwrap());
    assert_eq!(Some("smtp refused".to_string()), confirmation.email_error);

    // Re-rendering (second submit) creates no second record.
    let second = flow
        .submit(backend.as_ref(), backend.clone(), &store, now)
        .await;
    assert!(second.is_err());
    let jobs = backend.jobs.lock().unwrap();
    assert_eq!(1, jobs.len());
    assert_eq!(job_id, jobs[0].0);
}

#[tokio::test]
async fn existing_email_wrong_password_preserves_everything() {
    init_tracing();
    let backend =
        Arc::new(TestBackend::default().with_account("ada@example.com", "rightpass", "user-9"));
    let now = Utc::now();

    let mut flow = IntakeFlow::new();
    fill_domestic(&mut flow, "ada@example.com");
    flow.finish_collection(backend.as_ref(), now).await;
    flow.verification_mut().unwrap().cells_mut().paste("123456");
    flow.submit_code(backend.as_ref()).await;

    assert_eq!(Some(true), flow.resolve_identity(backend.as_ref()).await);

    let draft_before = flow.draft().clone();
    let outcome = flow
        .submit_credentials(backend.as_ref(), "wrongpass")
        .await
        .unwrap();
    assert_eq!(BindOutcome::Rejected("Invalid credentials".into()), outcome);

    // No account mutation, no phase change, draft untouched.
    assert_eq!(Phase::Identifying, flow.phase());
    assert_eq!(
        ("rightpass".to_string(), "user-9".to_string()),
        backend.accounts.lock().unwrap()["ada@example.com"].clone()
    );
    assert_eq!(draft_before.fields, flow.draft().fields);
    assert_eq!(draft_before.contact, flow.draft().contact);

    // Retry with the corrected password proceeds without returning to step 1.
    let outcome = flow
        .submit_credentials(backend.as_ref(), "rightpass")
        .await
        .unwrap();
    assert!(matches!(outcome, BindOutcome::Bound(_)));
    assert_eq!(Phase::Submitting, flow.phase());
}

#[tokio::test]
async fn fresh_referral_is_attributed_and_stale_one_is_not() {
    init_tracing();
    let backend = Arc::new(TestBackend::default().with_listing("acme-energy", "L1"));
    let store = MemoryStore::default();
    let captured_at = Utc::now();

    attribution::capture_from_query(&store, backend.as_ref(), "?ref=acme-energy", captured_at)
        .await;

    // Within the window: the job carries the listing id.
    let mut flow = IntakeFlow::new();
    fill_domestic(&mut flow, "ada@example.com");
    flow.finish_collection(backend.as_ref(), captured_at).await;
    flow.verification_mut().unwrap().cells_mut().paste("123456");
    flow.submit_code(backend.as_ref()).await;
    flow.submit_credentials(backend.as_ref(), "s3cretpass").await;
    flow.submit(backend.as_ref(), backend.clone(), &store, captured_at)
        .await
        .unwrap();
    assert_eq!(
        Some("L1".to_string()),
        backend.jobs.lock().unwrap()[0].1.referred_by_listing_id
    );

    // 30 days later the same stored token no longer attributes.
    let later = captured_at + Duration::days(30);
    let mut flow = IntakeFlow::new();
    fill_domestic(&mut flow, "eve@example.com");
    flow.finish_collection(backend.as_ref(), later).await;
    flow.verification_mut().unwrap().cells_mut().paste("123456");
    flow.submit_code(backend.as_ref()).await;
    flow.submit_credentials(backend.as_ref(), "s3cretpass").await;
    flow.submit(backend.as_ref(), backend.clone(), &store, later)
        .await
        .unwrap();
    assert_eq!(None, backend.jobs.lock().unwrap()[1].1.referred_by_listing_id);
}

#[tokio::test]
async fn signed_in_caller_skips_verification_and_identity() {
    init_tracing();
    let backend = Arc::new(TestBackend::default());
    let store = MemoryStore::default();
    let now = Utc::now();

    let mut flow = IntakeFlow::for_signed_in(AuthSubject {
        id: "user-7".into(),
        email: "ada@example.com".into(),
        display_name: Some("Ada Byrne".into()),
    });
    fill_domestic(&mut flow, "ada@example.com");

    assert!(flow.finish_collection(backend.as_ref(), now).await);
    assert_eq!(Phase::Submitting, flow.phase());
    assert_eq!(0, backend.issued.load(Ordering::SeqCst), "no OTP issued");

    flow.submit(backend.as_ref(), backend.clone(), &store, now)
        .await
        .unwrap();
    assert_eq!("user-7", backend.jobs.lock().unwrap()[0].1.submitter_id);
}

#[tokio::test]
async fn incomplete_final_step_blocks_the_hand_off() {
    init_tracing();
    let backend = Arc::new(TestBackend::default());
    let now = Utc::now();

    let mut flow = IntakeFlow::new();
    fill_domestic(&mut flow, "ada@example.com");
    // Break the postcode prefix rule for Galway.
    flow.dispatch(WizardAction::SetContact {
        name: None,
        email: None,
        phone: None,
        postcode: Some("T12 AB34".into()),
    });

    assert!(!flow.finish_collection(backend.as_ref(), now).await);
    assert_eq!(Phase::Collecting, flow.phase());
    assert_eq!(0, backend.issued.load(Ordering::SeqCst));
}
