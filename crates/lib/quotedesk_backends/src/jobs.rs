//! PostgreSQL-backed job persistence and referral resolution.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use quotedesk_core::collaborators::{CollaboratorError, JobStore};
use quotedesk_core::models::{JobRecord, ListingRef, NewJob};

use crate::error::BackendError;

/// `JobStore` over a PostgreSQL pool.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, job: &NewJob) -> Result<JobRecord, BackendError> {
        // Jobs are time-ordered in listings, so the id is a v7 UUID
        // generated app-side.
        let id = uuid::Uuid::now_v7();
        let created_at = sqlx::query_scalar::<_, chrono::DateTime<chrono::Utc>>(
            "INSERT INTO jobs \
             (id, category, attributes, submitter_id, referred_by_listing_id, \
              platform_fee_pence, assessor_fee_pence, \
              contact_name, contact_email, contact_phone, contact_postcode) \
             VALUES ($1, $2, $3::jsonb, $4::uuid, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING created_at",
        )
        .bind(id)
        .bind(job.category.as_str())
        .bind(job.attributes.to_string())
        .bind(&job.submitter_id)
        .bind(job.referred_by_listing_id.as_deref())
        .bind(i64::from(job.platform_fee_pence))
        .bind(i64::from(job.assessor_fee_pence))
        .bind(&job.contact.name)
        .bind(&job.contact.email)
        .bind(&job.contact.phone)
        .bind(&job.contact.postcode)
        .fetch_one(&self.pool)
        .await?;

        info!(job_id = %id, category = job.category.as_str(), "job inserted");
        Ok(JobRecord {
            id: id.to_string(),
            category: job.category,
            submitter_id: job.submitter_id.clone(),
            created_at,
        })
    }

    async fn listing_by_slug(&self, slug: &str) -> Result<ListingRef, BackendError> {
        let id = sqlx::query_scalar::<_, String>(
            "SELECT id::text FROM listings WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        match id {
            Some(id) => Ok(ListingRef { id }),
            None => Err(BackendError::Validation(format!(
                "No listing for referral '{slug}'"
            ))),
        }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn insert_job(&self, job: &NewJob) -> Result<JobRecord, CollaboratorError> {
        self.insert(job).await.map_err(CollaboratorError::from)
    }

    async fn resolve_referral(&self, slug: &str) -> Result<ListingRef, CollaboratorError> {
        self.listing_by_slug(slug)
            .await
            .map_err(CollaboratorError::from)
    }
}
