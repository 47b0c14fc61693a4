//! SQL access for job rows. Status strings are validated against the
//! `JobStatus` machine before they reach a query.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobRow, JobStatus};

/// Fields for a new job. The resume snapshot is stored as given; tailoring
/// outputs arrive later through `update_job`.
pub struct NewJob<'a> {
    pub user_id: Uuid,
    pub job_description: &'a str,
    pub job_url: Option<&'a str>,
    pub selected_resume: &'a serde_json::Value,
}

/// Changes to apply to a job. `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub ai_resume: Option<serde_json::Value>,
    pub ai_cover_letter: Option<serde_json::Value>,
}

/// Inserts a job in `pending` and returns the stored row.
pub async fn insert_job(pool: &PgPool, job: NewJob<'_>) -> Result<JobRow, AppError> {
    let id = Uuid::new_v4();
    let row = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs (id, user_id, job_description, job_url, selected_resume, status)
        VALUES ($1, $2, $3, $4, $5, 'pending')
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(job.user_id)
    .bind(job.job_description)
    .bind(job.job_url)
    .bind(job.selected_resume)
    .fetch_one(pool)
    .await?;

    info!("Created job {id} for user {}", job.user_id);
    Ok(row)
}

pub async fn fetch_job(pool: &PgPool, job_id: Uuid) -> Result<JobRow, AppError> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

/// Returns a user's jobs, newest first.
pub async fn list_jobs(pool: &PgPool, user_id: Uuid) -> Result<Vec<JobRow>, AppError> {
    Ok(sqlx::query_as::<_, JobRow>(
        "SELECT * FROM jobs WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Applies a worker write-back: an optional status transition plus attached
/// tailoring outputs. Illegal transitions are rejected before the write, and
/// the write itself is pinned to the status it was validated against, so two
/// racing updates cannot both move the same row.
pub async fn update_job(
    pool: &PgPool,
    job_id: Uuid,
    update: JobUpdate,
) -> Result<JobRow, AppError> {
    let current = fetch_job(pool, job_id).await?;
    let guard = transition_guard(job_id, &current.status, update.status)?;

    sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs
        SET status = COALESCE($2, status),
            ai_resume = COALESCE($3, ai_resume),
            ai_cover_letter = COALESCE($4, ai_cover_letter),
            updated_at = now()
        WHERE id = $1 AND ($5::text IS NULL OR status = $5)
        RETURNING *
        "#,
    )
    .bind(job_id)
    .bind(update.status.map(|s| s.as_str()))
    .bind(update.ai_resume)
    .bind(update.ai_cover_letter)
    .bind(guard)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| {
        AppError::UnprocessableEntity(format!(
            "Job {job_id} changed status concurrently; fetch it again and retry"
        ))
    })
}

/// Resets a job to `pending` so the worker can pick it up again. A job that
/// is already pending is returned as-is; the caller still re-enqueues it,
/// which recovers a create whose queue push failed after the row committed.
pub async fn requeue_job(pool: &PgPool, job_id: Uuid) -> Result<JobRow, AppError> {
    let current = fetch_job(pool, job_id).await?;
    let status = JobStatus::parse(&current.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "Job {job_id} has unknown status '{}'",
            current.status
        ))
    })?;

    match requeue_write(status) {
        None => Ok(current),
        Some(next) => {
            update_job(
                pool,
                job_id,
                JobUpdate {
                    status: Some(next),
                    ..Default::default()
                },
            )
            .await
        }
    }
}

/// Validates a requested transition and returns the status the row must
/// still hold when the update runs. Output-only updates carry no guard;
/// they do not race the status machine.
fn transition_guard<'a>(
    job_id: Uuid,
    current: &'a str,
    requested: Option<JobStatus>,
) -> Result<Option<&'a str>, AppError> {
    let next = match requested {
        Some(next) => next,
        None => return Ok(None),
    };
    let current_status = JobStatus::parse(current).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "Job {job_id} has unknown status '{current}'"
        ))
    })?;
    if !current_status.can_transition_to(next) {
        return Err(AppError::UnprocessableEntity(format!(
            "Job {job_id} cannot move from {current_status} to {next}"
        )));
    }
    info!("Job {job_id}: {current_status} -> {next}");
    Ok(Some(current))
}

/// The status write a requeue needs, if any. A pending job needs none: the
/// requeue is enqueue-only and must still succeed, not 422.
fn requeue_write(current: JobStatus) -> Option<JobStatus> {
    (current != JobStatus::Pending).then_some(JobStatus::Pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_guard_pins_validated_status() {
        let id = Uuid::new_v4();
        let guard = transition_guard(id, "processing", Some(JobStatus::Completed)).unwrap();
        assert_eq!(guard, Some("processing"));
    }

    #[test]
    fn test_transition_guard_rejects_illegal_move() {
        let id = Uuid::new_v4();
        let result = transition_guard(id, "pending", Some(JobStatus::Completed));
        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
    }

    #[test]
    fn test_output_only_update_carries_no_guard() {
        let id = Uuid::new_v4();
        assert_eq!(transition_guard(id, "processing", None).unwrap(), None);
    }

    #[test]
    fn test_pending_requeue_is_enqueue_only() {
        // A pending row is what a create with a failed queue push leaves
        // behind; requeue must put it back on the queue, not 422.
        assert_eq!(requeue_write(JobStatus::Pending), None);
        for status in [
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
        ] {
            assert_eq!(requeue_write(status), Some(JobStatus::Pending));
        }
    }
}
