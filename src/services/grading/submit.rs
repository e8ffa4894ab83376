use serde_json::json;
use tracing::info;

use super::GradingService;
use crate::errors::{GradingError, Result};
use crate::models::{
    audit::entities::AuditEventType,
    revisions::{entities::Revision, requests::SubmitRevisionRequest},
};
use crate::services::audit::record_best_effort;

pub async fn submit_revision(
    service: &GradingService,
    student_id: i64,
    request: SubmitRevisionRequest,
) -> Result<Revision> {
    if request.file_key.trim().is_empty() {
        return Err(GradingError::validation("File key must not be empty"));
    }
    if request.original_file_name.trim().is_empty() {
        return Err(GradingError::validation("Original file name must not be empty"));
    }
    if let Some(size) = request.size_bytes
        && size < 0
    {
        return Err(GradingError::validation("File size must not be negative"));
    }

    let storage = service.storage();
    let now = service.clock().now();
    let record = service
        .retry_on_conflict("提交修订", move || {
            storage.submit_revision(student_id, request.clone(), now)
        })
        .await?;

    let revision = record.revision;
    let entry = record.entry;
    info!(
        "学生 {} 提交提交物 {} 的修订 {}，迟交 {} 天，惩罚 {}%",
        student_id,
        revision.artifact_id,
        revision.id,
        entry.late_days_started,
        entry.penalty_percent_applied
    );

    record_best_effort(
        service.audit(),
        AuditEventType::RevisionSubmitted,
        Some(student_id),
        json!({
            "revision_id": revision.id,
            "artifact_id": revision.artifact_id,
            "stage_id": entry.stage_id,
            "late_days_started": entry.late_days_started,
            "penalty_percent": entry.penalty_percent_applied,
        }),
    )
    .await;

    Ok(revision)
}
