use serde_json::json;
use tracing::info;

use super::GradingService;
use crate::errors::{GradingError, Result};
use crate::models::{
    audit::entities::AuditEventType,
    grades::{entities::Grade, requests::GradeRevisionRequest},
};
use crate::services::audit::record_best_effort;

pub async fn grade_revision(
    service: &GradingService,
    teacher_id: i64,
    request: GradeRevisionRequest,
) -> Result<Grade> {
    if !request.points.is_finite() || request.points < 0.0 {
        return Err(GradingError::validation(format!(
            "Points must be a non-negative number, got {}",
            request.points
        )));
    }

    let storage = service.storage();
    let now = service.clock().now();
    let record = service
        .retry_on_conflict("评分", move || {
            storage.grade_revision(teacher_id, request.clone(), now)
        })
        .await?;

    let grade = record.grade;
    info!(
        "教师 {} 为修订 {} 评分: 原始分 {}，净分 {}，状态 {} -> {}",
        teacher_id,
        grade.revision_id,
        grade.points_brutto,
        grade.points_netto,
        record.previous_status,
        grade.status_after_grade
    );

    record_best_effort(
        service.audit(),
        AuditEventType::RevisionGraded,
        Some(teacher_id),
        json!({
            "revision_id": grade.revision_id,
            "grade_id": grade.id,
            "points_brutto": grade.points_brutto,
            "points_netto": grade.points_netto,
            "penalty_skipped": grade.penalty_skipped,
            "from_status": record.previous_status,
            "to_status": grade.status_after_grade,
            "queue_updated": record.entry.is_some(),
        }),
    )
    .await;

    Ok(grade)
}
