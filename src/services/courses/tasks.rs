use serde_json::json;
use tracing::info;

use super::CourseService;
use crate::errors::{GradingError, Result};
use crate::models::{
    audit::entities::AuditEventType,
    courses::{entities::Task, requests::CreateTaskRequest, responses::WeightStatus},
};
use crate::services::audit::record_best_effort;

pub async fn create_task(
    service: &CourseService,
    actor_id: i64,
    request: CreateTaskRequest,
) -> Result<Task> {
    let storage = service.storage();
    storage
        .get_course_by_id(request.course_id)
        .await?
        .ok_or_else(|| GradingError::not_found(format!("Course {} not found", request.course_id)))?;

    if request.title.trim().is_empty() {
        return Err(GradingError::validation("Task title must not be empty"));
    }
    if let Some(max_points) = request.max_points
        && !(max_points.is_finite() && max_points > 0.0)
    {
        return Err(GradingError::validation(format!(
            "Maximum points must be positive, got {max_points}"
        )));
    }

    let task = storage.create_task(request, service.clock().now()).await?;
    info!("任务 {} ({}) 创建成功", task.id, task.title);

    record_best_effort(
        service.audit(),
        AuditEventType::TaskCreated,
        Some(actor_id),
        json!({
            "task_id": task.id,
            "course_id": task.course_id,
            "grading_mode": task.grading_mode,
        }),
    )
    .await;

    Ok(task)
}

pub async fn weight_status(service: &CourseService, task_id: i64) -> Result<WeightStatus> {
    let storage = service.storage();
    storage
        .find_task(task_id)
        .await?
        .ok_or_else(|| GradingError::not_found(format!("Task {task_id} not found")))?;

    let stages = storage.list_stages_by_task(task_id).await?;
    let current_total: i32 = stages.iter().map(|s| s.weight_percent).sum();
    Ok(WeightStatus {
        current_total,
        remaining: 100 - current_total,
        stage_count: stages.len(),
    })
}

pub async fn validate_task_weights(service: &CourseService, task_id: i64) -> Result<()> {
    let status = weight_status(service, task_id).await?;
    if !status.is_complete() {
        return Err(GradingError::validation(format!(
            "Stage weights must sum to 100%. Current total: {}%",
            status.current_total
        )));
    }
    Ok(())
}
