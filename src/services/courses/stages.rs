use serde_json::json;
use tracing::info;

use super::CourseService;
use crate::errors::{GradingError, Result};
use crate::models::{
    audit::entities::AuditEventType,
    courses::{
        entities::Stage,
        requests::{CreateStageRequest, UpdateStageRequest},
    },
};
use crate::services::{audit::record_best_effort, retry_on_conflict};

pub async fn create_stage(
    service: &CourseService,
    actor_id: i64,
    request: CreateStageRequest,
) -> Result<Stage> {
    if request.name.trim().is_empty() {
        return Err(GradingError::validation("Stage name must not be empty"));
    }

    // 权重、截止时间与惩罚参数在存储事务内校验
    let now = service.clock().now();
    let stage = service.storage().create_stage(request, now).await?;
    info!(
        "任务 {} 新增阶段 {} ({}, 权重 {}%)",
        stage.task_id, stage.id, stage.name, stage.weight_percent
    );

    record_best_effort(
        service.audit(),
        AuditEventType::StageCreated,
        Some(actor_id),
        json!({
            "stage_id": stage.id,
            "task_id": stage.task_id,
            "weight_percent": stage.weight_percent,
            "soft_deadline": stage.soft_deadline,
            "hard_deadline": stage.hard_deadline,
            "penalty": stage.penalty,
        }),
    )
    .await;

    Ok(stage)
}

pub async fn update_stage(
    service: &CourseService,
    actor_id: i64,
    stage_id: i64,
    request: UpdateStageRequest,
) -> Result<Stage> {
    let storage = service.storage();
    if let Some(ref name) = request.name
        && name.trim().is_empty()
    {
        return Err(GradingError::validation("Stage name must not be empty"));
    }

    // 合并后的值在存储事务内校验，冲突重试时会按最新的行重新校验
    let now = service.clock().now();
    let record = retry_on_conflict(service.conflict_retries(), "修改阶段", move || {
        storage.update_stage(stage_id, request.clone(), now)
    })
    .await?;

    let previous = record.previous;
    let stage = record.stage;
    info!(
        "阶段 {} 已更新，重算评分队列 {} 行",
        stage.id, record.recomputed_rows
    );

    record_best_effort(
        service.audit(),
        AuditEventType::StageUpdated,
        Some(actor_id),
        json!({
            "stage_id": stage.id,
            "old_weight_percent": previous.weight_percent,
            "new_weight_percent": stage.weight_percent,
            "penalty": stage.penalty,
        }),
    )
    .await;

    if previous.soft_deadline != stage.soft_deadline || previous.hard_deadline != stage.hard_deadline
    {
        record_best_effort(
            service.audit(),
            AuditEventType::StageDeadlinesChanged,
            Some(actor_id),
            json!({
                "stage_id": stage.id,
                "old_soft_deadline": previous.soft_deadline,
                "new_soft_deadline": stage.soft_deadline,
                "old_hard_deadline": previous.hard_deadline,
                "new_hard_deadline": stage.hard_deadline,
                "recomputed_rows": record.recomputed_rows,
            }),
        )
        .await;
    }

    Ok(stage)
}
