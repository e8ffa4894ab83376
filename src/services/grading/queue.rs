use tracing::debug;

use super::GradingService;
use crate::errors::{GradingError, Result};
use crate::models::grading_queue::{
    entities::{GradingQueueEntry, QueueKey},
    requests::QueueListQuery,
};

pub async fn get_queue_entry(
    service: &GradingService,
    artifact_id: i64,
    student_id: i64,
) -> Result<Option<GradingQueueEntry>> {
    service
        .storage()
        .get_queue_entry(QueueKey::new(artifact_id, student_id))
        .await
}

pub async fn list_stage_queue(
    service: &GradingService,
    stage_id: i64,
    query: QueueListQuery,
) -> Result<Vec<GradingQueueEntry>> {
    let storage = service.storage();
    storage
        .find_stage(stage_id)
        .await?
        .ok_or_else(|| GradingError::not_found(format!("Stage {stage_id} not found")))?;

    let entries = storage
        .list_stage_queue(stage_id, query, service.clock().now())
        .await?;
    debug!("阶段 {} 评分队列返回 {} 行", stage_id, entries.len());
    Ok(entries)
}
