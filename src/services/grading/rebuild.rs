use serde_json::json;
use tracing::{error, info};

use super::GradingService;
use crate::errors::Result;
use crate::models::{
    audit::entities::AuditEventType,
    grading_queue::{
        entities::{GradingQueueEntry, QueueKey},
        responses::RebuildReport,
    },
};
use crate::services::audit::record_best_effort;

pub async fn rebuild_queue_entry(
    service: &GradingService,
    artifact_id: i64,
    student_id: i64,
) -> Result<Option<GradingQueueEntry>> {
    let storage = service.storage();
    let key = QueueKey::new(artifact_id, student_id);
    let now = service.clock().now();
    service
        .retry_on_conflict("重建评分队列", move || storage.rebuild_queue_entry(key, now))
        .await
}

/// 重建全部评分队列行，单行失败只计数不中断
pub async fn rebuild_all(service: &GradingService) -> Result<RebuildReport> {
    let keys = service.storage().list_submission_keys().await?;
    let mut report = RebuildReport::default();

    for key in keys {
        match rebuild_queue_entry(service, key.artifact_id, key.student_id).await {
            Ok(_) => report.rebuilt += 1,
            Err(e) => {
                report.failed += 1;
                error!(
                    "重建评分队列行 ({}, {}) 失败: {}",
                    key.artifact_id, key.student_id, e
                );
            }
        }
    }

    info!(
        "评分队列重建完成: 成功 {} 行，失败 {} 行",
        report.rebuilt, report.failed
    );
    record_best_effort(
        service.audit(),
        AuditEventType::QueueRebuilt,
        None,
        json!({ "rebuilt": report.rebuilt, "failed": report.failed }),
    )
    .await;

    Ok(report)
}
