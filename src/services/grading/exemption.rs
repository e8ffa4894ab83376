use serde_json::json;
use tracing::info;

use super::GradingService;
use crate::errors::Result;
use crate::models::{
    audit::entities::AuditEventType,
    exemptions::{entities::StageExemption, requests::UpsertExemptionRequest},
};
use crate::services::audit::record_best_effort;

pub async fn upsert_exemption(
    service: &GradingService,
    teacher_id: i64,
    request: UpsertExemptionRequest,
) -> Result<StageExemption> {
    let storage = service.storage();
    let now = service.clock().now();
    let record = service
        .retry_on_conflict("写入豁免", move || {
            storage.upsert_exemption(teacher_id, request.clone(), now)
        })
        .await?;

    let exemption = record.exemption;
    info!(
        "教师 {} {}阶段 {} 学生 {} 的豁免，重算队列 {} 行",
        teacher_id,
        if record.created { "创建" } else { "更新" },
        exemption.stage_id,
        exemption.student_id,
        record.recomputed_rows
    );

    record_best_effort(
        service.audit(),
        AuditEventType::ExemptionUpserted,
        Some(teacher_id),
        json!({
            "exemption_id": exemption.id,
            "stage_id": exemption.stage_id,
            "student_id": exemption.student_id,
            "allow_after_hard": exemption.allow_after_hard,
            "custom_soft": exemption.custom_soft,
            "custom_hard": exemption.custom_hard,
            "reason": exemption.reason,
            "recomputed_rows": record.recomputed_rows,
        }),
    )
    .await;

    Ok(exemption)
}
