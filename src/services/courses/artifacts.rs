use serde_json::json;
use tracing::info;

use super::CourseService;
use crate::errors::{GradingError, Result};
use crate::models::{
    audit::entities::AuditEventType,
    courses::{entities::Artifact, requests::CreateArtifactRequest},
};
use crate::services::audit::record_best_effort;

pub async fn create_artifact(
    service: &CourseService,
    actor_id: i64,
    request: CreateArtifactRequest,
) -> Result<Artifact> {
    let storage = service.storage();
    storage
        .find_stage(request.stage_id)
        .await?
        .ok_or_else(|| GradingError::not_found(format!("Stage {} not found", request.stage_id)))?;

    if request.name.trim().is_empty() {
        return Err(GradingError::validation("Artifact name must not be empty"));
    }
    if let Some(max) = request.max_size_bytes
        && max <= 0
    {
        return Err(GradingError::validation(format!(
            "Maximum file size must be positive, got {max}"
        )));
    }

    let artifact = storage
        .create_artifact(request, service.clock().now())
        .await?;
    info!(
        "阶段 {} 新增提交物 {} ({})",
        artifact.stage_id, artifact.id, artifact.name
    );

    record_best_effort(
        service.audit(),
        AuditEventType::ArtifactCreated,
        Some(actor_id),
        json!({
            "artifact_id": artifact.id,
            "stage_id": artifact.stage_id,
            "max_size_bytes": artifact.max_size_bytes,
            "allowed_extensions": artifact.allowed_extensions,
        }),
    )
    .await;

    Ok(artifact)
}
