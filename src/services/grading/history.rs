use std::collections::HashMap;

use super::GradingService;
use crate::errors::{GradingError, Result};
use crate::models::revisions::responses::{RevisionHistoryItem, RevisionHistoryResponse};

pub async fn revision_history(
    service: &GradingService,
    artifact_id: i64,
    student_id: i64,
) -> Result<RevisionHistoryResponse> {
    let storage = service.storage();
    storage
        .find_artifact(artifact_id)
        .await?
        .ok_or_else(|| GradingError::not_found(format!("Artifact {artifact_id} not found")))?;

    let revisions = storage.list_revisions(artifact_id, student_id).await?;
    let revision_ids: Vec<i64> = revisions.iter().map(|r| r.id).collect();
    let mut grades_by_revision: HashMap<i64, Vec<_>> = HashMap::new();
    for grade in storage.list_grades_by_revisions(&revision_ids).await? {
        grades_by_revision
            .entry(grade.revision_id)
            .or_default()
            .push(grade);
    }

    // 最新修订在前，评分按时间升序
    let items = revisions
        .into_iter()
        .rev()
        .map(|revision| RevisionHistoryItem {
            grades: grades_by_revision.remove(&revision.id).unwrap_or_default(),
            revision,
        })
        .collect();

    Ok(RevisionHistoryResponse {
        artifact_id,
        student_id,
        items,
    })
}
