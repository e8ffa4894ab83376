use super::{courses, exemptions, grading_queue, users, SeaOrmStorage};
use crate::entity::revisions::{ActiveModel, Column, Entity as Revisions};
use crate::errors::{GradingError, Result};
use crate::grading::queue::{self, SubmissionContext};
use crate::models::{
    grading_queue::entities::QueueKey,
    revisions::{
        entities::{Revision, RevisionStatus},
        requests::SubmitRevisionRequest,
    },
};
use crate::storage::SubmissionRecord;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

/// 通过 ID 获取修订
pub(super) async fn find_revision<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<Revision>> {
    let result = Revisions::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询修订失败: {e}")))?;

    Ok(result.map(|m| m.into_revision()))
}

/// 列出 (artifact, student) 的全部修订，按 (created_at, id) 升序
pub(super) async fn list_revisions<C: ConnectionTrait>(
    conn: &C,
    artifact_id: i64,
    student_id: i64,
) -> Result<Vec<Revision>> {
    let result = Revisions::find()
        .filter(Column::ArtifactId.eq(artifact_id))
        .filter(Column::StudentId.eq(student_id))
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询修订失败: {e}")))?;

    Ok(result.into_iter().map(|m| m.into_revision()).collect())
}

/// 所有存在修订的 (artifact, student)
pub(super) async fn list_submission_keys<C: ConnectionTrait>(conn: &C) -> Result<Vec<QueueKey>> {
    let pairs: Vec<(i64, i64)> = Revisions::find()
        .select_only()
        .column(Column::ArtifactId)
        .column(Column::StudentId)
        .distinct()
        .order_by_asc(Column::ArtifactId)
        .order_by_asc(Column::StudentId)
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询修订失败: {e}")))?;

    Ok(pairs
        .into_iter()
        .map(|(artifact_id, student_id)| QueueKey::new(artifact_id, student_id))
        .collect())
}

impl SeaOrmStorage {
    /// 提交修订并同步评分队列（单事务）
    pub async fn submit_revision_impl(
        &self,
        student_id: i64,
        req: SubmitRevisionRequest,
        now: DateTime<Utc>,
    ) -> Result<SubmissionRecord> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradingError::database_operation(format!("开启事务失败: {e}")))?;

        let artifact = courses::find_artifact(&txn, req.artifact_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Artifact {} not found", req.artifact_id)))?;
        let stage = courses::find_stage(&txn, artifact.stage_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Stage {} not found", artifact.stage_id)))?;
        let task = courses::find_task(&txn, stage.task_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Task {} not found", stage.task_id)))?;

        // 写入前完成全部校验
        let enrollment = courses::find_enrollment(&txn, task.course_id, student_id)
            .await?
            .ok_or_else(|| {
                GradingError::validation(format!(
                    "Student {student_id} is not enrolled in course {}",
                    task.course_id
                ))
            })?;
        artifact
            .check_file(&req.original_file_name, req.size_bytes)
            .map_err(GradingError::validation)?;

        let model = ActiveModel {
            artifact_id: Set(artifact.id),
            student_id: Set(student_id),
            file_key: Set(req.file_key),
            original_file_name: Set(req.original_file_name),
            mime_type: Set(req.mime_type),
            size_bytes: Set(req.size_bytes),
            status: Set(RevisionStatus::Submitted.to_string()),
            comment: Set(req.comment),
            created_at: Set(now.timestamp()),
            ..Default::default()
        };
        let revision = model
            .insert(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("创建修订失败: {e}")))?
            .into_revision();

        let exemption = exemptions::find_exemption(&txn, stage.id, student_id).await?;
        let student_name = users::find_user_display_name(&txn, student_id).await?;
        let key = QueueKey::new(artifact.id, student_id);
        let existing = grading_queue::find_entry(&txn, key).await?;
        let expected = existing.as_ref().map(|e| e.version);

        let ctx = SubmissionContext {
            revision: &revision,
            stage: &stage,
            task: &task,
            exemption: exemption.as_ref(),
            album_number: enrollment.album_number,
            student_name,
        };
        let entry = queue::on_submission(existing, &ctx);
        let entry = grading_queue::save_entry(&txn, &entry, expected, now).await?;

        txn.commit()
            .await
            .map_err(|e| GradingError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(SubmissionRecord { revision, entry })
    }
}
