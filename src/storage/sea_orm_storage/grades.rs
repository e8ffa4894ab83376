use super::{courses, exemptions, grading_queue, revisions, SeaOrmStorage};
use crate::entity::grades::{ActiveModel, Column, Entity as Grades};
use crate::entity::revisions::{
    ActiveModel as RevisionActiveModel, Entity as Revisions,
};
use crate::errors::{GradingError, Result};
use crate::grading::penalty;
use crate::grading::queue::{self, EffectiveDeadlines, GradeOutcome};
use crate::models::{
    grades::{entities::Grade, requests::GradeRevisionRequest},
    grading_queue::entities::QueueKey,
};
use crate::storage::GradeRecord;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

/// 列出修订的全部评分，按 (created_at, id) 升序
pub(super) async fn list_grades_by_revisions<C: ConnectionTrait>(
    conn: &C,
    revision_ids: &[i64],
) -> Result<Vec<Grade>> {
    if revision_ids.is_empty() {
        return Ok(Vec::new());
    }

    let result = Grades::find()
        .filter(Column::RevisionId.is_in(revision_ids.iter().copied()))
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询评分失败: {e}")))?;

    Ok(result.into_iter().map(|m| m.into_grade()).collect())
}

impl SeaOrmStorage {
    /// 评分：状态转换、追加评分记录并同步评分队列（单事务）
    pub async fn grade_revision_impl(
        &self,
        teacher_id: i64,
        req: GradeRevisionRequest,
        now: DateTime<Utc>,
    ) -> Result<GradeRecord> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradingError::database_operation(format!("开启事务失败: {e}")))?;

        let revision = revisions::find_revision(&txn, req.revision_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Revision {} not found", req.revision_id)))?;
        let previous_status = revision.status;
        let new_status = previous_status.transition_to(req.status_after_grade)?;

        let artifact = courses::find_artifact(&txn, revision.artifact_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Artifact {} not found", revision.artifact_id)))?;
        let stage = courses::find_stage(&txn, artifact.stage_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Stage {} not found", artifact.stage_id)))?;
        let task = courses::find_task(&txn, stage.task_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Task {} not found", stage.task_id)))?;

        let key = QueueKey::new(revision.artifact_id, revision.student_id);
        // 有修订就必须有队列行
        let mut entry = grading_queue::find_entry(&txn, key).await?.ok_or_else(|| {
            GradingError::not_found(format!(
                "Grading queue row ({}, {}) not found, rebuild it from history",
                key.artifact_id, key.student_id
            ))
        })?;

        // 优先使用队列中已记录的惩罚，评分对象不是当前修订时按阶段截止时间重新评估
        let penalty_percent = if entry.last_revision_id == revision.id {
            entry.penalty_percent_applied
        } else {
            let exemption =
                exemptions::find_exemption(&txn, stage.id, revision.student_id).await?;
            EffectiveDeadlines::resolve(&stage, exemption.as_ref())
                .assess(revision.created_at)
                .penalty_percent
        };
        let points_netto =
            penalty::net_points(&task, req.points, penalty_percent, req.skip_penalty);

        if new_status != previous_status {
            let mut active: RevisionActiveModel = Revisions::find_by_id(revision.id)
                .one(&txn)
                .await
                .map_err(|e| GradingError::database_operation(format!("查询修订失败: {e}")))?
                .ok_or_else(|| GradingError::not_found(format!("Revision {} not found", revision.id)))?
                .into_active_model();
            active.status = Set(new_status.to_string());
            active
                .update(&txn)
                .await
                .map_err(|e| GradingError::database_operation(format!("更新修订状态失败: {e}")))?;
        }

        let model = ActiveModel {
            revision_id: Set(revision.id),
            teacher_id: Set(teacher_id),
            points_brutto: Set(req.points),
            points_netto: Set(points_netto),
            penalty_skipped: Set(req.skip_penalty),
            status_after_grade: Set(new_status.to_string()),
            comment: Set(req.comment),
            created_at: Set(now.timestamp()),
            ..Default::default()
        };
        let grade = model
            .insert(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("创建评分失败: {e}")))?
            .into_grade();

        let expected = entry.version;
        let outcome = GradeOutcome {
            revision_id: revision.id,
            points_brutto: req.points,
            points_netto,
            status: new_status,
            penalty_waived: req.skip_penalty,
        };
        let entry = if queue::on_grade_assigned(&mut entry, &outcome) {
            Some(grading_queue::save_entry(&txn, &entry, Some(expected), now).await?)
        } else {
            debug!(
                "修订 {} 已不是当前修订，评分队列保持不变",
                revision.id
            );
            None
        };

        txn.commit()
            .await
            .map_err(|e| GradingError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(GradeRecord {
            grade,
            previous_status,
            entry,
        })
    }
}
