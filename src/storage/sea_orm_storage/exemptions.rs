use super::{courses, grading_queue, SeaOrmStorage};
use crate::entity::stage_exemptions::{ActiveModel, Column, Entity as StageExemptions};
use crate::entity::users::Entity as Users;
use crate::errors::{GradingError, Result};
use crate::models::exemptions::{entities::StageExemption, requests::UpsertExemptionRequest};
use crate::storage::ExemptionRecord;
use crate::utils::validate::validate_deadline_order;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};

/// 获取 (stage, student) 的豁免
pub(super) async fn find_exemption<C: ConnectionTrait>(
    conn: &C,
    stage_id: i64,
    student_id: i64,
) -> Result<Option<StageExemption>> {
    let result = StageExemptions::find()
        .filter(Column::StageId.eq(stage_id))
        .filter(Column::StudentId.eq(student_id))
        .one(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询豁免失败: {e}")))?;

    Ok(result.map(|m| m.into_exemption()))
}

impl SeaOrmStorage {
    /// 写入豁免（每个 (stage, student) 至多一条，后写覆盖）并重算队列
    pub async fn upsert_exemption_impl(
        &self,
        teacher_id: i64,
        req: UpsertExemptionRequest,
        now: DateTime<Utc>,
    ) -> Result<ExemptionRecord> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradingError::database_operation(format!("开启事务失败: {e}")))?;

        let stage = courses::find_stage(&txn, req.stage_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Stage {} not found", req.stage_id)))?;
        let task = courses::find_task(&txn, stage.task_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Task {} not found", stage.task_id)))?;
        Users::find_by_id(req.student_id)
            .one(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询用户失败: {e}")))?
            .ok_or_else(|| GradingError::not_found(format!("Student {} not found", req.student_id)))?;

        // 覆盖后的截止时间仍需满足 soft <= hard
        let soft = req.custom_soft.or(stage.soft_deadline);
        let hard = req.custom_hard.or(stage.hard_deadline);
        validate_deadline_order(soft, hard).map_err(GradingError::validation)?;

        let existing = StageExemptions::find()
            .filter(Column::StageId.eq(req.stage_id))
            .filter(Column::StudentId.eq(req.student_id))
            .one(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询豁免失败: {e}")))?;
        let created = existing.is_none();

        let mut model = match existing {
            Some(model) => model.into_active_model(),
            None => ActiveModel {
                stage_id: Set(req.stage_id),
                student_id: Set(req.student_id),
                ..Default::default()
            },
        };
        model.allow_after_hard = Set(req.allow_after_hard);
        model.custom_soft = Set(req.custom_soft.map(|d| d.timestamp()));
        model.custom_hard = Set(req.custom_hard.map(|d| d.timestamp()));
        model.teacher_id = Set(teacher_id);
        model.reason = Set(req.reason);
        model.created_at = Set(now.timestamp());

        let saved = if created {
            model.insert(&txn).await
        } else {
            model.update(&txn).await
        };
        let exemption = saved
            .map_err(|e| GradingError::database_operation(format!("写入豁免失败: {e}")))?
            .into_exemption();

        let recomputed_rows = grading_queue::recompute_stage_rows(
            &txn,
            &stage,
            &task,
            Some(req.student_id),
            now,
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| GradingError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(ExemptionRecord {
            exemption,
            created,
            recomputed_rows,
        })
    }
}
