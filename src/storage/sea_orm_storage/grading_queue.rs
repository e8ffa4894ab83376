//! 评分队列持久化
//!
//! 行内容只由 `grading::queue` 的投影函数计算，这里负责按版本号条件写回。

use std::collections::HashMap;

use super::{courses, exemptions, grades, revisions, users, SeaOrmStorage};
use crate::entity::grading_queue::{ActiveModel, Column, Entity as GradingQueue};
use crate::errors::{GradingError, Result};
use crate::grading::queue::{self, EffectiveDeadlines};
use crate::models::{
    courses::entities::{Stage, Task},
    grading_queue::{
        entities::{GradingQueueEntry, QueueKey},
        requests::{DeadlineFilter, QueueListQuery, QueueSort},
    },
};
use crate::utils::escape_like_pattern;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{LikeExpr, NullOrdering};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, ModelTrait, Order, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

/// 写入错误：唯一约束冲突视为并发首次插入
fn write_error(action: &'static str) -> impl FnOnce(DbErr) -> GradingError {
    move |e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            GradingError::conflict(format!("{action}冲突: {e}"))
        }
        _ => GradingError::database_operation(format!("{action}失败: {e}")),
    }
}

fn to_active_model(entry: &GradingQueueEntry, version: i64, now: i64) -> ActiveModel {
    ActiveModel {
        artifact_id: Set(entry.artifact_id),
        student_id: Set(entry.student_id),
        stage_id: Set(entry.stage_id),
        task_id: Set(entry.task_id),
        course_id: Set(entry.course_id),
        album_number: Set(entry.album_number.clone()),
        student_name: Set(entry.student_name.clone()),
        last_revision_id: Set(entry.last_revision_id),
        last_revision_status: Set(entry.last_revision_status.to_string()),
        last_submitted_at: Set(entry.last_submitted_at.timestamp()),
        soft_deadline: Set(entry.soft_deadline.map(|d| d.timestamp())),
        hard_deadline: Set(entry.hard_deadline.map(|d| d.timestamp())),
        late_days_started: Set(entry.late_days_started),
        penalty_percent_applied: Set(entry.penalty_percent_applied),
        penalty_waived: Set(entry.penalty_waived),
        last_points_brutto: Set(entry.last_points_brutto),
        last_points_netto: Set(entry.last_points_netto),
        last_accepted_revision_id: Set(entry.last_accepted_revision_id),
        last_accepted_points_netto: Set(entry.last_accepted_points_netto),
        flag_new_submission: Set(entry.flag_new_submission),
        version: Set(version),
        updated_at: Set(now),
    }
}

/// 按主键读取队列行
pub(super) async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    key: QueueKey,
) -> Result<Option<GradingQueueEntry>> {
    let result = GradingQueue::find_by_id((key.artifact_id, key.student_id))
        .one(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询评分队列失败: {e}")))?;

    Ok(result.map(|m| m.into_entry()))
}

/// 写回队列行
///
/// `expected_version` 为 None 表示首次插入；否则只在版本号未变时更新，
/// 否则返回 Conflict。返回带新版本号的行。
pub(super) async fn save_entry<C: ConnectionTrait>(
    conn: &C,
    entry: &GradingQueueEntry,
    expected_version: Option<i64>,
    now: DateTime<Utc>,
) -> Result<GradingQueueEntry> {
    let now = now.timestamp();
    let version = expected_version.map_or(1, |v| v + 1);
    let model = to_active_model(entry, version, now);

    match expected_version {
        None => {
            GradingQueue::insert(model)
                .exec_without_returning(conn)
                .await
                .map_err(write_error("写入评分队列"))?;
        }
        Some(expected) => {
            let result = GradingQueue::update_many()
                .set(model)
                .filter(Column::ArtifactId.eq(entry.artifact_id))
                .filter(Column::StudentId.eq(entry.student_id))
                .filter(Column::Version.eq(expected))
                .exec(conn)
                .await
                .map_err(write_error("更新评分队列"))?;

            if result.rows_affected == 0 {
                return Err(GradingError::conflict(format!(
                    "Grading queue row ({}, {}) was modified concurrently (expected version {expected})",
                    entry.artifact_id, entry.student_id
                )));
            }
        }
    }

    Ok(GradingQueueEntry {
        version,
        ..entry.clone()
    })
}

/// 重算阶段内的队列行；`student_id` 为 None 时重算该阶段全部学生
pub(super) async fn recompute_stage_rows<C: ConnectionTrait>(
    conn: &C,
    stage: &Stage,
    task: &Task,
    student_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<usize> {
    let mut select = GradingQueue::find().filter(Column::StageId.eq(stage.id));
    if let Some(student_id) = student_id {
        select = select.filter(Column::StudentId.eq(student_id));
    }
    let rows = select
        .all(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询评分队列失败: {e}")))?;

    let mut deadlines_by_student: HashMap<i64, EffectiveDeadlines> = HashMap::new();
    let mut recomputed = 0;
    for row in rows {
        let mut entry = row.into_entry();
        let deadlines = match deadlines_by_student.get(&entry.student_id) {
            Some(deadlines) => *deadlines,
            None => {
                let exemption =
                    exemptions::find_exemption(conn, stage.id, entry.student_id).await?;
                let deadlines = EffectiveDeadlines::resolve(stage, exemption.as_ref());
                deadlines_by_student.insert(entry.student_id, deadlines);
                deadlines
            }
        };

        let expected = entry.version;
        queue::recompute(&mut entry, &deadlines, task);
        save_entry(conn, &entry, Some(expected), now).await?;
        recomputed += 1;
    }

    debug!(
        "阶段 {} 重算评分队列 {} 行 (student: {:?})",
        stage.id, recomputed, student_id
    );
    Ok(recomputed)
}

impl SeaOrmStorage {
    /// 列出阶段评分队列
    pub async fn list_stage_queue_impl(
        &self,
        stage_id: i64,
        query: QueueListQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<GradingQueueEntry>> {
        let now = now.timestamp();
        let mut select = GradingQueue::find().filter(Column::StageId.eq(stage_id));

        // 状态筛选
        if let Some(status) = query.status {
            select = select.filter(Column::LastRevisionStatus.eq(status.to_string()));
        }

        if query.only_new == Some(true) {
            select = select.filter(Column::FlagNewSubmission.eq(true));
        }

        // 学号前缀（小组）
        if let Some(ref prefix) = query.album_prefix
            && !prefix.trim().is_empty()
        {
            let pattern = format!("{}%", escape_like_pattern(prefix.trim()));
            select = select.filter(Column::AlbumNumber.like(LikeExpr::new(pattern).escape('\\')));
        }

        // 截止时间筛选
        if let Some(deadline) = query.deadline {
            select = select.filter(match deadline {
                DeadlineFilter::Upcoming => Condition::all()
                    .add(Column::SoftDeadline.is_not_null())
                    .add(Column::SoftDeadline.gt(now)),
                DeadlineFilter::Overdue => Condition::all()
                    .add(Column::SoftDeadline.is_not_null())
                    .add(Column::SoftDeadline.lt(now)),
                DeadlineFilter::Critical => Condition::all()
                    .add(Column::HardDeadline.is_not_null())
                    .add(Column::HardDeadline.lt(now)),
            });
        }

        select = match query.sort_by {
            QueueSort::Deadline => {
                select.order_by_with_nulls(Column::SoftDeadline, Order::Asc, NullOrdering::Last)
            }
            QueueSort::SubmittedAt => select.order_by_asc(Column::LastSubmittedAt),
            QueueSort::Status => select.order_by_asc(Column::LastRevisionStatus),
            QueueSort::StudentName => {
                select.order_by_with_nulls(Column::StudentName, Order::Asc, NullOrdering::First)
            }
            QueueSort::Penalty => select.order_by_desc(Column::PenaltyPercentApplied),
        };

        let rows = select
            .order_by_asc(Column::StudentId)
            .order_by_asc(Column::ArtifactId)
            .all(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询评分队列失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_entry()).collect())
    }

    /// 列出学生在任务下的全部队列行
    pub async fn list_queue_by_task_student_impl(
        &self,
        task_id: i64,
        student_id: i64,
    ) -> Result<Vec<GradingQueueEntry>> {
        let rows = GradingQueue::find()
            .filter(Column::TaskId.eq(task_id))
            .filter(Column::StudentId.eq(student_id))
            .all(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询评分队列失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_entry()).collect())
    }

    /// 从修订与评分历史重建一行
    pub async fn rebuild_queue_entry_impl(
        &self,
        key: QueueKey,
        now: DateTime<Utc>,
    ) -> Result<Option<GradingQueueEntry>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradingError::database_operation(format!("开启事务失败: {e}")))?;

        let artifact = courses::find_artifact(&txn, key.artifact_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Artifact {} not found", key.artifact_id)))?;
        let stage = courses::find_stage(&txn, artifact.stage_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Stage {} not found", artifact.stage_id)))?;
        let task = courses::find_task(&txn, stage.task_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Task {} not found", stage.task_id)))?;

        let history = revisions::list_revisions(&txn, key.artifact_id, key.student_id).await?;
        let existing = GradingQueue::find_by_id((key.artifact_id, key.student_id))
            .one(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询评分队列失败: {e}")))?;

        let revision_ids: Vec<i64> = history.iter().map(|r| r.id).collect();
        let mut grades_by_revision = HashMap::new();
        for grade in grades::list_grades_by_revisions(&txn, &revision_ids).await? {
            grades_by_revision
                .entry(grade.revision_id)
                .or_insert_with(Vec::new)
                .push(grade);
        }

        let exemption = exemptions::find_exemption(&txn, stage.id, key.student_id).await?;
        let album_number = courses::find_enrollment(&txn, task.course_id, key.student_id)
            .await?
            .and_then(|e| e.album_number);
        let student_name = users::find_user_display_name(&txn, key.student_id).await?;

        let rebuilt = queue::rebuild(
            &stage,
            &task,
            exemption.as_ref(),
            album_number,
            student_name,
            &history,
            &grades_by_revision,
        );

        let saved = match (rebuilt, existing) {
            (Some(entry), existing) => {
                let expected = existing.map(|m| m.version);
                Some(save_entry(&txn, &entry, expected, now).await?)
            }
            (None, Some(stale)) => {
                // 没有修订的残留行
                stale
                    .delete(&txn)
                    .await
                    .map_err(|e| GradingError::database_operation(format!("删除评分队列失败: {e}")))?;
                None
            }
            (None, None) => None,
        };

        txn.commit()
            .await
            .map_err(|e| GradingError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(saved)
    }
}
