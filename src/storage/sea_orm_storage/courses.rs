use super::{grading_queue, SeaOrmStorage};
use crate::entity::artifacts::{
    self, ActiveModel as ArtifactActiveModel, Entity as Artifacts, extensions_to_csv,
};
use crate::entity::course_students::{
    self, ActiveModel as CourseStudentActiveModel, Entity as CourseStudents,
};
use crate::entity::courses::{ActiveModel as CourseActiveModel, Entity as Courses};
use crate::entity::stages::{self, ActiveModel as StageActiveModel, Entity as Stages};
use crate::entity::tasks::{ActiveModel as TaskActiveModel, Entity as Tasks};
use crate::errors::{GradingError, Result};
use crate::models::courses::{
    entities::{Artifact, Course, Enrollment, GradingMode, PenaltyPolicy, Stage, Task},
    requests::{
        CreateArtifactRequest, CreateCourseRequest, CreateStageRequest, CreateTaskRequest,
        EnrollStudentRequest, UpdateStageRequest,
    },
};
use crate::storage::StageUpdateRecord;
use crate::utils::validate::{
    validate_deadline_order, validate_deadlines, validate_penalty_params, validate_weight,
    validate_weight_total,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

/// 获取选课记录
pub(super) async fn find_enrollment<C: ConnectionTrait>(
    conn: &C,
    course_id: i64,
    student_id: i64,
) -> Result<Option<Enrollment>> {
    let result = CourseStudents::find()
        .filter(course_students::Column::CourseId.eq(course_id))
        .filter(course_students::Column::StudentId.eq(student_id))
        .one(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询选课记录失败: {e}")))?;

    Ok(result.map(|m| m.into_enrollment()))
}

pub(super) async fn find_task<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<Task>> {
    let result = Tasks::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询任务失败: {e}")))?;

    Ok(result.map(|m| m.into_task()))
}

pub(super) async fn find_stage<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<Stage>> {
    let result = Stages::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询阶段失败: {e}")))?;

    Ok(result.map(|m| m.into_stage()))
}

/// 列出任务的阶段，按 ID 升序
pub(super) async fn list_stages_by_task<C: ConnectionTrait>(
    conn: &C,
    task_id: i64,
) -> Result<Vec<Stage>> {
    let result = Stages::find()
        .filter(stages::Column::TaskId.eq(task_id))
        .order_by_asc(stages::Column::Id)
        .all(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询阶段失败: {e}")))?;

    Ok(result.into_iter().map(|m| m.into_stage()).collect())
}

/// 任务下其他阶段的权重之和
async fn other_stages_weight<C: ConnectionTrait>(
    conn: &C,
    task_id: i64,
    exclude_stage_id: Option<i64>,
) -> Result<i32> {
    Ok(list_stages_by_task(conn, task_id)
        .await?
        .iter()
        .filter(|s| Some(s.id) != exclude_stage_id)
        .map(|s| s.weight_percent)
        .sum())
}

pub(super) async fn find_artifact<C: ConnectionTrait>(
    conn: &C,
    id: i64,
) -> Result<Option<Artifact>> {
    let result = Artifacts::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询提交物失败: {e}")))?;

    Ok(result.map(|m| m.into_artifact()))
}

/// 列出阶段的提交物，按 ID 升序
pub(super) async fn list_artifacts_by_stage<C: ConnectionTrait>(
    conn: &C,
    stage_id: i64,
) -> Result<Vec<Artifact>> {
    let result = Artifacts::find()
        .filter(artifacts::Column::StageId.eq(stage_id))
        .order_by_asc(artifacts::Column::Id)
        .all(conn)
        .await
        .map_err(|e| GradingError::database_operation(format!("查询提交物失败: {e}")))?;

    Ok(result.into_iter().map(|m| m.into_artifact()).collect())
}

impl SeaOrmStorage {
    /// 创建课程
    pub async fn create_course_impl(
        &self,
        req: CreateCourseRequest,
        now: DateTime<Utc>,
    ) -> Result<Course> {
        let model = CourseActiveModel {
            name: Set(req.name),
            created_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 选课；已选课时更新学号
    pub async fn enroll_student_impl(&self, req: EnrollStudentRequest) -> Result<Enrollment> {
        let existing = CourseStudents::find()
            .filter(course_students::Column::CourseId.eq(req.course_id))
            .filter(course_students::Column::StudentId.eq(req.student_id))
            .one(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询选课记录失败: {e}")))?;

        let result = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                active.album_number = Set(req.album_number);
                active.update(&self.db).await
            }
            None => {
                CourseStudentActiveModel {
                    course_id: Set(req.course_id),
                    student_id: Set(req.student_id),
                    album_number: Set(req.album_number),
                    ..Default::default()
                }
                .insert(&self.db)
                .await
            }
        }
        .map_err(|e| GradingError::database_operation(format!("写入选课记录失败: {e}")))?;

        Ok(result.into_enrollment())
    }

    /// 创建任务
    pub async fn create_task_impl(&self, req: CreateTaskRequest, now: DateTime<Utc>) -> Result<Task> {
        let model = TaskActiveModel {
            course_id: Set(req.course_id),
            title: Set(req.title),
            grading_mode: Set(req.grading_mode.unwrap_or(GradingMode::Percent).to_string()),
            max_points: Set(req.max_points),
            created_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("创建任务失败: {e}")))?;

        Ok(result.into_task())
    }

    /// 创建阶段；权重总和在事务内校验
    pub async fn create_stage_impl(
        &self,
        req: CreateStageRequest,
        now: DateTime<Utc>,
    ) -> Result<Stage> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradingError::database_operation(format!("开启事务失败: {e}")))?;

        find_task(&txn, req.task_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Task {} not found", req.task_id)))?;

        let penalty = req.penalty.unwrap_or_default();
        validate_weight(req.weight_percent).map_err(GradingError::validation)?;
        validate_deadlines(req.soft_deadline, req.hard_deadline, now)
            .map_err(GradingError::validation)?;
        validate_penalty_params(&penalty).map_err(GradingError::validation)?;
        let other_total = other_stages_weight(&txn, req.task_id, None).await?;
        validate_weight_total(other_total, req.weight_percent).map_err(GradingError::validation)?;

        let model = StageActiveModel {
            task_id: Set(req.task_id),
            name: Set(req.name),
            weight_percent: Set(req.weight_percent),
            soft_deadline: Set(req.soft_deadline.map(|d| d.timestamp())),
            hard_deadline: Set(req.hard_deadline.map(|d| d.timestamp())),
            penalty_k_percent_per24h: Set(penalty.k_percent_per_24h),
            penalty_max_m_percent: Set(penalty.max_m_percent),
            created_at: Set(now.timestamp()),
            updated_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("创建阶段失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| GradingError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.into_stage())
    }

    /// 修改阶段；截止时间或惩罚策略变化时重算该阶段全部队列行（单事务）
    pub async fn update_stage_impl(
        &self,
        id: i64,
        update: UpdateStageRequest,
        now: DateTime<Utc>,
    ) -> Result<StageUpdateRecord> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| GradingError::database_operation(format!("开启事务失败: {e}")))?;

        let model = Stages::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("查询阶段失败: {e}")))?
            .ok_or_else(|| GradingError::not_found(format!("Stage {id} not found")))?;
        let previous = model.clone().into_stage();
        let task = find_task(&txn, previous.task_id)
            .await?
            .ok_or_else(|| GradingError::not_found(format!("Task {} not found", previous.task_id)))?;

        // 以合并后的值整体校验；软截止时间不早于现在只在其被修改时检查
        let weight = update.weight_percent.unwrap_or(previous.weight_percent);
        let soft = update.soft_deadline.or(previous.soft_deadline);
        let hard = update.hard_deadline.or(previous.hard_deadline);
        validate_weight(weight).map_err(GradingError::validation)?;
        if update.soft_deadline.is_some() {
            validate_deadlines(soft, hard, now).map_err(GradingError::validation)?;
        } else {
            validate_deadline_order(soft, hard).map_err(GradingError::validation)?;
        }
        validate_penalty_params(&update.penalty.unwrap_or(previous.penalty))
            .map_err(GradingError::validation)?;
        let other_total = other_stages_weight(&txn, previous.task_id, Some(id)).await?;
        validate_weight_total(other_total, weight).map_err(GradingError::validation)?;

        let mut active = model.into_active_model();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(weight) = update.weight_percent {
            active.weight_percent = Set(weight);
        }
        if let Some(soft) = update.soft_deadline {
            active.soft_deadline = Set(Some(soft.timestamp()));
        }
        if let Some(hard) = update.hard_deadline {
            active.hard_deadline = Set(Some(hard.timestamp()));
        }
        if let Some(PenaltyPolicy {
            k_percent_per_24h,
            max_m_percent,
        }) = update.penalty
        {
            active.penalty_k_percent_per24h = Set(k_percent_per_24h);
            active.penalty_max_m_percent = Set(max_m_percent);
        }
        active.updated_at = Set(now.timestamp());

        let stage = active
            .update(&txn)
            .await
            .map_err(|e| GradingError::database_operation(format!("更新阶段失败: {e}")))?
            .into_stage();

        let policy_changed = stage.soft_deadline != previous.soft_deadline
            || stage.hard_deadline != previous.hard_deadline
            || stage.penalty != previous.penalty;
        let recomputed_rows = if policy_changed {
            grading_queue::recompute_stage_rows(&txn, &stage, &task, None, now).await?
        } else {
            0
        };

        txn.commit()
            .await
            .map_err(|e| GradingError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(StageUpdateRecord {
            previous,
            stage,
            recomputed_rows,
        })
    }

    /// 创建提交物
    pub async fn create_artifact_impl(
        &self,
        req: CreateArtifactRequest,
        now: DateTime<Utc>,
    ) -> Result<Artifact> {
        let model = ArtifactActiveModel {
            stage_id: Set(req.stage_id),
            name: Set(req.name),
            max_size_bytes: Set(req.max_size_bytes),
            allowed_extensions_csv: Set(extensions_to_csv(&req.allowed_extensions)),
            created_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradingError::database_operation(format!("创建提交物失败: {e}")))?;

        Ok(result.into_artifact())
    }
}
