use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::DatabaseConfig;
use crate::models::{
    audit::entities::{AuditEventType, AuditLog},
    courses::{
        entities::{Artifact, Course, Enrollment, Stage, Task},
        requests::{
            CreateArtifactRequest, CreateCourseRequest, CreateStageRequest, CreateTaskRequest,
            EnrollStudentRequest, UpdateStageRequest,
        },
    },
    exemptions::{entities::StageExemption, requests::UpsertExemptionRequest},
    grades::{entities::Grade, requests::GradeRevisionRequest},
    grading_queue::{
        entities::{GradingQueueEntry, QueueKey},
        requests::QueueListQuery,
    },
    revisions::{
        entities::{Revision, RevisionStatus},
        requests::SubmitRevisionRequest,
    },
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 提交结果：新修订与写回后的队列行
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub revision: Revision,
    pub entry: GradingQueueEntry,
}

/// 评分结果：评分记录、状态转换前的状态、队列行（评分对象不是当前修订时为 None）
#[derive(Debug, Clone)]
pub struct GradeRecord {
    pub grade: Grade,
    pub previous_status: RevisionStatus,
    pub entry: Option<GradingQueueEntry>,
}

/// 修改阶段后的结果
#[derive(Debug, Clone)]
pub struct StageUpdateRecord {
    pub previous: Stage,
    pub stage: Stage,
    pub recomputed_rows: usize,
}

/// 豁免写入后的结果
#[derive(Debug, Clone)]
pub struct ExemptionRecord {
    pub exemption: StageExemption,
    pub created: bool,
    pub recomputed_rows: usize,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest, now: DateTime<Utc>) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// 课程与选课
    async fn create_course(&self, course: CreateCourseRequest, now: DateTime<Utc>)
    -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    // 重复选课时更新学号
    async fn enroll_student(&self, enrollment: EnrollStudentRequest) -> Result<Enrollment>;
    async fn find_enrollment(&self, course_id: i64, student_id: i64)
    -> Result<Option<Enrollment>>;

    /// 任务、阶段与提交物
    async fn create_task(&self, task: CreateTaskRequest, now: DateTime<Utc>) -> Result<Task>;
    async fn find_task(&self, id: i64) -> Result<Option<Task>>;
    async fn create_stage(&self, stage: CreateStageRequest, now: DateTime<Utc>) -> Result<Stage>;
    async fn find_stage(&self, id: i64) -> Result<Option<Stage>>;
    async fn list_stages_by_task(&self, task_id: i64) -> Result<Vec<Stage>>;
    // 修改阶段；截止时间或惩罚策略变化时在同一事务内重算该阶段全部队列行
    async fn update_stage(
        &self,
        id: i64,
        update: UpdateStageRequest,
        now: DateTime<Utc>,
    ) -> Result<StageUpdateRecord>;
    async fn create_artifact(
        &self,
        artifact: CreateArtifactRequest,
        now: DateTime<Utc>,
    ) -> Result<Artifact>;
    async fn find_artifact(&self, id: i64) -> Result<Option<Artifact>>;
    async fn list_artifacts_by_stage(&self, stage_id: i64) -> Result<Vec<Artifact>>;

    /// 修订与评分（单事务）
    async fn submit_revision(
        &self,
        student_id: i64,
        request: SubmitRevisionRequest,
        now: DateTime<Utc>,
    ) -> Result<SubmissionRecord>;
    async fn find_revision(&self, id: i64) -> Result<Option<Revision>>;
    // 按 (created_at, id) 升序
    async fn list_revisions(&self, artifact_id: i64, student_id: i64) -> Result<Vec<Revision>>;
    async fn grade_revision(
        &self,
        teacher_id: i64,
        request: GradeRevisionRequest,
        now: DateTime<Utc>,
    ) -> Result<GradeRecord>;
    // 按 (created_at, id) 升序
    async fn list_grades_by_revisions(&self, revision_ids: &[i64]) -> Result<Vec<Grade>>;

    /// 豁免
    async fn find_exemption(&self, stage_id: i64, student_id: i64)
    -> Result<Option<StageExemption>>;
    // 写入豁免并在同一事务内重算 (stage, student) 的队列行
    async fn upsert_exemption(
        &self,
        teacher_id: i64,
        request: UpsertExemptionRequest,
        now: DateTime<Utc>,
    ) -> Result<ExemptionRecord>;

    /// 评分队列
    async fn get_queue_entry(&self, key: QueueKey) -> Result<Option<GradingQueueEntry>>;
    async fn list_stage_queue(
        &self,
        stage_id: i64,
        query: QueueListQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<GradingQueueEntry>>;
    async fn list_queue_by_task_student(
        &self,
        task_id: i64,
        student_id: i64,
    ) -> Result<Vec<GradingQueueEntry>>;
    // 从修订与评分历史重建一行，没有修订时删除残留行并返回 None
    async fn rebuild_queue_entry(
        &self,
        key: QueueKey,
        now: DateTime<Utc>,
    ) -> Result<Option<GradingQueueEntry>>;
    // 所有存在修订的 (artifact, student)
    async fn list_submission_keys(&self) -> Result<Vec<QueueKey>>;

    /// 审计日志
    async fn append_audit_log(
        &self,
        event_type: AuditEventType,
        actor_id: Option<i64>,
        context: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<AuditLog>;
    async fn list_audit_logs(&self, event_type: Option<AuditEventType>) -> Result<Vec<AuditLog>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}

/// 按给定数据库配置创建存储（不依赖全局配置）
pub async fn create_storage_with(config: &DatabaseConfig) -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::connect(config).await?;
    Ok(Arc::new(storage))
}
