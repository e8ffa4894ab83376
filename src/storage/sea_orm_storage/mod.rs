//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 提交、评分、豁免与阶段修改各自在一个事务内完成，事务内的读写都走同一个连接。

mod audit;
mod courses;
mod exemptions;
mod grades;
mod grading_queue;
mod revisions;
mod users;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{GradingError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 使用全局配置创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(&config.database).await
    }

    /// 按数据库配置连接并运行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(&config.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| GradingError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:");
        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| GradingError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true)
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        // 内存库每个连接都是独立的数据库，必须保持唯一连接常驻
        let (max_connections, idle_timeout, max_lifetime) = if in_memory {
            (1, None, None)
        } else {
            (
                config.pool_size,
                Some(Duration::from_secs(300)),
                Some(Duration::from_secs(1800)),
            )
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(idle_timeout)
            .max_lifetime(max_lifetime)
            .connect_with(opt)
            .await
            .map_err(|e| GradingError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| GradingError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(GradingError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite:, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
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
    revisions::{entities::Revision, requests::SubmitRevisionRequest},
    users::{entities::User, requests::CreateUserRequest},
};
use crate::storage::{
    ExemptionRecord, GradeRecord, StageUpdateRecord, Storage, SubmissionRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest, now: DateTime<Utc>) -> Result<User> {
        self.create_user_impl(user, now).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    // 课程模块
    async fn create_course(
        &self,
        course: CreateCourseRequest,
        now: DateTime<Utc>,
    ) -> Result<Course> {
        self.create_course_impl(course, now).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn enroll_student(&self, enrollment: EnrollStudentRequest) -> Result<Enrollment> {
        self.enroll_student_impl(enrollment).await
    }

    async fn find_enrollment(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<Enrollment>> {
        courses::find_enrollment(&self.db, course_id, student_id).await
    }

    async fn create_task(&self, task: CreateTaskRequest, now: DateTime<Utc>) -> Result<Task> {
        self.create_task_impl(task, now).await
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>> {
        courses::find_task(&self.db, id).await
    }

    async fn create_stage(&self, stage: CreateStageRequest, now: DateTime<Utc>) -> Result<Stage> {
        self.create_stage_impl(stage, now).await
    }

    async fn find_stage(&self, id: i64) -> Result<Option<Stage>> {
        courses::find_stage(&self.db, id).await
    }

    async fn list_stages_by_task(&self, task_id: i64) -> Result<Vec<Stage>> {
        courses::list_stages_by_task(&self.db, task_id).await
    }

    async fn update_stage(
        &self,
        id: i64,
        update: UpdateStageRequest,
        now: DateTime<Utc>,
    ) -> Result<StageUpdateRecord> {
        self.update_stage_impl(id, update, now).await
    }

    async fn create_artifact(
        &self,
        artifact: CreateArtifactRequest,
        now: DateTime<Utc>,
    ) -> Result<Artifact> {
        self.create_artifact_impl(artifact, now).await
    }

    async fn find_artifact(&self, id: i64) -> Result<Option<Artifact>> {
        courses::find_artifact(&self.db, id).await
    }

    async fn list_artifacts_by_stage(&self, stage_id: i64) -> Result<Vec<Artifact>> {
        courses::list_artifacts_by_stage(&self.db, stage_id).await
    }

    // 修订模块
    async fn submit_revision(
        &self,
        student_id: i64,
        request: SubmitRevisionRequest,
        now: DateTime<Utc>,
    ) -> Result<SubmissionRecord> {
        self.submit_revision_impl(student_id, request, now).await
    }

    async fn find_revision(&self, id: i64) -> Result<Option<Revision>> {
        revisions::find_revision(&self.db, id).await
    }

    async fn list_revisions(&self, artifact_id: i64, student_id: i64) -> Result<Vec<Revision>> {
        revisions::list_revisions(&self.db, artifact_id, student_id).await
    }

    // 评分模块
    async fn grade_revision(
        &self,
        teacher_id: i64,
        request: GradeRevisionRequest,
        now: DateTime<Utc>,
    ) -> Result<GradeRecord> {
        self.grade_revision_impl(teacher_id, request, now).await
    }

    async fn list_grades_by_revisions(&self, revision_ids: &[i64]) -> Result<Vec<Grade>> {
        grades::list_grades_by_revisions(&self.db, revision_ids).await
    }

    // 豁免模块
    async fn find_exemption(
        &self,
        stage_id: i64,
        student_id: i64,
    ) -> Result<Option<StageExemption>> {
        exemptions::find_exemption(&self.db, stage_id, student_id).await
    }

    async fn upsert_exemption(
        &self,
        teacher_id: i64,
        request: UpsertExemptionRequest,
        now: DateTime<Utc>,
    ) -> Result<ExemptionRecord> {
        self.upsert_exemption_impl(teacher_id, request, now).await
    }

    // 评分队列模块
    async fn get_queue_entry(&self, key: QueueKey) -> Result<Option<GradingQueueEntry>> {
        grading_queue::find_entry(&self.db, key).await
    }

    async fn list_stage_queue(
        &self,
        stage_id: i64,
        query: QueueListQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<GradingQueueEntry>> {
        self.list_stage_queue_impl(stage_id, query, now).await
    }

    async fn list_queue_by_task_student(
        &self,
        task_id: i64,
        student_id: i64,
    ) -> Result<Vec<GradingQueueEntry>> {
        self.list_queue_by_task_student_impl(task_id, student_id)
            .await
    }

    async fn rebuild_queue_entry(
        &self,
        key: QueueKey,
        now: DateTime<Utc>,
    ) -> Result<Option<GradingQueueEntry>> {
        self.rebuild_queue_entry_impl(key, now).await
    }

    async fn list_submission_keys(&self) -> Result<Vec<QueueKey>> {
        revisions::list_submission_keys(&self.db).await
    }

    // 审计模块
    async fn append_audit_log(
        &self,
        event_type: AuditEventType,
        actor_id: Option<i64>,
        context: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<AuditLog> {
        self.append_audit_log_impl(event_type, actor_id, context, now)
            .await
    }

    async fn list_audit_logs(&self, event_type: Option<AuditEventType>) -> Result<Vec<AuditLog>> {
        self.list_audit_logs_impl(event_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("grading.db").unwrap(),
            "sqlite://grading.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/db").unwrap(),
            "postgres://u:p@localhost/db"
        );
        let err = SeaOrmStorage::build_database_url("redis://localhost").unwrap_err();
        assert_eq!(err.code(), "E001");
    }
}
