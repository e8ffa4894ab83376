//! 课程结构服务：用户、课程、选课、任务、阶段与提交物
//!
//! 所有校验都在写入之前完成。

pub mod artifacts;
pub mod courses;
pub mod stages;
pub mod tasks;
pub mod users;

use std::sync::Arc;

use crate::config::GradingConfig;
use crate::errors::Result;
use crate::models::{
    courses::{
        entities::{Artifact, Course, Enrollment, Stage, Task},
        requests::{
            CreateArtifactRequest, CreateCourseRequest, CreateStageRequest, CreateTaskRequest,
            EnrollStudentRequest, UpdateStageRequest,
        },
        responses::WeightStatus,
    },
    users::{entities::User, requests::CreateUserRequest},
};
use crate::services::audit::AuditSink;
use crate::storage::Storage;
use crate::utils::Clock;

pub struct CourseService {
    storage: Arc<dyn Storage>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    conflict_retries: u32,
}

impl CourseService {
    pub fn new(storage: Arc<dyn Storage>, audit: Arc<dyn AuditSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            audit,
            clock,
            conflict_retries: GradingConfig::default().conflict_retries,
        }
    }

    pub fn with_config(mut self, config: &GradingConfig) -> Self {
        self.conflict_retries = config.conflict_retries;
        self
    }

    pub(crate) fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub(crate) fn audit(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn conflict_retries(&self) -> u32 {
        self.conflict_retries
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User> {
        users::create_user(self, request).await
    }

    pub async fn create_course(&self, request: CreateCourseRequest) -> Result<Course> {
        courses::create_course(self, request).await
    }

    // 选课（重复选课时更新学号）
    pub async fn enroll_student(&self, request: EnrollStudentRequest) -> Result<Enrollment> {
        courses::enroll_student(self, request).await
    }

    pub async fn create_task(&self, actor_id: i64, request: CreateTaskRequest) -> Result<Task> {
        tasks::create_task(self, actor_id, request).await
    }

    // 当前权重总和与剩余可分配权重
    pub async fn weight_status(&self, task_id: i64) -> Result<WeightStatus> {
        tasks::weight_status(self, task_id).await
    }

    // 校验阶段权重之和恰好为 100%
    pub async fn validate_task_weights(&self, task_id: i64) -> Result<()> {
        tasks::validate_task_weights(self, task_id).await
    }

    pub async fn create_stage(&self, actor_id: i64, request: CreateStageRequest) -> Result<Stage> {
        stages::create_stage(self, actor_id, request).await
    }

    // 修改阶段，截止时间或惩罚策略变化时重算该阶段的评分队列
    pub async fn update_stage(
        &self,
        actor_id: i64,
        stage_id: i64,
        request: UpdateStageRequest,
    ) -> Result<Stage> {
        stages::update_stage(self, actor_id, stage_id, request).await
    }

    pub async fn create_artifact(
        &self,
        actor_id: i64,
        request: CreateArtifactRequest,
    ) -> Result<Artifact> {
        artifacts::create_artifact(self, actor_id, request).await
    }
}
