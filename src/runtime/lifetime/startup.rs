use crate::config::{AppConfig, AuditSinkKind};
use crate::errors::Result;
use crate::services::{
    AuditSink, CourseService, GradingService, StorageAuditSink, TracingAuditSink,
};
use crate::storage::Storage;
use crate::utils::{Clock, SystemClock};
use std::sync::Arc;
use tracing::warn;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub grading: Arc<GradingService>,
    pub courses: Arc<CourseService>,
}

/// 按已初始化的存储组装服务
pub fn build_services(
    storage: Arc<dyn Storage>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
) -> StartupContext {
    let config = &AppConfig::get().grading;
    let grading = GradingService::new(storage.clone(), audit.clone(), clock.clone())
        .with_config(config);
    let courses = CourseService::new(storage.clone(), audit, clock).with_config(config);

    StartupContext {
        storage,
        grading: Arc::new(grading),
        courses: Arc::new(courses),
    }
}

/// 准备启动上下文：存储（含迁移）、审计与服务
pub async fn prepare_startup() -> Result<StartupContext> {
    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let audit: Arc<dyn AuditSink> = match AppConfig::get().grading.audit_sink {
        AuditSinkKind::Database => Arc::new(StorageAuditSink::new(storage.clone(), clock.clone())),
        AuditSinkKind::Log => Arc::new(TracingAuditSink),
    };

    Ok(build_services(storage, audit, clock))
}
