//! 审计事件接收端
//!
//! 审计写入是尽力而为的：失败只记录警告，不影响评分操作本身。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::errors::{GradingError, Result};
use crate::models::audit::entities::AuditEventType;
use crate::storage::Storage;
use crate::utils::Clock;

/// 审计事件
#[derive(Debug, Clone, PartialEq)]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub actor_id: Option<i64>,
    pub context: serde_json::Value,
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<()>;
}

/// 写入 audit_logs 表
pub struct StorageAuditSink {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl StorageAuditSink {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }
}

#[async_trait]
impl AuditSink for StorageAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        self.storage
            .append_audit_log(
                event.event_type,
                event.actor_id,
                event.context,
                self.clock.now(),
            )
            .await
            .map(|_| ())
            .map_err(|e| GradingError::audit(format!("写入审计日志失败: {}", e.message())))
    }
}

/// 只输出到日志
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        info!(
            event_type = %event.event_type,
            actor_id = ?event.actor_id,
            context = %event.context,
            "audit"
        );
        Ok(())
    }
}

/// 记录审计事件，失败时只告警
pub async fn record_best_effort(
    sink: &dyn AuditSink,
    event_type: AuditEventType,
    actor_id: Option<i64>,
    context: serde_json::Value,
) {
    let event = AuditEvent {
        event_type,
        actor_id,
        context,
    };
    if let Err(e) = sink.record(event).await {
        warn!("审计事件 {} 写入失败，已忽略: {}", event_type, e);
    }
}
