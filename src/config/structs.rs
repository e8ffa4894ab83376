use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub grading: GradingConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

/// 审计事件写入位置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    #[default]
    Database, // audit_logs 表
    Log,      // 仅输出到日志
}

/// 评分流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    pub conflict_retries: u32,    // 评分队列乐观锁冲突时的整体重试次数
    pub rebuild_on_startup: bool, // 启动时是否从历史数据重建评分队列
    #[serde(default)]
    pub audit_sink: AuditSinkKind,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            conflict_retries: 1,
            rebuild_on_startup: false,
            audit_sink: AuditSinkKind::Database,
        }
    }
}
