//! Coursework grading - 课程作业评分流水线
//!
//! 迟交惩罚计算、修订状态机、评分队列读模型同步与阶段加权汇总。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `grading`: 纯计算核心（惩罚、队列投影、汇总）
//! - `models`: 数据模型定义
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod config;
pub mod entity;
pub mod errors;
pub mod grading;
pub mod models;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
