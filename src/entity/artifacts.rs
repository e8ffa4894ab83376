//! 提交物实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "artifacts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub stage_id: i64,
    pub name: String,
    pub max_size_bytes: Option<i64>,
    // 逗号分隔的扩展名列表
    pub allowed_extensions_csv: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stages::Entity",
        from = "Column::StageId",
        to = "super::stages::Column::Id"
    )]
    Stage,
    #[sea_orm(has_many = "super::revisions::Entity")]
    Revisions,
}

impl Related<super::stages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stage.def()
    }
}

impl Related<super::revisions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Revisions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 扩展名列表与 CSV 之间转换（统一为小写、去掉前导点）
pub fn extensions_to_csv(extensions: &[String]) -> Option<String> {
    let normalized: Vec<String> = extensions
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.join(","))
    }
}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_artifact(self) -> crate::models::courses::entities::Artifact {
        use crate::models::courses::entities::Artifact;

        Artifact {
            id: self.id,
            stage_id: self.stage_id,
            name: self.name,
            max_size_bytes: self.max_size_bytes,
            allowed_extensions: self
                .allowed_extensions_csv
                .map(|csv| {
                    csv.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
