use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_tables::{Artifacts, Stages, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建评分队列表，每个 (artifact, student) 一行
        manager
            .create_table(
                Table::create()
                    .table(GradingQueue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradingQueue::ArtifactId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingQueue::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradingQueue::StageId).big_integer().not_null())
                    .col(ColumnDef::new(GradingQueue::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(GradingQueue::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(GradingQueue::AlbumNumber).string().null())
                    .col(ColumnDef::new(GradingQueue::StudentName).string().null())
                    .col(
                        ColumnDef::new(GradingQueue::LastRevisionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingQueue::LastRevisionStatus)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GradingQueue::LastSubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradingQueue::SoftDeadline).big_integer().null())
                    .col(ColumnDef::new(GradingQueue::HardDeadline).big_integer().null())
                    .col(
                        ColumnDef::new(GradingQueue::LateDaysStarted)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GradingQueue::PenaltyPercentApplied)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(GradingQueue::PenaltyWaived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(GradingQueue::LastPointsBrutto).double().null())
                    .col(ColumnDef::new(GradingQueue::LastPointsNetto).double().null())
                    .col(
                        ColumnDef::new(GradingQueue::LastAcceptedRevisionId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradingQueue::LastAcceptedPointsNetto)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GradingQueue::FlagNewSubmission)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(GradingQueue::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GradingQueue::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(GradingQueue::ArtifactId)
                            .col(GradingQueue::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingQueue::Table, GradingQueue::ArtifactId)
                            .to(Artifacts::Table, Artifacts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingQueue::Table, GradingQueue::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradingQueue::Table, GradingQueue::StageId)
                            .to(Stages::Table, Stages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 按阶段列出队列
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grading_queue_stage_student")
                    .table(GradingQueue::Table)
                    .col(GradingQueue::StageId)
                    .col(GradingQueue::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grading_queue_task_student")
                    .table(GradingQueue::Table)
                    .col(GradingQueue::TaskId)
                    .col(GradingQueue::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GradingQueue::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum GradingQueue {
    #[sea_orm(iden = "grading_queue")]
    Table,
    ArtifactId,
    StudentId,
    StageId,
    TaskId,
    CourseId,
    AlbumNumber,
    StudentName,
    LastRevisionId,
    LastRevisionStatus,
    LastSubmittedAt,
    SoftDeadline,
    HardDeadline,
    LateDaysStarted,
    PenaltyPercentApplied,
    PenaltyWaived,
    LastPointsBrutto,
    LastPointsNetto,
    LastAcceptedRevisionId,
    LastAcceptedPointsNetto,
    FlagNewSubmission,
    Version,
    UpdatedAt,
}
