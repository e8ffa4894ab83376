use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::FirstName).string().not_null())
                    .col(ColumnDef::new(Users::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建课程表
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::Name).string().not_null())
                    .col(ColumnDef::new(Courses::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建选课表
        manager
            .create_table(
                Table::create()
                    .table(CourseStudents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseStudents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CourseStudents::CourseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseStudents::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CourseStudents::AlbumNumber).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseStudents::Table, CourseStudents::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseStudents::Table, CourseStudents::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建任务表
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::CourseId).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::GradingMode).string().not_null())
                    .col(ColumnDef::new(Tasks::MaxPoints).double().null())
                    .col(ColumnDef::new(Tasks::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tasks::Table, Tasks::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建阶段表
        manager
            .create_table(
                Table::create()
                    .table(Stages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Stages::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(Stages::Name).string().not_null())
                    .col(ColumnDef::new(Stages::WeightPercent).integer().not_null())
                    .col(ColumnDef::new(Stages::SoftDeadline).big_integer().null())
                    .col(ColumnDef::new(Stages::HardDeadline).big_integer().null())
                    .col(
                        ColumnDef::new(Stages::PenaltyKPercentPer24h)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Stages::PenaltyMaxMPercent)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Stages::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Stages::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Stages::Table, Stages::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建提交物表
        manager
            .create_table(
                Table::create()
                    .table(Artifacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Artifacts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Artifacts::StageId).big_integer().not_null())
                    .col(ColumnDef::new(Artifacts::Name).string().not_null())
                    .col(ColumnDef::new(Artifacts::MaxSizeBytes).big_integer().null())
                    .col(
                        ColumnDef::new(Artifacts::AllowedExtensionsCsv)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(Artifacts::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Artifacts::Table, Artifacts::StageId)
                            .to(Stages::Table, Stages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建修订表
        manager
            .create_table(
                Table::create()
                    .table(Revisions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Revisions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Revisions::ArtifactId).big_integer().not_null())
                    .col(ColumnDef::new(Revisions::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(Revisions::FileKey).string().not_null())
                    .col(
                        ColumnDef::new(Revisions::OriginalFileName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Revisions::MimeType).string().null())
                    .col(ColumnDef::new(Revisions::SizeBytes).big_integer().null())
                    .col(ColumnDef::new(Revisions::Status).string().not_null())
                    .col(ColumnDef::new(Revisions::Comment).text().null())
                    .col(ColumnDef::new(Revisions::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Revisions::Table, Revisions::ArtifactId)
                            .to(Artifacts::Table, Artifacts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Revisions::Table, Revisions::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评分表
        manager
            .create_table(
                Table::create()
                    .table(Grades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Grades::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Grades::RevisionId).big_integer().not_null())
                    .col(ColumnDef::new(Grades::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(Grades::PointsBrutto).double().not_null())
                    .col(ColumnDef::new(Grades::PointsNetto).double().not_null())
                    .col(
                        ColumnDef::new(Grades::PenaltySkipped)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Grades::StatusAfterGrade).string().not_null())
                    .col(ColumnDef::new(Grades::Comment).text().null())
                    .col(ColumnDef::new(Grades::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Grades::Table, Grades::RevisionId)
                            .to(Revisions::Table, Revisions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Grades::Table, Grades::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建阶段豁免表
        manager
            .create_table(
                Table::create()
                    .table(StageExemptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StageExemptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StageExemptions::StageId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StageExemptions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StageExemptions::AllowAfterHard)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(StageExemptions::CustomSoft)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StageExemptions::CustomHard)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StageExemptions::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StageExemptions::Reason).text().null())
                    .col(
                        ColumnDef::new(StageExemptions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StageExemptions::Table, StageExemptions::StageId)
                            .to(Stages::Table, Stages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建审计日志表
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLogs::EventType).string().not_null())
                    .col(ColumnDef::new(AuditLogs::ActorId).big_integer().null())
                    .col(ColumnDef::new(AuditLogs::Context).text().not_null())
                    .col(ColumnDef::new(AuditLogs::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建索引
        // 选课唯一索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_course_students_course_student")
                    .table(CourseStudents::Table)
                    .col(CourseStudents::CourseId)
                    .col(CourseStudents::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_stages_task_id")
                    .table(Stages::Table)
                    .col(Stages::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_artifacts_stage_id")
                    .table(Artifacts::Table)
                    .col(Artifacts::StageId)
                    .to_owned(),
            )
            .await?;

        // 修订表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_revisions_artifact_student")
                    .table(Revisions::Table)
                    .col(Revisions::ArtifactId)
                    .col(Revisions::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grades_revision_id")
                    .table(Grades::Table)
                    .col(Grades::RevisionId)
                    .to_owned(),
            )
            .await?;

        // 每个 (stage, student) 最多一条豁免
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_stage_exemptions_stage_student")
                    .table(StageExemptions::Table)
                    .col(StageExemptions::StageId)
                    .col(StageExemptions::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_audit_logs_event_type")
                    .table(AuditLogs::Table)
                    .col(AuditLogs::EventType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StageExemptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Grades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Revisions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Artifacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseStudents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    #[sea_orm(iden = "courses")]
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CourseStudents {
    #[sea_orm(iden = "course_students")]
    Table,
    Id,
    CourseId,
    StudentId,
    AlbumNumber,
}

#[derive(DeriveIden)]
enum Tasks {
    #[sea_orm(iden = "tasks")]
    Table,
    Id,
    CourseId,
    Title,
    GradingMode,
    MaxPoints,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Stages {
    #[sea_orm(iden = "stages")]
    Table,
    Id,
    TaskId,
    Name,
    WeightPercent,
    SoftDeadline,
    HardDeadline,
    #[sea_orm(iden = "penalty_k_percent_per24h")]
    PenaltyKPercentPer24h,
    PenaltyMaxMPercent,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Artifacts {
    #[sea_orm(iden = "artifacts")]
    Table,
    Id,
    StageId,
    Name,
    MaxSizeBytes,
    AllowedExtensionsCsv,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Revisions {
    #[sea_orm(iden = "revisions")]
    Table,
    Id,
    ArtifactId,
    StudentId,
    FileKey,
    OriginalFileName,
    MimeType,
    SizeBytes,
    Status,
    Comment,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Grades {
    #[sea_orm(iden = "grades")]
    Table,
    Id,
    RevisionId,
    TeacherId,
    PointsBrutto,
    PointsNetto,
    PenaltySkipped,
    StatusAfterGrade,
    Comment,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StageExemptions {
    #[sea_orm(iden = "stage_exemptions")]
    Table,
    Id,
    StageId,
    StudentId,
    AllowAfterHard,
    CustomSoft,
    CustomHard,
    TeacherId,
    Reason,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AuditLogs {
    #[sea_orm(iden = "audit_logs")]
    Table,
    Id,
    EventType,
    ActorId,
    Context,
    CreatedAt,
}
