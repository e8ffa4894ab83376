//! 预导入模块，方便使用

pub use super::artifacts::{
    ActiveModel as ArtifactActiveModel, Entity as Artifacts, Model as ArtifactModel,
};
pub use super::audit_logs::{
    ActiveModel as AuditLogActiveModel, Entity as AuditLogs, Model as AuditLogModel,
};
pub use super::course_students::{
    ActiveModel as CourseStudentActiveModel, Entity as CourseStudents, Model as CourseStudentModel,
};
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::grades::{ActiveModel as GradeActiveModel, Entity as Grades, Model as GradeModel};
pub use super::grading_queue::{
    ActiveModel as GradingQueueActiveModel, Entity as GradingQueue, Model as GradingQueueModel,
};
pub use super::revisions::{
    ActiveModel as RevisionActiveModel, Entity as Revisions, Model as RevisionModel,
};
pub use super::stage_exemptions::{
    ActiveModel as StageExemptionActiveModel, Entity as StageExemptions,
    Model as StageExemptionModel,
};
pub use super::stages::{ActiveModel as StageActiveModel, Entity as Stages, Model as StageModel};
pub use super::tasks::{ActiveModel as TaskActiveModel, Entity as Tasks, Model as TaskModel};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
