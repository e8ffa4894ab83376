#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_coursework_grading::config::DatabaseConfig;
use rust_coursework_grading::models::{
    courses::{
        entities::{Artifact, PenaltyPolicy, Stage, Task},
        requests::{
            CreateArtifactRequest, CreateCourseRequest, CreateStageRequest, CreateTaskRequest,
            EnrollStudentRequest,
        },
    },
    grades::{entities::Grade, requests::GradeRevisionRequest},
    revisions::{
        entities::{Revision, RevisionStatus},
        requests::SubmitRevisionRequest,
    },
    users::requests::CreateUserRequest,
};
use rust_coursework_grading::errors::{GradingError, Result};
use rust_coursework_grading::models::audit::entities::AuditEventType;
use rust_coursework_grading::services::{AuditEvent, AuditSink, CourseService, GradingService};
use rust_coursework_grading::storage::{Storage, create_storage_with};
use rust_coursework_grading::utils::{Clock, FixedClock};

pub const TEACHER: i64 = 1;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// 在内存中记录事件，可设置为始终失败
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
    fail: bool,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_of(&self, event_type: AuditEventType) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        if self.fail {
            return Err(GradingError::audit(format!(
                "audit sink unavailable for {}",
                event.event_type
            )));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct Fixture {
    pub storage: Arc<dyn Storage>,
    pub clock: Arc<FixedClock>,
    pub audit: Arc<RecordingAuditSink>,
    pub courses: CourseService,
    pub grading: GradingService,
    pub course_id: i64,
    pub task: Task,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_audit(RecordingAuditSink::new()).await
    }

    pub async fn with_audit(audit: RecordingAuditSink) -> Self {
        let storage = create_storage_with(&DatabaseConfig {
            url: ":memory:".to_string(),
            pool_size: 1,
            timeout: 5,
        })
        .await
        .unwrap();
        let clock = Arc::new(FixedClock::new(t0()));
        let audit = Arc::new(audit);
        let sink: Arc<dyn AuditSink> = audit.clone();

        let courses = CourseService::new(storage.clone(), sink.clone(), clock.clone());
        let grading = GradingService::new(storage.clone(), sink, clock.clone());

        let teacher = courses
            .create_user(CreateUserRequest {
                first_name: "Anna".into(),
                last_name: "Nowak".into(),
                email: "anna.nowak@example.edu".into(),
            })
            .await
            .unwrap();
        assert_eq!(teacher.id, TEACHER);

        let course = courses
            .create_course(CreateCourseRequest {
                name: "Systems Programming".into(),
            })
            .await
            .unwrap();
        let task = courses
            .create_task(
                TEACHER,
                CreateTaskRequest {
                    course_id: course.id,
                    title: "Project".into(),
                    grading_mode: None,
                    max_points: None,
                },
            )
            .await
            .unwrap();

        Self {
            storage,
            clock,
            audit,
            courses,
            grading,
            course_id: course.id,
            task,
        }
    }

    /// 新建学生并选课
    pub async fn student(&self, first_name: &str, album_number: &str) -> i64 {
        let user = self
            .courses
            .create_user(CreateUserRequest {
                first_name: first_name.into(),
                last_name: "Kowalski".into(),
                email: format!("{}@students.example.edu", album_number),
            })
            .await
            .unwrap();
        self.courses
            .enroll_student(EnrollStudentRequest {
                course_id: self.course_id,
                student_id: user.id,
                album_number: Some(album_number.into()),
            })
            .await
            .unwrap();
        user.id
    }

    pub async fn stage(
        &self,
        name: &str,
        weight_percent: i32,
        soft: Option<DateTime<Utc>>,
        hard: Option<DateTime<Utc>>,
        k: f64,
        m: f64,
    ) -> Stage {
        self.courses
            .create_stage(
                TEACHER,
                CreateStageRequest {
                    task_id: self.task.id,
                    name: name.into(),
                    weight_percent,
                    soft_deadline: soft,
                    hard_deadline: hard,
                    penalty: Some(PenaltyPolicy {
                        k_percent_per_24h: k,
                        max_m_percent: m,
                    }),
                },
            )
            .await
            .unwrap()
    }

    pub async fn artifact(&self, stage_id: i64, name: &str) -> Artifact {
        self.courses
            .create_artifact(
                TEACHER,
                CreateArtifactRequest {
                    stage_id,
                    name: name.into(),
                    max_size_bytes: None,
                    allowed_extensions: Vec::new(),
                },
            )
            .await
            .unwrap()
    }

    pub async fn submit(&self, student_id: i64, artifact_id: i64) -> Revision {
        self.grading
            .submit_revision(student_id, submission(artifact_id, "report.pdf"))
            .await
            .unwrap()
    }

    pub async fn grade(&self, revision_id: i64, points: f64, status: RevisionStatus) -> Grade {
        self.grading
            .grade_revision(TEACHER, grading(revision_id, points, status))
            .await
            .unwrap()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn advance_hours(&self, hours: i64) {
        self.clock.advance(Duration::hours(hours));
    }
}

pub fn submission(artifact_id: i64, file_name: &str) -> SubmitRevisionRequest {
    SubmitRevisionRequest {
        artifact_id,
        file_key: format!("uploads/{artifact_id}/{file_name}"),
        original_file_name: file_name.into(),
        mime_type: None,
        size_bytes: Some(2048),
        comment: None,
    }
}

pub fn grading(revision_id: i64, points: f64, status: RevisionStatus) -> GradeRevisionRequest {
    GradeRevisionRequest {
        revision_id,
        points,
        comment: None,
        status_after_grade: status,
        skip_penalty: false,
    }
}
