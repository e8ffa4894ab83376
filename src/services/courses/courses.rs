use tracing::info;

use super::CourseService;
use crate::errors::{GradingError, Result};
use crate::models::courses::{
    entities::{Course, Enrollment},
    requests::{CreateCourseRequest, EnrollStudentRequest},
};

pub async fn create_course(service: &CourseService, request: CreateCourseRequest) -> Result<Course> {
    if request.name.trim().is_empty() {
        return Err(GradingError::validation("Course name must not be empty"));
    }

    let course = service
        .storage()
        .create_course(request, service.clock().now())
        .await?;
    info!("课程 {} ({}) 创建成功", course.id, course.name);
    Ok(course)
}

pub async fn enroll_student(
    service: &CourseService,
    request: EnrollStudentRequest,
) -> Result<Enrollment> {
    let storage = service.storage();
    storage
        .get_course_by_id(request.course_id)
        .await?
        .ok_or_else(|| GradingError::not_found(format!("Course {} not found", request.course_id)))?;
    storage
        .get_user_by_id(request.student_id)
        .await?
        .ok_or_else(|| GradingError::not_found(format!("Student {} not found", request.student_id)))?;

    let enrollment = storage.enroll_student(request).await?;
    info!(
        "学生 {} 加入课程 {} (学号: {:?})",
        enrollment.student_id, enrollment.course_id, enrollment.album_number
    );
    Ok(enrollment)
}
