use tracing::info;

use super::CourseService;
use crate::errors::{GradingError, Result};
use crate::models::users::{entities::User, requests::CreateUserRequest};

pub async fn create_user(service: &CourseService, request: CreateUserRequest) -> Result<User> {
    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err(GradingError::validation("First and last name must not be empty"));
    }
    if !request.email.contains('@') {
        return Err(GradingError::validation(format!(
            "Invalid email address: {}",
            request.email
        )));
    }

    let user = service
        .storage()
        .create_user(request, service.clock().now())
        .await?;
    info!("用户 {} ({}) 创建成功", user.id, user.display_name());
    Ok(user)
}
