use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error payload carried in every `{"success": false}` envelope; see the
/// `ResponseError` impl on `AppError`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}
