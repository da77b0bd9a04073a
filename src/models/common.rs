use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 错误响应载荷，由 AppError 的 ResponseError 实现统一产出。
/// 成功响应由各 handler 直接以 {"success": true, "data": ...} 包裹。
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}
