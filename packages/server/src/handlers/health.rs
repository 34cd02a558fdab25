use crate::models::health::HealthStatus;
use crate::response::ApiResponse;

#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "Health",
    operation_id = "healthcheck",
    summary = "Liveness probe",
    responses(
        (status = 200, description = "Service is up", body = ApiResponse<HealthStatus>),
    ),
)]
pub async fn healthcheck() -> ApiResponse<HealthStatus> {
    ApiResponse::ok(HealthStatus { status: "ok" }, "Service is healthy")
}
