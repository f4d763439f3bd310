use remi_core::ServiceResult;
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health(_ctx: RequestContext, _args: serde_json::Value) -> ServiceResult<HealthResponse> {
    Ok(HealthResponse {
        status: "ok".to_string(),
    })
}
