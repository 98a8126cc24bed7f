//! Invocation DTOs

use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/invoke`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}
