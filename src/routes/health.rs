use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub carrier_lookup: ComponentHealth,
}

#[derive(Serialize)]
pub struct ComponentHealth {
    pub status: String,
}

/// GET /health — service liveness plus provider configuration state.
///
/// A disabled provider is not an outage: batches still run and resolve to
/// `ProviderDisabled`, so the service reports ok either way.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let lookup_status = if state.provider_enabled {
        "enabled"
    } else {
        "disabled"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            carrier_lookup: ComponentHealth {
                status: lookup_status.to_string(),
            },
        },
    })
}
