use crate::endpoints::EndpointRole;
use crate::errors::AppError;
use crate::models::TableResponse;
use crate::state::AppState;
use crate::ui::{RenderOptions, render_index};
use axum::{
    Json,
    extract::{Path, State},
    response::{Html, Redirect},
};
use chrono::Utc;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let panels = state.dashboard.render_pass().await;
    let options = RenderOptions {
        donut_inner_radius: state.config.donut_inner_radius,
    };
    Html(render_index(&panels, options, Utc::now()))
}

pub async fn refresh(State(state): State<AppState>) -> Redirect {
    state.dashboard.refresh().await;
    info!("cache cleared by refresh");
    Redirect::to("/")
}

pub async fn get_table(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<Json<TableResponse>, AppError> {
    let endpoint = EndpointRole::from_key(&role)
        .and_then(|role| state.dashboard.endpoint(role))
        .ok_or_else(|| AppError::not_found(format!("unknown endpoint '{role}'")))?;

    let panel = state.dashboard.obtain(endpoint).await;
    Ok(Json(TableResponse::from(panel)))
}

pub async fn healthz() -> &'static str {
    "ok"
}
