use axum::extract::{Path, State};
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{ChampionStats, TierListRow};

const NO_DATA: &str = "analysis has not been generated yet";

/// `GET /api/tierlist`
pub async fn tierlist(State(state): State<AppState>) -> Result<Json<Vec<TierListRow>>, ApiError> {
    let report = state
        .analysis
        .get()
        .await
        .ok_or_else(|| ApiError::Unavailable(NO_DATA.to_string()))?;

    let rows = report
        .tierlist
        .iter()
        .filter(|row| row.games >= state.min_games)
        .cloned()
        .collect();
    Ok(Json(rows))
}

/// `GET /api/tierlist/champion/:name`
pub async fn champion(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ChampionStats>, ApiError> {
    let report = state
        .analysis
        .get()
        .await
        .ok_or_else(|| ApiError::Unavailable(NO_DATA.to_string()))?;

    report
        .champion(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("champion {}", name)))
}
