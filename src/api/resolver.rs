use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::validation::validate_selection_text;
use crate::api::{ApiError, AppState, TextQuery};
use crate::models::Card;

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TextQuery>,
) -> Result<Json<Card>, ApiError> {
    let text = validate_selection_text(query.text.as_deref())?;
    let card = state.typeahead().resolve(text).await?;
    Ok(Json(card))
}
