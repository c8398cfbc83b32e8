use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use std::sync::Arc;
use tracing::debug;

use crate::api::{AppState, TextQuery};
use crate::models::Suggestion;

/// Missing or unparseable `text` lists every country.
pub async fn typeahead(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TextQuery>, QueryRejection>,
) -> Json<Vec<Suggestion>> {
    let text = match query {
        Ok(Query(query)) => query.text.unwrap_or_default(),
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable typeahead query, treating as empty");
            String::new()
        }
    };
    Json(state.typeahead().suggest(&text).await)
}
