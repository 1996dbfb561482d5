use crate::error::PollError;
use crate::startup::AppState;
use crate::views::{self, IndexView, PollDetailView, ResultsView};
use crate::voting::{self, VoteOutcome};
use crate::{db::PollStore, templates};
use axum::{
    extract::{Extension, Form, Path, rejection::FormRejection, rejection::PathRejection},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use sqlx::types::chrono::Utc;

#[derive(Debug, Deserialize)]
pub struct VoteForm {
    pub choice: Option<String>,
}

// Route ids are digits only; anything else is treated as an unknown poll.
fn poll_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, PollError> {
    path.map(|Path(id)| id).map_err(|_| PollError::PollNotFound)
}

/// Up to five most recently published polls
pub async fn index<S: PollStore>(
    Extension(app_state): Extension<AppState<S>>,
) -> Result<Html<String>, PollError> {
    views::render_list(&IndexView, &app_state.store, Utc::now()).await
}

/// A published poll with a voting form
pub async fn detail<S: PollStore>(
    Extension(app_state): Extension<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Html<String>, PollError> {
    let poll_id = poll_id(path)?;
    views::render_detail(&PollDetailView, &app_state.store, poll_id, Utc::now()).await
}

/// Current tallies of a published poll
pub async fn results<S: PollStore>(
    Extension(app_state): Extension<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Html<String>, PollError> {
    let poll_id = poll_id(path)?;
    views::render_detail(&ResultsView, &app_state.store, poll_id, Utc::now()).await
}

/// Records a vote, then redirects to the results page so a refresh cannot
/// submit it twice.
pub async fn vote<S: PollStore>(
    Extension(app_state): Extension<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    form: Result<Form<VoteForm>, FormRejection>,
) -> Result<Response, PollError> {
    let poll_id = poll_id(path)?;
    let submitted = form.ok().and_then(|Form(f)| f.choice);

    let outcome = voting::cast_vote(&app_state.store, poll_id, submitted.as_deref(), Utc::now()).await?;

    let response = match outcome {
        VoteOutcome::Recorded { redirect_to } => Redirect::to(&redirect_to).into_response(),
        VoteOutcome::Rejected { detail, message } => {
            Html(templates::detail(&detail, Some(message))).into_response()
        }
    };
    Ok(response)
}
