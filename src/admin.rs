use crate::db::{Choice, MAX_TEXT_LEN, Poll, PollStore};
use crate::error::AdminError;
use crate::startup::AppState;
use axum::{
    extract::{Extension, Json, Path, Query, Request, State, rejection::PathRejection},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use std::sync::Arc;

/// How one model shows up in the admin.
#[derive(Debug, Clone, Serialize)]
pub struct ModelAdmin {
    pub name: &'static str,
    pub verbose_name: &'static str,
    pub list_display: Vec<&'static str>,
    pub search_fields: Vec<&'static str>,
    pub ordering: Option<&'static str>,
}

impl ModelAdmin {
    pub fn new(name: &'static str, verbose_name: &'static str) -> Self {
        ModelAdmin {
            name,
            verbose_name,
            list_display: Vec::new(),
            search_fields: Vec::new(),
            ordering: None,
        }
    }

    pub fn list_display(mut self, fields: &[&'static str]) -> Self {
        self.list_display = fields.to_vec();
        self
    }

    pub fn search_fields(mut self, fields: &[&'static str]) -> Self {
        self.search_fields = fields.to_vec();
        self
    }

    /// A `-` prefix means descending, as in `-pub_date`.
    pub fn ordering(mut self, field: &'static str) -> Self {
        self.ordering = Some(field);
        self
    }
}

/// Registry of models exposed through the admin. Filled explicitly at
/// startup, see [`AdminSite::with_poll_models`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminSite {
    models: Vec<ModelAdmin>,
}

impl AdminSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: ModelAdmin) -> Result<(), AdminError> {
        if self.is_registered(model.name) {
            return Err(AdminError::AlreadyRegistered(model.name));
        }
        info!("admin: registered {}", model.name);
        self.models.push(model);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.models.iter().any(|m| m.name == name)
    }

    pub fn models(&self) -> &[ModelAdmin] {
        &self.models
    }

    pub fn with_poll_models() -> Result<Self, AdminError> {
        let mut site = AdminSite::new();
        site.register(
            ModelAdmin::new("polls", "Poll")
                .list_display(&["question", "pub_date", "was_published_recently"])
                .search_fields(&["question"])
                .ordering("-pub_date"),
        )?;
        site.register(ModelAdmin::new("choices", "Choice").list_display(&["choice_text", "votes"]))?;
        Ok(site)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    pub question: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub choices: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddChoiceRequest {
    pub choice_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PollRow {
    pub id: i64,
    pub question: String,
    pub pub_date: DateTime<Utc>,
    pub was_published_recently: bool,
}

#[derive(Debug, Serialize)]
pub struct PollWithChoicesResponse {
    #[serde(flatten)]
    pub poll: PollRow,
    pub choices: Vec<Choice>,
}

impl PollRow {
    fn new(poll: Poll, now: DateTime<Utc>) -> Self {
        PollRow {
            was_published_recently: poll.was_published_recently(now),
            id: poll.id,
            question: poll.question,
            pub_date: poll.pub_date,
        }
    }
}

fn validate_text(field: &str, value: &str) -> Result<String, AdminError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AdminError::InvalidRequest(format!("{field} must not be empty")));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(AdminError::InvalidRequest(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(value.to_string())
}

// Route ids are digits only; anything else is treated as an unknown poll.
fn poll_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AdminError> {
    path.map(|Path(id)| id).map_err(|_| AdminError::PollNotFound)
}

// Runs over every byte of both tokens regardless of where they differ.
fn tokens_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Rejects admin requests that do not carry the configured bearer token.
pub async fn require_token(
    State(token): State<Arc<str>>,
    request: Request,
    next: Next,
) -> Result<Response, AdminError> {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let authorized = presented.is_some_and(|p| tokens_match(p.as_bytes(), token.as_bytes()));
    if !authorized {
        warn!("admin request without a valid token");
        return Err(AdminError::Unauthorized);
    }

    Ok(next.run(request).await)
}

pub async fn site_index(Extension(site): Extension<Arc<AdminSite>>) -> impl IntoResponse {
    Json(site.models().to_vec())
}

pub async fn list_polls<S: PollStore>(
    Extension(app_state): Extension<AppState<S>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AdminError> {
    let query = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let polls = app_state.store.search_polls(query).await?;

    let now = Utc::now();
    let rows: Vec<PollRow> = polls.into_iter().map(|p| PollRow::new(p, now)).collect();
    Ok(Json(rows))
}

pub async fn create_poll<S: PollStore>(
    Extension(app_state): Extension<AppState<S>>,
    Json(payload): Json<CreatePollRequest>,
) -> Result<impl IntoResponse, AdminError> {
    let question = validate_text("question", &payload.question)?;
    let choice_texts = payload
        .choices
        .iter()
        .map(|text| validate_text("choice_text", text))
        .collect::<Result<Vec<_>, _>>()?;

    let (poll, choices) = app_state
        .store
        .create_poll_with_choices(&question, payload.pub_date, &choice_texts)
        .await?;

    info!(poll_id = poll.id, choices = choices.len(), "admin: poll created");

    let response = PollWithChoicesResponse {
        poll: PollRow::new(poll, Utc::now()),
        choices,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_poll<S: PollStore>(
    Extension(app_state): Extension<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AdminError> {
    let poll_id = poll_id(path)?;
    let poll = app_state
        .store
        .get_poll(poll_id)
        .await?
        .ok_or(AdminError::PollNotFound)?;
    let choices = app_state.store.choices(poll.id).await?;

    Ok(Json(PollWithChoicesResponse {
        poll: PollRow::new(poll, Utc::now()),
        choices,
    }))
}

pub async fn add_choice<S: PollStore>(
    Extension(app_state): Extension<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
    Json(payload): Json<AddChoiceRequest>,
) -> Result<impl IntoResponse, AdminError> {
    let poll_id = poll_id(path)?;
    let choice_text = validate_text("choice_text", &payload.choice_text)?;

    app_state
        .store
        .get_poll(poll_id)
        .await?
        .ok_or(AdminError::PollNotFound)?;

    let choice = app_state.store.add_choice(poll_id, &choice_text).await?;
    Ok((StatusCode::CREATED, Json(choice)))
}

pub async fn delete_poll<S: PollStore>(
    Extension(app_state): Extension<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AdminError> {
    let poll_id = poll_id(path)?;
    if !app_state.store.delete_poll(poll_id).await? {
        return Err(AdminError::PollNotFound);
    }
    info!(poll_id, "admin: poll deleted");
    Ok(StatusCode::NO_CONTENT)
}
