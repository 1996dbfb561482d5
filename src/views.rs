use crate::db::{LATEST_POLLS_LIMIT, Poll, PollDetail, PollStore};
use crate::error::PollError;
use crate::templates;
use axum::response::Html;
use sqlx::types::chrono::{DateTime, Utc};
use std::future::Future;

/// Renders a collection of items fetched from the store.
pub trait ListView<S: PollStore>: Sync {
    type Item: Send;

    fn object_list(
        &self,
        store: &S,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Self::Item>, PollError>> + Send;

    fn render(&self, items: &[Self::Item]) -> String;
}

/// Renders a single object resolved by its key, or fails with `PollNotFound`.
pub trait DetailView<S: PollStore>: Sync {
    type Object: Send;

    fn get_object(
        &self,
        store: &S,
        key: i64,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Self::Object, PollError>> + Send;

    fn render(&self, object: &Self::Object) -> String;
}

pub async fn render_list<S, V>(view: &V, store: &S, now: DateTime<Utc>) -> Result<Html<String>, PollError>
where
    S: PollStore,
    V: ListView<S>,
{
    let items = view.object_list(store, now).await?;
    Ok(Html(view.render(&items)))
}

pub async fn render_detail<S, V>(
    view: &V,
    store: &S,
    key: i64,
    now: DateTime<Utc>,
) -> Result<Html<String>, PollError>
where
    S: PollStore,
    V: DetailView<S>,
{
    let object = view.get_object(store, key, now).await?;
    Ok(Html(view.render(&object)))
}

/// Looks up a poll that is visible at `now`. Unknown ids and polls dated in
/// the future are both reported as not found.
pub async fn get_published_poll<S: PollStore>(
    store: &S,
    poll_id: i64,
    now: DateTime<Utc>,
) -> Result<Poll, PollError> {
    store
        .get_poll(poll_id)
        .await?
        .filter(|poll| poll.is_published(now))
        .ok_or(PollError::PollNotFound)
}

pub async fn get_poll_detail<S: PollStore>(
    store: &S,
    poll_id: i64,
    now: DateTime<Utc>,
) -> Result<PollDetail, PollError> {
    let poll = get_published_poll(store, poll_id, now).await?;
    let choices = store.choices(poll.id).await?;
    Ok(PollDetail { poll, choices })
}

pub struct IndexView;

impl<S: PollStore> ListView<S> for IndexView {
    type Item = Poll;

    async fn object_list(&self, store: &S, now: DateTime<Utc>) -> Result<Vec<Poll>, PollError> {
        Ok(store.published_polls(now, LATEST_POLLS_LIMIT).await?)
    }

    fn render(&self, items: &[Poll]) -> String {
        templates::index(items)
    }
}

pub struct PollDetailView;

impl<S: PollStore> DetailView<S> for PollDetailView {
    type Object = PollDetail;

    async fn get_object(&self, store: &S, key: i64, now: DateTime<Utc>) -> Result<PollDetail, PollError> {
        get_poll_detail(store, key, now).await
    }

    fn render(&self, object: &PollDetail) -> String {
        templates::detail(object, None)
    }
}

pub struct ResultsView;

impl<S: PollStore> DetailView<S> for ResultsView {
    type Object = PollDetail;

    async fn get_object(&self, store: &S, key: i64, now: DateTime<Utc>) -> Result<PollDetail, PollError> {
        get_poll_detail(store, key, now).await
    }

    fn render(&self, object: &PollDetail) -> String {
        templates::results(object)
    }
}
