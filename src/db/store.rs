use crate::db::connection::DbPool;
use crate::db::models::{Choice, Poll};
use crate::db::repositories;
use sqlx::Error;
use sqlx::types::chrono::{DateTime, Utc};
use std::future::Future;

/// Persistence seam for polls and their choices.
///
/// Handlers are generic over this trait so the same routes run against
/// PostgreSQL in production and [`MemoryStore`](crate::db::MemoryStore) in
/// tests. Every method is a single store operation; `record_vote` in
/// particular must be atomic on its own, since concurrent votes for the same
/// choice all have to land.
pub trait PollStore: Clone + Send + Sync + 'static {
    fn create_poll(
        &self,
        question: &str,
        pub_date: DateTime<Utc>,
    ) -> impl Future<Output = Result<Poll, Error>> + Send;

    /// Creates a poll together with its choices as one unit: either all of
    /// them are stored or none are.
    fn create_poll_with_choices(
        &self,
        question: &str,
        pub_date: DateTime<Utc>,
        choice_texts: &[String],
    ) -> impl Future<Output = Result<(Poll, Vec<Choice>), Error>> + Send;

    fn add_choice(
        &self,
        poll_id: i64,
        choice_text: &str,
    ) -> impl Future<Output = Result<Choice, Error>> + Send;

    fn get_poll(&self, poll_id: i64) -> impl Future<Output = Result<Option<Poll>, Error>> + Send;

    /// Polls with `pub_date <= now`, newest first, at most `limit` of them.
    fn published_polls(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Poll>, Error>> + Send;

    /// Every poll, newest first, optionally narrowed by a case-insensitive
    /// substring of the question.
    fn search_polls(
        &self,
        query: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Poll>, Error>> + Send;

    fn choices(&self, poll_id: i64) -> impl Future<Output = Result<Vec<Choice>, Error>> + Send;

    /// Adds one vote to `choice_id` if it belongs to `poll_id`. Returns whether
    /// a choice was updated.
    fn record_vote(
        &self,
        poll_id: i64,
        choice_id: i64,
    ) -> impl Future<Output = Result<bool, Error>> + Send;

    /// Removes a poll and, with it, all of its choices.
    fn delete_poll(&self, poll_id: i64) -> impl Future<Output = Result<bool, Error>> + Send;
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        PgStore { pool }
    }
}

impl PollStore for PgStore {
    async fn create_poll(&self, question: &str, pub_date: DateTime<Utc>) -> Result<Poll, Error> {
        repositories::create_poll(&self.pool, question, pub_date).await
    }

    async fn create_poll_with_choices(
        &self,
        question: &str,
        pub_date: DateTime<Utc>,
        choice_texts: &[String],
    ) -> Result<(Poll, Vec<Choice>), Error> {
        repositories::create_poll_with_choices(&self.pool, question, pub_date, choice_texts).await
    }

    async fn add_choice(&self, poll_id: i64, choice_text: &str) -> Result<Choice, Error> {
        repositories::add_choice(&self.pool, poll_id, choice_text).await
    }

    async fn get_poll(&self, poll_id: i64) -> Result<Option<Poll>, Error> {
        repositories::get_poll(&self.pool, poll_id).await
    }

    async fn published_polls(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Poll>, Error> {
        repositories::get_published_polls(&self.pool, now, limit).await
    }

    async fn search_polls(&self, query: Option<&str>) -> Result<Vec<Poll>, Error> {
        repositories::search_polls(&self.pool, query).await
    }

    async fn choices(&self, poll_id: i64) -> Result<Vec<Choice>, Error> {
        repositories::get_choices(&self.pool, poll_id).await
    }

    async fn record_vote(&self, poll_id: i64, choice_id: i64) -> Result<bool, Error> {
        repositories::increment_votes(&self.pool, poll_id, choice_id).await
    }

    async fn delete_poll(&self, poll_id: i64) -> Result<bool, Error> {
        repositories::delete_poll(&self.pool, poll_id).await
    }
}
