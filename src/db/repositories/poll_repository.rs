use crate::db::connection::DbPool;
use crate::db::models::{Choice, Poll};
use sqlx::Error;
use sqlx::types::chrono::{DateTime, Utc};

pub async fn create_poll(
    pool: &DbPool,
    question: &str,
    pub_date: DateTime<Utc>,
) -> Result<Poll, Error> {
    let poll = sqlx::query_as::<_, Poll>(
        "INSERT INTO polls (question, pub_date) VALUES ($1, $2) RETURNING id, question, pub_date",
    )
    .bind(question)
    .bind(pub_date)
    .fetch_one(pool)
    .await?;

    Ok(poll)
}

/// Inserts a poll and its choices in one transaction. Any failure rolls the
/// whole thing back, so a poll never exists with only some of its choices.
pub async fn create_poll_with_choices(
    pool: &DbPool,
    question: &str,
    pub_date: DateTime<Utc>,
    choice_texts: &[String],
) -> Result<(Poll, Vec<Choice>), Error> {
    let mut tx = pool.begin().await?;

    let poll = sqlx::query_as::<_, Poll>(
        "INSERT INTO polls (question, pub_date) VALUES ($1, $2) RETURNING id, question, pub_date",
    )
    .bind(question)
    .bind(pub_date)
    .fetch_one(&mut *tx)
    .await?;

    let mut choices = Vec::with_capacity(choice_texts.len());
    for text in choice_texts {
        let choice = sqlx::query_as::<_, Choice>(
            "INSERT INTO choices (poll_id, choice_text) VALUES ($1, $2) RETURNING id, poll_id, choice_text, votes",
        )
        .bind(poll.id)
        .bind(text.as_str())
        .fetch_one(&mut *tx)
        .await?;
        choices.push(choice);
    }

    tx.commit().await?;
    Ok((poll, choices))
}

pub async fn get_poll(pool: &DbPool, poll_id: i64) -> Result<Option<Poll>, Error> {
    let row = sqlx::query_as::<_, Poll>("SELECT id, question, pub_date FROM polls WHERE id = $1")
        .bind(poll_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_published_polls(
    pool: &DbPool,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Poll>, Error> {
    let rows = sqlx::query_as::<_, Poll>(
        "SELECT id, question, pub_date FROM polls WHERE pub_date <= $1 ORDER BY pub_date DESC LIMIT $2",
    )
    .bind(now)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn search_polls(pool: &DbPool, query: Option<&str>) -> Result<Vec<Poll>, Error> {
    let rows = match query {
        Some(q) => {
            sqlx::query_as::<_, Poll>(
                "SELECT id, question, pub_date FROM polls WHERE question ILIKE '%' || $1 || '%' ORDER BY pub_date DESC",
            )
            .bind(escape_like(q))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Poll>(
                "SELECT id, question, pub_date FROM polls ORDER BY pub_date DESC",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

pub async fn delete_poll(pool: &DbPool, poll_id: i64) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM polls WHERE id = $1")
        .bind(poll_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// `ILIKE` treats `%` and `_` as wildcards; search input is matched literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
