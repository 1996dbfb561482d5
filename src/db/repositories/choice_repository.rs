use crate::db::connection::DbPool;
use crate::db::models::Choice;
use sqlx::Error;

pub async fn add_choice(pool: &DbPool, poll_id: i64, choice_text: &str) -> Result<Choice, Error> {
    let choice = sqlx::query_as::<_, Choice>(
        "INSERT INTO choices (poll_id, choice_text) VALUES ($1, $2) RETURNING id, poll_id, choice_text, votes",
    )
    .bind(poll_id)
    .bind(choice_text)
    .fetch_one(pool)
    .await?;

    Ok(choice)
}

pub async fn get_choices(pool: &DbPool, poll_id: i64) -> Result<Vec<Choice>, Error> {
    let rows = sqlx::query_as::<_, Choice>(
        "SELECT id, poll_id, choice_text, votes FROM choices WHERE poll_id = $1 ORDER BY id",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Adds one vote to a choice of the given poll in a single statement.
/// Returns false when no choice with that id belongs to the poll.
pub async fn increment_votes(pool: &DbPool, poll_id: i64, choice_id: i64) -> Result<bool, Error> {
    let result = sqlx::query("UPDATE choices SET votes = votes + 1 WHERE id = $1 AND poll_id = $2")
        .bind(choice_id)
        .bind(poll_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
