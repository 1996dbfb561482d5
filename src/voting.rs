use crate::db::{PollDetail, PollStore};
use crate::error::PollError;
use crate::templates;
use crate::views::get_published_poll;
use sqlx::types::chrono::{DateTime, Utc};

pub const NO_CHOICE_MESSAGE: &str = "You didn't vote on a choice";

#[derive(Debug)]
pub enum VoteOutcome {
    /// The vote was stored; the client should be sent to this path.
    Recorded { redirect_to: String },
    /// Nothing was stored; the detail page is shown again with `message`.
    Rejected {
        detail: PollDetail,
        message: &'static str,
    },
}

/// Records one vote for `submitted_choice` on `poll_id`.
///
/// A missing, malformed or foreign choice id is a rejection, not an error.
/// The increment itself is a single store operation scoped to the poll, so
/// a choice belonging to another poll can never be touched.
pub async fn cast_vote<S: PollStore>(
    store: &S,
    poll_id: i64,
    submitted_choice: Option<&str>,
    now: DateTime<Utc>,
) -> Result<VoteOutcome, PollError> {
    let poll = get_published_poll(store, poll_id, now).await?;

    let choice_id = submitted_choice.and_then(|raw| raw.trim().parse::<i64>().ok());
    let recorded = match choice_id {
        Some(choice_id) => store.record_vote(poll.id, choice_id).await?,
        None => false,
    };

    if recorded {
        info!(poll_id = poll.id, choice_id = ?choice_id, "vote recorded");
        return Ok(VoteOutcome::Recorded {
            redirect_to: templates::results_path(poll.id),
        });
    }

    warn!(poll_id = poll.id, submitted = ?submitted_choice, "vote rejected");
    let choices = store.choices(poll.id).await?;
    Ok(VoteOutcome::Rejected {
        detail: PollDetail { poll, choices },
        message: NO_CHOICE_MESSAGE,
    })
}
