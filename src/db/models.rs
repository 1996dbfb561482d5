use serde::{Deserialize, Serialize};
use chrono::{DateTime, TimeDelta, Utc};

/// Upper bound on how many polls the index page shows.
pub const LATEST_POLLS_LIMIT: usize = 5;

/// Column width of `polls.question` and `choices.choice_text`.
pub const MAX_TEXT_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Poll {
    pub id: i64,
    pub question: String,
    pub pub_date: DateTime<Utc>,
}

impl Poll {
    /// True when the poll went out within the day before `now`. A poll dated
    /// in the future is never recent.
    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        now - TimeDelta::days(1) <= self.pub_date && self.pub_date < now
    }

    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.pub_date <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Choice {
    pub id: i64,
    pub poll_id: i64,
    pub choice_text: String,
    pub votes: i32,
}

/// A poll together with its choices, as shown on the detail and results pages.
#[derive(Debug, Clone, Serialize)]
pub struct PollDetail {
    pub poll: Poll,
    pub choices: Vec<Choice>,
}

impl PollDetail {
    pub fn total_votes(&self) -> i64 {
        self.choices.iter().map(|c| i64::from(c.votes)).sum()
    }
}

/// Published polls, most recent first, capped at [`LATEST_POLLS_LIMIT`].
pub fn latest_polls<I>(polls: I, now: DateTime<Utc>) -> Vec<Poll>
where
    I: IntoIterator<Item = Poll>,
{
    newest_published(polls, now, LATEST_POLLS_LIMIT)
}

/// Published polls, most recent first, at most `limit` of them.
pub fn newest_published<I>(polls: I, now: DateTime<Utc>, limit: usize) -> Vec<Poll>
where
    I: IntoIterator<Item = Poll>,
{
    let mut visible: Vec<Poll> = polls.into_iter().filter(|p| p.is_published(now)).collect();
    visible.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
    visible.truncate(limit);
    visible
}
