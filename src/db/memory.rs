use crate::db::models::{Choice, MAX_TEXT_LEN, Poll, newest_published};
use crate::db::store::PollStore;
use sqlx::Error;
use sqlx::types::chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

// Stands in for the `VARCHAR(200)` columns PostgreSQL would enforce.
fn check_len(text: &str) -> Result<(), Error> {
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(Error::Protocol(format!(
            "value too long for type character varying({MAX_TEXT_LEN})"
        )));
    }
    Ok(())
}

#[derive(Default)]
struct Tables {
    polls: BTreeMap<i64, Poll>,
    choices: BTreeMap<i64, Choice>,
    next_poll_id: i64,
    next_choice_id: i64,
}

/// In-process store with the same contract as the PostgreSQL one. Every
/// operation runs under one lock, which makes each of them atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn insert_poll(&mut self, question: &str, pub_date: DateTime<Utc>) -> Poll {
        self.next_poll_id += 1;
        let poll = Poll {
            id: self.next_poll_id,
            question: question.to_string(),
            pub_date,
        };
        self.polls.insert(poll.id, poll.clone());
        poll
    }

    fn insert_choice(&mut self, poll_id: i64, choice_text: &str) -> Choice {
        self.next_choice_id += 1;
        let choice = Choice {
            id: self.next_choice_id,
            poll_id,
            choice_text: choice_text.to_string(),
            votes: 0,
        };
        self.choices.insert(choice.id, choice.clone());
        choice
    }
}

impl PollStore for MemoryStore {
    async fn create_poll(&self, question: &str, pub_date: DateTime<Utc>) -> Result<Poll, Error> {
        check_len(question)?;
        Ok(self.tables.lock().await.insert_poll(question, pub_date))
    }

    async fn create_poll_with_choices(
        &self,
        question: &str,
        pub_date: DateTime<Utc>,
        choice_texts: &[String],
    ) -> Result<(Poll, Vec<Choice>), Error> {
        // Everything is checked before the first insert, so a failure leaves
        // the tables untouched.
        check_len(question)?;
        for text in choice_texts {
            check_len(text)?;
        }

        let mut tables = self.tables.lock().await;
        let poll = tables.insert_poll(question, pub_date);
        let choices: Vec<Choice> = choice_texts
            .iter()
            .map(|text| tables.insert_choice(poll.id, text))
            .collect();
        Ok((poll, choices))
    }

    async fn add_choice(&self, poll_id: i64, choice_text: &str) -> Result<Choice, Error> {
        check_len(choice_text)?;
        let mut tables = self.tables.lock().await;
        if !tables.polls.contains_key(&poll_id) {
            // Mirrors the foreign key violation PostgreSQL would raise.
            return Err(Error::RowNotFound);
        }
        Ok(tables.insert_choice(poll_id, choice_text))
    }

    async fn get_poll(&self, poll_id: i64) -> Result<Option<Poll>, Error> {
        Ok(self.tables.lock().await.polls.get(&poll_id).cloned())
    }

    async fn published_polls(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<Poll>, Error> {
        let tables = self.tables.lock().await;
        Ok(newest_published(tables.polls.values().cloned(), now, limit))
    }

    async fn search_polls(&self, query: Option<&str>) -> Result<Vec<Poll>, Error> {
        let needle = query.map(str::to_lowercase);
        let tables = self.tables.lock().await;
        let mut polls: Vec<Poll> = tables
            .polls
            .values()
            .filter(|p| match &needle {
                Some(n) => p.question.to_lowercase().contains(n.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        polls.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        Ok(polls)
    }

    async fn choices(&self, poll_id: i64) -> Result<Vec<Choice>, Error> {
        let tables = self.tables.lock().await;
        Ok(tables
            .choices
            .values()
            .filter(|c| c.poll_id == poll_id)
            .cloned()
            .collect())
    }

    async fn record_vote(&self, poll_id: i64, choice_id: i64) -> Result<bool, Error> {
        let mut tables = self.tables.lock().await;
        match tables.choices.get_mut(&choice_id) {
            Some(choice) if choice.poll_id == poll_id => {
                choice.votes += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_poll(&self, poll_id: i64) -> Result<bool, Error> {
        let mut tables = self.tables.lock().await;
        if tables.polls.remove(&poll_id).is_none() {
            return Ok(false);
        }
        tables.choices.retain(|_, c| c.poll_id != poll_id);
        Ok(true)
    }
}
