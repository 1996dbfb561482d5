//! HTML rendering for the poll pages.

use crate::db::models::{Choice, Poll, PollDetail};
use std::fmt::Write;

pub fn index(polls: &[Poll]) -> String {
    let mut body = String::new();
    if polls.is_empty() {
        body.push_str("<p>No polls found.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for poll in polls {
            let _ = writeln!(
                body,
                "  <li><a href=\"{}\">{}</a></li>",
                detail_path(poll.id),
                escape(&poll.question)
            );
        }
        body.push_str("</ul>\n");
    }
    page("Polls", &body)
}

pub fn detail(detail: &PollDetail, error_message: Option<&str>) -> String {
    let poll = &detail.poll;
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape(&poll.question));
    if let Some(message) = error_message {
        let _ = writeln!(body, "<p><strong>{}</strong></p>", escape(message));
    }
    let _ = writeln!(body, "<form action=\"{}\" method=\"post\">", vote_path(poll.id));
    for (counter, choice) in detail.choices.iter().enumerate() {
        let _ = writeln!(
            body,
            "  <input type=\"radio\" name=\"choice\" id=\"choice{n}\" value=\"{id}\" />\n  <label for=\"choice{n}\">{text}</label><br />",
            n = counter + 1,
            id = choice.id,
            text = escape(&choice.choice_text)
        );
    }
    body.push_str("  <input type=\"submit\" value=\"Vote\" />\n</form>\n");
    page(&poll.question, &body)
}

pub fn results(detail: &PollDetail) -> String {
    let poll = &detail.poll;
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>\n<ul>", escape(&poll.question));
    for choice in &detail.choices {
        let _ = writeln!(body, "  <li>{}</li>", tally(choice));
    }
    let _ = writeln!(
        body,
        "</ul>\n<p>{} in total</p>\n<a href=\"{}\">Vote again?</a>",
        pluralize(detail.total_votes(), "vote"),
        detail_path(poll.id)
    );
    page(&poll.question, &body)
}

pub fn not_found() -> String {
    page("Not Found", "<h1>Not Found</h1>\n<p>The requested poll does not exist.</p>\n")
}

pub fn server_error() -> String {
    page("Server Error", "<h1>Server Error (500)</h1>\n")
}

pub fn index_path() -> &'static str {
    "/polls/"
}

pub fn detail_path(poll_id: i64) -> String {
    format!("/polls/{poll_id}/")
}

pub fn results_path(poll_id: i64) -> String {
    format!("/polls/{poll_id}/results/")
}

pub fn vote_path(poll_id: i64) -> String {
    format!("/polls/{poll_id}/vote/")
}

fn tally(choice: &Choice) -> String {
    format!(
        "{} -- {}",
        escape(&choice.choice_text),
        pluralize(i64::from(choice.votes), "vote")
    )
}

fn pluralize(count: i64, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        body
    )
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::chrono::Utc;

    fn sample() -> PollDetail {
        PollDetail {
            poll: Poll {
                id: 7,
                question: "Tabs <or> spaces?".to_string(),
                pub_date: Utc::now(),
            },
            choices: vec![
                Choice { id: 11, poll_id: 7, choice_text: "Tabs".into(), votes: 1 },
                Choice { id: 12, poll_id: 7, choice_text: "Spaces".into(), votes: 2 },
            ],
        }
    }

    #[test]
    fn empty_index_says_so() {
        assert!(index(&[]).contains("No polls found."));
    }

    #[test]
    fn question_text_is_escaped() {
        let html = detail(&sample(), None);
        assert!(html.contains("Tabs &lt;or&gt; spaces?"));
        assert!(!html.contains("<or>"));
    }

    #[test]
    fn detail_form_posts_choice_ids() {
        let html = detail(&sample(), Some("You didn't vote on a choice"));
        assert!(html.contains("action=\"/polls/7/vote/\""));
        assert!(html.contains("name=\"choice\" id=\"choice2\" value=\"12\""));
        assert!(html.contains("You didn&#x27;t vote on a choice"));
    }

    #[test]
    fn results_pluralize_votes() {
        let html = results(&sample());
        assert!(html.contains("Tabs -- 1 vote</li>"));
        assert!(html.contains("Spaces -- 2 votes</li>"));
        assert!(html.contains("3 votes in total"));
        assert!(html.contains("href=\"/polls/7/\""));
    }
}
