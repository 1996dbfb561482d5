use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{TimeDelta, Utc};
use polls_site::db::{MemoryStore, Poll, PollStore};
use polls_site::startup::{AppState, build_router};
use tower::ServiceExt;

fn app(store: &MemoryStore) -> Router {
    build_router(AppState::new(store.clone()), None)
}

async fn create_poll(store: &MemoryStore, question: &str, days: i64) -> Poll {
    store
        .create_poll(question, Utc::now() + TimeDelta::days(days))
        .await
        .unwrap()
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn post_form(app: Router, uri: &str, form: &str) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn votes(store: &MemoryStore, poll_id: i64) -> Vec<i32> {
    store
        .choices(poll_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.votes)
        .collect()
}

#[tokio::test]
async fn index_with_no_polls() {
    let store = MemoryStore::new();
    let (status, body) = get(app(&store), "/polls/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No polls found."));
    assert!(!body.contains("<li>"));
}

#[tokio::test]
async fn index_with_a_past_poll() {
    let store = MemoryStore::new();
    create_poll(&store, "Past poll.", -30).await;

    let (status, body) = get(app(&store), "/polls/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Past poll."));
    assert!(!body.contains("No polls found."));
}

#[tokio::test]
async fn index_with_a_future_poll() {
    let store = MemoryStore::new();
    create_poll(&store, "Future poll.", 30).await;

    let (status, body) = get(app(&store), "/polls/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No polls found."));
    assert!(!body.contains("Future poll."));
}

#[tokio::test]
async fn index_with_a_future_and_past_poll() {
    let store = MemoryStore::new();
    create_poll(&store, "Past poll.", -30).await;
    create_poll(&store, "Future poll.", 30).await;

    let (_, body) = get(app(&store), "/polls/").await;
    assert!(body.contains("Past poll."));
    assert!(!body.contains("Future poll."));
}

#[tokio::test]
async fn index_with_two_past_polls() {
    let store = MemoryStore::new();
    create_poll(&store, "Past poll 2.", -32).await;
    create_poll(&store, "Past poll 1.", -30).await;

    let (_, body) = get(app(&store), "/polls/").await;
    let first = body.find("Past poll 1.").unwrap();
    let second = body.find("Past poll 2.").unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn root_redirects_to_index() {
    let store = MemoryStore::new();
    let response = app(&store)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/polls/");
}

#[tokio::test]
async fn detail_of_a_future_poll_is_not_found() {
    let store = MemoryStore::new();
    let poll = create_poll(&store, "Future poll.", 30).await;

    let (status, _) = get(app(&store), &format!("/polls/{}/", poll.id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app(&store), &format!("/polls/{}/results/", poll.id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detail_of_a_past_poll_shows_the_question() {
    let store = MemoryStore::new();
    let poll = create_poll(&store, "Past poll.", -30).await;
    store.add_choice(poll.id, "Yes").await.unwrap();

    let (status, body) = get(app(&store), &format!("/polls/{}/", poll.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Past poll."));
    assert!(body.contains("Yes"));
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let store = MemoryStore::new();

    let (status, _) = get(app(&store), "/polls/12/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app(&store), "/polls/abc/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app(&store), "/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unrouted_paths_get_the_html_not_found_page() {
    let store = MemoryStore::new();
    create_poll(&store, "Past poll.", -1).await;

    let (status, body) = get(app(&store), "/polls").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("<h1>Not Found</h1>"));
}

#[tokio::test]
async fn vote_without_a_choice_rerenders_the_form() {
    let store = MemoryStore::new();
    let poll = create_poll(&store, "Past poll.", -1).await;
    store.add_choice(poll.id, "A").await.unwrap();
    store.add_choice(poll.id, "B").await.unwrap();

    let response = post_form(app(&store), &format!("/polls/{}/vote/", poll.id), "").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("You didn&#x27;t vote on a choice"));
    assert!(body.contains("Past poll."));

    assert_eq!(votes(&store, poll.id).await, vec![0, 0]);
}

#[tokio::test]
async fn vote_for_a_choice_redirects_to_results() {
    let store = MemoryStore::new();
    let poll = create_poll(&store, "Past poll.", -1).await;
    let a = store.add_choice(poll.id, "A").await.unwrap();
    store.add_choice(poll.id, "B").await.unwrap();

    let response = post_form(
        app(&store),
        &format!("/polls/{}/vote/", poll.id),
        &format!("choice={}", a.id),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        format!("/polls/{}/results/", poll.id).as_str()
    );
    assert_eq!(votes(&store, poll.id).await, vec![1, 0]);

    let (status, body) = get(app(&store), &format!("/polls/{}/results/", poll.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("A -- 1 vote</li>"));
    assert!(body.contains("B -- 0 votes</li>"));
}

#[tokio::test]
async fn vote_for_another_polls_choice_is_rejected() {
    let store = MemoryStore::new();
    let poll = create_poll(&store, "Mine?", -1).await;
    store.add_choice(poll.id, "Mine").await.unwrap();
    let other = create_poll(&store, "Theirs?", -1).await;
    let theirs = store.add_choice(other.id, "Theirs").await.unwrap();

    let response = post_form(
        app(&store),
        &format!("/polls/{}/vote/", poll.id),
        &format!("choice={}", theirs.id),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(votes(&store, poll.id).await, vec![0]);
    assert_eq!(votes(&store, other.id).await, vec![0]);
}

#[tokio::test]
async fn vote_on_an_unknown_poll_is_not_found() {
    let store = MemoryStore::new();
    let response = post_form(app(&store), "/polls/3/vote/", "choice=1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vote_on_a_future_poll_is_not_found() {
    let store = MemoryStore::new();
    let poll = create_poll(&store, "Future poll.", 30).await;
    let choice = store.add_choice(poll.id, "Later").await.unwrap();

    let response = post_form(
        app(&store),
        &format!("/polls/{}/vote/", poll.id),
        &format!("choice={}", choice.id),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(votes(&store, poll.id).await, vec![0]);
}
