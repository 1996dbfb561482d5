use crate::admin::{self, AdminSite};
use crate::db::PollStore;
use crate::{polls, templates};
use axum::{
    Router,
    extract::Extension,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
}

impl<S: PollStore> AppState<S> {
    pub fn new(store: S) -> Self {
        AppState { store }
    }
}

/// Builds the whole application. The admin routes are only present when an
/// admin site and its token are given.
pub fn build_router<S: PollStore>(
    app_state: AppState<S>,
    admin_site: Option<(AdminSite, String)>,
) -> Router {
    let mut app = Router::new()
        .route("/", get(|| async { Redirect::to(templates::index_path()) }))
        .route("/polls/", get(polls::index::<S>))
        .route("/polls/:poll_id/", get(polls::detail::<S>))
        .route("/polls/:poll_id/results/", get(polls::results::<S>))
        .route("/polls/:poll_id/vote/", post(polls::vote::<S>));

    if let Some((site, token)) = admin_site {
        let token: Arc<str> = Arc::from(token);
        let admin_routes = Router::new()
            .route("/admin/", get(admin::site_index))
            .route(
                "/admin/polls/",
                get(admin::list_polls::<S>).post(admin::create_poll::<S>),
            )
            .route(
                "/admin/polls/:poll_id/",
                get(admin::get_poll::<S>).delete(admin::delete_poll::<S>),
            )
            .route("/admin/polls/:poll_id/choices/", post(admin::add_choice::<S>))
            .route_layer(middleware::from_fn_with_state(token, admin::require_token))
            .layer(Extension(Arc::new(site)));
        app = app.merge(admin_routes);
    }

    app.fallback(handler_404)
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html(templates::not_found()))
}
