//! Dispatch tests: routes → presenter handlers → responses.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use apiroute::*;
use http::StatusCode;

async fn users(m: RouteMatch) -> Response {
    let body = format!(r#"{{"action":"{}","id":"{}"}}"#, m.action, m.param("id").unwrap_or(""));
    Response::formatted(m.format, body.into_bytes())
}

async fn ping(_m: RouteMatch) -> &'static str {
    "pong"
}

fn app() -> App {
    let routes = RouteList::new()
        .route(Route::new("/users[/<id>]", "Resources:Users").unwrap())
        .route(
            Route::builder("/ping", "Ping")
                .methods(ActionTable::from_pairs([(Method::Get, "read")]))
                .build()
                .unwrap(),
        )
        .route(Route::new("/orphan", "Nobody").unwrap());

    App::new(routes)
        .handler("Resources:Users", users)
        .handler("Ping", ping)
}

#[tokio::test]
async fn dispatches_to_presenter_handler() {
    let res = app().respond(RouteRequest::new("DELETE", "/users/7")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), br#"{"action":"delete","id":"7"}"#);
    assert_eq!(res.header("content-type"), Some("application/json"));
}

#[tokio::test]
async fn negotiated_format_reaches_handler() {
    let req = RouteRequest::new("GET", "/users").with_header("Accept", "application/xml");
    let res = app().respond(req).await;
    assert_eq!(res.header("content-type"), Some("application/xml"));
}

#[tokio::test]
async fn string_handlers_become_text() {
    let res = app().respond(RouteRequest::new("GET", "/ping")).await;
    assert_eq!(res.body(), b"pong");
}

#[tokio::test]
async fn unmatched_requests_are_not_found() {
    let app = app();

    let res = app.respond(RouteRequest::new("GET", "/nowhere")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

    // wrong verb looks exactly like a wrong path
    let res = app.respond(RouteRequest::new("POST", "/ping")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

    // matched, but nobody handles the presenter
    let res = app.respond(RouteRequest::new("GET", "/orphan")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn base_path_is_respected() {
    let res = app().respond(RouteRequest::new("GET", "/api/ping")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

    let app = app().base_path("/api");
    assert_eq!(app.respond(RouteRequest::new("GET", "/api/ping")).await.body(), b"pong");

    // the app's base path wins over the request's own
    let req = RouteRequest::new("GET", "/api/ping").with_base_path("/other/");
    assert_eq!(app.respond(req).await.body(), b"pong");

    let res = app.respond(RouteRequest::new("GET", "/ping")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hooks_observe_dispatched_matches() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);

    let routes = RouteList::new().route(
        Route::builder("/users/<id>", "Resources:Users")
            .on_match(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap(),
    );
    let app = App::new(routes).handler("Resources:Users", users);

    app.respond(RouteRequest::new("GET", "/users/1")).await;
    app.respond(RouteRequest::new("GET", "/users")).await;
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn routes_load_from_toml() {
    let routes = config::parse_routes(
        r#"
        [[route]]
        path = "/users/<id>"
        presenter = "Resources:Users"
        methods = { GET = "read" }

        [route.parameters.id]
        requirement = "\\d+"
        "#,
    )
    .unwrap();

    let (route, m) = routes.match_request(&RouteRequest::new("GET", "/users/12")).unwrap();
    assert_eq!(route.presenter(), "Resources:Users");
    assert_eq!(m.param("id"), Some("12"));
    assert!(routes.match_request(&RouteRequest::new("GET", "/users/abc")).is_none());
}
