//! Minimal apiroute example: a users resource with an optional id.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users
//!   curl http://localhost:3000/users/42
//!   curl -H 'accept: application/xml' http://localhost:3000/users/42
//!   curl -X DELETE http://localhost:3000/users/42
//!   curl -H 'x-http-method-override: PUT' http://localhost:3000/users/42
//!   curl http://localhost:3000/routes

use apiroute::{
    App, Destination, Format, ParameterSpec, Response, Route, RouteList, RouteMatch, Server,
};

#[tokio::main]
async fn main() -> Result<(), apiroute::Error> {
    tracing_subscriber::fmt::init();

    let routes = RouteList::new()
        .route(
            Route::builder("/users[/<id>]", "Resources:Users")
                .parameter("id", ParameterSpec::new().requirement(r"\d+").kind("integer"))
                .description("Users collection and single users")
                .tag("public")
                .build()?,
        )
        .route(Route::builder("/routes", "Docs").build()?);

    let users_url = routes.construct_url(
        &Destination::new("Resources:Users").action("read").param("id", 42),
        "http://localhost:3000/",
    );
    tracing::info!(?users_url, "example url");

    let docs = serde_json::to_vec(&routes.iter().map(Route::describe).collect::<Vec<_>>())
        .unwrap_or_default();

    let app = App::new(routes)
        .handler("Resources:Users", users)
        .handler("Docs", move |_m: RouteMatch| {
            let docs = docs.clone();
            async move { Response::json(docs) }
        });

    Server::bind("0.0.0.0:3000").serve(app).await
}

// GET    /users       → read, no id
// GET    /users/42    → read
// DELETE /users/42    → delete
async fn users(m: RouteMatch) -> Response {
    let id = m.param("id").unwrap_or("*");
    let body = match m.format {
        Format::Json => format!(r#"{{"action":"{}","id":"{id}"}}"#, m.action),
        Format::Xml => format!(r#"<user action="{}" id="{id}"/>"#, m.action),
    };
    Response::formatted(m.format, body.into_bytes())
}
