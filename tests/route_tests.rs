//! Integration tests for route matching and URL construction.
//!
//! Organized by feature area:
//! - Action tables and methods
//! - Path matching and base paths
//! - Placeholders and optional segments
//! - URL construction
//! - Round trips

use apiroute::*;

fn get(uri: &str) -> RouteRequest {
    RouteRequest::new("GET", uri)
}

fn route(mask: &str) -> Route {
    Route::new(mask, "U").unwrap()
}

// ── Actions & methods ─────────────────────────────────────────────────────────

#[test]
fn default_actions_allow_every_method() {
    let route = route("/u");
    assert_eq!(
        route.methods(),
        [
            Method::Post,
            Method::Get,
            Method::Put,
            Method::Delete,
            Method::Options,
            Method::Patch,
            Method::Head,
        ]
    );
}

#[test]
fn set_action_on_builder() {
    let route = Route::builder("/u", "U")
        .methods(ActionTable::from_pairs([(Method::Post, "create")]))
        .set_action("foo", Some("POST"))
        .set_action("bar", None)
        .set_action("create", None)
        .set_action("read", Some("GET"))
        .set_action("baz", Some("BAR"))
        .build()
        .unwrap();

    assert_eq!(route.methods(), [Method::Post, Method::Get]);
}

#[test]
fn method_without_action_never_matches() {
    let route = Route::builder("/users", "U")
        .methods(ActionTable::from_pairs([(Method::Post, "create")]))
        .build()
        .unwrap();
    assert!(route.match_request(&get("/users")).is_none());

    let route = Route::builder("/users", "U")
        .methods(ActionTable::from_pairs([(Method::Get, "read")]))
        .build()
        .unwrap();
    assert!(route.match_request(&RouteRequest::new("POST", "/users")).is_none());
}

#[test]
fn method_override_selects_action() {
    let route = route("/users/<id>");

    let req = get("/users/1").with_header("X-HTTP-Method-Override", "delete");
    let m = route.match_request(&req).unwrap();
    assert_eq!(m.method, Method::Delete);
    assert_eq!(m.action, "delete");

    let m = route.match_request(&get("/users/1?__apiRouteMethod=put")).unwrap();
    assert_eq!(m.action, "update");
}

#[test]
fn unknown_override_header_does_not_match() {
    let req = get("/users").with_header("X-HTTP-Method-Override", "BREW");
    assert!(route("/users").match_request(&req).is_none());
}

#[test]
fn resolve_method_precedence() {
    assert_eq!(resolve_method(&get("/users")), "GET");

    let req = get("/users").with_header("X-HTTP-Method-Override", "POST");
    assert_eq!(resolve_method(&req), "POST");

    let req = get("/users?__apiRouteMethod=PUT").with_header("X-HTTP-Method-Override", "POST");
    assert_eq!(resolve_method(&req), "POST");

    assert_eq!(resolve_method(&get("/users?__apiRouteMethod=PUT")), "PUT");
}

#[test]
fn disabled_route_never_matches() {
    let route = Route::builder("/users", "U").disable(true).build().unwrap();
    assert!(route.match_request(&get("/users")).is_none());
}

// ── Paths & base paths ────────────────────────────────────────────────────────

#[test]
fn trailing_slash_must_fit_mask() {
    assert!(route("/users/").match_request(&get("/users")).is_none());
    assert!(route("/users").match_request(&get("/users/")).is_none());
    assert!(route("/users[/]").match_request(&get("/users")).is_some());
    assert!(route("/users[/]").match_request(&get("/users/")).is_some());
}

#[test]
fn base_path_is_stripped() {
    let req = get("/api-project/api/ping").with_base_path("/api-project/");
    assert!(route("/api/ping").match_request(&req).is_some());

    let req = get("/api-project/api/ping/").with_base_path("/api-project/");
    assert!(route("/api/ping/").match_request(&req).is_some());

    let req = get("/api-project/api/fake").with_base_path("/api-project/");
    assert!(route("/api/ping").match_request(&req).is_none());

    let req = get("/api-project/fake").with_base_path("/api-project/");
    assert!(route("/api/ping").match_request(&req).is_none());
}

#[test]
fn path_outside_base_path_fails() {
    let req = get("/api/ping").with_base_path("/api-project/");
    assert!(route("/api/ping").match_request(&req).is_none());
}

#[test]
fn auto_base_path_can_be_turned_off() {
    let route = Route::builder("/app/users", "U").auto_base_path(false).build().unwrap();
    let req = get("/app/users").with_base_path("/app/");
    assert!(route.match_request(&req).is_some());
}

// ── Placeholders & optional segments ──────────────────────────────────────────

#[test]
fn required_placeholder() {
    let route = route("/users/<id>");
    assert!(route.match_request(&get("/users")).is_none());

    let m = route.match_request(&get("/users/aaaa")).unwrap();
    assert_eq!(m.param("id"), Some("aaaa"));
}

#[test]
fn optional_placeholder() {
    let route = route("/users[/<id>]");

    let m = route.match_request(&get("/users/aaaa")).unwrap();
    assert_eq!(m.param("id"), Some("aaaa"));

    let m = route.match_request(&get("/users")).unwrap();
    assert_eq!(m.param("id"), None);
    assert!(m.params.contains_key("id"));
}

#[test]
fn mixed_required_and_optional() {
    let route = Route::new("/users/<l>-<p>[/<id>/<a>]", "U").unwrap();

    assert!(route.match_request(&get("/users")).is_none());
    assert!(route.match_request(&get("/users/a")).is_none());
    assert!(route.match_request(&get("/users/l-p")).is_some());

    let m = route.match_request(&get("/users/l-p/8/aa")).unwrap();
    assert_eq!(m.param("l"), Some("l"));
    assert_eq!(m.param("p"), Some("p"));
    assert_eq!(m.param("id"), Some("8"));
    assert_eq!(m.param("a"), Some("aa"));

    let m = route.match_request(&get("/users/l-p/8/aa?bubla=a")).unwrap();
    assert_eq!(m.param("bubla"), Some("a"));
    assert_eq!(m.presenter, "U");
}

#[test]
fn sibling_optional_segments() {
    let route = route("/users[/<id>][/<foo>][/<bar>]");

    let m = route.match_request(&get("/users")).unwrap();
    assert_eq!((m.param("id"), m.param("foo"), m.param("bar")), (None, None, None));

    let m = route.match_request(&get("/users/1")).unwrap();
    assert_eq!((m.param("id"), m.param("foo"), m.param("bar")), (Some("1"), None, None));

    let m = route.match_request(&get("/users/1/foo")).unwrap();
    assert_eq!((m.param("id"), m.param("foo"), m.param("bar")), (Some("1"), Some("foo"), None));

    let m = route.match_request(&get("/users/1/foo/bar")).unwrap();
    assert_eq!(
        (m.param("id"), m.param("foo"), m.param("bar")),
        (Some("1"), Some("foo"), Some("bar"))
    );
}

#[test]
fn nested_optional_segments() {
    let route = route("/users[/<id>[/<foo>[/<bar>]]]");

    let m = route.match_request(&get("/users")).unwrap();
    assert_eq!((m.param("id"), m.param("foo"), m.param("bar")), (None, None, None));

    let m = route.match_request(&get("/users/1")).unwrap();
    assert_eq!((m.param("id"), m.param("foo"), m.param("bar")), (Some("1"), None, None));

    let m = route.match_request(&get("/users/1/foo")).unwrap();
    assert_eq!((m.param("id"), m.param("foo"), m.param("bar")), (Some("1"), Some("foo"), None));

    let m = route.match_request(&get("/users/1/foo/bar")).unwrap();
    assert_eq!(
        (m.param("id"), m.param("foo"), m.param("bar")),
        (Some("1"), Some("foo"), Some("bar"))
    );
}

#[test]
fn nested_optional_segments_without_base_path() {
    let route = Route::builder("/users[/<id>[/<foo>[/<bar>]]]", "U")
        .auto_base_path(false)
        .build()
        .unwrap();

    let m = route.match_request(&get("/users/1/foo/bar")).unwrap();
    assert_eq!(m.param("bar"), Some("bar"));
}

#[test]
fn requirement_restricts_placeholder() {
    let route = Route::builder("/users/<id>", "U")
        .parameter("id", ParameterSpec::new().requirement(r"\d+"))
        .build()
        .unwrap();

    assert!(route.match_request(&get("/users/abc")).is_none());
    assert_eq!(route.match_request(&get("/users/42")).unwrap().param("id"), Some("42"));
}

#[test]
fn required_placeholder_with_default_still_required() {
    let route = Route::builder("/users/<id>", "U")
        .parameter("id", ParameterSpec::new().default_value("1"))
        .build()
        .unwrap();

    assert!(route.match_request(&get("/users/")).is_none());
    assert!(route.match_request(&get("/users/5")).is_some());
}

#[test]
fn path_parameter_overrides_query() {
    let m = route("/users/<id>").match_request(&get("/users/5?id=9&page=2")).unwrap();
    assert_eq!(m.param("id"), Some("5"));
    assert_eq!(m.param("page"), Some("2"));

    let names: Vec<_> = m.params.iter().map(|(k, _)| k).collect();
    assert_eq!(names, ["id", "page"]);
}

#[test]
fn placeholder_and_required_lists() {
    let route = route("/u/<id>[/<l>-<r>/<aa>]/<a>");
    assert_eq!(route.placeholder_parameters(), ["id", "l", "r", "aa", "a"]);
    assert_eq!(route.required_parameters(), ["id", "a"]);
}

#[test]
fn match_carries_request_facts() {
    let req = RouteRequest::new("POST", "/users")
        .with_header("Accept", "application/xml")
        .with_body(&b"{\"name\":\"alice\"}"[..])
        .with_secure(true)
        .with_file(UploadedFile {
            field: "avatar".into(),
            file_name: Some("a.png".into()),
            content_type: Some("image/png".into()),
            data: bytes_of(b"png"),
        });

    let m = route("/users").match_request(&req).unwrap();
    assert_eq!(m.action, "create");
    assert_eq!(m.format, Format::Xml);
    assert!(m.secure);
    assert_eq!(m.body.as_ref(), b"{\"name\":\"alice\"}");
    assert_eq!(m.files.len(), 1);
}

#[test]
fn fixed_format_ignores_accept() {
    let route = Route::builder("/users", "U").format(Format::Xml).build().unwrap();
    let m = route.match_request(&get("/users").with_header("Accept", "application/json")).unwrap();
    assert_eq!(m.format, Format::Xml);
}

#[test]
fn matching_is_repeatable() {
    let route = route("/users/<id>");
    let first = route.match_request(&get("/users/3")).unwrap();
    let second = route.match_request(&get("/users/3")).unwrap();
    assert_eq!(first.params, second.params);
    assert_eq!(first.action, second.action);
}

fn bytes_of(data: &'static [u8]) -> bytes::Bytes {
    bytes::Bytes::from_static(data)
}

// ── URL construction ──────────────────────────────────────────────────────────

#[test]
fn construct_url_needs_matching_presenter_and_action() {
    let route = Route::new("/users/<id>", "U").unwrap();

    let dest = Destination::new("Reources:Users");
    assert_eq!(route.construct_url(&dest, "http://foo.com/users"), None);

    let dest = Destination::new("Reources:Users").param("id", 8);
    assert_eq!(route.construct_url(&dest, "http://foo.com/users"), None);

    let dest = Destination::new("U").param("id", 8);
    assert_eq!(route.construct_url(&dest, "http://foo.com/"), None);

    let dest = Destination::new("U").action("explode").param("id", 8);
    assert_eq!(route.construct_url(&dest, "http://foo.com/"), None);
}

#[test]
fn construct_url_fills_placeholders() {
    let route = Route::new("/users/<id>", "Resources:Users").unwrap();
    let dest = Destination::new("Resources:Users").action("create").param("id", 8);
    assert_eq!(
        route.construct_url(&dest, "http://foo.com/").as_deref(),
        Some("http://foo.com/users/8")
    );
}

#[test]
fn construct_url_keeps_filled_optional_segment() {
    let route = Route::new("/users/<id>[/<f>-<b>]", "Resources:Users").unwrap();
    let dest = Destination::new("Resources:Users")
        .action("create")
        .param("id", 8)
        .param("f", "a")
        .param("b", "a");
    assert_eq!(
        route.construct_url(&dest, "http://foo.com/").as_deref(),
        Some("http://foo.com/users/8/a-a")
    );
}

#[test]
fn construct_url_drops_partial_optional_segment() {
    let route = Route::new("/users/<id>[/<f>-<b>]", "U").unwrap();
    let dest = Destination::new("U").action("read").param("id", 8).param("f", "a");
    assert_eq!(
        route.construct_url(&dest, "http://foo.com/").as_deref(),
        Some("http://foo.com/users/8")
    );
}

#[test]
fn construct_url_requires_required_placeholders() {
    let route = Route::new("/users/<id>", "U").unwrap();
    let dest = Destination::new("U").action("read");
    assert_eq!(route.construct_url(&dest, "http://foo.com/"), None);

    let dest = Destination::new("U").action("read").null_param("id");
    assert_eq!(route.construct_url(&dest, "http://foo.com/"), None);
}

#[test]
fn construct_url_appends_leftovers_as_query() {
    let route = Route::new("/users/<id>", "U").unwrap();
    let dest = Destination::new("U")
        .action("read")
        .param("page", 2)
        .param("id", 8)
        .null_param("skip")
        .param("q", "a b&c");
    assert_eq!(
        route.construct_url(&dest, "http://foo.com/").as_deref(),
        Some("http://foo.com/users/8?page=2&q=a+b%26c")
    );
}

#[test]
fn construct_url_adds_missing_slash() {
    let route = Route::new("/users", "U").unwrap();
    let dest = Destination::new("U").action("read");
    assert_eq!(
        route.construct_url(&dest, "http://foo.com/app").as_deref(),
        Some("http://foo.com/app/users")
    );
}

#[test]
fn construct_url_nested_segments() {
    let route = route("/users[/<id>[/<foo>[/<bar>]]]");
    let base = "http://foo.com/";

    let dest = Destination::new("U").action("read");
    assert_eq!(route.construct_url(&dest, base).as_deref(), Some("http://foo.com/users"));

    let dest = Destination::new("U").action("read").param("id", 1).param("foo", "f");
    assert_eq!(route.construct_url(&dest, base).as_deref(), Some("http://foo.com/users/1/f"));

    let dest = Destination::new("U")
        .action("read")
        .param("id", 1)
        .param("foo", "f")
        .param("bar", "b");
    assert_eq!(route.construct_url(&dest, base).as_deref(), Some("http://foo.com/users/1/f/b"));

    // inner value without its enclosing placeholder is lost with the segment
    let dest = Destination::new("U").action("read").param("foo", "f");
    assert_eq!(route.construct_url(&dest, base).as_deref(), Some("http://foo.com/users"));
}

#[test]
fn construct_url_inserts_values_verbatim() {
    let users = route("/users/<a>/<b>");
    let dest = Destination::new("U").action("read").param("a", "<b>").param("b", "x");
    assert_eq!(
        users.construct_url(&dest, "http://h/").as_deref(),
        Some("http://h/users/<b>/x")
    );

    let tags = route("/tags/<t>[/<page>]");
    let dest = Destination::new("U").action("read").param("t", "[<tag>]");
    assert_eq!(
        tags.construct_url(&dest, "http://h/").as_deref(),
        Some("http://h/tags/[<tag>]")
    );
}

// ── Round trips ───────────────────────────────────────────────────────────────

#[test]
fn match_then_construct_round_trips() {
    for (mask, path) in [
        ("/users/<id>", "/users/aaaa"),
        ("/users/<l>-<p>/items/<id>", "/users/l-p/items/8"),
        ("/a/<x>/b/<y>/c", "/a/1/b/2/c"),
    ] {
        let route = route(mask);
        let m = route.match_request(&get(path)).unwrap();
        let url = route.construct_url(&m.destination(), "http://foo.com/").unwrap();
        assert_eq!(url, format!("http://foo.com{path}"));
    }
}
