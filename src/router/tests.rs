use super::{
    normalize_path, split_target, Converter, ConverterRegistry, MatchResult, Methods, ParamValue,
    Registry, RouteOutcome, Router, Template,
};
use crate::error::{ConvertError, RouteError};
use http::{Method, StatusCode};

fn handler_of(m: &MatchResult<&'static str>) -> Option<&'static str> {
    m.handler().copied()
}

fn get_only() -> Methods {
    Methods::single(Method::GET)
}

// --- template compilation ---------------------------------------------------

#[test]
fn test_root_template() {
    let converters = ConverterRegistry::with_builtins();
    for raw in ["/", "", "//"] {
        let t = Template::compile(raw, &converters).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.as_str(), "/");
        assert_eq!(t.regex_source(), "^/$");
    }
}

#[test]
fn test_parameterized_template() {
    let t = Template::compile("/items/{id}", &ConverterRegistry::with_builtins()).unwrap();
    assert_eq!(t.len(), 2);
    assert_eq!(t.dynamic_count(), 1);
    assert_eq!(t.first_dynamic(), Some(1));
    assert_eq!(t.param_names().collect::<Vec<_>>(), vec!["id"]);
    assert_eq!(t.regex_source(), "^/items/(?P<id>[^/]+)$");
}

#[test]
fn test_typed_template_rendering() {
    let t = Template::compile("a/{b:int}/c/", &ConverterRegistry::with_builtins()).unwrap();
    assert_eq!(t.as_str(), "/a/{b:int}/c");
    assert_eq!(t.raw(), "a/{b:int}/c/");
    assert_eq!(t.regex_source(), "^/a/(?P<b>[0-9]+)/c$");
}

#[test]
fn test_template_syntax_errors() {
    let converters = ConverterRegistry::with_builtins();
    for bad in [
        "/a/{b",
        "/a/b}",
        "/a/{b}}",
        "/x{y}",
        "/{}",
        "/{:int}",
        "/{1abc}",
        "/{a-b}",
        "/{a:}",
        "/{a}/{a}",
        "/{a}/{a:int}",
        "/{rest:path}/tail",
    ] {
        let err = Template::compile(bad, &converters).unwrap_err();
        assert!(err.is_syntax(), "{bad} should be a syntax error, got {err:?}");
    }
}

#[test]
fn test_unknown_converter() {
    let err = Template::compile("/u/{id:uuid}", &ConverterRegistry::with_builtins()).unwrap_err();
    assert_eq!(
        err,
        RouteError::UnknownConverter {
            template: "/u/{id:uuid}".to_string(),
            converter: "uuid".to_string(),
        }
    );
}

#[test]
fn test_normalize_path() {
    assert_eq!(normalize_path("users/list/"), "/users/list");
    assert_eq!(normalize_path("/users//list"), "/users//list");
    assert_eq!(normalize_path(""), "/");
    assert_eq!(normalize_path("///"), "/");
}

#[test]
fn test_split_target() {
    assert_eq!(split_target("/a/b?x=1"), "/a/b");
    assert_eq!(split_target("/a#frag"), "/a");
    assert_eq!(split_target("/plain"), "/plain");
}

// --- matching ---------------------------------------------------------------

#[test]
fn test_literal_routes_match_every_declared_method() {
    let mut r = Registry::new();
    r.add_route("/a/b", "ab", Methods::only(["GET", "POST", "PUT"]).unwrap())
        .unwrap();
    r.add_route("/c", "c", Methods::only(["DELETE"]).unwrap())
        .unwrap();

    for method in ["GET", "POST", "PUT"] {
        let m = r.match_route(method, "/a/b");
        assert_eq!(handler_of(&m), Some("ab"));
        assert_eq!(m.method_allowed, Some(true));
        assert!(m.path_params.is_empty());
    }
    let m = r.match_route("delete", "c/");
    assert_eq!(handler_of(&m), Some("c"));
    assert_eq!(m.method_allowed, Some(true));
}

#[test]
fn test_static_beats_dynamic_regardless_of_order() {
    let mut r = Registry::new();
    r.add_route("/users/{username}", "profile", get_only()).unwrap();
    r.add_route("/users/admin", "admin", get_only()).unwrap();

    let m = r.match_route("GET", "/users/admin");
    assert_eq!(handler_of(&m), Some("admin"));
    assert!(m.path_params.is_empty());

    let m = r.match_route("GET", "/users/bob");
    assert_eq!(handler_of(&m), Some("profile"));
    assert_eq!(m.path_params.get_str("username"), Some("bob"));
    assert_eq!(m.path_params.len(), 1);
}

#[test]
fn test_fewer_placeholders_beats_later_first_placeholder() {
    let mut r = Registry::new();
    r.add_route("/x/{b}/{c}", "two", Methods::Any).unwrap();
    r.add_route("/{a}/b/c", "one", Methods::Any).unwrap();

    assert_eq!(handler_of(&r.match_route("GET", "/x/b/c")), Some("one"));
}

#[test]
fn test_later_first_placeholder_wins_ties() {
    let mut r = Registry::new();
    r.add_route("/{kind}/items", "by_kind", Methods::Any).unwrap();
    r.add_route("/shop/{item}", "shop_item", Methods::Any).unwrap();

    let m = r.match_route("GET", "/shop/items");
    assert_eq!(handler_of(&m), Some("shop_item"));
    assert_eq!(m.path_params.get_str("item"), Some("items"));

    // Only one candidate survives here.
    assert_eq!(handler_of(&r.match_route("GET", "/toys/items")), Some("by_kind"));
}

#[test]
fn test_registration_order_breaks_remaining_ties() {
    let mut r = Registry::new();
    r.add_route("/{a}/{b}", "first", Methods::Any).unwrap();
    r.add_route("/{c}/{d}", "second", Methods::Any).unwrap();

    let m = r.match_route("GET", "/p/q");
    assert_eq!(handler_of(&m), Some("first"));
    assert_eq!(m.path_params.get_str("a"), Some("p"));
    assert_eq!(m.path_params.get_str("b"), Some("q"));
}

#[test]
fn test_int_conversion_and_fall_through() {
    let mut r = Registry::new();
    r.add_route("/users/{id:int}", "by_id", Methods::Any).unwrap();
    r.add_route("/users/{name}", "by_name", Methods::Any).unwrap();

    let m = r.match_route("GET", "/users/42");
    assert_eq!(handler_of(&m), Some("by_id"));
    assert_eq!(m.path_params.get("id"), Some(&ParamValue::Int(42)));
    assert_eq!(m.path_params.get_str("id"), None);

    let m = r.match_route("GET", "/users/abc");
    assert_eq!(handler_of(&m), Some("by_name"));
    assert_eq!(m.path_params.get_str("name"), Some("abc"));
}

#[test]
fn test_int_rejects_signs_and_fractions() {
    let mut r = Registry::new();
    r.add_route("/n/{v:int}", "n", Methods::Any).unwrap();

    assert_eq!(r.match_route("GET", "/n/007").path_params.get_int("v"), Some(7));
    for bad in ["/n/-5", "/n/+5", "/n/1.5"] {
        let m = r.match_route("GET", bad);
        assert!(m.is_not_found(), "{bad} should not match");
        assert!(m.path_params.is_empty());
    }
}

#[test]
fn test_int_out_of_range_digits_still_match() {
    let mut r = Registry::new();
    r.add_route("/n/{v:int}", "n", Methods::Any).unwrap();

    let m = r.match_route("GET", "/n/99999999999999999999");
    assert!(m.is_match());
    assert_eq!(m.path_params.get_int("v"), None);
    assert_eq!(m.path_params.get_str("v"), Some("99999999999999999999"));

    let max = i64::MAX.to_string();
    let m = r.match_route("GET", &format!("/n/{max}"));
    assert_eq!(m.path_params.get_int("v"), Some(i64::MAX));
}

#[test]
fn test_path_converter_consumes_remainder() {
    let mut r = Registry::new();
    r.add_route("/files/{filepath:path}", "files", Methods::Any)
        .unwrap();

    let m = r.match_route("GET", "/files/a/b/c.txt");
    assert_eq!(m.path_params.get_str("filepath"), Some("a/b/c.txt"));

    let m = r.match_route("GET", "/files/readme");
    assert_eq!(m.path_params.get_str("filepath"), Some("readme"));

    // Needs at least one segment to absorb.
    assert!(r.match_route("GET", "/files").is_not_found());
    assert!(r.match_route("GET", "/files/").is_not_found());
}

#[test]
fn test_path_converter_keeps_repeated_slashes() {
    let mut r = Registry::new();
    r.add_route("/files/{filepath:path}", "files", Methods::Any)
        .unwrap();

    let m = r.match_route("GET", "/files/a//b/c.txt");
    assert_eq!(m.path_params.get_str("filepath"), Some("a//b/c.txt"));

    // Only the slashes at the ends of the request path are dropped.
    let m = r.match_route("GET", "//files/a/b///");
    assert_eq!(m.path_params.get_str("filepath"), Some("a/b"));
}

#[test]
fn test_interior_empty_segment_is_not_collapsed() {
    let mut r = Registry::new();
    r.add_route("/a/b", "ab", Methods::Any).unwrap();
    r.add_route("/a/{x}/b", "axb", Methods::Any).unwrap();
    r.add_route("/a/{n:int}", "an", Methods::Any).unwrap();

    // An empty piece satisfies neither a literal nor a str or int placeholder.
    assert!(r.match_route("GET", "/a//b").is_not_found());
    assert!(r.match_route("GET", "/a///b").is_not_found());
    assert_eq!(handler_of(&r.match_route("GET", "/a/b")), Some("ab"));

    // A template written with the same empty piece matches it byte-for-byte.
    r.add_route("/a//b", "a_empty_b", Methods::Any).unwrap();
    assert_eq!(handler_of(&r.match_route("GET", "/a//b")), Some("a_empty_b"));
}

#[test]
fn test_path_converter_loses_to_exact_template() {
    let mut r = Registry::new();
    r.add_route("/static/{rest:path}", "catch_all", Methods::Any)
        .unwrap();
    r.add_route("/static/css/site.css", "site_css", Methods::Any)
        .unwrap();

    assert_eq!(
        handler_of(&r.match_route("GET", "/static/css/site.css")),
        Some("site_css")
    );
    assert_eq!(
        handler_of(&r.match_route("GET", "/static/js/app.js")),
        Some("catch_all")
    );
}

#[test]
fn test_method_not_allowed_vs_not_found() {
    let mut r = Registry::new();
    r.add_route("/items", "items", get_only()).unwrap();

    let m = r.match_route("POST", "/items");
    assert_eq!(handler_of(&m), Some("items"));
    assert!(m.path_params.is_empty());
    assert_eq!(m.method_allowed, Some(false));
    assert!(m.is_method_not_allowed());
    assert_eq!(
        m.outcome(),
        RouteOutcome::MethodNotAllowed {
            allow: vec![Method::GET]
        }
    );
    assert_eq!(m.outcome().status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(m.outcome().allow_header().as_deref(), Some("GET"));

    let m = r.match_route("POST", "/missing");
    assert!(m.handler().is_none());
    assert!(m.path_params.is_empty());
    assert_eq!(m.method_allowed, None);
    assert_eq!(m.outcome(), RouteOutcome::NotFound);
    assert_eq!(m.outcome().status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_method_checked_on_winner_only() {
    let mut r = Registry::new();
    r.add_route("/things/{id}", "any_thing", Methods::Any).unwrap();
    r.add_route("/things/new", "new_form", get_only()).unwrap();

    // The more specific route wins and then rejects the method; the looser
    // route is not consulted.
    let m = r.match_route("POST", "/things/new");
    assert_eq!(handler_of(&m), Some("new_form"));
    assert_eq!(m.method_allowed, Some(false));
}

#[test]
fn test_root_and_slash_normalization() {
    let mut r = Registry::new();
    r.add_route("/", "root", Methods::Any).unwrap();
    r.add_route("/a/b", "ab", Methods::Any).unwrap();

    for path in ["/", "", "//"] {
        assert_eq!(handler_of(&r.match_route("GET", path)), Some("root"));
    }
    for path in ["/a/b/", "a/b", "//a/b//"] {
        assert_eq!(handler_of(&r.match_route("GET", path)), Some("ab"), "{path}");
    }
}

#[test]
fn test_empty_registry_matches_nothing() {
    let r: Registry<&str> = Registry::new();
    assert!(r.is_empty());
    assert!(r.match_route("GET", "/").is_not_found());
}

// --- registration -----------------------------------------------------------

#[test]
fn test_equivalent_templates_are_a_redefinition() {
    let mut r = Registry::new();
    r.add_route("users/list/", "first", get_only()).unwrap();
    r.add_route("/users/list", "second", Methods::Any).unwrap();

    assert_eq!(r.len(), 1);
    assert_eq!(r.path_patterns(), vec!["/users/list"]);

    let m = r.match_route("POST", "/users/list");
    assert_eq!(handler_of(&m), Some("second"));
    assert_eq!(m.method_allowed, Some(true));
}

#[test]
fn test_redefinition_keeps_registration_slot() {
    let mut r = Registry::new();
    r.add_route("/{a}/{b}", "one", Methods::Any).unwrap();
    r.add_route("/{c}/{d}", "two", Methods::Any).unwrap();
    r.add_route("/{a}/{b}", "three", Methods::Any).unwrap();

    assert_eq!(r.len(), 2);
    assert_eq!(handler_of(&r.match_route("GET", "/x/y")), Some("three"));
}

#[test]
fn test_different_converters_are_different_routes() {
    let mut r = Registry::new();
    r.add_route("/v/{x:int}", "int", Methods::Any).unwrap();
    r.add_route("/v/{x}", "str", Methods::Any).unwrap();
    assert_eq!(r.len(), 2);
}

#[test]
fn test_method_tokens_validated_and_uppercased() {
    let methods = Methods::only(["get", "Post", "GET"]).unwrap();
    assert_eq!(methods.as_slice(), &[Method::GET, Method::POST]);
    assert!(methods.allows("post"));

    assert!(matches!(
        Methods::only(["GE T"]),
        Err(RouteError::InvalidMethod { .. })
    ));
}

#[test]
fn test_empty_method_set_rejected() {
    let mut r: Registry<&str> = Registry::new();
    let err = r
        .add_route("/x", "x", Methods::only(Vec::<&str>::new()).unwrap())
        .unwrap_err();
    assert_eq!(
        err,
        RouteError::EmptyMethodSet {
            template: "/x".to_string()
        }
    );
    assert!(r.is_empty());
}

#[test]
fn test_failed_registration_leaves_registry_unchanged() {
    let mut r = Registry::new();
    r.add_route("/ok", "ok", Methods::Any).unwrap();
    assert!(r.add_route("/bad/{", "bad", Methods::Any).is_err());
    assert_eq!(r.path_patterns(), vec!["/ok"]);
}

// --- custom converters ------------------------------------------------------

#[test]
fn test_custom_converter() {
    let mut r = Registry::new();
    r.register_converter(
        Converter::new("hex", "[0-9a-fA-F]+", |raw| {
            i64::from_str_radix(raw, 16)
                .map(ParamValue::Int)
                .map_err(|e| ConvertError::new("hex", raw, e.to_string()))
        })
        .unwrap(),
    );
    r.add_route("/color/{rgb:hex}", "color", Methods::Any).unwrap();

    let m = r.match_route("GET", "/color/ff");
    assert_eq!(m.path_params.get_int("rgb"), Some(255));
    assert!(r.match_route("GET", "/color/zz").is_not_found());
}

#[test]
fn test_custom_remainder_converter_must_be_last() {
    let mut r: Registry<&str> = Registry::new();
    r.register_converter(
        Converter::remainder("tail", ".+", |raw| Ok(ParamValue::from(raw))).unwrap(),
    );
    assert!(r.add_route("/t/{rest:tail}", "t", Methods::Any).is_ok());
    assert!(r
        .add_route("/t/{rest:tail}/more", "t", Methods::Any)
        .unwrap_err()
        .is_syntax());
}

#[test]
fn test_panicking_converter_is_a_non_match() {
    let mut r = Registry::new();
    r.register_converter(
        Converter::new("boom", ".+", |raw| -> Result<ParamValue, ConvertError> {
            panic!("converter exploded on {raw}")
        })
        .unwrap(),
    );
    r.add_route("/x/{v:boom}", "boom", Methods::Any).unwrap();
    r.add_route("/x/{v}", "fallback", Methods::Any).unwrap();

    let m = r.match_route("GET", "/x/1");
    assert_eq!(handler_of(&m), Some("fallback"));
}

#[test]
fn test_converter_error_is_a_non_match() {
    let mut r = Registry::new();
    r.register_converter(
        Converter::new("never", ".+", |raw| Err(ConvertError::new("never", raw, "rejected")))
            .unwrap(),
    );
    r.add_route("/x/{v:never}", "never", Methods::Any).unwrap();
    assert!(r.match_route("GET", "/x/1").is_not_found());
}

// --- merge ------------------------------------------------------------------

#[test]
fn test_merge_under_prefix() {
    let mut child = Registry::new();
    child.add_route("/users", "users", get_only()).unwrap();

    let mut app = Registry::new();
    app.merge(&child, "/api/v1").unwrap();

    assert_eq!(handler_of(&app.match_route("GET", "/api/v1/users")), Some("users"));
    assert!(app.match_route("GET", "/users").is_not_found());

    // The source is untouched and still usable on its own.
    assert_eq!(child.len(), 1);
    assert_eq!(handler_of(&child.match_route("GET", "/users")), Some("users"));
}

#[test]
fn test_merge_into_several_parents() {
    let mut child = Registry::new();
    child.add_route("/", "index", Methods::Any).unwrap();

    let mut a = Registry::new();
    let mut b = Registry::new();
    a.merge(&child, "alpha/").unwrap();
    b.merge(&child, "/beta").unwrap();

    assert_eq!(a.path_patterns(), vec!["/alpha"]);
    assert_eq!(b.path_patterns(), vec!["/beta"]);
}

#[test]
fn test_merge_with_empty_prefix() {
    let mut child = Registry::new();
    child.add_route("/x/{id:int}", "x", Methods::Any).unwrap();
    let mut app = Registry::new();
    app.merge(&child, "").unwrap();
    assert_eq!(app.path_patterns(), vec!["/x/{id:int}"]);
}

#[test]
fn test_merge_prefix_with_placeholder() {
    let mut child = Registry::new();
    child.add_route("/repos/{repo}", "repo", Methods::Any).unwrap();

    let mut app = Registry::new();
    app.merge(&child, "/orgs/{org}").unwrap();

    let m = app.match_route("GET", "/orgs/rust-lang/repos/regex");
    assert_eq!(m.path_params.get_str("org"), Some("rust-lang"));
    assert_eq!(m.path_params.get_str("repo"), Some("regex"));
    assert_eq!(m.template().map(Template::as_str), Some("/orgs/{org}/repos/{repo}"));
}

#[test]
fn test_merge_is_all_or_nothing() {
    let mut child = Registry::new();
    child.add_route("/ok", "ok", Methods::Any).unwrap();
    child.add_route("/{id}", "clash", Methods::Any).unwrap();

    let mut app = Registry::new();
    app.add_route("/home", "home", Methods::Any).unwrap();
    let err = app.merge(&child, "/{id}").unwrap_err();
    assert!(err.is_syntax());
    assert_eq!(app.path_patterns(), vec!["/home"]);
}

#[test]
fn test_merge_prefix_cannot_hold_rest_converter() {
    let mut child = Registry::new();
    child.add_route("/x", "x", Methods::Any).unwrap();
    let mut app = Registry::new();
    assert!(app.merge(&child, "/{p:path}").unwrap_err().is_syntax());
}

#[test]
fn test_merge_redefines_existing_routes() {
    let mut child = Registry::new();
    child.add_route("/users", "child_users", Methods::Any).unwrap();

    let mut app = Registry::new();
    app.add_route("/api/users", "app_users", get_only()).unwrap();
    app.merge(&child, "/api").unwrap();

    assert_eq!(app.len(), 1);
    assert_eq!(handler_of(&app.match_route("PUT", "/api/users")), Some("child_users"));
}

// --- router facade ------------------------------------------------------------

#[test]
fn test_router_verb_helpers() {
    let mut router = Router::new();
    router
        .get("/a", "get_a")
        .unwrap()
        .post("/b", "post_b")
        .unwrap()
        .delete("/c", "delete_c")
        .unwrap()
        .any("/d", "any_d")
        .unwrap();

    assert_eq!(router.match_route("GET", "/a").method_allowed, Some(true));
    assert_eq!(router.match_route("POST", "/a").method_allowed, Some(false));
    assert_eq!(router.match_route("POST", "/b").method_allowed, Some(true));
    assert_eq!(router.match_route("DELETE", "/c").method_allowed, Some(true));
    assert_eq!(router.match_route("PATCH", "/d").method_allowed, Some(true));
}

#[test]
fn test_include_router_nested() {
    let mut comments = Router::new();
    comments.get("/{comment_id:int}", "get_comment").unwrap();

    let mut posts = Router::new();
    posts.get("/{post_id:int}", "get_post").unwrap();
    posts
        .include_router(&comments, "/{post_id:int}/comments")
        .unwrap();

    let mut app = Router::new();
    app.include_router(&posts, "/posts").unwrap();

    let m = app.match_route("GET", "/posts/3/comments/9");
    assert_eq!(handler_of(&m), Some("get_comment"));
    assert_eq!(m.path_params.get_int("post_id"), Some(3));
    assert_eq!(m.path_params.get_int("comment_id"), Some(9));

    let m = app.match_route("GET", "/posts/3");
    assert_eq!(handler_of(&m), Some("get_post"));
}

#[test]
fn test_params_serialize_as_map() {
    let mut r = Registry::new();
    r.add_route("/u/{id:int}/{name}", "u", Methods::Any).unwrap();
    let m = r.match_route("GET", "/u/5/ana");
    let json = serde_json::to_value(&m.path_params).unwrap();
    assert_eq!(json, serde_json::json!({"id": 5, "name": "ana"}));
}
