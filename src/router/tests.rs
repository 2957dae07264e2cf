use super::{compile_route, RouteSpec};

#[test]
fn test_match_any_sentinel() {
    for pattern in ["*", "/*", "//*"] {
        assert_eq!(compile_route(pattern), RouteSpec::Any);
    }
    assert!(RouteSpec::any().matches(&[]));
    assert!(RouteSpec::any().matches(&["a", "b", "c"]));
}

#[test]
fn test_prefix_route() {
    let route = compile_route("/a/b/*");
    assert_eq!(route, RouteSpec::Prefix(vec!["a".into(), "b".into()]));
    assert!(route.matches(&["a", "b"]));
    assert!(route.matches(&["a", "b", "c"]));
    assert!(route.matches(&["a", "b", "c", "d"]));
    assert!(!route.matches(&["a", "c"]));
    assert!(!route.matches(&["a"]));
}

#[test]
fn test_exact_route() {
    let route = compile_route("/a/b");
    assert!(route.matches(&["a", "b"]));
    assert!(!route.matches(&["a", "b", "c"]));
    assert!(!route.matches(&["a"]));
    assert!(!route.matches(&["b", "a"]));
}

#[test]
fn test_empty_segments_discarded() {
    assert_eq!(compile_route("//a///b/"), compile_route("/a/b"));
    assert_eq!(compile_route("a/b"), compile_route("/a/b"));
}

#[test]
fn test_root_route() {
    let route = compile_route("/");
    assert_eq!(route, RouteSpec::Exact(vec![]));
    assert!(route.matches(&[]));
    assert!(!route.matches(&["a"]));
}

#[test]
fn test_inner_wildcard_is_literal() {
    let route = compile_route("/a/*/c");
    assert!(route.matches(&["a", "*", "c"]));
    assert!(!route.matches(&["a", "b", "c"]));
}

#[test]
fn test_compile_is_idempotent() {
    let paths: [&[&str]; 5] = [&[], &["a"], &["a", "b"], &["a", "b", "c"], &["x", "b"]];
    for pattern in ["*", "/a", "/a/b/*", "/a/*", "/x/b"] {
        let first = compile_route(pattern);
        let second = compile_route(pattern);
        assert_eq!(first, second);
        for path in paths {
            assert_eq!(first.matches(path), second.matches(path));
        }
    }
}

#[test]
fn test_display_round_trips_pattern() {
    assert_eq!(compile_route("/a/b/*").to_string(), "/a/b/*");
    assert_eq!(compile_route("a//b").to_string(), "/a/b");
    assert_eq!(compile_route("*").to_string(), "*");
    assert_eq!(compile_route("/").to_string(), "/");
}
