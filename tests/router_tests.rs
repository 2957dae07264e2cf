use std::sync::Arc;

use brrtcors::cors::{CorsDecision, CorsOptionsBuilder, OptionsInput, RejectReason};
use brrtcors::router::{compile_route, select_options_for_path, CorsOutcome, CorsRouter};
use brrtcors::server::{CorsRequest, CorsResponse};
use http::Method;

mod common;
use common::requests::{preflight, simple};

fn origins(list: &[&str]) -> OptionsInput {
    CorsOptionsBuilder::new()
        .allowed_origins(list)
        .into_input()
        .unwrap()
}

fn sample_router() -> CorsRouter {
    CorsRouter::builder()
        .defaults(origins(&["https://app.example.com"]))
        .resource(
            "/public/*",
            CorsOptionsBuilder::new().any_origin().into_input().unwrap(),
        )
        .unwrap()
        .resource(
            "/api/admin/*",
            CorsOptionsBuilder::new()
                .allowed_origins(&["https://admin.example.com"])
                .allow_credentials(true)
                .into_input()
                .unwrap(),
        )
        .unwrap()
        .resource(
            "/api/*",
            CorsOptionsBuilder::new()
                .allowed_methods(&["PUT"])
                .max_age(60)
                .into_input()
                .unwrap(),
        )
        .unwrap()
        .build()
}

#[test]
fn test_end_to_end_preflight() {
    let router = CorsRouter::builder()
        .resource(
            "/foo",
            CorsOptionsBuilder::new()
                .allowed_origins(&["http://a.com"])
                .allowed_methods(&["PUT"])
                .into_input()
                .unwrap(),
        )
        .unwrap()
        .build();
    let req = preflight("/foo", "http://a.com", "PUT", None);
    let mut resp = CorsResponse::new(404);
    resp.body = "not found".to_string();

    let outcome = router.handle(&req, &mut resp).unwrap();

    assert_eq!(outcome, CorsOutcome::Halted(CorsDecision::Accepted));
    assert!(resp.halted);
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "");
    assert_eq!(
        resp.get_header("access-control-allow-origin"),
        Some("http://a.com")
    );
    assert_eq!(resp.get_header("access-control-allow-methods"), Some("PUT"));
}

#[test]
fn test_end_to_end_no_origin_passes_through() {
    let router = sample_router();
    let req = CorsRequest::new(Method::GET, "/api/pets");
    let mut resp = CorsResponse::new(200);
    resp.body = "[]".to_string();

    let outcome = router.handle(&req, &mut resp).unwrap();

    assert_eq!(outcome, CorsOutcome::Continue(CorsDecision::Skipped));
    assert!(resp.headers.is_empty());
    assert!(!resp.halted);
    assert_eq!(resp.body, "[]");
}

#[test]
fn test_first_match_wins() {
    let router = sample_router();

    let mut resp = CorsResponse::new(200);
    router
        .handle(&simple("/api/admin/users", "https://admin.example.com"), &mut resp)
        .unwrap();
    assert_eq!(
        resp.get_header("access-control-allow-credentials"),
        Some("true")
    );

    // defaults apply to /api/* and the admin origin is not among them
    let mut resp = CorsResponse::new(200);
    let outcome = router
        .handle(&simple("/api/pets", "https://admin.example.com"), &mut resp)
        .unwrap();
    assert_eq!(
        outcome,
        CorsOutcome::Continue(CorsDecision::Rejected(RejectReason::OriginNotAllowed))
    );
    assert!(resp.headers.is_empty());
}

#[test]
fn test_overrides_inherit_defaults() {
    let router = sample_router();
    let opts = router.select(&["api", "pets"]).unwrap();
    assert!(!opts.origins().is_wildcard());
    assert_eq!(opts.max_age(), Some("60"));
    assert!(!opts.allow_credentials());

    let public = router.select(&["public"]).unwrap();
    assert!(public.origins().is_wildcard());
    assert_eq!(public.max_age(), None);
}

#[test]
fn test_unrouted_path() {
    let router = sample_router();
    assert!(router.select(&["internal", "health"]).is_none());

    let req = preflight("/internal/health", "https://app.example.com", "PUT", None);
    let mut resp = CorsResponse::new(404);
    let outcome = router.handle(&req, &mut resp).unwrap();
    assert_eq!(outcome, CorsOutcome::Unrouted);
    assert_eq!(resp.status, 404);
    assert!(!resp.halted);
    assert!(resp.headers.is_empty());
}

#[test]
fn test_select_options_for_path_over_entries() {
    let router = sample_router();
    let table = router.entries();
    assert_eq!(table.len(), 3);
    assert!(select_options_for_path(&["public", "a", "b"], table)
        .unwrap()
        .origins()
        .is_wildcard());
    assert!(select_options_for_path(&[], table).is_none());
}

#[test]
fn test_shared_options_across_routes() {
    let opts = Arc::new(
        CorsOptionsBuilder::new()
            .allowed_origins(&["https://a.test"])
            .build()
            .unwrap(),
    );
    let router = CorsRouter::builder()
        .resource_with("/a", Arc::clone(&opts))
        .resource_with("/b/*", Arc::clone(&opts))
        .build();

    assert!(std::ptr::eq(router.select(&["a"]).unwrap(), opts.as_ref()));
    assert!(std::ptr::eq(router.select(&["b", "c"]).unwrap(), opts.as_ref()));
    assert!(router.select(&["a", "b"]).is_none());
}

#[test]
fn test_invalid_override_fails_registration() {
    let result = CorsRouter::builder()
        .defaults(CorsOptionsBuilder::new().any_origin().into_input().unwrap())
        .resource(
            "/x",
            CorsOptionsBuilder::new()
                .allow_credentials(true)
                .into_input()
                .unwrap(),
        );
    assert!(result.is_err());
}

#[test]
fn test_route_prefix_property() {
    let route = compile_route("/a/b/*");
    for path in [&["a", "b"][..], &["a", "b", "c"], &["a", "b", "c", "d"]] {
        assert!(route.matches(path));
    }
    for path in [&["a", "c"][..], &["a"]] {
        assert!(!route.matches(path));
    }
}

#[test]
fn test_router_is_shareable_across_threads() {
    let router = Arc::new(sample_router());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let router = Arc::clone(&router);
            std::thread::spawn(move || {
                let req = simple(&format!("/public/{i}"), "https://x.test");
                let mut resp = CorsResponse::new(200);
                router.handle(&req, &mut resp).unwrap();
                resp.get_header("access-control-allow-origin").map(str::to_string)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().as_deref(), Some("*"));
    }
}
