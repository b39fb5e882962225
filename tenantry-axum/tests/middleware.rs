use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{middleware, Router};
use http_body_util::BodyExt;
use tenantry_axum::{tenant_middleware, CurrentTenant, HeaderStrategy, RouteStrategy};
use tenantry_core::{InMemoryStore, KeyComparison, StaticStrategy, TenantInfo, TenantResolver};
use tower::ServiceExt;

fn seeded_store() -> InMemoryStore {
    InMemoryStore::with_tenants(
        KeyComparison::default(),
        [
            TenantInfo::new("t1", "tenantA", "Tenant A").unwrap(),
            TenantInfo::new("t2", "default", "Fallback Tenant").unwrap(),
        ],
    )
    .unwrap()
}

async fn whoami(tenant: CurrentTenant) -> String {
    tenant
        .tenant()
        .map(|t| t.id.clone())
        .unwrap_or_else(|| "unresolved".to_owned())
}

fn app(resolver: TenantResolver) -> Router {
    Router::new()
        .route("/", get(whoami))
        .route("/{tenant}/orders", get(whoami))
        .layer(middleware::from_fn_with_state(
            Arc::new(resolver),
            tenant_middleware,
        ))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn header_strategy_resolves_the_tenant() {
    let resolver = TenantResolver::builder()
        .with_strategy(HeaderStrategy::new("X-Tenant"))
        .with_store(seeded_store())
        .build();

    let res = app(resolver)
        .oneshot(
            Request::builder()
                .uri("/")
                .header("X-Tenant", "tenantA")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "t1");
}

#[tokio::test]
async fn missing_header_leaves_the_request_unresolved() {
    let resolver = TenantResolver::builder()
        .with_strategy(HeaderStrategy::new("X-Tenant"))
        .with_store(seeded_store())
        .build();

    let res = app(resolver)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "unresolved");
}

#[tokio::test]
async fn static_fallback_kicks_in_after_other_strategies_miss() {
    let resolver = TenantResolver::builder()
        .with_strategy(HeaderStrategy::new("X-Tenant"))
        .with_strategy(StaticStrategy::new("default"))
        .with_store(seeded_store())
        .build();

    let res = app(resolver)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(body_string(res).await, "t2");
}

#[tokio::test]
async fn route_strategy_reads_the_captured_path_parameter() {
    let resolver = TenantResolver::builder()
        .with_strategy(RouteStrategy::new("tenant"))
        .with_store(seeded_store())
        .build();

    let res = app(resolver)
        .oneshot(
            Request::builder()
                .uri("/tenantA/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(body_string(res).await, "t1");
}

#[tokio::test]
async fn extractor_without_the_middleware_is_a_server_error() {
    let router = Router::new().route("/", get(whoami));

    let res = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
