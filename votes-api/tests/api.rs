//! HTTP tests for the vote endpoints, run against the in-memory backend.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderName, Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;
use votes_api::Dependencies;
use votes_api::config::create_cors_layer;
use votes_api::server::{create_app, state::AppState};
use votes_service::RatingServiceConfig;
use votes_shared::types::TargetRef;

const IDENTITY: &str = "x-user-id";

struct TestApp {
    router: Router,
    article: Uuid,
    claim: Uuid,
    review: Uuid,
}

fn app() -> TestApp {
    let article = Uuid::new_v4();
    let claim = Uuid::new_v4();
    let review = Uuid::new_v4();
    let deps = Dependencies::in_memory(
        RatingServiceConfig::default(),
        &[
            TargetRef::article(article),
            TargetRef::claim(claim),
            TargetRef::review(review),
        ],
    );
    let identity = HeaderName::from_static(IDENTITY);
    let cors = create_cors_layer(&["http://localhost:3000".to_string()], &identity);

    TestApp {
        router: create_app(AppState::new(deps.service, identity), cors),
        article,
        claim,
        review,
    }
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    voter: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(voter) = voter {
        request = request.header(IDENTITY, voter.to_string());
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app.router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_cast_vote_on_claim() {
    let app = app();
    let voter = Uuid::new_v4();

    let (status, body) = send(
        &app.router,
        Method::POST,
        &format!("/vote?claimId={}", app.claim),
        Some(voter),
        Some(json!({ "rating": 1, "text": "Checked the source" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["claimId"], app.claim.to_string());
    assert_eq!(body["addedBy"], voter.to_string());
    assert_eq!(body["rating"], 1);
    assert_eq!(body["text"], "Checked the source");
    assert_eq!(body["target"]["nBeenVoted"], 1);
    assert_eq!(body["target"]["nPositiveVotes"], 1);
    assert_eq!(body["target"]["nNegativeVotes"], 0);
    assert_eq!(body["target"]["nNeutralVotes"], 0);
    assert_eq!(body["target"]["userVote"], 1);
}

#[tokio::test]
async fn test_recast_and_second_voter() {
    let app = app();
    let uri = format!("/vote?claimId={}", app.claim);
    let x = Uuid::new_v4();
    let y = Uuid::new_v4();

    send(&app.router, Method::POST, &uri, Some(x), Some(json!({ "rating": 1 }))).await;
    let (_, body) = send(&app.router, Method::POST, &uri, Some(x), Some(json!({ "rating": -1 }))).await;
    assert_eq!(body["target"]["nBeenVoted"], 1);
    assert_eq!(body["target"]["nNegativeVotes"], 1);

    let (status, body) =
        send(&app.router, Method::POST, &uri, Some(y), Some(json!({ "rating": 1 }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["target"]["nBeenVoted"], 2);
    assert_eq!(body["target"]["nPositiveVotes"], 1);
    assert_eq!(body["target"]["nNegativeVotes"], 1);
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let app = app();
    let (status, body) = send(
        &app.router,
        Method::POST,
        &format!("/vote?claimId={}", app.claim),
        None,
        Some(json!({ "rating": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_ambiguous_target_is_bad_request() {
    let app = app();
    let (status, body) = send(
        &app.router,
        Method::POST,
        &format!("/vote?articleId={}&claimId={}", app.article, app.claim),
        Some(Uuid::new_v4()),
        Some(json!({ "rating": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_unknown_parameter_is_bad_request() {
    let app = app();
    let (status, _) = send(
        &app.router,
        Method::POST,
        &format!("/vote?otherId={}", app.claim),
        Some(Uuid::new_v4()),
        Some(json!({ "rating": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_body_is_bad_request() {
    let app = app();
    let (status, body) = send(
        &app.router,
        Method::POST,
        &format!("/vote?claimId={}", app.claim),
        Some(Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_invalid_rating_is_bad_request() {
    let app = app();
    let voter = Uuid::new_v4();

    let (status, _) = send(
        &app.router,
        Method::POST,
        &format!("/vote?claimId={}", app.claim),
        Some(voter),
        Some(json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        Method::POST,
        &format!("/vote?articleId={}", app.article),
        Some(voter),
        Some(json!({ "rating": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        Method::POST,
        &format!("/vote?claimId={}", app.claim),
        Some(voter),
        Some(json!({ "rating": 1, "text": "x".repeat(129) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_target_is_not_found() {
    let app = app();
    let (status, body) = send(
        &app.router,
        Method::POST,
        &format!("/vote?reviewId={}", Uuid::new_v4()),
        Some(Uuid::new_v4()),
        Some(json!({ "rating": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_no_info_on_review() {
    let app = app();
    let voter = Uuid::new_v4();
    let uri = format!("/vote?reviewId={}", app.review);

    let (status, body) = send(
        &app.router,
        Method::POST,
        &uri,
        Some(voter),
        Some(json!({ "rating": "no_info" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rating"], "no_info");
    assert_eq!(body["target"]["nBeenVoted"], 0);

    let (status, body) = send(&app.router, Method::GET, &uri, Some(voter), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userVote"], "no_info");
}

#[tokio::test]
async fn test_get_reports_user_vote() {
    let app = app();
    let voter = Uuid::new_v4();
    let uri = format!("/vote?articleId={}", app.article);

    send(&app.router, Method::POST, &uri, Some(voter), Some(json!({ "rating": -1 }))).await;

    let (status, body) = send(&app.router, Method::GET, &uri, Some(voter), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "article");
    assert_eq!(body["userVote"], -1);
    assert_eq!(body["nNegativeVotes"], 1);
    assert!(body.get("nNeutralVotes").is_none());

    let (_, body) = send(&app.router, Method::GET, &uri, Some(Uuid::new_v4()), None).await;
    assert_eq!(body["userVote"], Value::Null);
}

#[tokio::test]
async fn test_retract_vote() {
    let app = app();
    let voter = Uuid::new_v4();
    let uri = format!("/vote?claimId={}", app.claim);

    send(&app.router, Method::POST, &uri, Some(voter), Some(json!({ "rating": 0 }))).await;

    let (status, body) = send(&app.router, Method::DELETE, &uri, Some(voter), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nBeenVoted"], 0);
    assert_eq!(body["nNeutralVotes"], 0);
    assert_eq!(body["userVote"], Value::Null);

    let (status, _) = send(&app.router, Method::DELETE, &uri, Some(voter), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_audit_after_votes() {
    let app = app();
    let uri = format!("/vote?claimId={}", app.claim);
    for rating in [1, -1, 0, 1] {
        send(
            &app.router,
            Method::POST,
            &uri,
            Some(Uuid::new_v4()),
            Some(json!({ "rating": rating })),
        )
        .await;
    }

    let (status, body) = send(
        &app.router,
        Method::GET,
        &format!("/vote/audit?claimId={}", app.claim),
        Some(Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["consistent"], true);
    assert_eq!(body["stored"]["nBeenVoted"], 4);
    assert_eq!(body["tally"]["positive"], 2);
}
