//! HTTP-level integration tests for the `/workflows` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json};
use serde_json::json;

fn open_body(title: &str, body: &str, content_id: &str) -> serde_json::Value {
    json!({
        "content": { "title": title, "body": body },
        "context": { "content_type": "story", "content_id": content_id }
    })
}

#[tokio::test]
async fn test_public_content_needs_no_workflow() {
    let test = build_test_app();
    let response = post_json(
        test.app(),
        "/api/v1/workflows",
        open_body("Garden day", "We planted tomatoes.", "1"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["tier"], "public");
    assert_eq!(json["data"]["status"], "not_required");
    assert!(json["data"]["stages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_open_workflow_requires_content_identity() {
    let test = build_test_app();
    let body = json!({ "content": { "title": "Ceremony" } });
    let response = post_json(test.app(), "/api/v1/workflows", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sacred_workflow_runs_in_order() {
    let test = build_test_app();
    let response = post_json(
        test.app(),
        "/api/v1/workflows",
        open_body("Our Ceremony Story", "This describes a ceremony.", "7"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let opened = body_json(response).await;
    assert_eq!(opened["data"]["tier"], "sacred");
    assert_eq!(opened["data"]["status"], "in_progress");
    let stages = opened["data"]["stages"].as_array().unwrap();
    let kinds: Vec<_> = stages.iter().map(|s| s["stage"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["cultural_advisor", "elder", "community"]);
    let ids: Vec<i64> = stages.iter().map(|s| s["id"].as_i64().unwrap()).collect();

    // Opening twice conflicts.
    let again = post_json(
        test.app(),
        "/api/v1/workflows",
        open_body("Our Ceremony Story", "This describes a ceremony.", "7"),
    )
    .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    // The elder stage cannot start before the advisor stage is approved.
    let early = post_json(
        test.app(),
        &format!("/api/v1/workflows/stages/{}/review", ids[1]),
        json!({}),
    )
    .await;
    assert_eq!(early.status(), StatusCode::BAD_REQUEST);

    for id in &ids {
        let review = post_json(
            test.app(),
            &format!("/api/v1/workflows/stages/{id}/review"),
            json!({ "assignee": "Aunty May" }),
        )
        .await;
        assert_eq!(review.status(), StatusCode::OK);
        assert_eq!(body_json(review).await["data"]["stage"]["status"], "in_review");

        let decision = post_json(
            test.app(),
            &format!("/api/v1/workflows/stages/{id}/decision"),
            json!({ "status": "approved" }),
        )
        .await;
        assert_eq!(decision.status(), StatusCode::OK);
    }

    let json = body_json(get(test.app(), "/api/v1/workflows/story/7").await).await;
    assert_eq!(json["data"]["status"], "approved");
}

#[tokio::test]
async fn test_requested_changes_need_comments_and_reopen() {
    let test = build_test_app();
    let opened = body_json(
        post_json(
            test.app(),
            "/api/v1/workflows",
            open_body(
                "Visiting Elders",
                "We spoke with elder community members about traditional knowledge.",
                "8",
            ),
        )
        .await,
    )
    .await;
    assert_eq!(opened["data"]["tier"], "sensitive");
    let first = opened["data"]["stages"][0]["id"].as_i64().unwrap();

    post_json(
        test.app(),
        &format!("/api/v1/workflows/stages/{first}/review"),
        json!({}),
    )
    .await;

    let missing_comment = post_json(
        test.app(),
        &format!("/api/v1/workflows/stages/{first}/decision"),
        json!({ "status": "requires_changes" }),
    )
    .await;
    assert_eq!(missing_comment.status(), StatusCode::BAD_REQUEST);

    let changes = post_json(
        test.app(),
        &format!("/api/v1/workflows/stages/{first}/decision"),
        json!({ "status": "requires_changes", "comments": "Name the Elder with permission" }),
    )
    .await;
    assert_eq!(changes.status(), StatusCode::OK);
    assert_eq!(body_json(changes).await["data"]["workflow_status"], "changes_requested");

    let reopened = post_json(
        test.app(),
        &format!("/api/v1/workflows/stages/{first}/review"),
        json!({}),
    )
    .await;
    assert_eq!(reopened.status(), StatusCode::OK);
    assert_eq!(body_json(reopened).await["data"]["workflow_status"], "in_progress");
}

#[tokio::test]
async fn test_unknown_stage_is_404() {
    let test = build_test_app();
    let response = post_json(test.app(), "/api/v1/workflows/stages/404/review", json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
