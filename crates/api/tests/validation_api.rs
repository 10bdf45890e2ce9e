//! HTTP-level integration tests for the `/cultural` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json};
use serde_json::json;

fn ceremony_story() -> serde_json::Value {
    json!({
        "content": {
            "title": "Our Ceremony Story",
            "body": "This describes a men's business ceremony."
        },
        "context": { "intended_audience": "public" }
    })
}

// ---------------------------------------------------------------------------
// Test: GET /api/v1/cultural/rules lists the built-in rule table
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_rules() {
    let test = build_test_app();
    let response = get(test.app(), "/api/v1/cultural/rules").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = json["data"].as_array().expect("data should be an array");
    assert_eq!(data.len(), 6);
    assert_eq!(data[0]["id"], "sacred-content");
    assert_eq!(data[0]["severity"], "error");
}

// ---------------------------------------------------------------------------
// Test: POST /api/v1/cultural/validate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_validate_ceremony_story() {
    let test = build_test_app();
    let response = post_json(test.app(), "/api/v1/cultural/validate", ceremony_story()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["result"]["valid"], false);

    let violations = data["result"]["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["severity"], "error");
    assert_eq!(violations[0]["term"], "ceremony");

    let warnings = data["result"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["category"], "gender-specific");
    assert_eq!(warnings[0]["requires_review"], true);

    assert_eq!(data["sensitivity"]["tier"], "sacred");
    assert_eq!(data["sensitivity"]["reason"]["kind"], "rule_violation");
    assert_eq!(data["consultation"]["required"], true);
    assert_eq!(data["consultation"]["priority"], "HIGH");
}

#[tokio::test]
async fn test_validate_visiting_elders() {
    let test = build_test_app();
    let body = json!({
        "content": {
            "title": "Visiting Elders",
            "body": "We spoke with elder community members about traditional knowledge."
        },
        "context": { "author": { "community": "Arrernte" } }
    });
    let json = body_json(post_json(test.app(), "/api/v1/cultural/validate", body).await).await;
    let data = &json["data"];

    assert_eq!(data["result"]["valid"], true);
    assert!(!data["result"]["warnings"].as_array().unwrap().is_empty());
    assert_eq!(data["sensitivity"]["tier"], "sensitive");
    assert_eq!(data["consultation"]["priority"], "MEDIUM");
}

#[tokio::test]
async fn test_validate_plain_content() {
    let test = build_test_app();
    let body = json!({ "content": { "title": "Garden day", "body": "We planted tomatoes." } });
    let json = body_json(post_json(test.app(), "/api/v1/cultural/validate", body).await).await;
    let data = &json["data"];

    assert_eq!(data["result"]["valid"], true);
    assert_eq!(data["result"]["violations"].as_array().unwrap().len(), 0);
    assert_eq!(data["result"]["warnings"].as_array().unwrap().len(), 0);
    assert_eq!(data["sensitivity"]["tier"], "public");
    assert_eq!(data["consultation"]["required"], false);
}

#[tokio::test]
async fn test_validate_is_repeatable() {
    let test = build_test_app();
    let first = body_json(
        post_json(test.app(), "/api/v1/cultural/validate", ceremony_story()).await,
    )
    .await;
    let second = body_json(
        post_json(test.app(), "/api/v1/cultural/validate", ceremony_story()).await,
    )
    .await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_validate_rejects_malformed_body() {
    let test = build_test_app();
    let response =
        post_json(test.app(), "/api/v1/cultural/validate", json!({ "context": {} })).await;
    assert!(response.status().is_client_error());
}

// ---------------------------------------------------------------------------
// Test: POST /api/v1/cultural/sensitivity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_sensitivity_keeps_rule_tier_and_flags_analysis() {
    let test = build_test_app();
    let body = json!({
        "content": { "title": "Market day", "body": "Stalls and music." },
        "analysis": "Assessment: SACRED material, consult Elders."
    });
    let response = post_json(test.app(), "/api/v1/cultural/sensitivity", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["tier"], "public");
    assert_eq!(data["analysis"]["tier"], "sacred");
    assert_eq!(data["analysis"]["confidence"], "low");
    assert_eq!(data["needs_review"], true);
    assert_eq!(data["reason"]["kind"], "no_signals");
}

#[tokio::test]
async fn test_sensitivity_location_is_community() {
    let test = build_test_app();
    let body = json!({
        "content": { "title": "Market day", "body": "Stalls and music." },
        "context": { "location": { "name": "Alice Springs" } }
    });
    let json = body_json(post_json(test.app(), "/api/v1/cultural/sensitivity", body).await).await;
    assert_eq!(json["data"]["tier"], "community");
    assert_eq!(json["data"]["reason"]["kind"], "location");
    assert_eq!(json["data"]["needs_review"], false);
}

// ---------------------------------------------------------------------------
// Test: POST /api/v1/cultural/publish-check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_publish_check_allows_plain_content() {
    let test = build_test_app();
    let body = json!({
        "content": { "title": "Garden day", "body": "We planted tomatoes." },
        "context": { "content_type": "story", "content_id": "1" }
    });
    let response = post_json(test.app(), "/api/v1/cultural/publish-check", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"], "allowed");
    assert_eq!(json["data"]["requires_consultation"], false);
}

#[tokio::test]
async fn test_publish_check_requires_consultation_for_sacred_content() {
    let test = build_test_app();
    let body = json!({
        "content": { "title": "Our Ceremony Story", "body": "This describes a ceremony." },
        "context": { "content_type": "story", "content_id": "2" }
    });
    let response = post_json(test.app(), "/api/v1/cultural/publish-check", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["outcome"], "consultation_required");
    assert!(data["recommended_advisor"].is_object());
    assert_eq!(data["next_action"]["action"], "create_consultation");
    assert_eq!(data["next_action"]["priority"], "HIGH");
    assert_eq!(data["assessment"]["result"]["valid"], false);
}

#[tokio::test]
async fn test_publish_check_recommends_specialist() {
    let test = build_test_app();
    let body = json!({
        "content": { "title": "Dreaming", "body": "A story of the dreaming." },
        "context": { "content_type": "story", "content_id": "3" }
    });
    let json = body_json(post_json(test.app(), "/api/v1/cultural/publish-check", body).await).await;
    assert_eq!(json["data"]["recommended_advisor"]["name"], "Uncle Jim");
}

#[tokio::test]
async fn test_publish_check_store_outage_is_503() {
    let test = build_test_app();
    test.consultations.set_unavailable(true);
    let body = json!({
        "content": { "title": "Our Ceremony Story", "body": "This describes a ceremony." },
        "context": { "content_type": "story", "content_id": "4" }
    });
    let response = post_json(test.app(), "/api/v1/cultural/publish-check", body).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = body_json(response).await;
    assert_eq!(json["code"], "LOOKUP_FAILED");
    assert_eq!(json["details"]["retryable"], true);
}
