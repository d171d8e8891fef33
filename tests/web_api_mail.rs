//! Web API Mail Tests
//!
//! Integration tests for outbound sending, mailbox access and reverse-alias
//! management endpoints.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use postmask::Plan;
use serde_json::{json, Value};

use common::create_test_app;

/// Create an alias through the API and return its id and address.
async fn create_alias(
    app: &common::TestApp,
    token: &str,
    name: &str,
    collaborative: bool,
) -> (i64, String) {
    let body: Value = app
        .server
        .post("/api/aliases")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "name": name, "is_collaborative": collaborative }))
        .await
        .json();
    (
        body["data"]["id"].as_i64().unwrap(),
        body["data"]["address"].as_str().unwrap().to_string(),
    )
}

// ============================================================================
// Send Tests
// ============================================================================

#[tokio::test]
async fn test_send_mail_success() {
    let app = create_test_app().await;
    let (_id, token) = app.create_user("alice@example.com", "Alice", Plan::Free).await;
    let (_alias_id, address) = create_alias(&app, &token, "sales", false).await;

    let response = app
        .server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({
            "from": address,
            "to": "buyer@ext.com",
            "subject": "Offer",
            "body": "Interested?"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["entry"]["direction"], "sent");
    assert_eq!(body["data"]["entry"]["counterpart"], "buyer@ext.com");
    let reverse_address = body["data"]["reverse_address"].as_str().unwrap();
    assert!(reverse_address.starts_with("ra_"));
    assert!(reverse_address.ends_with("@m.test"));

    // The relayed message shows only the alias
    let sent = app.relay.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, "sales@m.test");
    assert_eq!(sent[0].reply_to, "sales@m.test");
}

#[tokio::test]
async fn test_send_twice_reuses_reverse_address() {
    let app = create_test_app().await;
    let (_id, token) = app.create_user("alice@example.com", "Alice", Plan::Free).await;
    let (_alias_id, address) = create_alias(&app, &token, "sales", false).await;

    let first: Value = app
        .server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "from": address, "to": "buyer@ext.com", "subject": "One", "body": "B" }))
        .await
        .json();
    let second: Value = app
        .server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "from": address, "to": "buyer@ext.com", "subject": "Two", "body": "B" }))
        .await
        .json();

    assert_eq!(
        first["data"]["reverse_address"],
        second["data"]["reverse_address"]
    );
}

#[tokio::test]
async fn test_viewer_cannot_send_member_can() {
    let app = create_test_app().await;
    let (_owner, owner_token) = app.create_user("owner@example.com", "Owner", Plan::Pro).await;
    let (_m, member_token) = app.create_user("member@example.com", "Member", Plan::Free).await;
    let (_v, viewer_token) = app.create_user("viewer@example.com", "Viewer", Plan::Free).await;
    let (alias_id, address) = create_alias(&app, &owner_token, "team", true).await;

    for (email, role) in [("member@example.com", "member"), ("viewer@example.com", "viewer")] {
        app.server
            .post(&format!("/api/aliases/{alias_id}/collaborators"))
            .add_header(AUTHORIZATION, format!("Bearer {}", owner_token))
            .json(&json!({ "email": email, "role": role }))
            .await
            .assert_status_ok();
    }

    let send_body = json!({ "from": address, "to": "x@ext.com", "subject": "S", "body": "B" });

    let response = app
        .server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", viewer_token))
        .json(&send_body)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", member_token))
        .json(&send_body)
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_send_from_inaccessible_alias_is_404() {
    let app = create_test_app().await;
    let (_owner, owner_token) = app.create_user("owner@example.com", "Owner", Plan::Free).await;
    let (_eve, eve_token) = app.create_user("eve@example.com", "Eve", Plan::Free).await;
    let (_alias_id, address) = create_alias(&app, &owner_token, "sales", false).await;

    let response = app
        .server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", eve_token))
        .json(&json!({ "from": address, "to": "x@ext.com", "subject": "S", "body": "B" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_relay_failure_is_bad_gateway() {
    let app = create_test_app().await;
    let (_id, token) = app.create_user("alice@example.com", "Alice", Plan::Free).await;
    let (alias_id, address) = create_alias(&app, &token, "sales", false).await;
    app.relay.fail_for("buyer@ext.com");

    let response = app
        .server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "from": address, "to": "buyer@ext.com", "subject": "S", "body": "B" }))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    // No mailbox entry was recorded for the failed attempt
    let body: Value = app
        .server
        .get(&format!("/api/aliases/{alias_id}/mailbox"))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await
        .json();
    assert!(body["data"].as_array().unwrap().is_empty());
}

// ============================================================================
// Mailbox Tests
// ============================================================================

#[tokio::test]
async fn test_mailbox_listing_and_detail() {
    let app = create_test_app().await;
    let (_id, token) = app.create_user("alice@example.com", "Alice", Plan::Free).await;
    let (alias_id, address) = create_alias(&app, &token, "sales", false).await;

    app.server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "from": address, "to": "b@ext.com", "subject": "Sent one", "body": "B" }))
        .await
        .assert_status_ok();

    let body: Value = app
        .server
        .get(&format!("/api/aliases/{alias_id}/mailbox"))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await
        .json();
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["direction"], "sent");
    assert_eq!(body["meta"]["total"], 1);
    // List view omits the body
    assert!(entries[0].get("body").is_none());

    let entry_id = entries[0]["id"].as_i64().unwrap();
    let detail: Value = app
        .server
        .get(&format!("/api/mailbox/{entry_id}"))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await
        .json();
    assert_eq!(detail["data"]["body"], "B");
    assert_eq!(detail["data"]["transport_id"], "mem-1");
}

#[tokio::test]
async fn test_mailbox_pagination() {
    let app = create_test_app().await;
    let (_id, token) = app.create_user("alice@example.com", "Alice", Plan::Free).await;
    let (alias_id, address) = create_alias(&app, &token, "sales", false).await;

    for i in 0..3 {
        app.server
            .post("/api/send")
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
            .json(&json!({
                "from": address,
                "to": format!("r{i}@ext.com"),
                "subject": format!("S{i}"),
                "body": "B"
            }))
            .await
            .assert_status_ok();
    }

    let body: Value = app
        .server
        .get(&format!("/api/aliases/{alias_id}/mailbox?page=2&per_page=2"))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await
        .json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["meta"]["page"], 2);
    assert_eq!(body["meta"]["total"], 3);
}

#[tokio::test]
async fn test_mailbox_entry_hard_delete_by_collaborator() {
    let app = create_test_app().await;
    let (_owner, owner_token) = app.create_user("owner@example.com", "Owner", Plan::Pro).await;
    let (_v, viewer_token) = app.create_user("viewer@example.com", "Viewer", Plan::Free).await;
    let (alias_id, address) = create_alias(&app, &owner_token, "team", true).await;

    app.server
        .post(&format!("/api/aliases/{alias_id}/collaborators"))
        .add_header(AUTHORIZATION, format!("Bearer {}", owner_token))
        .json(&json!({ "email": "viewer@example.com", "role": "viewer" }))
        .await
        .assert_status_ok();

    let sent: Value = app
        .server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", owner_token))
        .json(&json!({ "from": address, "to": "b@ext.com", "subject": "S", "body": "B" }))
        .await
        .json();
    let entry_id = sent["data"]["entry"]["id"].as_i64().unwrap();

    // Any accessible user may hard-delete
    app.server
        .delete(&format!("/api/mailbox/{entry_id}"))
        .add_header(AUTHORIZATION, format!("Bearer {}", viewer_token))
        .await
        .assert_status_ok();

    let response = app
        .server
        .get(&format!("/api/mailbox/{entry_id}"))
        .add_header(AUTHORIZATION, format!("Bearer {}", owner_token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mailbox_entry_inaccessible_is_404() {
    let app = create_test_app().await;
    let (_owner, owner_token) = app.create_user("owner@example.com", "Owner", Plan::Free).await;
    let (_eve, eve_token) = app.create_user("eve@example.com", "Eve", Plan::Free).await;
    let (_alias_id, address) = create_alias(&app, &owner_token, "sales", false).await;

    let sent: Value = app
        .server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", owner_token))
        .json(&json!({ "from": address, "to": "b@ext.com", "subject": "S", "body": "B" }))
        .await
        .json();
    let entry_id = sent["data"]["entry"]["id"].as_i64().unwrap();

    let response = app
        .server
        .get(&format!("/api/mailbox/{entry_id}"))
        .add_header(AUTHORIZATION, format!("Bearer {}", eve_token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app
        .server
        .delete(&format!("/api/mailbox/{entry_id}"))
        .add_header(AUTHORIZATION, format!("Bearer {}", eve_token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Reverse Alias Management Tests
// ============================================================================

#[tokio::test]
async fn test_list_and_deactivate_reverse_alias() {
    let app = create_test_app().await;
    let (_id, token) = app.create_user("alice@example.com", "Alice", Plan::Free).await;
    let (alias_id, address) = create_alias(&app, &token, "sales", false).await;

    app.server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "from": address, "to": "buyer@ext.com", "subject": "S", "body": "B" }))
        .await
        .assert_status_ok();

    let listed: Value = app
        .server
        .get(&format!("/api/aliases/{alias_id}/reverse"))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await
        .json();
    let reverses = listed["data"].as_array().unwrap();
    assert_eq!(reverses.len(), 1);
    assert_eq!(reverses[0]["recipient_email"], "buyer@ext.com");
    assert_eq!(reverses[0]["emails_sent"], 1);
    let reverse_id = reverses[0]["id"].as_i64().unwrap();

    let response = app
        .server
        .post(&format!("/api/reverse/{reverse_id}/deactivate"))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["is_active"], false);

    // A new send mints a fresh identifier
    let sent: Value = app
        .server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "from": address, "to": "buyer@ext.com", "subject": "S2", "body": "B" }))
        .await
        .json();
    let new_reverse = sent["data"]["reverse_address"].as_str().unwrap();
    let old_reverse = format!("{}@m.test", reverses[0]["reverse_id"].as_str().unwrap());
    assert_ne!(new_reverse, old_reverse);
}

#[tokio::test]
async fn test_deactivate_reverse_alias_stranger_404() {
    let app = create_test_app().await;
    let (_id, token) = app.create_user("alice@example.com", "Alice", Plan::Free).await;
    let (alias_id, address) = create_alias(&app, &token, "sales", false).await;
    let (_eve, eve_token) = app.create_user("eve@example.com", "Eve", Plan::Free).await;

    app.server
        .post("/api/send")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .json(&json!({ "from": address, "to": "buyer@ext.com", "subject": "S", "body": "B" }))
        .await
        .assert_status_ok();

    let listed: Value = app
        .server
        .get(&format!("/api/aliases/{alias_id}/reverse"))
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await
        .json();
    let reverse_id = listed["data"][0]["id"].as_i64().unwrap();

    let response = app
        .server
        .post(&format!("/api/reverse/{reverse_id}/deactivate"))
        .add_header(AUTHORIZATION, format!("Bearer {}", eve_token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}
