// SPDX-FileCopyrightText: 2023 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tests for the REST endpoints against a mock server.

use chattypes::{
    identifiers::{NotificationId, RoomId, Uid, UserId, UserLookup},
    messages::{auth::LoginParams, notification::NotificationPatch},
};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

use crate::{ApiClient, ApiClientInitError, RequestError};

fn token_json() -> serde_json::Value {
    json!({
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "token_type": "bearer",
    })
}

async fn client(mock_server: &MockServer) -> ApiClient {
    let _ = tracing_subscriber::fmt::try_init();
    ApiClient::with_default_http_client(mock_server.uri()).expect("Failed to initialize client")
}

#[test]
fn initialize_accepts_hostname() {
    let client = ApiClient::with_default_http_client("localhost:8000").unwrap();
    assert_eq!(
        client.build_url("/api/v1/room/"),
        "http://localhost:8000/api/v1/room/"
    );

    let client = ApiClient::with_default_http_client("https://chat.example.com").unwrap();
    assert_eq!(
        client.build_url("/api/v1/room/"),
        "https://chat.example.com:443/api/v1/room/"
    );
}

#[test]
fn base_path_prefixes_endpoints() {
    let client = ApiClient::with_default_http_client("http://chat.example.com:8000/chat").unwrap();
    assert_eq!(
        client.build_url("/api/v1/room/"),
        "http://chat.example.com:8000/chat/api/v1/room/"
    );

    let client = ApiClient::with_default_http_client("localhost:8000/chat/").unwrap();
    assert_eq!(
        client.build_url("/api/v1/room/"),
        "http://localhost:8000/chat/api/v1/room/"
    );
}

#[tokio::test]
async fn requests_go_below_base_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/api/v1/room/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        ApiClient::with_default_http_client(format!("{}/chat", mock_server.uri())).unwrap();
    assert!(client.rooms().await.unwrap().is_empty());
}

#[test]
fn initialize_rejects_garbage() {
    let res = ApiClient::with_default_http_client("http://");
    assert!(matches!(res, Err(ApiClientInitError::UrlParsingError(_))));
}

#[tokio::test]
async fn login_authenticates_following_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token/"))
        .and(body_json(json!({"username": "jdoe", "password": "secret123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user/onlineuser/"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server).await;
    let params = LoginParams {
        username: "jdoe".to_owned(),
        password: "secret123".to_owned(),
    };
    let token = client.login(&params).await.unwrap();
    assert_eq!(token.access_token, "access-1");
    assert_eq!(client.token(), Some(token));

    let online = client.online_users().await.unwrap();
    assert!(online.is_empty());
}

#[tokio::test]
async fn refresh_session_without_token_is_unauthorized() {
    let mock_server = MockServer::start().await;
    let client = client(&mock_server).await;
    let error = client.refresh_session().await.unwrap_err();
    assert!(error.is_unauthorized());
}

#[tokio::test]
async fn room_messages_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/message/msg/7/"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "m1", "room_id": "7", "sender_id": 1, "created_at": "2024-05-01", "message_text": "hi"},
            {"id": "m2", "room_id": "7", "sender_id": 2, "created_at": "2024-05-01", "status": "seen"},
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server).await;
    let messages = client
        .room_messages(&RoomId::new("7"), 0, 20)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].message_text.as_deref(), Some("hi"));
}

#[tokio::test]
async fn user_lookup_by_uid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user/getuser/"))
        .and(query_param("uid", "k2j4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "uid": "k2j4",
            "username": "jdoe",
            "profile": "files/profile/default.png",
            "email": "jdoe@example.com",
            "first_name": "John",
            "last_name": "Doe",
            "contact_number_country_code": 977,
            "contact_number": 9800000000i64,
            "address": "Kathmandu",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server).await;
    let profile = client
        .user(&UserLookup::ByUid(Uid::new("k2j4")))
        .await
        .unwrap();
    assert_eq!(profile.user.id, UserId::new(3));
}

#[tokio::test]
async fn error_status_is_surfaced_with_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/room/friend/nope/"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"detail": "invalid room id"})),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server).await;
    let error = client
        .room_friends(&RoomId::new("nope"))
        .await
        .unwrap_err();
    match error {
        RequestError::Status { status, detail } => {
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(detail.unwrap().to_string(), "invalid room id");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_bad_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/room/history/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server).await;
    let error = client.chat_history().await.unwrap_err();
    assert!(matches!(error, RequestError::BadResponse(_)));
}

#[tokio::test]
async fn block_passes_payload_through() {
    let mock_server = MockServer::start().await;
    let payload = json!({"id": 1, "username": "me", "anything": [1, 2, 3]});

    Mock::given(method("GET"))
        .and(path("/api/v1/relation/block/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server).await;
    let res = client.block_user(UserId::new(12)).await.unwrap();
    assert_eq!(res, payload);
}

#[tokio::test]
async fn notification_status_patch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/notification/5/"))
        .and(body_json(json!({"is_read": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"msg": "notification updated"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/notification/delete/5/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"msg": "notification deleted"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server).await;
    let id = NotificationId::new(5);
    let res = client
        .change_notification_status(id, &NotificationPatch::mark_read())
        .await
        .unwrap();
    assert_eq!(res.msg, "notification updated");
    let res = client.delete_notification(id).await.unwrap();
    assert_eq!(res.msg, "notification deleted");
}

#[tokio::test]
async fn upload_profile_picture() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/user/upload/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file": "abc.me.png",
            "content": "image/png",
            "path": "files/profile/abc.me.png",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server).await;
    let uploaded = client
        .upload_profile("me.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47])
        .await
        .unwrap();
    assert_eq!(uploaded.path, "files/profile/abc.me.png");

    let error = client
        .upload_profile("me.png", "not a mime type", Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(error, RequestError::Multipart(_)));
}
