// SPDX-FileCopyrightText: 2024 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{pin::pin, sync::Arc, time::Duration};

use chatcoreclient::{
    CacheNotification, ChatClient, QueryKey,
    queries::{ChatHistoryQuery, Query, RoomFriendsQuery, RoomQuery, UserQuery, keys},
};
use chattypes::{
    identifiers::{RoomId, UserId},
    messages::{
        auth::LoginParams,
        room::ChatHistoryEntry,
        user::{SearchType, SearchUser, UpdateUsernameParams, UserProfile},
    },
};
use reqwest::StatusCode;
use serde_json::json;
use tokio_stream::{Stream, StreamExt};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, path_regex, query_param},
};

fn user_json(username: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "uid": "a1b2",
        "username": username,
        "profile": "files/profile/default.png",
        "email": "jdoe@example.com",
        "first_name": "John",
        "last_name": "Doe",
        "contact_number_country_code": 977,
        "contact_number": 9800000000i64,
        "address": "Kathmandu",
    })
}

fn search() -> SearchUser {
    SearchUser {
        search_type: SearchType::Name,
        search: "jo".to_owned(),
        limit: 10,
        offset: 0,
    }
}

async fn setup() -> (MockServer, ChatClient) {
    let _ = tracing_subscriber::fmt::try_init();
    let mock_server = MockServer::start().await;
    let client = ChatClient::with_domain(mock_server.uri()).expect("Failed to create client");
    (mock_server, client)
}

async fn mount_get(mock_server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(mock_server)
        .await;
}

/// Populates the cache with the views affected by relation changes.
async fn warm_cache(mock_server: &MockServer, client: &ChatClient) {
    mount_get(mock_server, "/api/v1/user/getuser/", user_json("jdoe")).await;
    mount_get(mock_server, "/api/v1/user/search/", json!([])).await;
    mount_get(mock_server, "/api/v1/room/room/42/", json!(null)).await;
    mount_get(mock_server, "/api/v1/room/friend/42/", json!([])).await;
    mount_get(mock_server, "/api/v1/room/history/", json!([])).await;

    assert!(client.current_user().await.is_success());
    assert!(client.search_users(search()).await.is_success());
    assert!(client.room(Some(RoomId::new("42"))).await.is_success());
    assert!(client.room_friends(Some(RoomId::new("42"))).await.is_success());
    assert!(client.chat_history().await.is_success());
}

/// Collects notifications until none arrives for a while.
async fn drain<S>(notifications: &mut S) -> Vec<Arc<CacheNotification>>
where
    S: Stream<Item = Arc<CacheNotification>> + Unpin,
{
    let mut received = Vec::new();
    while let Ok(Some(notification)) =
        tokio::time::timeout(Duration::from_millis(100), notifications.next()).await
    {
        received.push(notification);
    }
    received
}

#[tokio::test]
async fn block_invalidates_user_friend_and_room_views() {
    let (mock_server, client) = setup().await;
    warm_cache(&mock_server, &client).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/relation/block/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"blocked": 12})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut notifications = pin!(client.cache().subscribe());
    let state = client.block_user(UserId::new(12)).await;
    assert!(state.is_success());
    assert_eq!(state.data(), Some(&json!({"blocked": 12})));

    let received = drain(&mut notifications).await;
    let invalidated: Vec<QueryKey> = received
        .iter()
        .flat_map(|notification| notification.invalidated.clone())
        .collect();
    for resource in [keys::GET_USER, keys::ADD_FRIEND, keys::ROOM] {
        let count = invalidated
            .iter()
            .filter(|key| **key == QueryKey::new(resource))
            .count();
        assert_eq!(count, 1, "{resource} invalidated {count} times");
    }
    assert_eq!(invalidated.len(), 3);

    let cache = client.cache();
    assert!(cache.is_stale(&UserQuery::current().key()));
    assert!(cache.is_stale(&RoomQuery::new(RoomId::new("42")).key()));
    assert!(cache.is_stale(&RoomFriendsQuery::new(RoomId::new("42")).key()));
    assert!(!cache.is_stale(&ChatHistoryQuery.key()));
}

#[tokio::test]
async fn failed_block_does_not_invalidate() {
    let (mock_server, client) = setup().await;
    warm_cache(&mock_server, &client).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/relation/block/1/"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"detail": "cannot block yourself"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut notifications = pin!(client.cache().subscribe());
    let state = client.block_user(UserId::new(1)).await;

    assert!(state.is_error());
    assert!(state.data().is_none());
    let error = state.error().unwrap();
    assert_eq!(error.status(), Some(StatusCode::FORBIDDEN));
    assert!(error.to_string().contains("cannot block yourself"));

    assert!(drain(&mut notifications).await.is_empty());
    assert!(!client.cache().is_stale(&UserQuery::current().key()));
}

#[tokio::test]
async fn concurrent_identical_queries_are_coalesced() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/room/history/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let other = client.clone();
    let (a, b) = tokio::join!(client.chat_history(), other.chat_history());
    assert!(a.is_success());
    assert!(b.is_success());
}

#[tokio::test]
async fn fresh_data_is_not_refetched() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/room/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(client.rooms().await.is_success());
    assert!(client.rooms().await.is_success());
}

#[tokio::test]
async fn distinct_parameters_are_fetched_separately() {
    let (mock_server, client) = setup().await;

    for offset in ["0", "20"] {
        Mock::given(method("GET"))
            .and(path("/api/v1/message/msg/7/"))
            .and(query_param("offset", offset))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let room_id = RoomId::new("7");
    assert!(client.room_messages(room_id.clone(), 0, 20).await.is_success());
    assert!(client.room_messages(room_id.clone(), 20, 20).await.is_success());
    // Both pages are cached now.
    assert!(client.room_messages(room_id, 0, 20).await.is_success());
}

#[tokio::test]
async fn room_query_without_id_stays_idle() {
    let (mock_server, client) = setup().await;

    Mock::given(path_regex("^/api/v1/room/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    assert!(client.room(None).await.is_idle());
    assert!(client.room_friends(None).await.is_idle());
    let observer = client.observe(RoomQuery::default());
    assert!(observer.state().is_idle());
}

#[tokio::test]
async fn observer_refetches_after_invalidation() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user/getuser/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("before")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/getuser/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("after")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/user/updateusername/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "after"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut observer = client.observe(UserQuery::current());
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        observer.wait_for(|state| state.is_success()),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(state.data().unwrap().user.username, "before");

    let params = UpdateUsernameParams {
        username: "after".to_owned(),
        password: "secret123".to_owned(),
    };
    assert!(client.update_username(params).await.is_success());

    let state = tokio::time::timeout(
        Duration::from_secs(5),
        observer.wait_for(|state| {
            state.is_success()
                && state
                    .data()
                    .is_some_and(|profile| profile.user.username == "after")
        }),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(state.error().is_none());
}

#[tokio::test]
async fn deleting_the_user_clears_the_cache() {
    let (mock_server, client) = setup().await;
    warm_cache(&mock_server, &client).await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/user/delete/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"msg": "deleted"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(client.delete_user().await.is_success());
    assert!(
        client
            .cache()
            .state::<Vec<ChatHistoryEntry>>(&ChatHistoryQuery.key())
            .is_idle()
    );
    assert!(client.api().token().is_none());
}

#[tokio::test]
async fn read_after_mutation_does_not_reuse_pending_request() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user/getuser/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_json("before"))
                .set_delay(Duration::from_millis(300)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/getuser/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("after")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/user/updateusername/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "after"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.current_user().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let params = UpdateUsernameParams {
        username: "after".to_owned(),
        password: "secret123".to_owned(),
    };
    assert!(client.update_username(params).await.is_success());

    let state = client.current_user().await;
    assert_eq!(state.data().unwrap().user.username, "after");

    let earlier = pending.await.unwrap();
    assert_eq!(earlier.data().unwrap().user.username, "before");

    let key = UserQuery::current().key();
    assert!(!client.cache().is_stale(&key));
    let cached = client.cache().state::<UserProfile>(&key);
    assert_eq!(cached.data().unwrap().user.username, "after");
}

#[tokio::test]
async fn dropping_observer_mid_request_leaves_no_loading_entry() {
    let (mock_server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/user/getuser/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_json("jdoe"))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let key = UserQuery::current().key();
    let observer = client.observe(UserQuery::current());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(client.cache().state::<UserProfile>(&key).is_loading());

    drop(observer);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let state = client.cache().state::<UserProfile>(&key);
    assert!(!state.is_loading());
    assert!(state.is_idle());
}

#[tokio::test]
async fn login_starts_with_an_empty_cache() {
    let (mock_server, client) = setup().await;
    warm_cache(&mock_server, &client).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2",
            "token_type": "bearer",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut notifications = pin!(client.cache().subscribe());
    let params = LoginParams {
        username: "other".to_owned(),
        password: "secret123".to_owned(),
    };
    assert!(client.login(params).await.is_success());

    let cache = client.cache();
    assert!(cache.state::<UserProfile>(&UserQuery::current().key()).is_idle());
    assert!(
        cache
            .state::<Vec<ChatHistoryEntry>>(&ChatHistoryQuery.key())
            .is_idle()
    );
    assert!(notifications.next().await.unwrap().everything);
    assert!(client.api().token().is_some());
}
