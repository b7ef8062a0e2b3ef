//! Common test utilities for feed-session integration tests

use feed_session::{Config, Event, SessionState};
use serde_json::{Value, json};
use std::ops::Range;
use std::time::Duration;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Source id served by [`mount_source`]
pub const SOURCE_ID: &str = "336355127";

/// Config pointing the HTTP fetcher at `server`
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.timeout = Duration::from_secs(5);
    config
}

/// Program objects as the remote API returns them
pub fn program_json(ids: Range<u64>) -> Vec<Value> {
    ids.map(|id| {
        json!({
            "id": id,
            "name": format!("episode {id}"),
            "serialNum": id + 1,
            "duration": 1_800_000,
            "createTime": 1_700_000_000_000u64 + id,
            "mainSong": { "id": 9_000 + id, "name": format!("song {id}") },
            "dj": { "userId": 77, "nickname": "Host" }
        })
    })
    .collect()
}

/// Mount the detail endpoint for [`SOURCE_ID`]
pub async fn mount_source(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/dj/detail"))
        .and(query_param("rid", SOURCE_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "djRadio": {
                "id": 336355127u64,
                "name": "Night Talk",
                "desc": "Stories after midnight",
                "picUrl": "https://img.local/cover.jpg",
                "dj": { "userId": 77, "nickname": "Host" }
            }
        })))
        .mount(server)
        .await;
}

/// Mount one page of programs at `offset`
pub async fn mount_page(server: &MockServer, offset: u64, ids: Range<u64>, more: bool) {
    Mock::given(method("GET"))
        .and(path("/dj/program"))
        .and(query_param("rid", SOURCE_ID))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 200,
            "more": more,
            "programs": program_json(ids)
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Wait for the session loading `page` to finish and return its terminal state
pub async fn wait_for_session(
    events: &mut broadcast::Receiver<Event>,
    page: u32,
    timeout: Duration,
) -> Option<SessionState> {
    tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(Event::SessionFinished { page: p, state }) if p == page => return Some(state),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .await
    .ok()
    .flatten()
}
