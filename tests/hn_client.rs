use std::time::Duration;

use hn_feed_reader::comments::CommentThread;
use hn_feed_reader::config::ApiConfig;
use hn_feed_reader::hn_client::{fetch_many, HackerNewsClient, ItemSource};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HackerNewsClient {
    let config = ApiConfig {
        // No trailing slash on purpose; the client adds it.
        base_url: format!("{}/v0", server.uri()),
        request_timeout_secs: 5,
        ..ApiConfig::default()
    };
    HackerNewsClient::new(&config).expect("client")
}

async fn mount_item(server: &MockServer, id: u64, body: serde_json::Value, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v0/item/{}.json", id)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn top_story_ids_come_back_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([9, 5, 3, 100])))
        .mount(&server)
        .await;

    let ids = client_for(&server).top_story_ids().await.expect("ids");
    assert_eq!(ids, vec![9, 5, 3, 100]);
}

#[tokio::test]
async fn story_is_decoded_from_item_endpoint() {
    let server = MockServer::start().await;
    mount_item(
        &server,
        8863,
        json!({
            "by": "dhouston",
            "descendants": 71,
            "id": 8863,
            "kids": [8952, 9224],
            "score": 111,
            "time": 1175714200,
            "title": "My YC app: Dropbox - Throw away your USB drive",
            "type": "story",
            "url": "http://www.getdropbox.com/u/2/screencast.html"
        }),
        0,
    )
    .await;

    let story = client_for(&server).story(8863).await.expect("fetch").expect("present");
    assert_eq!(story.by, "dhouston");
    assert_eq!(story.kids, vec![8952, 9224]);
    assert_eq!(story.score, 111);
    assert_eq!(story.domain().as_deref(), Some("getdropbox.com"));
}

#[tokio::test]
async fn null_item_is_absent_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/item/1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let comment = client_for(&server).comment(1).await.expect("fetch");
    assert_eq!(comment, None);
}

#[tokio::test]
async fn server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/topstories.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(client_for(&server).top_story_ids().await.is_err());
}

#[tokio::test]
async fn joined_fetch_keeps_input_order() {
    let server = MockServer::start().await;
    // 9 answers first, 5 last.
    mount_item(&server, 5, json!({"id": 5, "title": "five"}), 300).await;
    mount_item(&server, 3, json!({"id": 3, "title": "three"}), 150).await;
    mount_item(&server, 9, json!({"id": 9, "title": "nine"}), 0).await;

    let client = client_for(&server);
    let stories = fetch_many(&[5, 3, 9], |id| client.story(id)).await;

    let titles: Vec<Option<String>> = stories
        .into_iter()
        .map(|story| story.map(|s| s.title))
        .collect();
    assert_eq!(
        titles,
        vec![
            Some("five".to_string()),
            Some("three".to_string()),
            Some("nine".to_string())
        ]
    );
}

#[tokio::test]
async fn failed_item_leaves_a_gap_in_the_join() {
    let server = MockServer::start().await;
    mount_item(&server, 1, json!({"id": 1, "title": "one"}), 0).await;
    Mock::given(method("GET"))
        .and(path("/v0/item/2.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let stories = fetch_many(&[1, 2], |id| client.story(id)).await;
    assert_eq!(stories.len(), 2);
    assert!(stories[0].is_some());
    assert!(stories[1].is_none());
}

#[tokio::test]
async fn comment_thread_keeps_missing_entries_but_hides_them() {
    let server = MockServer::start().await;
    mount_item(
        &server,
        11,
        json!({"id": 11, "by": "alice", "text": "first", "parent": 10, "kids": [12]}),
        50,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/v0/item/13.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    mount_item(
        &server,
        14,
        json!({"id": 14, "deleted": true, "parent": 10}),
        0,
    )
    .await;
    mount_item(
        &server,
        15,
        json!({"id": 15, "by": "bob", "text": "second", "parent": 10}),
        0,
    )
    .await;

    let client = client_for(&server);
    let thread = CommentThread::load(&client, &[11, 13, 14, 15]).await;

    assert_eq!(thread.entries().len(), 4);
    assert!(thread.entries()[1].is_none());
    let authors: Vec<&str> = thread.visible().map(|c| c.by.as_str()).collect();
    assert_eq!(authors, vec!["alice", "bob"]);
}

#[tokio::test]
async fn empty_comment_list_makes_no_requests() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let thread = CommentThread::load(&client, &[]).await;

    assert!(thread.is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
