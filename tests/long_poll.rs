//! Long polling on `GET /talks` against a real server.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use skillshare_sdk::PollResult;

mod common;

#[tokio::test]
async fn test_current_tag_without_wait_is_not_modified() {
    let server = common::spawn_server().await;
    let client = server.client();

    let PollResult::Changed { tag, .. } = client.poll_talks(None, None).await.unwrap() else {
        panic!("first poll must return the list");
    };
    let tag = tag.expect("list carries an ETag");
    assert_eq!(tag, "\"0\"");

    let started = Instant::now();
    assert_eq!(client.poll_talks(Some(&tag), None).await.unwrap(), PollResult::NotModified);
    assert!(started.elapsed() < Duration::from_secs(1));

    // A stale or foreign tag gets the full list straight away.
    for stale in ["\"41\"", "\"abc\"", "W/\"x\""] {
        assert!(matches!(
            client.poll_talks(Some(stale), Some(30)).await.unwrap(),
            PollResult::Changed { .. }
        ));
    }

    server.stop().await.0.unwrap();
}

#[tokio::test]
async fn test_wait_times_out_with_not_modified() {
    let server = common::spawn_server().await;
    let http = reqwest::Client::new();

    let started = Instant::now();
    let resp = http
        .get(server.url("/talks"))
        .header("If-None-Match", "\"0\"")
        .header("Prefer", "wait=1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    assert!(started.elapsed() >= Duration::from_millis(900));

    server.stop().await.0.unwrap();
}

#[tokio::test]
async fn test_change_wakes_every_waiter() {
    let server = common::spawn_server().await;
    // A poll that registers late sees a stale tag and still gets the change.
    let polls: Vec<_> = (0..5)
        .map(|_| {
            let client = server.client();
            tokio::spawn(async move { client.poll_talks(Some("\"0\""), Some(30)).await })
        })
        .collect();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let started = Instant::now();
    server
        .client()
        .put_talk("Waking", "Ann", "Everyone hears this")
        .await
        .unwrap();

    for poll in polls {
        let result = tokio::time::timeout(Duration::from_secs(5), poll)
            .await
            .expect("waiter was not woken")
            .unwrap()
            .unwrap();
        let PollResult::Changed { talks, tag } = result else {
            panic!("waiter should see the change");
        };
        assert_eq!(tag.as_deref(), Some("\"1\""));
        assert_eq!(talks.len(), 1);
        assert_eq!(talks[0].title, "Waking");
    }
    assert!(started.elapsed() < Duration::from_secs(5));

    server.stop().await.0.unwrap();
}

#[tokio::test]
async fn test_noop_delete_does_not_wake_waiters() {
    let server = common::spawn_server().await;
    let client = server.client();

    let waiter = {
        let client = server.client();
        tokio::spawn(async move { client.poll_talks(Some("\"0\""), Some(1)).await })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;
    client.delete_talk("Never existed").await.unwrap();

    let result = waiter.await.unwrap().unwrap();
    assert_eq!(result, PollResult::NotModified);

    server.stop().await.0.unwrap();
}

#[tokio::test]
async fn test_shutdown_releases_waiters() {
    let server = common::spawn_server().await;

    let waiter = {
        let client = server.client();
        tokio::spawn(async move { client.poll_talks(Some("\"0\""), Some(60)).await })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = Instant::now();
    let (result, _dir) = server.stop().await;
    result.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));

    // Released as "not modified", or the connection closed under it.
    if let Ok(Ok(poll)) = waiter.await {
        assert_eq!(poll, PollResult::NotModified);
    }
}

#[tokio::test]
async fn test_watch_loop_sees_successive_versions() {
    let server = common::spawn_server().await;
    let client = server.client();
    let writer = server.client();

    let PollResult::Changed { tag, .. } = client.poll_talks(None, None).await.unwrap() else {
        panic!("first poll must return the list");
    };
    let mut tag = tag.unwrap();

    for (i, title) in ["One", "Two", "Three"].into_iter().enumerate() {
        let poll = client.poll_talks(Some(&tag), Some(30));
        let write = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            writer.put_talk(title, "P", "S").await.unwrap();
        };
        let (result, ()) = tokio::join!(poll, write);
        let PollResult::Changed { talks, tag: next } = result.unwrap() else {
            panic!("expected a change");
        };
        assert_eq!(talks.len(), i + 1);
        tag = next.unwrap();
        assert_eq!(tag, format!("\"{}\"", i + 1));
    }

    server.stop().await.0.unwrap();
}
