// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session behaviour against a scripted transport

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use bytes::Bytes;
use seepia::http::{Cookie, CookieJar, FastCookieStore};
use seepia::{default_options, Error, Request, Session, SessionOption};
use tokio_test::{assert_err, assert_ok};
use url::Url;

use common::{Outcome, ScriptedBuilder};

const PROXY_A: &str = "http://127.0.0.1:3001";
const PROXY_B: &str = "http://127.0.0.1:3002";

async fn session_with(builder: Arc<ScriptedBuilder>, extra: Vec<SessionOption>) -> Session {
    let mut options = default_options();
    options.extend(extra);
    Session::with_builder(options, builder).await.unwrap()
}

fn via(response: &seepia::Response) -> String {
    response.header("x-via").unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_network_failure_returns_placeholder() {
    let builder = ScriptedBuilder::new(|_| Outcome::Fail(Error::network("connection refused")));
    let session = session_with(builder, vec![]).await;

    let err = session.get("https://example.com/").await.unwrap_err();

    assert_eq!(err.response.status_code, -1);
    assert!(err.response.body.is_none());
    assert!(err.response.body_bytes.is_none());
    assert!(matches!(err.error, Error::Network(_)));
}

#[tokio::test]
async fn test_body_read_error_keeps_head() {
    let builder = ScriptedBuilder::new(|_| Outcome::Respond {
        status: 200,
        headers: vec![("content-type".into(), "text/plain".into())],
        chunks: vec![
            Ok(Bytes::from_static(b"partial")),
            Err(Error::body_read("connection reset")),
        ],
    });
    let session = session_with(builder.clone(), vec![]).await;

    let err = session.get("https://example.com/").await.unwrap_err();

    assert_eq!(err.response.status_code, 200);
    assert_eq!(err.response.header("content-type"), Some("text/plain"));
    assert!(err.response.body.is_none());
    assert!(matches!(err.error, Error::BodyRead(_)));
    assert_eq!(builder.recorder.drops(), 1);
}

#[tokio::test]
async fn test_body_released_once_per_request() {
    let builder = ScriptedBuilder::ok();
    let session = session_with(builder.clone(), vec![]).await;

    for _ in 0..5 {
        let response = session.get("https://example.com/").await.unwrap();
        assert_eq!(response.text(), "ok");
        assert_eq!(response.body_bytes.as_ref().map(|b| b.len()), Some(2));
    }

    assert_eq!(builder.recorder.drops(), 5);
}

#[tokio::test]
async fn test_binary_body_leaves_text_unset() {
    let builder = ScriptedBuilder::new(|_| Outcome::Respond {
        status: 200,
        headers: vec![("content-type".into(), "image/png".into())],
        chunks: vec![
            Ok(Bytes::from_static(&[0x89, b'P', b'N', b'G'])),
            Ok(Bytes::from_static(&[0xff, 0xfe])),
        ],
    });
    let session = session_with(builder, vec![]).await;

    let response = assert_ok!(session.get("https://example.com/logo.png").await);

    assert_eq!(
        response.body_bytes.as_deref(),
        Some(&[0x89, b'P', b'N', b'G', 0xff, 0xfe][..])
    );
    assert!(response.body.is_none());
}

#[tokio::test]
async fn test_default_headers_only_for_bare_requests() {
    let builder = ScriptedBuilder::ok();
    let session = session_with(
        builder.clone(),
        vec![SessionOption::default_headers([
            ("User-Agent", "seepia-test"),
            ("Accept", "*/*"),
        ])],
    )
    .await;

    session.get("https://example.com/").await.unwrap();
    let sent = builder.recorder.last();
    assert_eq!(sent.headers.get("user-agent").unwrap(), "seepia-test");
    assert_eq!(sent.header_order, vec!["user-agent", "accept"]);

    let request = Request::get("https://example.com/")
        .unwrap()
        .header("X-Custom", "1")
        .header_order(["X-Custom"]);
    session.execute(request).await.unwrap();
    let sent = builder.recorder.last();
    assert!(sent.headers.get("user-agent").is_none());
    assert_eq!(sent.header_order, vec!["x-custom"]);
}

#[tokio::test]
async fn test_fast_store_overrides_cookie_and_merges() {
    let builder = ScriptedBuilder::new(|_| {
        Outcome::ok("ok")
            .with_header("set-cookie", "b=3; Path=/")
            .with_header("set-cookie", "c=4; HttpOnly")
    });
    let store = FastCookieStore::from_header("a=1; b=2");
    let session = session_with(
        builder.clone(),
        vec![SessionOption::FastCookieStore(store.clone())],
    )
    .await;

    let request = Request::get("https://example.com/")
        .unwrap()
        .header("Cookie", "caller=9");
    session.execute(request).await.unwrap();

    let sent = builder.recorder.last();
    assert_eq!(sent.headers.get("cookie").unwrap(), "a=1; b=2");
    assert_eq!(store.cookie_string(), "a=1; b=3; c=4");
}

#[tokio::test]
async fn test_standard_jar_not_updated_from_responses() {
    let builder = ScriptedBuilder::new(|_| Outcome::ok("ok").with_header("set-cookie", "sid=1"));
    let jar = CookieJar::new();
    let session = session_with(builder, vec![SessionOption::CookieJar(Arc::new(jar.clone()))]).await;

    session.get("https://example.com/").await.unwrap();

    assert!(jar.is_empty());
    let url = Url::parse("https://example.com/").unwrap();
    assert!(session.cookies(&url).is_empty());

    session.set_cookies(&url, vec![Cookie::new("manual", "1")]);
    assert_eq!(session.cookies(&url).len(), 1);
}

#[tokio::test]
async fn test_concurrent_set_cookie_merges_are_not_lost() {
    let builder = ScriptedBuilder::new(|request| {
        let name = request.url.path().trim_start_matches('/').to_string();
        Outcome::ok("ok").with_header("set-cookie", &format!("{}=v", name))
    });
    let store = FastCookieStore::new();
    let session = session_with(builder, vec![SessionOption::FastCookieStore(store.clone())]).await;

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let session = session.clone();
            tokio::spawn(async move { session.get(&format!("https://example.com/c{}", i)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.len(), 32);
    assert_eq!(store.get("c17"), Some("v".to_string()));
}

#[tokio::test]
async fn test_set_proxy_swaps_transport() {
    let builder = ScriptedBuilder::ok();
    let session = session_with(builder.clone(), vec![]).await;
    assert_eq!(session.proxy(), "");

    session.set_proxy(PROXY_A).await.unwrap();
    assert_eq!(session.proxy(), PROXY_A);

    let response = session.get("https://example.com/").await.unwrap();
    assert_eq!(via(&response), "http://127.0.0.1:3001/");
}

#[tokio::test]
async fn test_set_proxy_rolls_back_on_build_failure() {
    let builder = ScriptedBuilder::ok();
    let session = session_with(builder.clone(), vec![SessionOption::Proxy(PROXY_A.into())]).await;
    builder.fail_proxy("3002");

    let err = session.set_proxy(PROXY_B).await.unwrap_err();

    assert!(matches!(err, Error::TransportBuild(_)));
    assert_eq!(session.proxy(), PROXY_A);
    let response = session.get("https://example.com/").await.unwrap();
    assert_eq!(via(&response), "http://127.0.0.1:3001/");
    // initial build, then the rebuilt previous route
    assert_eq!(builder.builds.lock().len(), 2);
}

#[tokio::test]
async fn test_invalid_proxy_url_keeps_direct_route() {
    let builder = ScriptedBuilder::ok();
    let session = session_with(builder.clone(), vec![]).await;

    let err = assert_err!(session.set_proxy("socks5://127.0.0.1:1080").await);

    assert!(matches!(err, Error::TransportBuild(_)));
    assert_eq!(session.proxy(), "");
    assert_ok!(session.get("https://example.com/").await);
}

#[tokio::test]
async fn test_rollback_failure_reports_both_errors() {
    let builder = ScriptedBuilder::ok();
    let session = session_with(builder.clone(), vec![SessionOption::Proxy(PROXY_A.into())]).await;
    builder.fail_proxy("3001");
    builder.fail_proxy("3002");

    let err = session.set_proxy(PROXY_B).await.unwrap_err();

    match &err {
        Error::ProxyRollback {
            requested,
            previous,
            original,
            rollback,
        } => {
            assert_eq!(requested, PROXY_B);
            assert_eq!(previous, PROXY_A);
            assert!(matches!(**original, Error::TransportBuild(_)));
            assert!(matches!(**rollback, Error::TransportBuild(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.transport_state_unknown());
    assert_eq!(session.proxy(), PROXY_A);
    assert_ok!(session.get("https://example.com/").await);
}

#[tokio::test]
async fn test_requests_during_proxy_rotation_see_consistent_transport() {
    let builder = ScriptedBuilder::ok();
    let session = session_with(builder, vec![SessionOption::Proxy(PROXY_A.into())]).await;

    let requests: Vec<_> = (0..64)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move { session.get("https://example.com/").await })
        })
        .collect();
    let rotations = {
        let session = session.clone();
        tokio::spawn(async move {
            for i in 0..10 {
                let proxy = if i % 2 == 0 { PROXY_B } else { PROXY_A };
                session.set_proxy(proxy).await.unwrap();
            }
        })
    };

    for task in requests {
        let response = task.await.unwrap().unwrap();
        let via = via(&response);
        assert!(via == "http://127.0.0.1:3001/" || via == "http://127.0.0.1:3002/");
    }
    rotations.await.unwrap();

    assert_eq!(session.proxy(), PROXY_A);
    let response = session.get("https://example.com/").await.unwrap();
    assert_eq!(via(&response), "http://127.0.0.1:3001/");
}

#[tokio::test]
async fn test_close_idle_connections_reaches_active_transport() {
    let builder = ScriptedBuilder::ok();
    let session = session_with(builder.clone(), vec![]).await;

    session.close_idle_connections();
    session.close_idle_connections();

    assert_eq!(builder.idle_closes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_store_accessors() {
    let session = session_with(ScriptedBuilder::ok(), vec![]).await;
    assert!(session.cookie_jar().is_none());
    assert!(session.fast_cookie_store().is_none());

    let store = FastCookieStore::from_header("k=v");
    session.set_fast_cookie_store(Some(store));
    assert_eq!(
        session.fast_cookie_store().map(|s| s.cookie_string()),
        Some("k=v".to_string())
    );

    session.set_cookie_jar(Some(Arc::new(CookieJar::new())));
    assert!(session.cookie_jar().is_some());
}
