//! End-to-end session lifecycle tests over a scripted transport

use integration_tests::*;
use relay_cache::CacheFlags;
use relay_common::{BackoffConfig, ClientError, GatewayConfig};
use relay_core::Snowflake;
use relay_gateway::SessionState;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn identify_then_ready_reaches_connected() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();
    let mut state_rx = client.session_state_receiver().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);

    let identify = conn.expect_identify().await.unwrap();
    assert_eq!(identify.token, "test-token");
    assert!(!identify.intents.is_empty());

    conn.dispatch("READY", 1, ready_payload("sess-1"));
    wait_for_state(&mut state_rx, SessionState::Connected)
        .await
        .unwrap();
    assert_eq!(client.last_sequence(), 1);

    client.close();
    client.wait_until_closed().await.unwrap();
    assert_eq!(client.session_state(), SessionState::Disconnected);
}

#[tokio::test]
async fn resumable_close_resumes_and_preserves_cache() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 1, ready_payload("sess-1"));
    conn.dispatch("GUILD_MEMBER_ADD", 2, member_add_payload(10, 200, "alice"));

    let member_cached = || {
        client
            .caches()
            .members()
            .get(Snowflake::new(10), Snowflake::new(200))
            .is_some()
    };
    wait_until(member_cached).await.unwrap();

    // remote closes with a resumable code
    conn.close(Some(4000));

    let mut conn2 = next_connection(&mut connections).await.unwrap();
    conn2.hello(45_000);
    let resume = conn2.expect_resume().await.unwrap();
    assert_eq!(resume.session_id, "sess-1");
    assert_eq!(resume.seq, 2);

    conn2.dispatch("RESUMED", 3, json!(null));
    wait_until(|| client.last_sequence() == 3).await.unwrap();

    // the reconnect kept both the sequence number and the mirror
    assert!(member_cached());

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn network_drop_without_close_frame_resumes() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 7, ready_payload("sess-7"));
    wait_until(|| client.last_sequence() == 7).await.unwrap();

    conn.sever();

    let mut conn2 = next_connection(&mut connections).await.unwrap();
    conn2.hello(45_000);
    let resume = conn2.expect_resume().await.unwrap();
    assert_eq!(resume.seq, 7);

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn invalid_session_forces_fresh_identify() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 5, ready_payload("sess-1"));
    wait_until(|| client.last_sequence() == 5).await.unwrap();

    conn.invalid_session(false);

    // the new connection identifies from scratch and the sequence resets
    let mut conn2 = next_connection(&mut connections).await.unwrap();
    conn2.hello(45_000);
    conn2.expect_identify().await.unwrap();
    assert_eq!(client.last_sequence(), 0);

    conn2.dispatch("READY", 1, ready_payload("sess-2"));
    wait_until(|| client.last_sequence() == 1).await.unwrap();

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn remote_reconnect_request_resumes() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 3, ready_payload("sess-3"));
    wait_until(|| client.last_sequence() == 3).await.unwrap();

    conn.reconnect();

    let mut conn2 = next_connection(&mut connections).await.unwrap();
    conn2.hello(45_000);
    let resume = conn2.expect_resume().await.unwrap();
    assert_eq!(resume.session_id, "sess-3");

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn heartbeats_carry_last_sequence() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(50);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 9, ready_payload("sess-9"));
    wait_until(|| client.last_sequence() == 9).await.unwrap();

    let first = conn.expect_heartbeat().await.unwrap();
    conn.ack();
    let second = conn.expect_heartbeat().await.unwrap();
    conn.ack();

    // pulses after READY carry the recorded high-water mark
    assert_eq!(second, Some(9));
    assert!(first.is_none() || first == Some(9));

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn missed_heartbeat_ack_declares_zombie_and_reconnects() {
    // long backoff keeps the session observable in Reconnecting
    let config = GatewayConfig::default()
        .with_connect_timeout(Duration::from_secs(2))
        .with_backoff(BackoffConfig {
            base_ms: 60_000,
            max_ms: 60_000,
        });
    let (client, mut connections) = test_client_with(CacheFlags::all(), config).unwrap();
    client.connect().unwrap();
    let mut state_rx = client.session_state_receiver().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(30);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 1, ready_payload("sess-1"));

    // swallow heartbeats without ever acking
    conn.expect_heartbeat().await.unwrap();

    wait_for_state(&mut state_rx, SessionState::Reconnecting)
        .await
        .unwrap();

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn repeated_auth_failures_abort_the_client() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();

    for _ in 0..3 {
        let mut conn = next_connection(&mut connections).await.unwrap();
        conn.hello(45_000);
        conn.expect_identify().await.unwrap();
        conn.close(Some(4004));
    }

    let result = client.wait_until_closed().await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed)));
    assert_eq!(client.session_state(), SessionState::Disconnected);
}

#[tokio::test]
async fn out_of_order_sequences_are_dropped_and_gaps_accepted() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 1, ready_payload("sess-1"));

    conn.dispatch("GUILD_MEMBER_ADD", 2, member_add_payload(10, 201, "a"));
    // duplicate sequence: dropped, not applied
    conn.dispatch("GUILD_MEMBER_ADD", 2, member_add_payload(10, 202, "b"));
    // gap: accepted (and flagged for a later resync)
    conn.dispatch("GUILD_MEMBER_ADD", 5, member_add_payload(10, 203, "c"));

    let members = client.caches().members();
    wait_until(|| members.get(Snowflake::new(10), Snowflake::new(203)).is_some())
        .await
        .unwrap();

    assert!(members.get(Snowflake::new(10), Snowflake::new(201)).is_some());
    assert!(members.get(Snowflake::new(10), Snowflake::new(202)).is_none());
    assert_eq!(client.last_sequence(), 5);

    client.close();
    client.wait_until_closed().await.unwrap();
}
