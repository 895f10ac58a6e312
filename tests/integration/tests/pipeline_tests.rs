//! End-to-end dispatch pipeline tests over a scripted transport

use std::sync::Arc;

use integration_tests::*;
use parking_lot::Mutex;
use relay_cache::CacheFlags;
use relay_client::{Event, FnListener};
use relay_core::Snowflake;
use serde_json::json;

#[tokio::test]
async fn member_add_scenario_with_members_flag_only() {
    let (client, mut connections) = test_client(CacheFlags::MEMBERS).unwrap();

    let joins: Arc<Mutex<Vec<(Snowflake, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let joins_clone = joins.clone();
    client.add_listener(Arc::new(FnListener(move |event: &Event| {
        if let Event::MemberJoin(join) = event {
            joins_clone
                .lock()
                .push((join.guild_id, join.member.user.username.clone()));
        }
    })));

    client.connect().unwrap();
    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 1, ready_payload("sess-1"));
    conn.dispatch("GUILD_MEMBER_ADD", 2, member_add_payload(10, 200, "alice"));

    wait_until(|| !joins.lock().is_empty()).await.unwrap();

    // the member was admitted under the members flag
    let member = client
        .caches()
        .members()
        .get(Snowflake::new(10), Snowflake::new(200))
        .expect("member should be cached");
    assert_eq!(member.user.username, "alice");

    // the domain event carried the group id
    assert_eq!(joins.lock().as_slice(), &[(Snowflake::new(10), "alice".to_string())]);

    // kinds without their flag stayed empty
    assert!(client.caches().users().is_empty());

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn unknown_event_tag_is_swallowed_without_mutation() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 1, ready_payload("sess-1"));

    // a ban-remove shaped payload under a tag this client has no handler for
    conn.dispatch("BAN_REMOVE_LEGACY", 2, ban_remove_payload(10, 200));
    // pipeline keeps running: the next payload still applies
    conn.dispatch("GUILD_MEMBER_ADD", 3, member_add_payload(10, 201, "bob"));

    wait_until(|| {
        client
            .caches()
            .members()
            .get(Snowflake::new(10), Snowflake::new(201))
            .is_some()
    })
    .await
    .unwrap();

    // the unknown payload mutated nothing
    assert!(client.caches().bans().is_empty());
    assert!(client.caches().users().get(Snowflake::new(200)).is_none());
    assert_eq!(client.last_sequence(), 3);

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn redelivered_upsert_is_idempotent() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 1, ready_payload("sess-1"));

    // the same logical fact delivered twice under fresh sequence numbers
    conn.dispatch("GUILD_MEMBER_ADD", 2, member_add_payload(10, 200, "alice"));
    conn.dispatch("GUILD_MEMBER_ADD", 3, member_add_payload(10, 200, "alice"));

    wait_until(|| client.last_sequence() == 3).await.unwrap();

    let members = client.caches().members();
    assert_eq!(members.len(), 1);
    let member = members
        .get(Snowflake::new(10), Snowflake::new(200))
        .unwrap();
    assert_eq!(member.user.username, "alice");

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn ban_remove_caches_user_and_emits_unban() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();

    let unbans: Arc<Mutex<Vec<Snowflake>>> = Arc::new(Mutex::new(Vec::new()));
    let unbans_clone = unbans.clone();
    client.add_listener(Arc::new(FnListener(move |event: &Event| {
        if let Event::GuildUnban(unban) = event {
            unbans_clone.lock().push(unban.guild_id);
        }
    })));

    client.connect().unwrap();
    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 1, ready_payload("sess-1"));
    conn.dispatch("GUILD_BAN_REMOVE", 2, ban_remove_payload(10, 200));

    wait_until(|| !unbans.lock().is_empty()).await.unwrap();

    assert_eq!(unbans.lock().as_slice(), &[Snowflake::new(10)]);
    // the pardoned user lands in the user cache
    assert!(client.caches().users().get(Snowflake::new(200)).is_some());

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn events_arrive_in_wire_order() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();

    let sequences: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let sequences_clone = sequences.clone();
    client.add_listener(Arc::new(FnListener(move |event: &Event| {
        sequences_clone.lock().push(event.sequence());
    })));

    client.connect().unwrap();
    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 1, ready_payload("sess-1"));

    for seq in 2..=20u64 {
        conn.dispatch(
            "MESSAGE_CREATE",
            seq,
            message_payload(50, 900 + seq as i64, "hi"),
        );
    }

    wait_until(|| sequences.lock().len() == 20).await.unwrap();

    let seen = sequences.lock();
    let mut sorted = seen.clone();
    sorted.sort_unstable();
    assert_eq!(*seen, sorted, "events must preserve wire order");

    client.close();
    client.wait_until_closed().await.unwrap();
}

#[tokio::test]
async fn malformed_payload_drops_only_that_payload() {
    let (client, mut connections) = test_client(CacheFlags::all()).unwrap();
    client.connect().unwrap();

    let mut conn = next_connection(&mut connections).await.unwrap();
    conn.hello(45_000);
    conn.expect_identify().await.unwrap();
    conn.dispatch("READY", 1, ready_payload("sess-1"));

    // body does not decode as a member
    conn.dispatch("GUILD_MEMBER_ADD", 2, json!({"user": "broken"}));
    conn.dispatch("GUILD_MEMBER_ADD", 3, member_add_payload(10, 200, "alice"));

    wait_until(|| {
        client
            .caches()
            .members()
            .get(Snowflake::new(10), Snowflake::new(200))
            .is_some()
    })
    .await
    .unwrap();

    assert_eq!(client.caches().members().len(), 1);

    client.close();
    client.wait_until_closed().await.unwrap();
}
