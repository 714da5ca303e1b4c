//! Change feed over the realtime websocket (Phoenix channel protocol, vsn 1.0.0).

use super::SupabaseAuth;
use crate::config::EnvConfig;
use crate::models::{ChangeEvent, ChangeKind, BOOKMARKS_TABLE};
use futures::channel::oneshot;
use futures::{select, FutureExt, SinkExt, StreamExt};
use gloo_net::websocket::{futures::WebSocket, Message};
use gloo_timers::future::IntervalStream;
use leptos::logging::{log, warn};
use leptos::task::spawn_local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const CHANNEL_NAME: &str = "bookmarks-changes";
const HEARTBEAT_TOPIC: &str = "phoenix";
const HEARTBEAT_INTERVAL_MS: u32 = 25_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub(crate) enum ChannelStatus {
    Connecting,
    Subscribed,
    Closed,
    Errored,
}

#[derive(Debug, Error)]
enum FeedError {
    #[error("not signed in: {0}")]
    Auth(String),
    #[error("websocket error: {0}")]
    Socket(String),
    #[error("channel join rejected: {0}")]
    Rejected(String),
    #[error("channel closed by server")]
    ClosedByServer,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Frame {
    pub topic: String,
    pub event: String,
    pub payload: serde_json::Value,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

impl Frame {
    fn encode(&self) -> Result<String, FeedError> {
        serde_json::to_string(self).map_err(|e| FeedError::Socket(e.to_string()))
    }
}

pub(crate) fn channel_topic(name: &str) -> String {
    format!("realtime:{name}")
}

pub(crate) fn join_frame(topic: &str, join_ref: &str, filter: &str, access_token: &str) -> Frame {
    Frame {
        topic: topic.to_string(),
        event: "phx_join".to_string(),
        payload: serde_json::json!({
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [{
                    "event": "*",
                    "schema": "public",
                    "table": BOOKMARKS_TABLE,
                    "filter": filter,
                }],
                "private": false,
            },
            "access_token": access_token,
        }),
        reference: Some(join_ref.to_string()),
        join_ref: Some(join_ref.to_string()),
    }
}

pub(crate) fn heartbeat_frame(reference: &str) -> Frame {
    Frame {
        topic: HEARTBEAT_TOPIC.to_string(),
        event: "heartbeat".to_string(),
        payload: serde_json::json!({}),
        reference: Some(reference.to_string()),
        join_ref: None,
    }
}

pub(crate) fn leave_frame(topic: &str, reference: &str, join_ref: &str) -> Frame {
    Frame {
        topic: topic.to_string(),
        event: "phx_leave".to_string(),
        payload: serde_json::json!({}),
        reference: Some(reference.to_string()),
        join_ref: Some(join_ref.to_string()),
    }
}

/// What an incoming frame means for a channel joined under `join_ref`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FeedMessage {
    Joined,
    JoinRejected(String),
    Change(ChangeEvent),
    ServerClosed,
}

#[derive(Debug, Deserialize)]
struct ChangePayload {
    data: ChangeData,
}

#[derive(Debug, Deserialize)]
struct ChangeData {
    #[serde(rename = "type")]
    kind: ChangeKind,
    #[serde(default)]
    record: Option<serde_json::Value>,
    #[serde(default)]
    old_record: Option<serde_json::Value>,
}

pub(crate) fn decode_frame(raw: &str, topic: &str, join_ref: &str) -> Option<FeedMessage> {
    let frame: Frame = serde_json::from_str(raw).ok()?;
    if frame.topic != topic {
        return None;
    }

    match frame.event.as_str() {
        "phx_reply" if frame.reference.as_deref() == Some(join_ref) => {
            let status = frame
                .payload
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or("error");
            if status == "ok" {
                Some(FeedMessage::Joined)
            } else {
                let reason = frame
                    .payload
                    .get("response")
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| status.to_string());
                Some(FeedMessage::JoinRejected(reason))
            }
        }
        "postgres_changes" => {
            let payload: ChangePayload = serde_json::from_value(frame.payload).ok()?;
            let row = match payload.data.kind {
                ChangeKind::Delete => payload.data.old_record,
                ChangeKind::Insert | ChangeKind::Update => payload.data.record,
            }
            .unwrap_or(serde_json::Value::Null);
            Some(FeedMessage::Change(ChangeEvent {
                kind: payload.data.kind,
                row,
            }))
        }
        "phx_close" | "phx_error" => Some(FeedMessage::ServerClosed),
        _ => None,
    }
}

#[derive(Default)]
struct RefCounter(u64);

impl RefCounter {
    fn next(&mut self) -> String {
        self.0 = self.0.saturating_add(1);
        self.0.to_string()
    }
}

/// Open change-feed channel. Closing is idempotent; dropping the handle closes it too.
pub(crate) struct ChangeSubscription {
    topic: String,
    close: Option<oneshot::Sender<()>>,
}

impl ChangeSubscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn unsubscribe(mut self) {
        self.close_channel();
    }

    fn close_channel(&mut self) {
        if let Some(tx) = self.close.take() {
            // The task may already be gone; nothing left to close then.
            let _ = tx.send(());
        }
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.close_channel();
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ChangeFeed {
    config: EnvConfig,
    auth: SupabaseAuth,
}

impl ChangeFeed {
    pub fn new(config: EnvConfig, auth: SupabaseAuth) -> Self {
        Self { config, auth }
    }

    /// Subscribes to every insert/update/delete on `user_id`'s bookmark rows.
    pub fn subscribe<E, S>(&self, user_id: &str, on_event: E, on_status: S) -> ChangeSubscription
    where
        E: Fn(ChangeEvent) + 'static,
        S: Fn(ChannelStatus) + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let topic = channel_topic(CHANNEL_NAME);
        let filter = format!("user_id=eq.{user_id}");

        let feed = self.clone();
        let task_topic = topic.clone();
        spawn_local(async move {
            on_status(ChannelStatus::Connecting);
            match feed
                .run_channel(&task_topic, &filter, rx, &on_event, &on_status)
                .await
            {
                Ok(()) => on_status(ChannelStatus::Closed),
                Err(e) => {
                    warn!("Realtime channel {task_topic} stopped: {e}");
                    on_status(ChannelStatus::Errored);
                }
            }
        });

        ChangeSubscription {
            topic,
            close: Some(tx),
        }
    }

    async fn run_channel(
        &self,
        topic: &str,
        filter: &str,
        close_rx: oneshot::Receiver<()>,
        on_event: &dyn Fn(ChangeEvent),
        on_status: &dyn Fn(ChannelStatus),
    ) -> Result<(), FeedError> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| FeedError::Auth(e.to_string()))?;

        let socket = WebSocket::open(&self.config.realtime_url())
            .map_err(|e| FeedError::Socket(e.to_string()))?;
        let (mut sink, stream) = socket.split();

        let mut refs = RefCounter::default();
        let join_ref = refs.next();
        sink.send(Message::Text(
            join_frame(topic, &join_ref, filter, &token).encode()?,
        ))
        .await
        .map_err(|e| FeedError::Socket(e.to_string()))?;

        let mut incoming = stream.fuse();
        let mut heartbeat = IntervalStream::new(HEARTBEAT_INTERVAL_MS).fuse();
        let mut close = close_rx.fuse();

        loop {
            select! {
                msg = incoming.next() => match msg {
                    Some(Ok(Message::Text(raw))) => match decode_frame(&raw, topic, &join_ref) {
                        Some(FeedMessage::Joined) => {
                            log!("Realtime status: {}", ChannelStatus::Subscribed);
                            on_status(ChannelStatus::Subscribed);
                        }
                        Some(FeedMessage::JoinRejected(reason)) => {
                            return Err(FeedError::Rejected(reason));
                        }
                        Some(FeedMessage::Change(event)) => {
                            log!("Realtime event: {} {:?}", event.kind, event.row_id());
                            on_event(event);
                        }
                        Some(FeedMessage::ServerClosed) => return Err(FeedError::ClosedByServer),
                        None => {}
                    },
                    Some(Ok(Message::Bytes(_))) => {}
                    Some(Err(e)) => return Err(FeedError::Socket(e.to_string())),
                    None => return Err(FeedError::ClosedByServer),
                },
                _ = heartbeat.next() => {
                    sink.send(Message::Text(heartbeat_frame(&refs.next()).encode()?))
                        .await
                        .map_err(|e| FeedError::Socket(e.to_string()))?;
                }
                _ = close => {
                    let leave = leave_frame(topic, &refs.next(), &join_ref);
                    if let Ok(text) = leave.encode() {
                        let _ = sink.send(Message::Text(text)).await;
                    }
                    let _ = sink.close().await;
                    log!("Realtime status: {}", ChannelStatus::Closed);
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPIC: &str = "realtime:bookmarks-changes";

    #[test]
    fn test_join_frame_shape() {
        let frame = join_frame(TOPIC, "1", "user_id=eq.u1", "jwt");
        let v = serde_json::to_value(&frame).expect("should serialize");
        assert_eq!(v["topic"], TOPIC);
        assert_eq!(v["event"], "phx_join");
        assert_eq!(v["ref"], "1");
        assert_eq!(v["join_ref"], "1");
        assert_eq!(v["payload"]["access_token"], "jwt");

        let change = &v["payload"]["config"]["postgres_changes"][0];
        assert_eq!(change["event"], "*");
        assert_eq!(change["schema"], "public");
        assert_eq!(change["table"], "bookmarks");
        assert_eq!(change["filter"], "user_id=eq.u1");
    }

    #[test]
    fn test_encode_produces_wire_json() {
        let raw = leave_frame(TOPIC, "3", "1").encode().expect("should encode");
        let v: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(v["event"], "phx_leave");
        assert_eq!(v["topic"], TOPIC);
        assert_eq!(v["ref"], "3");
        assert_eq!(v["join_ref"], "1");
    }

    #[test]
    fn test_heartbeat_frame_uses_phoenix_topic() {
        let v = serde_json::to_value(heartbeat_frame("7")).expect("should serialize");
        assert_eq!(v["topic"], "phoenix");
        assert_eq!(v["event"], "heartbeat");
        assert!(v.get("join_ref").is_none());
    }

    #[test]
    fn test_decode_join_reply() {
        let ok = r#"{"topic":"realtime:bookmarks-changes","event":"phx_reply",
            "payload":{"status":"ok","response":{"postgres_changes":[{"id":1}]}},"ref":"1"}"#;
        assert_eq!(decode_frame(ok, TOPIC, "1"), Some(FeedMessage::Joined));

        // Replies to other refs (heartbeats, leaves) are not join outcomes.
        assert_eq!(decode_frame(ok, TOPIC, "2"), None);

        let rejected = r#"{"topic":"realtime:bookmarks-changes","event":"phx_reply",
            "payload":{"status":"error","response":{"reason":"Invalid JWT"}},"ref":"1"}"#;
        match decode_frame(rejected, TOPIC, "1") {
            Some(FeedMessage::JoinRejected(reason)) => assert!(reason.contains("Invalid JWT")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_insert_and_delete_events() {
        let insert = r#"{"topic":"realtime:bookmarks-changes","event":"postgres_changes",
            "payload":{"data":{"type":"INSERT","schema":"public","table":"bookmarks",
            "commit_timestamp":"2024-05-01T10:15:30Z","errors":null,
            "record":{"id":"b1","title":"Example"},"old_record":null},"ids":[1]},"ref":null}"#;
        match decode_frame(insert, TOPIC, "1") {
            Some(FeedMessage::Change(ev)) => {
                assert_eq!(ev.kind, ChangeKind::Insert);
                assert_eq!(ev.row_id().as_deref(), Some("b1"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let delete = r#"{"topic":"realtime:bookmarks-changes","event":"postgres_changes",
            "payload":{"data":{"type":"DELETE","old_record":{"id":"b1"}},"ids":[1]},"ref":null}"#;
        match decode_frame(delete, TOPIC, "1") {
            Some(FeedMessage::Change(ev)) => {
                assert_eq!(ev.kind, ChangeKind::Delete);
                assert_eq!(ev.row_id().as_deref(), Some("b1"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_ignores_foreign_topics_and_noise() {
        let heartbeat_reply =
            r#"{"topic":"phoenix","event":"phx_reply","payload":{"status":"ok","response":{}},"ref":"1"}"#;
        assert_eq!(decode_frame(heartbeat_reply, TOPIC, "1"), None);

        let presence = r#"{"topic":"realtime:bookmarks-changes","event":"presence_state","payload":{},"ref":null}"#;
        assert_eq!(decode_frame(presence, TOPIC, "1"), None);

        assert_eq!(decode_frame("not json", TOPIC, "1"), None);

        let closed = r#"{"topic":"realtime:bookmarks-changes","event":"phx_close","payload":{},"ref":"1"}"#;
        assert_eq!(decode_frame(closed, TOPIC, "1"), Some(FeedMessage::ServerClosed));
    }

    #[test]
    fn test_subscription_close_is_idempotent() {
        let (tx, mut rx) = oneshot::channel();
        let sub = ChangeSubscription {
            topic: channel_topic(CHANNEL_NAME),
            close: Some(tx),
        };
        assert_eq!(sub.topic(), TOPIC);
        sub.unsubscribe();
        assert_eq!(rx.try_recv(), Ok(Some(())));
    }

    #[test]
    fn test_dropping_subscription_closes_channel() {
        let (tx, mut rx) = oneshot::channel();
        drop(ChangeSubscription {
            topic: channel_topic(CHANNEL_NAME),
            close: Some(tx),
        });
        assert_eq!(rx.try_recv(), Ok(Some(())));
    }
}
