use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dialog_client::wire::enums::{ListLoadMode, PeerType, UpdateOptimization};
use dialog_client::wire::functions::media_and_files::GetFileUrl;
use dialog_client::wire::functions::messaging::{LoadHistory, MessageRead, SendMessage};
use dialog_client::wire::types::{
    HistoryMessage, MessageContent, OutPeer, ResponseGetFileUrl, ResponseLoadHistory,
    ResponseSeqDateMid, ResponseVoid, UuidValue,
};
use dialog_client::wire::{Deserializable, RemoteCall, Serializable};
use dialog_client::{
    Channel, Client, Config, Content, Direction, DocumentContent, DocumentKind, FileLocation,
    Image, InvocationError, Media, Peer, PeerDirectory, RawCall, StaticToken, Transport,
    UpdateStream,
};
use uuid::Uuid;

// ── Fake server ───────────────────────────────────────────────────────────────

const HISTORY_LEN: i32 = 25;

/// Answers each method with a canned response and records every call.
#[derive(Default)]
struct FakeServer {
    calls: Mutex<Vec<RawCall>>,
}

impl FakeServer {
    fn last_body<R: Deserializable>(&self, method: &str) -> R {
        let calls = self.calls.lock().unwrap();
        let call = calls.iter().rev().find(|c| c.method == method).expect("method not called");
        R::from_bytes(&call.body).unwrap()
    }

    fn call_count(&self) -> usize { self.calls.lock().unwrap().len() }
}

fn history_entry(n: i32) -> HistoryMessage {
    HistoryMessage {
        peer:        OutPeer { kind: PeerType::Group, id: 9, access_hash: 90 },
        sender_peer: OutPeer { kind: PeerType::Private, id: 100 + n, access_hash: 1 },
        mid:         UuidValue { msb: 0, lsb: n as i64 },
        date:        1_000 + n as i64,
        message:     MessageContent::text(format!("msg {n}")),
    }
}

#[async_trait]
impl Channel for FakeServer {
    async fn unary(&self, call: RawCall) -> Result<Vec<u8>, InvocationError> {
        let reply = match call.method {
            m if m == SendMessage::METHOD => ResponseSeqDateMid {
                seq:  1,
                date: 2,
                mid:  UuidValue { msb: 0x0123, lsb: -5 },
            }
            .to_bytes(),
            m if m == LoadHistory::METHOD => ResponseLoadHistory {
                history: (0..HISTORY_LEN).map(history_entry).collect(),
            }
            .to_bytes(),
            m if m == MessageRead::METHOD => ResponseVoid {}.to_bytes(),
            m if m == GetFileUrl::METHOD => ResponseGetFileUrl {
                url:     "https://files.example/abc".into(),
                timeout: 3600,
            }
            .to_bytes(),
            other => panic!("unexpected method {other}"),
        };
        self.calls.lock().unwrap().push(call);
        Ok(reply)
    }
}

fn client() -> (Client, Arc<FakeServer>) {
    let server = Arc::new(FakeServer::default());
    let (_tx, updates) = UpdateStream::channel();
    let client = Client::start(Config::default(), Transport {
        channel:  server.clone(),
        tokens:   Arc::new(StaticToken::new("bot-token")),
        resolver: Arc::new(PeerDirectory::new()),
        updates,
    })
    .unwrap();
    (client, server)
}

fn group() -> Peer { Peer::group(9, 90) }

fn image(id: i64) -> Media {
    Media::Image(Image { file: FileLocation::new(id, 1), width: 10, height: 20, size: 300 })
}

// ── Sending ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn send_text_builds_request_and_returns_server_id() {
    let (client, server) = client();

    let id = client.send_text(&group(), "hi there", None).await.unwrap();
    assert_eq!(id, Uuid::from(UuidValue { msb: 0x0123, lsb: -5 }));

    let req: SendMessage = server.last_body(SendMessage::METHOD);
    assert_eq!(req.peer, OutPeer { kind: PeerType::Group, id: 9, access_hash: 90 });
    assert_eq!(req.message, MessageContent::text("hi there"));
    assert_eq!(req.is_only_for_user, None);
    assert!(req.rid > 0);
}

#[tokio::test]
async fn only_for_targets_one_user() {
    let (client, server) = client();
    client.send_text(&group(), "psst", Some(42)).await.unwrap();

    let req: SendMessage = server.last_body(SendMessage::METHOD);
    assert_eq!(req.is_only_for_user, Some(42));
}

#[tokio::test]
async fn consecutive_sends_use_distinct_rids() {
    let (client, server) = client();
    client.send_text(&group(), "a", None).await.unwrap();
    let first: SendMessage = server.last_body(SendMessage::METHOD);
    client.send_text(&group(), "b", None).await.unwrap();
    let second: SendMessage = server.last_body(SendMessage::METHOD);
    assert!(second.rid > first.rid);
}

#[tokio::test]
async fn send_media_keeps_attachment_order() {
    let (client, server) = client();
    let items = [image(1), image(2)];

    client.send_media(&group(), &items, None).unwrap().await.unwrap();

    let req: SendMessage = server.last_body(SendMessage::METHOD);
    let text = req.message.text_message.expect("media travels in a text message");
    assert_eq!(text.text, "");
    assert_eq!(text.media, vec![items[0].to_wire(), items[1].to_wire()]);
    assert_eq!(
        Content::from_wire(&MessageContent { text_message: Some(text), ..Default::default() }),
        Content::Media(dialog_client::MediaContent { caption: String::new(), items: items.to_vec() }),
    );
}

#[tokio::test]
async fn send_media_rejects_empty_list_before_calling() {
    let (client, server) = client();
    let result = client.send_media(&group(), &[], None);
    assert!(matches!(result, Err(InvocationError::InvalidArgument(_))));
    assert_eq!(server.call_count(), 0);
}

#[tokio::test]
async fn send_document_maps_every_field() {
    let (client, server) = client();
    let doc = DocumentContent::new(FileLocation::new(77, 88), 4096, "voice.ogg")
        .kind(DocumentKind::Voice { duration: 9 });

    client.send_document(&group(), &doc, None).await.unwrap();

    let req: SendMessage = server.last_body(SendMessage::METHOD);
    let wire = req.message.document_message.expect("document payload");
    assert_eq!(wire.file_id, 77);
    assert_eq!(wire.access_hash, 88);
    assert_eq!(wire.file_size, 4096);
    assert_eq!(wire.name, "voice.ogg");
    assert_eq!(wire.mime_type, "audio/ogg");
    assert_eq!(wire.ext.and_then(|e| e.voice).map(|v| v.duration), Some(9));
}

// ── Files ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_url_carries_timeout() {
    let (client, server) = client();

    let url = client.get_file_url_parts(5, 6).await.unwrap();
    assert_eq!(url.url, "https://files.example/abc");
    assert_eq!(url.timeout, Duration::from_secs(3600));

    let req: GetFileUrl = server.last_body(GetFileUrl::METHOD);
    assert_eq!(req.file.file_id, 5);
    assert_eq!(req.file.access_hash, 6);
}

// ── History ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_forward_requests_mode_and_caps_length() {
    let (client, server) = client();

    let messages = client.load(&group(), 1000, 20, Direction::Forward).unwrap().await.unwrap();

    let req: LoadHistory = server.last_body(LoadHistory::METHOD);
    assert_eq!(req.load_mode, ListLoadMode::Forward);
    assert_eq!(req.date, 1000);
    assert_eq!(req.limit, 20);
    assert_eq!(req.optimizations, [UpdateOptimization::StripEntities, UpdateOptimization::GroupsV2]);

    assert_eq!(messages.len(), 20);
    let first = &messages[0];
    assert_eq!(first.text, "msg 0");
    assert_eq!(first.peer, group());
    assert_eq!(first.sender, Peer::user(100, 1));
    assert_eq!(first.id, Uuid::from(UuidValue { msb: 0, lsb: 0 }));
    assert!(matches!(&first.content, Content::Text(t) if t.text == "msg 0"));
}

#[tokio::test]
async fn load_backward_and_both_map_modes() {
    let (client, server) = client();

    client.load(&group(), 0, 50, Direction::Backward).unwrap().await.unwrap();
    let req: LoadHistory = server.last_body(LoadHistory::METHOD);
    assert_eq!(req.load_mode, ListLoadMode::Backward);

    let all = client.load(&group(), 0, 50, Direction::Both).unwrap().await.unwrap();
    let req: LoadHistory = server.last_body(LoadHistory::METHOD);
    assert_eq!(req.load_mode, ListLoadMode::Both);
    assert_eq!(all.len(), HISTORY_LEN as usize);
}

#[tokio::test]
async fn load_rejects_non_positive_limit() {
    let (client, server) = client();
    assert!(matches!(
        client.load(&group(), 0, 0, Direction::Forward),
        Err(InvocationError::InvalidArgument(_))
    ));
    assert!(client.load(&group(), 0, -3, Direction::Both).is_err());
    assert_eq!(server.call_count(), 0);
}

// ── Read ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn read_acknowledges() {
    let (client, server) = client();

    client.read(&Peer::user(3, 30), 12_345).await.unwrap();

    let req: MessageRead = server.last_body(MessageRead::METHOD);
    assert_eq!(req.peer, OutPeer { kind: PeerType::Private, id: 3, access_hash: 30 });
    assert_eq!(req.date, 12_345);
}

#[tokio::test]
async fn with_deadline_only_affects_the_clone() {
    let (client, _server) = client();
    let quick = client.with_deadline(Duration::from_secs(5));
    assert_eq!(quick.deadline(), Duration::from_secs(5));
    assert_eq!(client.deadline(), dialog_client::DEFAULT_DEADLINE);
}
