//! Hand-rolled fakes for the ports.

use std::sync::{
    atomic::{AtomicI32, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef, NewVideo, Sender, UserId, VideoRecord},
    errors::Error,
    messaging::{port::MessagingPort, types::OutgoingMessage},
    ports::{InsertOutcome, MetadataLookup, MetadataProvider, VideoMetadata, VideoStore},
    Result,
};

#[derive(Default)]
pub struct FakeMessenger {
    next_id: AtomicI32,
    pub sent: Mutex<Vec<OutgoingMessage>>,
    pub answered: Mutex<Vec<(String, Option<String>)>>,
    pub fail_chat: Mutex<Option<ChatId>>,
}

impl FakeMessenger {
    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: ChatId) -> Vec<OutgoingMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.chat_id == chat_id)
            .collect()
    }

    pub fn answered(&self) -> Vec<(String, Option<String>)> {
        self.answered.lock().unwrap().clone()
    }

    /// Make every send to `chat_id` fail.
    pub fn fail_sends_to(&self, chat_id: ChatId) {
        *self.fail_chat.lock().unwrap() = Some(chat_id);
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send(&self, msg: OutgoingMessage) -> Result<MessageRef> {
        if *self.fail_chat.lock().unwrap() == Some(msg.chat_id) {
            return Err(Error::External("telegram error: chat not found".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1000;
        let chat_id = msg.chat_id;
        self.sent.lock().unwrap().push(msg);
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(id),
        })
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.answered
            .lock()
            .unwrap()
            .push((callback_id.to_string(), text.map(str::to_string)));
        Ok(())
    }
}

/// Returns a fixed lookup and counts calls.
pub struct FakeMetadata {
    result: MetadataLookup,
    calls: AtomicUsize,
}

impl FakeMetadata {
    pub fn found(title: &str) -> Self {
        Self {
            result: MetadataLookup::Found(VideoMetadata {
                title: title.to_string(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            result: MetadataLookup::Unavailable {
                reason: "ERROR: [youtube] x: Video unavailable".to_string(),
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn interrupted() -> Self {
        Self {
            result: MetadataLookup::Interrupted,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for FakeMetadata {
    async fn lookup(&self, _url: &str) -> MetadataLookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Every operation fails like a dead pool.
#[derive(Default)]
pub struct FailingStore;

#[async_trait]
impl VideoStore for FailingStore {
    async fn exists(&self, _url: &str) -> Result<bool> {
        Err(Error::Store("pool timed out while waiting for an open connection".to_string()))
    }

    async fn insert(&self, _video: NewVideo) -> Result<InsertOutcome> {
        Err(Error::Store("connection refused".to_string()))
    }

    async fn count(&self) -> Result<u64> {
        Err(Error::Store("connection refused".to_string()))
    }

    async fn page(&self, _offset: u64, _limit: u64) -> Result<Vec<VideoRecord>> {
        Err(Error::Store("connection refused".to_string()))
    }
}

/// `exists` says no, `insert` loses the race.
#[derive(Default)]
pub struct RacingStore;

#[async_trait]
impl VideoStore for RacingStore {
    async fn exists(&self, _url: &str) -> Result<bool> {
        Ok(false)
    }

    async fn insert(&self, _video: NewVideo) -> Result<InsertOutcome> {
        Ok(InsertOutcome::Duplicate)
    }

    async fn count(&self) -> Result<u64> {
        Ok(1)
    }

    async fn page(&self, _offset: u64, _limit: u64) -> Result<Vec<VideoRecord>> {
        Ok(Vec::new())
    }
}

pub fn sender(id: i64, username: Option<&str>) -> Sender {
    Sender {
        id: UserId(id),
        username: username.map(str::to_string),
        full_name: format!("User {id}"),
    }
}
