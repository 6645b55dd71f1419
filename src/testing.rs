//! Test doubles for the side-effect ports.
//!
//! Each double records what it was handed so tests can assert on the
//! constructed messages, notices and documents.

use std::sync::{Arc, Mutex, PoisonError};

use jiff::{Timestamp, Zoned, tz::TimeZone};

use crate::{
    admin::Confirmation,
    clock::Clock,
    invoice::{DocumentSink, InvoiceError, RenderedDocument, TableRenderer},
    messaging::{Messenger, WhatsAppMessage},
    notify::{Notification, Notifier},
    storage::MemoryStore,
    storefront::Ports,
};

/// 2026-10-19 09:00 in Bali (UTC+8).
const DEFAULT_SECOND: i64 = 1_792_371_600;

/// Clock frozen at one instant.
#[derive(Clone, Debug)]
pub struct FixedClock {
    now: Zoned,
}

impl Default for FixedClock {
    fn default() -> Self {
        let zone = TimeZone::fixed(jiff::tz::offset(8));

        Self {
            now: Timestamp::constant(DEFAULT_SECOND, 0).to_zoned(zone),
        }
    }
}

impl FixedClock {
    /// Clock frozen at a Unix millisecond, in UTC.
    ///
    /// # Errors
    ///
    /// Returns an error when the instant is out of range.
    pub fn at_millis(millis: i64) -> Result<Self, jiff::Error> {
        Ok(Self {
            now: Timestamp::from_millisecond(millis)?.to_zoned(TimeZone::UTC),
        })
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Zoned {
        self.now.clone()
    }
}

/// Keeps every message it is handed.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<WhatsAppMessage>>,
}

impl RecordingMessenger {
    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<WhatsAppMessage> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Messenger for RecordingMessenger {
    fn send(&self, message: &WhatsAppMessage) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
    }
}

/// Keeps every notice it is shown.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Notices shown so far, oldest first.
    pub fn notices(&self) -> Vec<Notification> {
        self.notices.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// Keeps every saved document in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Mutex<Vec<RenderedDocument>>,
}

impl MemorySink {
    /// Saved documents, oldest first.
    pub fn documents(&self) -> Vec<RenderedDocument> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// File names of the saved documents, oldest first.
    pub fn file_names(&self) -> Vec<String> {
        self.documents()
            .into_iter()
            .map(|document| document.file_name)
            .collect()
    }
}

impl DocumentSink for MemorySink {
    fn save(&self, document: &RenderedDocument) -> Result<(), InvoiceError> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(document.clone());

        Ok(())
    }
}

/// Answers every prompt the same way and remembers the questions.
#[derive(Debug)]
pub struct ScriptedConfirmation {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmation {
    /// Says yes.
    pub fn accepting() -> Self {
        Self {
            answer: true,
            prompts: Mutex::default(),
        }
    }

    /// Says no.
    pub fn declining() -> Self {
        Self {
            answer: false,
            prompts: Mutex::default(),
        }
    }

    /// Prompts asked so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        self.answer
    }
}

/// Recording doubles for every port, wired into [`Ports`] on demand.
#[derive(Debug, Default, Clone)]
pub struct Harness {
    /// Shared in-memory storage
    pub storage: Arc<MemoryStore>,

    /// Message recorder
    pub messenger: Arc<RecordingMessenger>,

    /// Notice recorder
    pub notifier: Arc<RecordingNotifier>,

    /// Document recorder
    pub sink: Arc<MemorySink>,

    /// Frozen clock
    pub clock: Arc<FixedClock>,
}

impl Harness {
    /// Ports backed by the recorders, rendering documents as text.
    pub fn ports(&self) -> Ports {
        Ports {
            storage: self.storage.clone(),
            messenger: self.messenger.clone(),
            notifier: self.notifier.clone(),
            clock: self.clock.clone(),
            renderer: Arc::new(TableRenderer),
            sink: self.sink.clone(),
        }
    }
}
