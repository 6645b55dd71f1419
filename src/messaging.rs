//! Messaging
//!
//! Outbound confirmations handed off to WhatsApp as pre-filled deep links.
//! Delivery is fire-and-forget: a [`Messenger`] never reports failure back to
//! the workflow that produced the message.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::info;

use crate::{orders::Order, pricing::price_label};

/// Characters left unescaped in the message text, matching `encodeURIComponent`.
const MESSAGE_TEXT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A pre-filled chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhatsAppMessage {
    /// Recipient number in international form, digits only
    pub recipient: String,

    /// Message body
    pub text: String,
}

impl WhatsAppMessage {
    /// Message to `recipient`, whose number is normalised first.
    pub fn new(recipient: &str, text: impl Into<String>) -> Self {
        Self {
            recipient: normalize_phone(recipient),
            text: text.into(),
        }
    }

    /// `https://wa.me/` link opening a chat with the text filled in.
    pub fn deep_link(&self) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.recipient,
            utf8_percent_encode(&self.text, MESSAGE_TEXT)
        )
    }
}

/// Receives outbound messages.
pub trait Messenger: fmt::Debug + Send + Sync {
    /// Hands a message off. Implementations swallow and log their own failures.
    fn send(&self, message: &WhatsAppMessage);
}

/// Logs the deep link instead of opening it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessenger;

impl Messenger for LogMessenger {
    fn send(&self, message: &WhatsAppMessage) {
        info!(recipient = %message.recipient, link = %message.deep_link(), "whatsapp handoff");
    }
}

/// Digits only, with a leading `0` replaced by the `62` country code.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    match digits.strip_prefix('0') {
        Some(rest) => format!("62{rest}"),
        None => digits,
    }
}

/// Sent to the merchant when a purchaser submits a payment proof.
pub fn checkout_confirmation(merchant: &str, order: &Order) -> WhatsAppMessage {
    let text = format!(
        "*Om Swastyastu, Konfirmasi Pembayaran Griya Banten.*\n\
         No. Pesanan: #{id}\n\
         Pemesan: {purchaser}\n\
         Status Pembayaran: *MENUNGGU VERIFIKASI* (Bukti Terlampir)\n\
         Total: {total}\n\
         \n\
         *File Bukti Pesanan telah saya lampirkan pada chat ini.*\n\
         \n\
         Mohon dicek bukti transfernya. Suksma.",
        id = order.id,
        purchaser = order.purchaser,
        total = price_label(order.total),
    );

    WhatsAppMessage::new(merchant, text)
}

/// Sent to the purchaser once an admin verifies the payment.
pub fn payment_verified(order: &Order) -> WhatsAppMessage {
    let text = format!(
        "*Om Swastyastu {purchaser},*\n\
         \n\
         Pembayaran untuk pesanan #{id} telah kami terima dan verifikasi (LUNAS).\n\
         \n\
         Berikut kami lampirkan Invoice LUNAS.\n\
         \n\
         Suksma telah berbelanja di Griya Banten Online.",
        purchaser = order.purchaser,
        id = order.id,
    );

    WhatsAppMessage::new(&order.phone, text)
}

/// Sent to the purchaser when a paid invoice is issued again.
pub fn invoice_resent(order: &Order) -> WhatsAppMessage {
    let text = format!(
        "*Om Swastyastu {purchaser},*\n\
         \n\
         Berikut kami kirimkan kembali Invoice LUNAS untuk pesanan #{id}.\n\
         \n\
         Suksma.",
        purchaser = order.purchaser,
        id = order.id,
    );

    WhatsAppMessage::new(&order.phone, text)
}
