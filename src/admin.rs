//! Admin Review
//!
//! Reads the persisted orders, splits them into those waiting for
//! verification and the settled history, and moves an order to paid. Moving
//! to paid is the only way out of the pending state.

use std::{fmt, io, sync::Arc};

use jiff::civil::Date;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    invoice::{self, DocumentRenderer, DocumentSink, InvoiceError, RenderedDocument},
    messaging::{self, Messenger},
    orders::{Order, OrderId, OrderStatus, OrderStore},
    pricing::{TotalPriceError, format_idr, rupiah, total_price, whole_rupiah},
    storage::StorageError,
};

/// Question asked before an order is settled.
pub const VERIFY_PROMPT: &str = "Konfirmasi pembayaran valid? Status akan diubah menjadi LUNAS, \
                                 Invoice akan diunduh, dan WhatsApp User akan dibuka.";

/// Admin review errors
#[derive(Debug, Error)]
pub enum AdminError {
    /// The admin declined the confirmation prompt
    #[error("Verifikasi dibatalkan.")]
    Cancelled,

    /// No persisted order has the id
    #[error("Pesanan #{0} tidak ditemukan.")]
    NotFound(OrderId),

    /// The order has not been verified yet
    #[error("Pesanan #{0} belum lunas.")]
    NotPaid(OrderId),

    /// The order carries no cart lines to itemise
    #[error("Data item keranjang tidak ditemukan untuk order ini. Tidak dapat generate PDF.")]
    MissingSnapshot(OrderId),

    /// Wrapped storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Wrapped document error
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Wrapped money error
    #[error(transparent)]
    Money(#[from] TotalPriceError),

    /// IO error writing a table
    #[error("Failed to write table: {0}")]
    Io(#[from] io::Error),
}

/// Explicit yes/no prompt.
pub trait Confirmation: fmt::Debug + Send + Sync {
    /// Asks `prompt`; `true` means go ahead.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirmation for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Dashboard figures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReviewSummary {
    /// Orders waiting for verification
    pub pending: usize,

    /// Every persisted order
    pub orders: usize,

    /// Sum of every order total, verified or not
    pub revenue: i64,
}

/// Outcome of a verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verification {
    /// The order as persisted after the status change
    pub order: Order,

    /// The paid document, absent when the order has no cart lines or
    /// rendering failed
    pub document: Option<RenderedDocument>,
}

/// Admin review surface
#[derive(Debug, Clone)]
pub struct AdminReview {
    orders: Arc<OrderStore>,
    renderer: Arc<dyn DocumentRenderer>,
    sink: Arc<dyn DocumentSink>,
    messenger: Arc<dyn Messenger>,
}

impl AdminReview {
    /// Review surface over `orders`, handing documents and messages to the
    /// given ports.
    pub fn new(
        orders: Arc<OrderStore>,
        renderer: Arc<dyn DocumentRenderer>,
        sink: Arc<dyn DocumentSink>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            orders,
            renderer,
            sink,
            messenger,
        }
    }

    /// Orders waiting for verification, most recent first.
    pub fn pending(&self) -> Vec<Order> {
        self.orders
            .list_all()
            .into_iter()
            .filter(|order| order.status.is_pending())
            .collect()
    }

    /// Every order that is not pending, most recent first.
    pub fn history(&self) -> Vec<Order> {
        self.orders
            .list_all()
            .into_iter()
            .filter(|order| !order.status.is_pending())
            .collect()
    }

    /// Pending count and revenue. Revenue counts every order, including the
    /// ones not verified yet.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Money`] on a money arithmetic error.
    pub fn summary(&self) -> Result<ReviewSummary, AdminError> {
        let orders = self.orders.list_all();
        let revenue = total_price(orders.iter().map(|order| rupiah(order.total)))?;

        Ok(ReviewSummary {
            pending: orders.iter().filter(|order| order.status.is_pending()).count(),
            orders: orders.len(),
            revenue: whole_rupiah(&revenue),
        })
    }

    /// Settles an order after an explicit confirmation, then issues the paid
    /// document and tells the purchaser.
    ///
    /// The document and the message are best-effort: an order without cart
    /// lines is still settled and messaged, only without a document.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] for unknown ids,
    /// [`AdminError::Cancelled`] when the prompt is declined (nothing changes)
    /// and [`AdminError::Storage`] when the status cannot be persisted.
    pub fn verify(
        &self,
        order_id: &OrderId,
        confirmation: &dyn Confirmation,
    ) -> Result<Verification, AdminError> {
        if self.orders.find(order_id).is_none() {
            return Err(AdminError::NotFound(order_id.clone()));
        }

        if !confirmation.confirm(VERIFY_PROMPT) {
            info!(order = %order_id, "verification cancelled");

            return Err(AdminError::Cancelled);
        }

        let order = self
            .orders
            .update_status(order_id, OrderStatus::Paid)?
            .ok_or_else(|| AdminError::NotFound(order_id.clone()))?;

        let document = match invoice::generate(&order, self.renderer.as_ref()) {
            Ok(document) => {
                self.save(&document);
                Some(document)
            }
            Err(err) => {
                warn!(order = %order.id, error = %err, "paid document skipped");
                None
            }
        };

        self.messenger.send(&messaging::payment_verified(&order));

        info!(order = %order.id, "order verified");

        Ok(Verification { order, document })
    }

    /// Issues the paid document again and re-sends it to the purchaser.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] for unknown ids,
    /// [`AdminError::NotPaid`] for orders still pending and
    /// [`AdminError::MissingSnapshot`] for orders without cart lines.
    pub fn resend_invoice(&self, order_id: &OrderId) -> Result<RenderedDocument, AdminError> {
        let order = self
            .orders
            .find(order_id)
            .ok_or_else(|| AdminError::NotFound(order_id.clone()))?;

        if !order.status.is_paid() {
            return Err(AdminError::NotPaid(order.id));
        }

        let document = invoice::generate(&order, self.renderer.as_ref()).map_err(|err| match err {
            InvoiceError::MissingSnapshot(id) => AdminError::MissingSnapshot(id),
            err => AdminError::Invoice(err),
        })?;

        self.sink.save(&document)?;
        self.messenger.send(&messaging::invoice_resent(&order));

        info!(order = %order.id, file = %document.file_name, "invoice re-sent");

        Ok(document)
    }

    /// Prints the pending orders, then the history.
    ///
    /// # Errors
    ///
    /// Returns an error if `out` cannot be written.
    pub fn write_table(&self, mut out: impl io::Write) -> Result<(), AdminError> {
        let orders = self.orders.list_all();
        let (pending, history): (Vec<_>, Vec<_>) =
            orders.into_iter().partition(|order| order.status.is_pending());

        writeln!(out, "Menunggu Verifikasi ({})", pending.len())?;
        writeln!(out, "{}", orders_table(&pending))?;
        writeln!(out)?;
        writeln!(out, "Riwayat Pesanan ({})", history.len())?;
        writeln!(out, "{}", orders_table(&history))?;

        Ok(())
    }

    fn save(&self, document: &RenderedDocument) {
        if let Err(err) = self.sink.save(document) {
            warn!(file = %document.file_name, error = %err, "document not saved");
        }
    }
}

/// Orders as a table, one row each.
pub fn orders_table(orders: &[Order]) -> String {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Tanggal", "Pemesan", "Telepon", "Item", "Total", "Status"]);

    for order in orders {
        builder.push_record([
            order.id.to_string(),
            date_label(order.date),
            order.purchaser.clone(),
            order.phone.clone(),
            order.items.join(", "),
            format_idr(order.total),
            order.status.label().to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(5..6), Alignment::right());

    table.to_string()
}

fn date_label(date: Date) -> String {
    date.strftime("%-d/%-m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        invoice::{DocumentKind, TableRenderer, tests::order_with_lines},
        orders::tests::sample_order,
        storage::MemoryStore,
        testing::{MemorySink, RecordingMessenger, ScriptedConfirmation},
    };

    use super::*;

    struct Fixture {
        orders: Arc<OrderStore>,
        sink: Arc<MemorySink>,
        messenger: Arc<RecordingMessenger>,
        review: AdminReview,
    }

    fn fixture(orders: Vec<Order>) -> Result<Fixture, Box<dyn std::error::Error>> {
        let store = Arc::new(OrderStore::with_default_key(Arc::new(MemoryStore::new())));

        for order in orders.into_iter().rev() {
            store.append(order)?;
        }

        let sink = Arc::new(MemorySink::default());
        let messenger = Arc::new(RecordingMessenger::default());
        let review = AdminReview::new(
            Arc::clone(&store),
            Arc::new(TableRenderer),
            sink.clone(),
            messenger.clone(),
        );

        Ok(Fixture {
            orders: store,
            sink,
            messenger,
            review,
        })
    }

    #[test]
    fn orders_are_partitioned_by_status() -> TestResult {
        let fixture = fixture(vec![
            sample_order("ORD-000003", OrderStatus::AwaitingVerification),
            sample_order("ORD-000002", OrderStatus::Paid),
            sample_order("ORD-000001", OrderStatus::New),
        ])?;

        let pending: Vec<_> = fixture.review.pending().into_iter().map(|order| order.id).collect();
        let history: Vec<_> = fixture.review.history().into_iter().map(|order| order.id).collect();

        assert_eq!(pending, [OrderId::from("ORD-000003"), OrderId::from("ORD-000001")]);
        assert_eq!(history, [OrderId::from("ORD-000002")]);

        Ok(())
    }

    #[test]
    fn revenue_includes_unverified_orders() -> TestResult {
        let mut paid = sample_order("ORD-000002", OrderStatus::Paid);
        paid.total = 350_000;

        let fixture = fixture(vec![
            sample_order("ORD-000003", OrderStatus::AwaitingVerification),
            paid,
        ])?;

        assert_eq!(
            fixture.review.summary()?,
            ReviewSummary {
                pending: 1,
                orders: 2,
                revenue: 500_000,
            }
        );

        Ok(())
    }

    #[test]
    fn verify_settles_issues_document_and_messages_purchaser() -> TestResult {
        let fixture = fixture(vec![order_with_lines(OrderStatus::AwaitingVerification)?])?;
        let confirmation = ScriptedConfirmation::accepting();
        let id = OrderId::from("ORD-482913");

        let verification = fixture.review.verify(&id, &confirmation)?;

        assert_eq!(verification.order.status, OrderStatus::Paid);
        assert_eq!(
            verification.document.as_ref().map(|doc| (doc.kind, doc.file_name.as_str())),
            Some((DocumentKind::Paid, "Invoice_LUNAS_ORD-482913.txt"))
        );
        assert_eq!(confirmation.prompts(), [VERIFY_PROMPT]);
        assert_eq!(fixture.sink.file_names(), ["Invoice_LUNAS_ORD-482913.txt"]);
        assert_eq!(
            fixture.messenger.sent().first().map(|message| message.recipient.as_str()),
            Some("6281234000111")
        );
        assert_eq!(
            fixture.orders.find(&id).map(|order| order.status),
            Some(OrderStatus::Paid)
        );

        Ok(())
    }

    #[test]
    fn declined_confirmation_changes_nothing() -> TestResult {
        let fixture = fixture(vec![order_with_lines(OrderStatus::AwaitingVerification)?])?;
        let id = OrderId::from("ORD-482913");

        let result = fixture.review.verify(&id, &ScriptedConfirmation::declining());

        assert!(matches!(result, Err(AdminError::Cancelled)));
        assert_eq!(
            fixture.orders.find(&id).map(|order| order.status),
            Some(OrderStatus::AwaitingVerification)
        );
        assert!(fixture.sink.file_names().is_empty());
        assert!(fixture.messenger.sent().is_empty());

        Ok(())
    }

    #[test]
    fn unknown_order_is_not_found_without_prompting() -> TestResult {
        let fixture = fixture(Vec::new())?;
        let confirmation = ScriptedConfirmation::accepting();

        let result = fixture.review.verify(&OrderId::from("ORD-999999"), &confirmation);

        assert!(matches!(result, Err(AdminError::NotFound(id)) if id.as_str() == "ORD-999999"));
        assert!(confirmation.prompts().is_empty());

        Ok(())
    }

    #[test]
    fn missing_snapshot_still_settles_and_messages() -> TestResult {
        let fixture = fixture(vec![sample_order("ORD-000007", OrderStatus::New)])?;

        let verification = fixture
            .review
            .verify(&OrderId::from("ORD-000007"), &ScriptedConfirmation::accepting())?;

        assert_eq!(verification.order.status, OrderStatus::Paid);
        assert_eq!(verification.document, None);
        assert!(fixture.sink.file_names().is_empty());
        assert_eq!(fixture.messenger.sent().len(), 1);

        Ok(())
    }

    #[test]
    fn resend_refuses_pending_orders_and_missing_snapshots() -> TestResult {
        let fixture = fixture(vec![
            sample_order("ORD-000009", OrderStatus::AwaitingVerification),
            sample_order("ORD-000008", OrderStatus::Paid),
        ])?;

        let pending = fixture.review.resend_invoice(&OrderId::from("ORD-000009"));
        let no_lines = fixture.review.resend_invoice(&OrderId::from("ORD-000008"));

        assert!(matches!(pending, Err(AdminError::NotPaid(_))));
        assert!(matches!(no_lines, Err(AdminError::MissingSnapshot(_))));
        assert_eq!(
            AdminError::MissingSnapshot(OrderId::from("ORD-000008")).to_string(),
            "Data item keranjang tidak ditemukan untuk order ini. Tidak dapat generate PDF."
        );
        assert!(fixture.messenger.sent().is_empty());

        Ok(())
    }

    #[test]
    fn resend_reissues_the_paid_document() -> TestResult {
        let fixture = fixture(vec![order_with_lines(OrderStatus::Paid)?])?;

        let document = fixture.review.resend_invoice(&OrderId::from("ORD-482913"))?;

        assert_eq!(document.kind, DocumentKind::Paid);
        assert_eq!(fixture.sink.file_names(), ["Invoice_LUNAS_ORD-482913.txt"]);
        assert!(
            fixture
                .messenger
                .sent()
                .first()
                .is_some_and(|message| message.text.contains("kembali Invoice LUNAS"))
        );

        Ok(())
    }

    #[test]
    fn table_lists_both_sections() -> TestResult {
        let fixture = fixture(vec![
            sample_order("ORD-000003", OrderStatus::AwaitingVerification),
            sample_order("ORD-000002", OrderStatus::Paid),
        ])?;

        let mut out = Vec::new();
        fixture.review.write_table(&mut out)?;
        let text = String::from_utf8(out)?;

        assert!(text.starts_with("Menunggu Verifikasi (1)\n"));
        assert!(text.contains("Riwayat Pesanan (1)"));
        assert!(text.contains("ORD-000003"));
        assert!(text.contains("Rp 150.000"));
        assert!(text.contains("LUNAS"));

        Ok(())
    }
}
