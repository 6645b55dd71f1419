//! Invoices
//!
//! Turns an order and its embedded cart lines into a printable document. The
//! document is a pending order receipt or a paid invoice depending only on the
//! order status; renderers decide the output format.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use jiff::civil::{Date, Time};
use smallvec::{SmallVec, smallvec};
use thiserror::Error;
use tracing::info;

use crate::{
    cart::CartLine,
    orders::{Order, OrderId, OrderStatus},
    pricing::{DONATION_LABEL, format_idr},
};

pub mod table;
pub mod typst;

pub use table::TableRenderer;
pub use typst::TypstRenderer;

/// Brand name printed in the header.
pub const BRAND: &str = "GRIYA BANTEN";

/// Brand tagline printed under the name.
pub const TAGLINE: &str = "Solusi Terpercaya Keperluan Yadnya di Bali";

/// Merchant contact line.
pub const CONTACT: &str = "Denpasar - Bali | WA: 0812-3456-7890";

/// Account the purchaser transfers to.
pub const BANK_ACCOUNT: &str = "BCA: 7725-1234-5678 a.n Griya Banten Online";

/// Closing line on every document.
pub const CLOSING: &str = "Matur Suksma - Om Shanti Shanti Shanti Om";

/// Region printed when an order has none.
pub const FALLBACK_REGION: &str = "Bali";

/// Invoice errors
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// The order carries no cart lines to itemise
    #[error("Detail item tidak ditemukan, tidak dapat mengunduh invoice.")]
    MissingSnapshot(OrderId),

    /// Error formatting document text
    #[error("Failed to format document: {0}")]
    Format(#[from] fmt::Error),

    /// IO error writing a document
    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

/// Paid invoice or pending order receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    /// Payment verified
    Paid,

    /// Waiting for verification
    Pending,
}

impl DocumentKind {
    /// Paid exactly when the status label contains "lunas", ignoring case.
    pub fn for_status(status: &OrderStatus) -> Self {
        if status.is_paid() {
            DocumentKind::Paid
        } else {
            DocumentKind::Pending
        }
    }

    /// Document title.
    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Paid => "INVOICE LUNAS",
            DocumentKind::Pending => "BUKTI PESANAN",
        }
    }

    /// Text of the full-page stamp and header badge.
    pub fn stamp(self) -> &'static str {
        match self {
            DocumentKind::Paid => "LUNAS",
            DocumentKind::Pending => "MENUNGGU VERIFIKASI",
        }
    }

    /// Stamp colour as RGB.
    pub fn stamp_color(self) -> (u8, u8, u8) {
        match self {
            DocumentKind::Paid => (22, 163, 74),
            DocumentKind::Pending => (234, 88, 12),
        }
    }

    /// Footer lines above the closing line.
    pub fn footer(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Paid => &["Dokumen ini sah dan diterbitkan otomatis oleh Griya Banten Online."],
            DocumentKind::Pending => &[
                "* Bukti pesanan ini belum berlaku sebagai invoice lunas.",
                "Mohon tunggu konfirmasi admin setelah bukti pembayaran diverifikasi.",
            ],
        }
    }

    /// File name without extension.
    pub fn file_stem(self, order_id: &OrderId) -> String {
        match self {
            DocumentKind::Paid => format!("Invoice_LUNAS_{order_id}"),
            DocumentKind::Pending => format!("Bukti_Pesanan_{order_id}"),
        }
    }
}

/// A price column cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceCell {
    /// Whole Rupiah amount
    Amount(i64),

    /// Donation, no amount
    Donation,
}

impl fmt::Display for PriceCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceCell::Amount(amount) => f.write_str(&format_idr(*amount)),
            PriceCell::Donation => f.write_str(DONATION_LABEL),
        }
    }
}

/// One table row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvoiceRow {
    /// Main description
    pub description: String,

    /// Second description line
    pub detail: Option<String>,

    /// Unit price
    pub unit_price: PriceCell,

    /// Quantity
    pub quantity: u32,

    /// Row total
    pub total: PriceCell,
}

/// Rows for one cart line. A venue gives a package row plus a catering row
/// when it has guests; officiants and goods give one row each.
pub fn expand_line(line: &CartLine) -> SmallVec<[InvoiceRow; 2]> {
    match line {
        CartLine::Good { good, quantity } => smallvec![InvoiceRow {
            description: good.name.clone(),
            detail: None,
            unit_price: PriceCell::Amount(good.price),
            quantity: *quantity,
            total: PriceCell::Amount(good.price.saturating_mul(i64::from(*quantity))),
        }],
        CartLine::Venue { selection } => {
            let mut rows = smallvec![InvoiceRow {
                description: selection.venue_name.trim().to_string(),
                detail: Some(format!("Paket: {}", selection.package.name)),
                unit_price: PriceCell::Amount(selection.package.price),
                quantity: 1,
                total: PriceCell::Amount(selection.package.price),
            }];

            if selection.guest_count > 0 {
                rows.push(InvoiceRow {
                    description: format!("Catering ({} pax)", selection.guest_count),
                    detail: None,
                    unit_price: PriceCell::Amount(selection.catering_price),
                    quantity: selection.guest_count,
                    total: PriceCell::Amount(selection.catering_total()),
                });
            }

            rows
        }
        CartLine::Officiant { officiant } => smallvec![InvoiceRow {
            description: officiant.name.clone(),
            detail: Some(officiant.house.clone()),
            unit_price: PriceCell::Donation,
            quantity: 1,
            total: PriceCell::Donation,
        }],
    }
}

/// Bill-to block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Purchaser {
    /// Name
    pub name: String,

    /// Phone
    pub phone: String,

    /// Region name
    pub region: String,
}

/// Everything a renderer needs, in display-ready form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvoiceDocument {
    /// Paid or pending
    pub kind: DocumentKind,

    /// Order code
    pub order_id: OrderId,

    /// Submission date
    pub date: Date,

    /// Ceremony date
    pub event_date: Date,

    /// Ceremony time
    pub event_time: Time,

    /// Bill-to block
    pub purchaser: Purchaser,

    /// Table rows
    pub rows: Vec<InvoiceRow>,

    /// Stored order total
    pub total: i64,

    /// Payment method label
    pub payment_method: String,
}

impl InvoiceDocument {
    /// Lays out an order. The total is the order's stored total, not a sum
    /// of the rows.
    ///
    /// # Errors
    ///
    /// Returns [`InvoiceError::MissingSnapshot`] when the order has no cart lines.
    pub fn from_order(order: &Order) -> Result<Self, InvoiceError> {
        let lines = order
            .snapshot()
            .ok_or_else(|| InvoiceError::MissingSnapshot(order.id.clone()))?;

        Ok(Self {
            kind: DocumentKind::for_status(&order.status),
            order_id: order.id.clone(),
            date: order.date,
            event_date: order.event_date,
            event_time: order.event_time,
            purchaser: Purchaser {
                name: order.purchaser.clone(),
                phone: order.phone.clone(),
                region: order
                    .region
                    .map_or_else(|| FALLBACK_REGION.to_string(), |region| region.to_string()),
            },
            rows: lines.iter().flat_map(expand_line).collect(),
            total: order.total,
            payment_method: order.payment_method.clone(),
        })
    }

    /// Submission date as `d/m/yyyy`.
    pub fn date_label(&self) -> String {
        self.date.strftime("%-d/%-m/%Y").to_string()
    }

    /// Ceremony time as `HH:MM`.
    pub fn event_time_label(&self) -> String {
        self.event_time.strftime("%H:%M").to_string()
    }

    /// File name for a renderer's extension.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.kind.file_stem(&self.order_id))
    }
}

/// Turns a document into bytes.
pub trait DocumentRenderer: fmt::Debug + Send + Sync {
    /// File extension of the output, without the dot.
    fn extension(&self) -> &'static str;

    /// Renders the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be produced.
    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>, InvoiceError>;
}

/// A rendered document and its file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Paid or pending
    pub kind: DocumentKind,

    /// File name including extension
    pub file_name: String,

    /// Rendered bytes
    pub bytes: Vec<u8>,
}

/// Renders the document for an order in its current status.
///
/// # Errors
///
/// Returns [`InvoiceError::MissingSnapshot`] for orders without cart lines,
/// or the renderer's error.
pub fn generate(
    order: &Order,
    renderer: &dyn DocumentRenderer,
) -> Result<RenderedDocument, InvoiceError> {
    let document = InvoiceDocument::from_order(order)?;

    Ok(RenderedDocument {
        kind: document.kind,
        file_name: document.file_name(renderer.extension()),
        bytes: renderer.render(&document)?,
    })
}

/// Receives rendered documents, like a browser download.
pub trait DocumentSink: fmt::Debug + Send + Sync {
    /// Stores a document under its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be stored.
    fn save(&self, document: &RenderedDocument) -> Result<(), InvoiceError>;
}

/// Writes documents into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Sink writing into `dir`, created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentSink for DirectorySink {
    fn save(&self, document: &RenderedDocument) -> Result<(), InvoiceError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(&document.file_name);
        fs::write(&path, &document.bytes)?;

        info!(path = %path.display(), "document saved");

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use testresult::TestResult;

    use crate::{
        cart::{Cart, CartLine},
        catalog::Catalog,
        orders::tests::sample_order,
    };

    use super::*;

    pub(crate) fn mixed_lines() -> Result<Vec<CartLine>, Box<dyn std::error::Error>> {
        let catalog = Catalog::bundled()?;
        let mut cart = Cart::new();

        cart.add(catalog.good(1)?.clone())?;
        cart.add(catalog.good(1)?.clone())?;
        cart.add(catalog.venue(301)?.configure()?)?;
        cart.add(catalog.officiant(203)?.clone())?;

        Ok(cart.snapshot())
    }

    pub(crate) fn order_with_lines(status: OrderStatus) -> Result<Order, Box<dyn std::error::Error>> {
        let mut order = sample_order("ORD-482913", status);
        order.total = 21_550_000;
        order.cart_items = Some(mixed_lines()?);

        Ok(order)
    }

    #[test]
    fn venue_expands_into_package_and_catering_rows() -> TestResult {
        let catalog = Catalog::bundled()?;
        let line = CartLine::Venue {
            selection: catalog.venue(301)?.configure()?,
        };

        let rows = expand_line(&line);

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows.first().map(|row| (row.detail.as_deref(), row.total)),
            Some((Some("Paket: Sewa Venue Saja"), PriceCell::Amount(15_000_000)))
        );
        assert_eq!(
            rows.get(1).map(|row| (row.description.as_str(), row.quantity, row.total)),
            Some(("Catering (100 pax)", 100, PriceCell::Amount(6_500_000)))
        );

        Ok(())
    }

    #[test]
    fn venue_without_guests_has_only_the_package_row() -> TestResult {
        let catalog = Catalog::bundled()?;
        let line = CartLine::Venue {
            selection: catalog.venue(302)?.configure()?.with_guests(0),
        };

        assert_eq!(expand_line(&line).len(), 1);

        Ok(())
    }

    #[test]
    fn officiant_row_is_a_donation() -> TestResult {
        let catalog = Catalog::bundled()?;
        let line = CartLine::Officiant {
            officiant: catalog.officiant(201)?.clone(),
        };

        let rows = expand_line(&line);
        let row = rows.first();

        assert_eq!(row.map(|row| row.total), Some(PriceCell::Donation));
        assert_eq!(row.map(|row| row.total.to_string()).as_deref(), Some("Dana Punia"));
        assert_eq!(
            row.and_then(|row| row.detail.as_deref()),
            Some("Griya Gede Sanur")
        );

        Ok(())
    }

    #[test]
    fn document_kind_follows_status_only() {
        assert_eq!(DocumentKind::for_status(&OrderStatus::Paid), DocumentKind::Paid);
        assert_eq!(
            DocumentKind::for_status(&OrderStatus::Other("lunas sebagian".to_string())),
            DocumentKind::Paid
        );
        assert_eq!(
            DocumentKind::for_status(&OrderStatus::AwaitingVerification),
            DocumentKind::Pending
        );
        assert_eq!(DocumentKind::for_status(&OrderStatus::New), DocumentKind::Pending);
    }

    #[test]
    fn document_uses_the_stored_total_and_fallback_region() -> TestResult {
        let mut order = order_with_lines(OrderStatus::AwaitingVerification)?;
        order.total = 1;
        order.region = None;

        let document = InvoiceDocument::from_order(&order)?;

        assert_eq!(document.total, 1);
        assert_eq!(document.purchaser.region, "Bali");
        assert_eq!(document.rows.len(), 4);
        assert_eq!(document.date_label(), "19/10/2026");
        assert_eq!(document.event_time_label(), "08:30");

        Ok(())
    }

    #[test]
    fn missing_snapshot_is_refused() {
        let mut order = sample_order("ORD-000020", OrderStatus::Paid);
        order.cart_items = Some(Vec::new());

        let result = InvoiceDocument::from_order(&order);

        assert!(matches!(result, Err(InvoiceError::MissingSnapshot(id)) if id.as_str() == "ORD-000020"));
    }

    #[test]
    fn file_names_follow_status() -> TestResult {
        let pending = InvoiceDocument::from_order(&order_with_lines(OrderStatus::New)?)?;
        let paid = InvoiceDocument::from_order(&order_with_lines(OrderStatus::Paid)?)?;

        assert_eq!(pending.file_name("typ"), "Bukti_Pesanan_ORD-482913.typ");
        assert_eq!(paid.file_name("txt"), "Invoice_LUNAS_ORD-482913.txt");

        Ok(())
    }

    #[test]
    fn directory_sink_writes_under_the_file_name() -> TestResult {
        let dir = tempfile::tempdir()?;
        let sink = DirectorySink::new(dir.path().join("invoices"));
        let order = order_with_lines(OrderStatus::Paid)?;

        let rendered = generate(&order, &TableRenderer)?;
        sink.save(&rendered)?;

        let written = fs::read(dir.path().join("invoices").join("Invoice_LUNAS_ORD-482913.txt"))?;

        assert_eq!(written, rendered.bytes);

        Ok(())
    }
}
