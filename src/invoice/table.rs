//! Text Renderer

use std::fmt::Write;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style, Theme,
        object::{Columns, Rows},
    },
};

use crate::{
    invoice::{BANK_ACCOUNT, BRAND, CLOSING, CONTACT, DocumentRenderer, InvoiceDocument, InvoiceError},
    pricing::format_idr,
};

/// Renders documents as a plain-text receipt.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableRenderer;

impl DocumentRenderer for TableRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>, InvoiceError> {
        let mut out = String::new();

        write_header(&mut out, document)?;
        writeln!(out, "{}", rows_table(document))?;
        write_summary(&mut out, document)?;

        Ok(out.into_bytes())
    }
}

fn write_header(out: &mut String, document: &InvoiceDocument) -> Result<(), InvoiceError> {
    let kind = document.kind;

    writeln!(out, "{BRAND} ONLINE")?;
    writeln!(out, "{CONTACT}")?;
    writeln!(out)?;
    writeln!(out, "{} #{}  [{}]", kind.title(), document.order_id, kind.stamp())?;
    writeln!(out, "Tanggal: {}", document.date_label())?;
    writeln!(out)?;
    writeln!(out, "Tagihan kepada: {}", document.purchaser.name.to_uppercase())?;
    writeln!(out, "                {}", document.purchaser.phone)?;
    writeln!(out, "                {}", document.purchaser.region)?;
    writeln!(
        out,
        "Rencana upacara: {} pukul {}",
        document.event_date,
        document.event_time_label()
    )?;

    Ok(())
}

fn rows_table(document: &InvoiceDocument) -> String {
    let mut builder = Builder::default();

    builder.push_record(["No", "Deskripsi", "Harga Satuan", "Qty", "Total"]);

    for (idx, row) in document.rows.iter().enumerate() {
        let description = match &row.detail {
            Some(detail) => format!("{}\n{detail}", row.description),
            None => row.description.clone(),
        };

        builder.push_record([
            (idx + 1).to_string(),
            description,
            row.unit_price.to_string(),
            row.quantity.to_string(),
            row.total.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Theme::from(Style::modern_rounded()));
    table.modify(Columns::new(2..5), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    table.to_string()
}

fn write_summary(out: &mut String, document: &InvoiceDocument) -> Result<(), InvoiceError> {
    writeln!(out, "TOTAL PEMBAYARAN: {}", format_idr(document.total))?;
    writeln!(out, "Metode Pembayaran: {}", document.payment_method)?;
    writeln!(out, "{BANK_ACCOUNT}")?;
    writeln!(out)?;

    for line in document.kind.footer() {
        writeln!(out, "{line}")?;
    }

    writeln!(out, "{CLOSING}")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{invoice::tests::order_with_lines, orders::OrderStatus};

    use super::*;

    fn render(status: OrderStatus) -> Result<String, Box<dyn std::error::Error>> {
        let order = order_with_lines(status)?;
        let document = InvoiceDocument::from_order(&order)?;

        Ok(String::from_utf8(TableRenderer.render(&document)?)?)
    }

    #[test]
    fn receipt_lists_every_row_and_the_stored_total() -> TestResult {
        let text = render(OrderStatus::AwaitingVerification)?;

        assert!(text.starts_with("GRIYA BANTEN ONLINE\n"));
        assert!(text.contains("BUKTI PESANAN #ORD-482913  [MENUNGGU VERIFIKASI]"));
        assert!(text.contains("Canang Sari (50 pcs)"));
        assert!(text.contains("Paket: Sewa Venue Saja"));
        assert!(text.contains("Catering (100 pax)"));
        assert!(text.contains("Dana Punia"));
        assert!(text.contains("Rp 6.500.000"));
        assert!(text.contains("TOTAL PEMBAYARAN: Rp 21.550.000\n"));
        assert!(text.contains("╭"), "table uses the rounded style");

        Ok(())
    }

    #[test]
    fn footer_follows_status() -> TestResult {
        let pending = render(OrderStatus::New)?;
        let paid = render(OrderStatus::Paid)?;

        assert!(pending.contains("* Bukti pesanan ini belum berlaku sebagai invoice lunas."));
        assert!(!pending.contains("Dokumen ini sah"));
        assert!(paid.contains("INVOICE LUNAS #ORD-482913  [LUNAS]"));
        assert!(paid.contains("Dokumen ini sah dan diterbitkan otomatis oleh Griya Banten Online."));
        assert!(paid.trim_end().ends_with("Om Shanti Shanti Shanti Om"));

        Ok(())
    }
}
