//! Typst Renderer
//!
//! Emits Typst markup. Compiling it with `typst compile` gives the paginated
//! PDF, with the status stamp drawn translucent and rotated behind every page.

use std::fmt::Write;

use crate::{
    invoice::{
        BANK_ACCOUNT, BRAND, CLOSING, CONTACT, DocumentRenderer, InvoiceDocument, InvoiceError,
        TAGLINE,
    },
    pricing::format_idr,
};

const ACCENT: &str = "rgb(194, 65, 12)";
const ACCENT_DARK: &str = "rgb(154, 52, 18)";
const HEADER_FILL: &str = "rgb(255, 247, 237)";
const TOTAL_FILL: &str = "rgb(255, 237, 213)";
const TOTAL_STROKE: &str = "rgb(251, 146, 60)";

/// Renders documents as Typst markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypstRenderer;

impl DocumentRenderer for TypstRenderer {
    fn extension(&self) -> &'static str {
        "typ"
    }

    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>, InvoiceError> {
        Ok(markup(document)?.into_bytes())
    }
}

fn markup(document: &InvoiceDocument) -> Result<String, InvoiceError> {
    let mut out = String::with_capacity(4096);

    write_page_setup(&mut out, document)?;
    write_header(&mut out, document)?;
    write_parties(&mut out, document)?;
    write_table(&mut out, document)?;
    write_summary(&mut out, document)?;

    Ok(out)
}

fn write_page_setup(out: &mut String, document: &InvoiceDocument) -> Result<(), InvoiceError> {
    let kind = document.kind;
    let (r, g, b) = kind.stamp_color();

    writeln!(out, "#set text(size: 10pt)")?;
    writeln!(out, "#set page(")?;
    writeln!(out, "  paper: \"a4\",")?;
    writeln!(out, "  margin: (x: 15mm, top: 15mm, bottom: 25mm),")?;
    writeln!(
        out,
        "  background: place(center + horizon, rotate(-35deg, text(35pt, weight: \"bold\", fill: rgb({r}, {g}, {b}).transparentize(90%), {}))),",
        string(kind.stamp())
    )?;
    writeln!(out, "  footer: align(center, text(8pt, fill: luma(150))[")?;
    writeln!(out, "    #line(length: 100%, stroke: 0.1pt + luma(220))")?;

    for line in kind.footer() {
        writeln!(out, "    #{} \\", string(line))?;
    }

    writeln!(out, "    #{}", string(CLOSING))?;
    writeln!(out, "  ]),")?;
    writeln!(out, ")")?;
    writeln!(out)?;

    Ok(())
}

fn write_header(out: &mut String, document: &InvoiceDocument) -> Result<(), InvoiceError> {
    let kind = document.kind;
    let (r, g, b) = kind.stamp_color();

    writeln!(out, "#block(width: 100%, fill: {HEADER_FILL}, stroke: (top: 5pt + {ACCENT}), inset: 12pt)[")?;
    writeln!(out, "  #grid(columns: (1fr, auto), gutter: 12pt,")?;
    writeln!(out, "    [")?;
    writeln!(out, "      #text(24pt, weight: \"bold\", fill: {ACCENT_DARK}, {}) \\", string(BRAND))?;
    writeln!(out, "      #text(14pt, weight: \"bold\", fill: {ACCENT}, \"ONLINE\") \\")?;
    writeln!(out, "      #text(9pt, fill: luma(100), {}) \\", string(TAGLINE))?;
    writeln!(out, "      #text(9pt, fill: luma(100), {})", string(CONTACT))?;
    writeln!(out, "    ],")?;
    writeln!(out, "    align(right)[")?;
    writeln!(out, "      #text(weight: \"bold\", {}) \\", string(kind.title()))?;
    writeln!(out, "      #{} \\", string(&format!("#{}", document.order_id)))?;
    writeln!(out, "      #{} \\", string(&document.date_label()))?;
    writeln!(
        out,
        "      #box(stroke: rgb({r}, {g}, {b}), radius: 2pt, inset: 4pt, text(8pt, weight: \"bold\", fill: rgb({r}, {g}, {b}), {}))",
        string(kind.stamp())
    )?;
    writeln!(out, "    ],")?;
    writeln!(out, "  )")?;
    writeln!(out, "]")?;
    writeln!(out)?;

    Ok(())
}

fn write_parties(out: &mut String, document: &InvoiceDocument) -> Result<(), InvoiceError> {
    let purchaser = &document.purchaser;

    writeln!(out, "#grid(columns: (1fr, 1fr), gutter: 12pt,")?;
    writeln!(out, "  [")?;
    writeln!(out, "    #text(weight: \"bold\", fill: luma(150), \"TAGIHAN KEPADA:\") \\")?;
    writeln!(out, "    #text(weight: \"bold\", {}) \\", string(&purchaser.name.to_uppercase()))?;
    writeln!(out, "    #{} \\", string(&purchaser.phone))?;
    writeln!(out, "    #{}", string(&purchaser.region))?;
    writeln!(out, "  ],")?;
    writeln!(out, "  [")?;
    writeln!(out, "    #text(weight: \"bold\", fill: luma(150), \"RENCANA UPACARA:\") \\")?;
    writeln!(out, "    #{} \\", string(&format!("Tanggal: {}", document.event_date)))?;
    writeln!(out, "    #{}", string(&format!("Pukul: {}", document.event_time_label())))?;
    writeln!(out, "  ],")?;
    writeln!(out, ")")?;
    writeln!(out)?;

    Ok(())
}

fn write_table(out: &mut String, document: &InvoiceDocument) -> Result<(), InvoiceError> {
    writeln!(out, "#table(")?;
    writeln!(out, "  columns: (auto, 1fr, auto, auto, auto),")?;
    writeln!(out, "  align: (center, left, right, center, right),")?;
    writeln!(
        out,
        "  fill: (_, y) => if y == 0 {{ {ACCENT} }} else if calc.even(y) {{ {HEADER_FILL} }},"
    )?;
    writeln!(out, "  table.header(")?;

    for heading in ["No", "Deskripsi", "Harga Satuan", "Qty", "Total"] {
        writeln!(out, "    text(fill: white, weight: \"bold\", {}),", string(heading))?;
    }

    writeln!(out, "  ),")?;

    for (idx, row) in document.rows.iter().enumerate() {
        let description = match &row.detail {
            Some(detail) => format!("{}\n{detail}", row.description),
            None => row.description.clone(),
        };

        writeln!(
            out,
            "  {}, {}, {}, {}, text(weight: \"bold\", {}),",
            string(&(idx + 1).to_string()),
            string(&description),
            string(&row.unit_price.to_string()),
            string(&row.quantity.to_string()),
            string(&row.total.to_string()),
        )?;
    }

    writeln!(out, ")")?;
    writeln!(out)?;

    Ok(())
}

fn write_summary(out: &mut String, document: &InvoiceDocument) -> Result<(), InvoiceError> {
    writeln!(out, "#grid(columns: (1fr, 90mm), gutter: 12pt,")?;
    writeln!(out, "  [")?;
    writeln!(out, "    Metode Pembayaran: \\")?;
    writeln!(out, "    #text(weight: \"bold\", {}) \\", string(&document.payment_method))?;
    writeln!(out, "    #text(9pt, fill: luma(80), {})", string(BANK_ACCOUNT))?;
    writeln!(out, "  ],")?;
    writeln!(
        out,
        "  block(width: 100%, fill: {TOTAL_FILL}, stroke: {TOTAL_STROKE}, radius: 3pt, inset: 8pt)["
    )?;
    writeln!(out, "    #text(9pt, weight: \"bold\", fill: {ACCENT_DARK}, \"TOTAL PEMBAYARAN\")")?;
    writeln!(
        out,
        "    #align(right, text(18pt, weight: \"bold\", fill: {ACCENT}, {}))",
        string(&format_idr(document.total))
    )?;
    writeln!(out, "  ],")?;
    writeln!(out, ")")?;

    Ok(())
}

/// Typst string literal.
fn string(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);

    literal.push('"');

    for ch in text.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => {}
            ch => literal.push(ch),
        }
    }

    literal.push('"');

    literal
}
