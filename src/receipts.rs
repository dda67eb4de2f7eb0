use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use printpdf::{BuiltinFont, Color, Line, Mm, PdfDocument, Point, Rgb};
use uuid::Uuid;

const ORG_NAME: &str = "GreenPulse India";
const BOILERPLATE: &str = "Your contribution helps us promote sustainability and \
environmental protection. Every donation counts toward a greener tomorrow.";

pub struct ReceiptData {
    pub receipt_no: Uuid,
    pub donor_name: String,
    pub donor_email: String,
    pub amount: f64,
    pub transaction_id: String,
    pub issued_at: NaiveDateTime,
}

/// Renders the single-page donation receipt into `receipts_dir` and returns
/// the public relative path persisted on the donation row. The filename is
/// derived from the transaction id, so regeneration overwrites in place.
pub fn generate_receipt(receipts_dir: &Path, data: &ReceiptData) -> Result<String> {
    create_dir_all(receipts_dir).context("failed to create receipts directory")?;

    let filename = format!("receipt-{}.pdf", data.transaction_id);
    let path = receipts_dir.join(&filename);

    let (doc, page, layer) = PdfDocument::new("Donation Receipt", Mm(210.0), Mm(297.0), "receipt");
    let layer = doc.get_page(page).get_layer(layer);

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| anyhow!("failed to load builtin font: {err}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|err| anyhow!("failed to load builtin font: {err}"))?;
    let oblique = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|err| anyhow!("failed to load builtin font: {err}"))?;

    let green = Color::Rgb(Rgb::new(0.18, 0.55, 0.34, None));
    let black = Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None));
    let grey = Color::Rgb(Rgb::new(0.33, 0.33, 0.33, None));

    // Sequential top-down layout; `y` is the running cursor in millimetres.
    let mut y = 270.0;

    layer.set_fill_color(green.clone());
    layer.use_text(ORG_NAME, 26.0, Mm(58.0), Mm(y), &bold);
    y -= 12.0;

    layer.set_fill_color(black.clone());
    layer.use_text("Official Donation Receipt", 18.0, Mm(62.0), Mm(y), &regular);
    y -= 8.0;

    layer.set_outline_color(green.clone());
    layer.set_outline_thickness(1.0);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(18.0), Mm(y)), false),
            (Point::new(Mm(192.0), Mm(y)), false),
        ],
        is_closed: false,
    });
    y -= 12.0;

    let metadata = [
        format!("Receipt No: {}", data.receipt_no),
        format!("Transaction ID: {}", data.transaction_id),
        format!("Date: {}", data.issued_at.format("%d/%m/%Y")),
        format!("Time: {}", data.issued_at.format("%H:%M:%S")),
    ];
    for line in &metadata {
        layer.use_text(line, 12.0, Mm(18.0), Mm(y), &regular);
        y -= 6.0;
    }
    y -= 8.0;

    layer.use_text("Donor Information:", 14.0, Mm(18.0), Mm(y), &bold);
    y -= 7.0;
    layer.use_text(
        format!("Name: {}", data.donor_name),
        12.0,
        Mm(18.0),
        Mm(y),
        &regular,
    );
    y -= 6.0;
    layer.use_text(
        format!("Email: {}", data.donor_email),
        12.0,
        Mm(18.0),
        Mm(y),
        &regular,
    );
    y -= 14.0;

    layer.use_text(
        format!("Amount Donated: INR {}/-", format_amount(data.amount)),
        14.0,
        Mm(60.0),
        Mm(y),
        &bold,
    );
    y -= 14.0;

    for line in wrap_text(BOILERPLATE, 90) {
        layer.use_text(line, 12.0, Mm(18.0), Mm(y), &regular);
        y -= 6.0;
    }
    y -= 14.0;

    layer.set_fill_color(green);
    layer.use_text("Authorized Signature:", 12.0, Mm(18.0), Mm(y), &bold);
    y -= 16.0;

    layer.set_fill_color(black);
    layer.use_text(
        "Thank you for your generous support!",
        11.0,
        Mm(68.0),
        Mm(y),
        &oblique,
    );
    y -= 7.0;

    layer.set_fill_color(grey);
    layer.use_text(
        "This is a computer-generated receipt and does not require a signature.",
        10.0,
        Mm(48.0),
        Mm(y),
        &regular,
    );

    let file = File::create(&path)
        .with_context(|| format!("failed to create receipt file {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|err| anyhow!("failed to write receipt pdf: {err}"))?;

    Ok(format!("/uploads/receipts/{filename}"))
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
