//! Monthly ledger statement rendering.
//!
//! One A4 portrait document per month: a title, the opening balance, a
//! transaction table and the closing balance. Long months continue on
//! further pages. Layout is computed in whole millimetres.

use committee_core::ledger::{MonthlyLedger, Transaction};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use rust_decimal::Decimal;

const PAGE_WIDTH_MM: u16 = 210;
const PAGE_HEIGHT_MM: u16 = 297;
const MARGIN_MM: u16 = 10;
const ROW_HEIGHT_MM: u16 = 6;
const DESCRIPTION_CHARS: usize = 38;

/// Table columns as `(label, left edge in mm)`.
const COLUMNS: [(&str, u16); 6] = [
    ("Date", 10),
    ("Category", 35),
    ("Description", 65),
    ("Debit", 135),
    ("Credit", 155),
    ("Balance", 180),
];

fn mm(value: u16) -> Mm {
    Mm(f32::from(value))
}

fn money(amount: Decimal) -> String {
    format!("{amount:.2}")
}

fn truncate(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

/// Table cells for one transaction: debits and credits in separate columns.
fn row_cells(tx: &Transaction) -> [String; 6] {
    let (debit, credit) = if tx.amount.is_sign_negative() {
        (money(-tx.amount), String::new())
    } else if tx.amount.is_zero() {
        (String::new(), String::new())
    } else {
        (String::new(), money(tx.amount))
    };
    [
        tx.date.to_string(),
        truncate(&tx.category, 14),
        truncate(&tx.description, DESCRIPTION_CHARS),
        debit,
        credit,
        money(tx.running_balance),
    ]
}

struct Writer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Baseline of the next line, from the page bottom.
    y: u16,
}

impl Writer {
    fn line(&mut self, text: &str, size: u8, bold: bool, x: u16) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, f32::from(size), mm(x), mm(self.y), font);
    }

    fn advance(&mut self, by: u16) {
        if self.y < MARGIN_MM + by {
            let (page, layer) = self.doc.add_page(mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), "Ledger");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        } else {
            self.y -= by;
        }
    }

    fn table_row(&mut self, cells: &[String; 6], bold: bool) {
        for ((_, x), cell) in COLUMNS.iter().zip(cells) {
            self.line(cell, 10, bold, *x);
        }
        self.advance(ROW_HEIGHT_MM);
    }
}

/// Renders a reconciled month as a PDF statement.
///
/// # Errors
///
/// Returns an error if a built-in font cannot be embedded or the document
/// cannot be serialized.
pub fn render_ledger_pdf(ledger: &MonthlyLedger) -> Result<Vec<u8>, printpdf::Error> {
    let title = format!("Ledger {} - {}", ledger.ledger_type, ledger.month);
    let (doc, page, layer) = PdfDocument::new(&title, mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), "Ledger");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut writer = Writer {
        doc,
        layer,
        regular,
        bold,
        y: PAGE_HEIGHT_MM - MARGIN_MM - 6,
    };

    writer.line(&title, 16, true, MARGIN_MM);
    writer.advance(10);
    writer.line(
        &format!("Opening Balance: ${}", money(ledger.opening_balance)),
        12,
        false,
        MARGIN_MM,
    );
    writer.advance(10);

    writer.table_row(&COLUMNS.map(|(label, _)| label.to_string()), true);
    for tx in &ledger.transactions {
        writer.table_row(&row_cells(tx), false);
    }

    writer.advance(4);
    writer.line(
        &format!("Closing Balance: ${}", money(ledger.closing_balance)),
        12,
        true,
        MARGIN_MM,
    );

    writer.doc.save_to_bytes()
}
