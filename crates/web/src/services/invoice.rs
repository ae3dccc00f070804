//! Invoice PDF rendering.
//!
//! Rendering is a pure function of the order snapshot: title, one
//! `title - qty x $price` line per item, and the total. The route layer
//! both streams the bytes to the client and writes them to the invoice
//! directory for later retrieval.

use printpdf::{BuiltinFont, Mm, PdfDocument};
use thiserror::Error;

use fernwood_core::OrderId;

use crate::models::{OrderItem, OrderWithItems};

/// Errors that can occur while rendering an invoice.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// PDF construction failed.
    #[error("pdf error: {0}")]
    Pdf(String),
}

/// The on-disk / download filename for an order's invoice.
#[must_use]
pub fn invoice_filename(order_id: OrderId) -> String {
    format!("invoice-{order_id}.pdf")
}

/// Render an order's invoice as PDF bytes (A4, built-in Helvetica).
///
/// # Errors
///
/// Returns `InvoiceError::Pdf` if document construction fails.
pub fn render_invoice(order: &OrderWithItems) -> Result<Vec<u8>, InvoiceError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        format!("Invoice #{}", order.order.id),
        Mm(210.0),
        Mm(297.0),
        "invoice",
    );

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| InvoiceError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| InvoiceError::Pdf(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    // Text cursor, in mm from the bottom of the page.
    let mut y = 267.0;

    layer.use_text("Invoice", 26.0, Mm(20.0), Mm(y), &bold);
    y -= 8.0;
    layer.use_text(
        format!("Order #{} for {}", order.order.id, order.order.email),
        11.0,
        Mm(20.0),
        Mm(y),
        &regular,
    );
    y -= 8.0;
    layer.use_text("-----------------------", 11.0, Mm(20.0), Mm(y), &regular);
    y -= 12.0;

    for item in &order.items {
        // Start a fresh page when the current one runs out of room.
        if y < 28.0 {
            let (page, layer_index) = doc.add_page(Mm(210.0), Mm(297.0), "invoice");
            layer = doc.get_page(page).get_layer(layer_index);
            y = 267.0;
        }

        layer.use_text(item_line(item), 14.0, Mm(20.0), Mm(y), &regular);
        y -= 8.0;
    }

    if y < 36.0 {
        let (page, layer_index) = doc.add_page(Mm(210.0), Mm(297.0), "invoice");
        layer = doc.get_page(page).get_layer(layer_index);
        y = 267.0;
    }

    layer.use_text("---", 11.0, Mm(20.0), Mm(y), &regular);
    y -= 12.0;
    layer.use_text(
        format!("Total: ${:.2}", order.total()),
        20.0,
        Mm(20.0),
        Mm(y),
        &bold,
    );

    doc.save_to_bytes()
        .map_err(|e| InvoiceError::Pdf(e.to_string()))
}

fn item_line(item: &OrderItem) -> String {
    format!(
        "{} - {} x ${:.2}",
        item.title, item.quantity, item.unit_price
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fernwood_core::{Email, OrderItemId, UserId};
    use rust_decimal::Decimal;

    use crate::models::Order;

    use super::*;

    fn sample_order(item_count: i32) -> OrderWithItems {
        let items = (0..item_count)
            .map(|i| OrderItem {
                id: OrderItemId::new(i + 1),
                order_id: OrderId::new(9),
                product_id: None,
                quantity: 2,
                title: format!("Item {i}"),
                description: "Something nice".to_string(),
                unit_price: Decimal::new(1250, 2),
            })
            .collect();

        OrderWithItems {
            order: Order {
                id: OrderId::new(9),
                user_id: UserId::new(1),
                email: Email::parse("shopper@example.com").expect("valid"),
                created_at: Utc::now(),
            },
            items,
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let bytes = render_invoice(&sample_order(3)).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_orders_span_multiple_pages_without_failing() {
        let bytes = render_invoice(&sample_order(80)).expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn item_lines_follow_the_invoice_format() {
        let order = sample_order(1);
        assert_eq!(item_line(&order.items[0]), "Item 0 - 2 x $12.50");
    }

    #[test]
    fn filenames_embed_the_order_id() {
        assert_eq!(invoice_filename(OrderId::new(42)), "invoice-42.pdf");
    }
}
