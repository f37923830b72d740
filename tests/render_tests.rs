use chrono::{NaiveDate, NaiveDateTime};
use flooreno_invoice::invoice::{
    calculate_totals, generate_invoice, save_invoice, settle_payment, suggested_file_name,
    InvoiceRequest, InvoiceTotals, LineItem, PaymentInfo, PaymentMethod, StoreLocation,
};
use flooreno_invoice::pdf::metrics::FontFace;
use flooreno_invoice::pdf::model::{Color, RowKind};
use flooreno_invoice::pdf::{
    invoice_blocks, item_table, layout_invoice, render_invoice, DrawOp, InvoiceContent,
    LaidOutDocument, Page, COLUMN_WIDTHS, HEADER_LABELS,
};
use flooreno_invoice::InvoiceError;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(14, 7, 9)
        .unwrap()
}

fn hardware_items() -> Vec<LineItem> {
    vec![
        LineItem::new("Oak Plank", dec!(12.50), 4).unwrap(),
        LineItem::new("Nail Box", dec!(5.00), 2).unwrap(),
    ]
}

fn content<'a>(items: &'a [LineItem], payment: PaymentInfo) -> InvoiceContent<'a> {
    InvoiceContent {
        brand: "Flooreno",
        location: StoreLocation::Sauga,
        client_name: "Jane Doe",
        phone: "5551234",
        items,
        payment,
        totals: calculate_totals(items),
    }
}

fn texts(document: &LaidOutDocument) -> Vec<&str> {
    document.texts().collect()
}

fn position(texts: &[&str], needle: &str) -> usize {
    texts
        .iter()
        .position(|t| *t == needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in {texts:?}"))
}

#[test]
fn test_table_rows() {
    let items = hardware_items();
    let table = item_table(&items, &calculate_totals(&items));

    assert_eq!(table.rows_of(RowKind::Header).count(), 1);
    assert_eq!(table.rows_of(RowKind::Body).count(), 2);
    assert_eq!(table.rows_of(RowKind::Summary).count(), 3);
    assert_eq!(table.rows.len(), 6);

    let header = table.header().unwrap();
    let labels: Vec<String> = header.cells.iter().map(|c| c.text_content()).collect();
    assert_eq!(labels, HEADER_LABELS);

    let total_row = table.rows.last().unwrap();
    assert_eq!(total_row.cells[0].span, 3);
    assert_eq!(total_row.cells[1].text_content(), "TOTAL");
    assert_eq!(total_row.cells[2].text_content(), "67.80");
    assert!(total_row.cells[2].background.is_some());
    assert!(total_row.cells[2].rule_above.is_some());
}

#[test]
fn test_document_contents_in_order() {
    let items = hardware_items();
    let content = content(&items, PaymentInfo::Debit);
    let document = layout_invoice(&content, timestamp()).unwrap();
    let texts = texts(&document);

    assert_eq!(document.page_count(), 1);
    assert_eq!(texts[0], "Flooreno Store Invoice");
    assert!(texts.contains(&"Sauga"));
    assert!(texts.contains(&"Jane Doe"));
    assert!(texts.contains(&"5551234"));
    assert!(texts.contains(&"2024-03-05 14:07:09"));
    assert!(texts.contains(&"Debit"));
    assert!(!texts.contains(&"Cash Given:"));

    let order = [
        "Store Location:",
        "Customer Name:",
        "Phone Number:",
        "Date:",
        "Payment Type:",
        "Item Description",
        "Oak Plank",
        "Nail Box",
        "Subtotal",
        "60.00",
        "Tax (13%)",
        "7.80",
        "TOTAL",
        "67.80",
        "Thank you for shopping at Flooreno!",
    ];
    let positions: Vec<usize> = order.iter().map(|t| position(&texts, t)).collect();
    assert!(
        positions.windows(2).all(|w| w[0] < w[1]),
        "out of order: {positions:?}"
    );
}

#[test]
fn test_item_row_values() {
    let items = hardware_items();
    let document = layout_invoice(&content(&items, PaymentInfo::Credit), timestamp()).unwrap();
    let texts = texts(&document);

    let plank = position(&texts, "Oak Plank");
    assert_eq!(&texts[plank..plank + 5], ["Oak Plank", "12.50", "4", "50.00", "56.50"]);

    let nails = position(&texts, "Nail Box");
    assert_eq!(&texts[nails..nails + 5], ["Nail Box", "5.00", "2", "10.00", "11.30"]);
}

#[test]
fn test_cash_lines() {
    let items = hardware_items();
    let totals = calculate_totals(&items);
    let payment = settle_payment(PaymentMethod::Cash, Some(dec!(100)), &totals).unwrap();
    let document = layout_invoice(&content(&items, payment), timestamp()).unwrap();
    let texts = texts(&document);

    let given = position(&texts, "Cash Given:");
    assert_eq!(texts[given + 1], "$100.00");
    let change = position(&texts, "Change:");
    assert_eq!(texts[change + 1], "$32.20");
    assert!(given > position(&texts, "Payment Type:"));
}

#[test]
fn test_long_description_wraps() {
    let description =
        "premium engineered hardwood flooring with click lock installation system and matte finish";
    let items = vec![LineItem::new(description, dec!(89.99), 12).unwrap()];
    let document = layout_invoice(&content(&items, PaymentInfo::Debit), timestamp()).unwrap();

    let pieces: Vec<&str> = document
        .texts()
        .filter(|t| t.len() > 3 && description.contains(*t))
        .collect();
    assert!(pieces.len() >= 2, "expected wrapped lines, got {pieces:?}");
    assert_eq!(pieces.join(" "), description);
}

#[test]
fn test_wrapped_lines_stay_inside_the_description_column() {
    let description = "x".repeat(200);
    let items = vec![LineItem::new(description.as_str(), dec!(1.00), 1).unwrap()];
    let document = layout_invoice(&content(&items, PaymentInfo::Debit), timestamp()).unwrap();

    let pieces: Vec<&str> = document
        .texts()
        .filter(|t| t.chars().all(|c| c == 'x'))
        .collect();
    assert!(pieces.len() >= 2);
    assert_eq!(pieces.concat(), description);
}

#[test]
fn test_many_items_paginate_with_repeated_header() {
    let items: Vec<LineItem> = (1..=120)
        .map(|n| LineItem::new(format!("Item {n:03}"), dec!(1.25), n).unwrap())
        .collect();
    let document = layout_invoice(&content(&items, PaymentInfo::Debit), timestamp()).unwrap();

    assert!(document.page_count() >= 3, "got {} pages", document.page_count());

    // every item appears exactly once, in order
    let texts = texts(&document);
    let listed: Vec<&str> = texts
        .iter()
        .copied()
        .filter(|t| t.starts_with("Item ") && *t != "Item Description")
        .collect();
    let expected: Vec<String> = (1..=120).map(|n| format!("Item {n:03}")).collect();
    assert_eq!(listed, expected);

    for page in &document.pages {
        let page_texts: Vec<&str> = page.texts().collect();
        let has_items = page_texts
            .iter()
            .any(|t| t.starts_with("Item ") && *t != "Item Description");
        if has_items {
            assert!(
                page_texts.contains(&"Item Description"),
                "table page without header: {page_texts:?}"
            );
        }
        // summary rows are never split
        if page_texts.contains(&"Subtotal") {
            assert!(page_texts.contains(&"TOTAL"));
        }
    }
}

#[test]
fn test_draw_ops_stay_on_the_page() {
    let items: Vec<LineItem> = (1..=60)
        .map(|n| LineItem::new(format!("Plank {n}"), dec!(3.00), 1).unwrap())
        .collect();
    let document = layout_invoice(&content(&items, PaymentInfo::Debit), timestamp()).unwrap();
    let geometry = document.geometry;

    for page in &document.pages {
        for op in &page.ops {
            if let DrawOp::Text { x, y, .. } = op {
                assert!(*x >= geometry.margin - 0.01);
                assert!(*y >= geometry.margin - 0.01);
                assert!(*y <= geometry.height - geometry.margin);
            }
        }
    }
}

#[test]
fn test_oversized_row_continues_on_next_page() {
    let description = "plank ".repeat(1200);
    let items = vec![LineItem::new(description.as_str(), dec!(2.00), 1).unwrap()];
    let document = layout_invoice(&content(&items, PaymentInfo::Debit), timestamp()).unwrap();
    let geometry = document.geometry;

    assert!(document.page_count() >= 3, "got {} pages", document.page_count());

    let mut wrapped = Vec::new();
    for page in &document.pages {
        let mut on_page = 0;
        for op in &page.ops {
            match op {
                DrawOp::Text { y, text, .. } if text.starts_with("plank") => {
                    assert!(*y >= geometry.margin, "line drawn below the frame at y={y}");
                    wrapped.push(text.as_str());
                    on_page += 1;
                }
                DrawOp::Line { y1, y2, .. } => {
                    assert!(y1.min(*y2) >= geometry.margin - 0.01);
                }
                _ => {}
            }
        }
        if on_page > 0 {
            assert!(page.texts().any(|t| t == "Item Description"));
        }
    }

    assert_eq!(wrapped.join(" "), description.trim());
    assert!(texts(&document).contains(&"TOTAL"));
}

/// (x1, y1, x2, y2, width) of every line on the page
fn lines(page: &Page) -> Vec<(f32, f32, f32, f32, f32)> {
    page.ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                ..
            } => Some((*x1, *y1, *x2, *y2, *width)),
            _ => None,
        })
        .collect()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

#[test]
fn test_summary_rows_grid_and_styling() {
    let items = hardware_items();
    let document = layout_invoice(&content(&items, PaymentInfo::Debit), timestamp()).unwrap();
    let geometry = document.geometry;
    let page = &document.pages[0];

    let table_width: f32 = COLUMN_WIDTHS.iter().sum();
    let left = geometry.margin + (geometry.width - 2.0 * geometry.margin - table_width) / 2.0;
    let edges: Vec<f32> = COLUMN_WIDTHS
        .iter()
        .scan(left, |x, w| {
            *x += w;
            Some(*x)
        })
        .collect();
    let right = edges[4];
    let lines = lines(page);

    // 0.5pt rules above Subtotal and TOTAL, over the label and value cells only
    let rules: Vec<_> = lines.iter().filter(|l| close(l.4, 0.5)).collect();
    assert_eq!(rules.len(), 4);
    assert!(rules.iter().all(|l| close(l.1, l.3) && l.0 >= edges[2] - 0.01));
    let mut rule_ys: Vec<f32> = rules.iter().map(|l| l.1).collect();
    rule_ys.dedup_by(|a, b| close(*a, *b));
    assert_eq!(rule_ys.len(), 2);
    let (subtotal_top, total_top) = (rule_ys[0], rule_ys[1]);
    assert!(subtotal_top > total_top);

    let text_op = |needle: &str| {
        page.ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { y, text, style, .. } if text == needle => Some((*y, style.face)),
                _ => None,
            })
            .unwrap_or_else(|| panic!("{needle:?} not drawn"))
    };
    let (subtotal_y, subtotal_face) = text_op("Subtotal");
    assert!(subtotal_y < subtotal_top && subtotal_y > total_top);
    assert_eq!(subtotal_face, FontFace::Regular);
    let (total_y, total_face) = text_op("TOTAL");
    assert!(total_y < total_top);
    assert_eq!(total_face, FontFace::Bold);
    assert_eq!(text_op("67.80").1, FontFace::Bold);

    // grid lines
    let grid: Vec<_> = lines.iter().filter(|l| close(l.4, 0.25)).collect();
    let verticals_at = |x: f32| -> Vec<_> {
        grid.iter()
            .filter(|l| close(l.0, x) && close(l.2, x))
            .collect()
    };

    // no interior edges inside the three-column blank span
    for x in [edges[0], edges[1]] {
        let found = verticals_at(x);
        assert!(!found.is_empty());
        assert!(found.iter().all(|l| l.1.min(l.3) >= subtotal_top - 0.01));
    }
    // but the span's own edges and the label/value edges run through the summary
    for x in [left, edges[2], edges[3], right] {
        assert!(verticals_at(x).iter().any(|l| l.1 <= total_top + 0.01));
    }

    // outer box
    let horizontals: Vec<_> = grid
        .iter()
        .filter(|l| close(l.1, l.3) && close(l.0, left) && close(l.2, right))
        .collect();
    let top = horizontals.iter().map(|l| l.1).fold(f32::MIN, f32::max);
    let bottom = horizontals.iter().map(|l| l.1).fold(f32::MAX, f32::min);
    assert!(bottom < total_y && top > subtotal_top);

    // grey behind the header cells and the TOTAL label and value
    let fills: Vec<(f32, f32)> = page
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::FillRect {
                x,
                y,
                height,
                color,
                ..
            } if *color == Color::LIGHT_GREY => Some((*x, y + height)),
            _ => None,
        })
        .collect();
    assert_eq!(fills.len(), 7);
    assert_eq!(fills.iter().filter(|f| close(f.1, top)).count(), 5);
    let total_fills: Vec<f32> = fills
        .iter()
        .filter(|f| close(f.1, total_top))
        .map(|f| f.0)
        .collect();
    assert_eq!(total_fills.len(), 2);
    assert!(close(total_fills[0], edges[2]) && close(total_fills[1], edges[3]));
}

#[test]
fn test_layout_is_repeatable() {
    let items = hardware_items();
    let content = content(&items, PaymentInfo::Credit);

    let first = layout_invoice(&content, timestamp()).unwrap();
    let second = layout_invoice(&content, timestamp()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        invoice_blocks(&content, timestamp()),
        invoice_blocks(&content, timestamp())
    );
}

#[test]
fn test_render_produces_pdf() {
    let items = hardware_items();
    let bytes = render_invoice(&content(&items, PaymentInfo::Debit), timestamp()).unwrap();

    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_free_item_renders() {
    let items = vec![LineItem::new("Tile", dec!(0.00), 5).unwrap()];
    let totals = calculate_totals(&items);
    let payment = settle_payment(PaymentMethod::Cash, None, &totals).unwrap();

    let document = layout_invoice(&content(&items, payment), timestamp()).unwrap();
    let texts = texts(&document);
    let total = position(&texts, "TOTAL");
    assert_eq!(texts[total + 1], "0.00");
    assert_eq!(texts[position(&texts, "Tile") + 4], "0.00");

    let bytes = render_invoice(&content(&items, payment), timestamp()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_render_rejects_bad_content() {
    let items = hardware_items();

    let mut blank_name = content(&items, PaymentInfo::Debit);
    blank_name.client_name = "  ";
    assert!(matches!(
        render_invoice(&blank_name, timestamp()),
        Err(InvoiceError::MissingField("Client name"))
    ));

    let mut blank_phone = content(&items, PaymentInfo::Debit);
    blank_phone.phone = "";
    assert!(matches!(
        render_invoice(&blank_phone, timestamp()),
        Err(InvoiceError::MissingField("Phone number"))
    ));

    let no_items = content(&[], PaymentInfo::Debit);
    assert!(matches!(
        render_invoice(&no_items, timestamp()),
        Err(InvoiceError::NoItems)
    ));

    let mut stale_totals = content(&items, PaymentInfo::Debit);
    stale_totals.totals = InvoiceTotals {
        subtotal: dec!(1),
        tax: dec!(0.13),
        total: dec!(1.13),
    };
    assert!(matches!(
        render_invoice(&stale_totals, timestamp()),
        Err(InvoiceError::TotalsMismatch { .. })
    ));
}

#[test]
fn test_suggested_file_name() {
    assert_eq!(
        suggested_file_name("Jane Doe", "555 1234", timestamp()),
        "Invoice_Jane_Doe_555_1234_20240305_140709.pdf"
    );
    assert_eq!(
        suggested_file_name("A/B\\C", "1", timestamp()),
        "Invoice_A_B_C_1_20240305_140709.pdf"
    );
}

#[test]
fn test_generate_and_save() {
    let temp_dir = TempDir::new().unwrap();
    let request = InvoiceRequest {
        client_name: "Jane Doe".to_string(),
        phone: "5551234".to_string(),
        location: StoreLocation::Ottawa,
        payment_method: PaymentMethod::Cash,
        cash_given: Some(dec!(70)),
    };

    let invoice = generate_invoice(&request, &hardware_items(), "Flooreno", timestamp()).unwrap();
    assert_eq!(invoice.file_name, "Invoice_Jane_Doe_5551234_20240305_140709.pdf");
    assert_eq!(invoice.pages, 1);
    assert_eq!(
        invoice.payment,
        PaymentInfo::Cash {
            cash_given: dec!(70),
            change: dec!(2.20),
        }
    );

    let path = save_invoice(&invoice, &temp_dir.path().join("output"), None).unwrap();
    assert_eq!(path, temp_dir.path().join("output").join(&invoice.file_name));
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_generate_refuses_short_cash() {
    let request = InvoiceRequest {
        client_name: "Jane Doe".to_string(),
        phone: "5551234".to_string(),
        location: StoreLocation::Ny,
        payment_method: PaymentMethod::Cash,
        cash_given: Some(dec!(67.79)),
    };

    let err = generate_invoice(&request, &hardware_items(), "Flooreno", timestamp()).unwrap_err();
    assert!(matches!(err, InvoiceError::InsufficientCash { .. }));
}
