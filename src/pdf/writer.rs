use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color as PdfColor, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference,
    Point, Polygon, Rgb,
};

use super::layout::{DrawOp, LaidOutDocument};
use super::metrics::FontFace;
use super::model::Color;
use crate::error::{InvoiceError, Result};

const MM_PER_PT: f32 = 25.4 / 72.0;

fn mm(points: f32) -> Mm {
    Mm(points * MM_PER_PT)
}

fn pdf_color(color: Color) -> PdfColor {
    PdfColor::Rgb(Rgb::new(color.r, color.g, color.b, None))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Italic => &self.italic,
        }
    }
}

/// Serialize laid-out pages into a PDF byte buffer
pub fn write_pdf(document: &LaidOutDocument, title: &str) -> Result<Vec<u8>> {
    let width = mm(document.geometry.width);
    let height = mm(document.geometry.height);
    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");

    let add_font = |font: BuiltinFont| {
        doc.add_builtin_font(font)
            .map_err(|e| InvoiceError::PdfGeneration(e.to_string()))
    };
    let fonts = Fonts {
        regular: add_font(BuiltinFont::Helvetica)?,
        bold: add_font(BuiltinFont::HelveticaBold)?,
        italic: add_font(BuiltinFont::HelveticaOblique)?,
    };

    for (index, page) in document.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(width, height, "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, &fonts, &page.ops);
    }

    doc.save_to_bytes()
        .map_err(|e| InvoiceError::PdfGeneration(e.to_string()))
}

fn draw_page(layer: &PdfLayerReference, fonts: &Fonts, ops: &[DrawOp]) {
    layer.set_fill_color(pdf_color(Color::BLACK));

    for op in ops {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                let corners = [
                    (*x, *y),
                    (x + width, *y),
                    (x + width, y + height),
                    (*x, y + height),
                ];
                layer.set_fill_color(pdf_color(*color));
                layer.add_polygon(Polygon {
                    rings: vec![corners
                        .iter()
                        .map(|(px, py)| (Point::new(mm(*px), mm(*py)), false))
                        .collect()],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
                layer.set_fill_color(pdf_color(Color::BLACK));
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                layer.set_outline_color(pdf_color(*color));
                layer.set_outline_thickness(*width);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(mm(*x1), mm(*y1)), false),
                        (Point::new(mm(*x2), mm(*y2)), false),
                    ],
                    is_closed: false,
                });
            }
            DrawOp::Text { x, y, text, style } => {
                layer.use_text(text.as_str(), style.size, mm(*x), mm(*y), fonts.get(style.face));
            }
        }
    }
}
