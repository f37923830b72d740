//! Flows a list of blocks onto fixed-size pages.
//!
//! The result is a list of pages, each holding positioned draw operations in
//! PDF user space (points, origin at the bottom-left corner). Paragraph lines
//! and table rows move to a new page when the frame is full; a table that
//! continues on a new page gets its header row repeated, and consecutive
//! summary rows stay together. A body row taller than a whole frame is split
//! between its wrapped lines.

use tracing::debug;

use super::metrics::{break_word, measure_text};
use super::model::{Align, Block, Cell, Color, Paragraph, Row, RowKind, Run, Table, TextStyle};

/// Page size and margins, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// US Letter with one-inch margins
    pub const LETTER: PageGeometry = PageGeometry {
        width: 612.0,
        height: 792.0,
        margin: 72.0,
    };

    fn frame_top(&self) -> f32 {
        self.height - self.margin
    }

    fn frame_bottom(&self) -> f32 {
        self.margin
    }

    fn frame_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// `y` is the text baseline
    Text {
        x: f32,
        y: f32,
        text: String,
        style: TextStyle,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Color,
    },
    /// `y` is the bottom edge
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Text of every text operation, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutDocument {
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

impl LaidOutDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(Page::texts)
    }
}

/// Lay out `blocks` top to bottom. Always produces at least one page.
pub fn layout(blocks: &[Block], geometry: PageGeometry) -> LaidOutDocument {
    let mut engine = LayoutEngine::new(geometry);
    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => engine.place_paragraph(paragraph),
            Block::Spacer(height) => engine.place_spacer(*height),
            Block::Table(table) => engine.place_table(table),
        }
    }
    LaidOutDocument {
        geometry,
        pages: engine.pages,
    }
}

// -------------------------------------------------------
// Line breaking across styled runs
// -------------------------------------------------------

/// Text in one style at a horizontal offset within its line
#[derive(Debug, Clone, PartialEq)]
struct Segment {
    x: f32,
    text: String,
    style: TextStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Line {
    segments: Vec<Segment>,
    width: f32,
    size: f32,
    leading: f32,
}

impl Line {
    fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn push(&mut self, text: &str, style: TextStyle, gap: f32, width: f32) {
        match self.segments.last_mut() {
            Some(last) if last.style == style => {
                if gap > 0.0 {
                    last.text.push(' ');
                }
                last.text.push_str(text);
            }
            _ => self.segments.push(Segment {
                x: self.width + gap,
                text: text.to_string(),
                style,
            }),
        }
        self.width += gap + width;
        self.size = self.size.max(style.size);
        self.leading = self.leading.max(style.leading);
    }
}

struct Word<'a> {
    text: &'a str,
    style: TextStyle,
    space_before: bool,
}

fn split_words(runs: &[Run]) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut pending_space = false;

    for run in runs {
        for (i, piece) in run.text.split(char::is_whitespace).enumerate() {
            if i > 0 {
                pending_space = true;
            }
            if piece.is_empty() {
                continue;
            }
            words.push(Word {
                text: piece,
                style: run.style,
                space_before: pending_space && !words.is_empty(),
            });
            pending_space = false;
        }
    }
    words
}

/// Wrap a paragraph's runs into lines no wider than `avail_width`.
/// An empty paragraph yields no lines.
fn wrap_runs(runs: &[Run], avail_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut line = Line::default();

    for word in split_words(runs) {
        let face = word.style.face;
        let size = word.style.size;
        let word_width = measure_text(word.text, face, size);
        let mut gap = if word.space_before && !line.is_empty() {
            measure_text(" ", face, size)
        } else {
            0.0
        };

        if line.width + gap + word_width > avail_width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            gap = 0.0;
        }

        if word_width > avail_width && line.is_empty() {
            let mut pieces = break_word(word.text, avail_width, face, size);
            let last = pieces.pop().unwrap_or_default();
            for piece in pieces {
                let mut broken = Line::default();
                broken.push(&piece, word.style, 0.0, measure_text(&piece, face, size));
                lines.push(broken);
            }
            line.push(&last, word.style, 0.0, measure_text(&last, face, size));
        } else {
            line.push(word.text, word.style, gap, word_width);
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn line_x(align: Align, left: f32, avail_width: f32, line_width: f32) -> f32 {
    match align {
        Align::Left => left,
        Align::Center => left + (avail_width - line_width) / 2.0,
        Align::Right => left + avail_width - line_width,
    }
}

/// Emit text ops for `lines` starting with the first line box at `top`
fn emit_lines(
    lines: &[Line],
    align: Align,
    left: f32,
    avail_width: f32,
    top: f32,
    out: &mut Vec<DrawOp>,
) {
    let mut line_top = top;
    for line in lines {
        let x0 = line_x(align, left, avail_width, line.width);
        let baseline = line_top - line.size;
        for segment in &line.segments {
            out.push(DrawOp::Text {
                x: x0 + segment.x,
                y: baseline,
                text: segment.text.clone(),
                style: segment.style,
            });
        }
        line_top -= line.leading;
    }
}

// -------------------------------------------------------
// Table measurement
// -------------------------------------------------------

/// A cell resolved to its horizontal position within the table
struct CellBox<'a> {
    cell: &'a Cell,
    x: f32,
    width: f32,
    lines: Vec<Line>,
}

struct MeasuredRow<'a> {
    row: &'a Row,
    cells: Vec<CellBox<'a>>,
    height: f32,
}

fn measure_row<'a>(table: &'a Table, row: &'a Row, table_x: f32) -> MeasuredRow<'a> {
    let mut cells = Vec::with_capacity(row.cells.len());
    let mut col = 0usize;
    let mut x = table_x;

    for cell in &row.cells {
        if col >= table.columns.len() {
            break;
        }
        let end = (col + cell.span).min(table.columns.len());
        let width: f32 = table.columns[col..end].iter().sum();
        let avail = (width - 2.0 * table.padding_x).max(0.0);
        let lines = cell
            .content
            .as_ref()
            .map(|p| wrap_runs(&p.runs, avail))
            .unwrap_or_default();

        cells.push(CellBox {
            cell,
            x,
            width,
            lines,
        });
        x += width;
        col = end;
    }

    let height = row_height(table, &cells);
    MeasuredRow { row, cells, height }
}

fn row_height(table: &Table, cells: &[CellBox<'_>]) -> f32 {
    let text_height = cells
        .iter()
        .map(|c| c.lines.iter().map(|l| l.leading).sum::<f32>())
        .fold(table.base_style.leading, f32::max);
    text_height + 2.0 * table.padding_y
}

/// Split a row at a line boundary so the first part is at most `avail` tall.
/// Returns `None` when not even one line fits or nothing would move.
fn split_row<'a>(
    table: &Table,
    measured: &MeasuredRow<'a>,
    avail: f32,
) -> Option<(MeasuredRow<'a>, MeasuredRow<'a>)> {
    let text_avail = avail - 2.0 * table.padding_y;
    let mut head = Vec::with_capacity(measured.cells.len());
    let mut rest = Vec::with_capacity(measured.cells.len());
    let mut kept = false;
    let mut moved = false;

    for cell in &measured.cells {
        let mut used = 0.0_f32;
        let mut take = 0usize;
        for line in &cell.lines {
            if used + line.leading > text_avail {
                break;
            }
            used += line.leading;
            take += 1;
        }
        kept |= take > 0;
        moved |= take < cell.lines.len();

        head.push(CellBox {
            cell: cell.cell,
            x: cell.x,
            width: cell.width,
            lines: cell.lines[..take].to_vec(),
        });
        rest.push(CellBox {
            cell: cell.cell,
            x: cell.x,
            width: cell.width,
            lines: cell.lines[take..].to_vec(),
        });
    }

    if !kept || !moved {
        return None;
    }

    let head_height = row_height(table, &head);
    let rest_height = row_height(table, &rest);
    Some((
        MeasuredRow {
            row: measured.row,
            cells: head,
            height: head_height,
        },
        MeasuredRow {
            row: measured.row,
            cells: rest,
            height: rest_height,
        },
    ))
}

/// Rows placed on one page, drawn together once the page segment is done
struct PlacedRow<'a> {
    measured: MeasuredRow<'a>,
    top: f32,
}

// -------------------------------------------------------
// Engine
// -------------------------------------------------------

struct LayoutEngine {
    geometry: PageGeometry,
    pages: Vec<Page>,
    cursor_y: f32,
}

impl LayoutEngine {
    fn new(geometry: PageGeometry) -> Self {
        LayoutEngine {
            geometry,
            pages: vec![Page::default()],
            cursor_y: geometry.frame_top(),
        }
    }

    fn at_page_top(&self) -> bool {
        self.cursor_y >= self.geometry.frame_top()
    }

    fn fits(&self, height: f32) -> bool {
        self.cursor_y - height >= self.geometry.frame_bottom()
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor_y = self.geometry.frame_top();
        debug!(page = self.pages.len(), "started new page");
    }

    fn ops(&mut self) -> &mut Vec<DrawOp> {
        let last = self.pages.len() - 1;
        &mut self.pages[last].ops
    }

    fn place_spacer(&mut self, height: f32) {
        if self.at_page_top() {
            return;
        }
        if self.fits(height) {
            self.cursor_y -= height;
        } else {
            self.new_page();
        }
    }

    fn place_paragraph(&mut self, paragraph: &Paragraph) {
        let left = self.geometry.margin;
        let avail = self.geometry.frame_width();

        for line in wrap_runs(&paragraph.runs, avail) {
            if !self.fits(line.leading) && !self.at_page_top() {
                self.new_page();
            }
            let top = self.cursor_y;
            emit_lines(
                std::slice::from_ref(&line),
                paragraph.align,
                left,
                avail,
                top,
                self.ops(),
            );
            self.cursor_y -= line.leading;
        }
    }

    fn place_table(&mut self, table: &Table) {
        let table_x = self.geometry.margin + (self.geometry.frame_width() - table.width()) / 2.0;

        // Group rows into units that must not be split across pages: the
        // header stays with the first row under it, summary rows stay together
        let mut units: Vec<Vec<MeasuredRow<'_>>> = Vec::new();
        for row in &table.rows {
            let measured = measure_row(table, row, table_x);
            let previous = units.last().and_then(|u| u.last()).map(|r| r.row.kind);
            let joins_previous = match (previous, row.kind) {
                (Some(RowKind::Header), _) => true,
                (Some(RowKind::Summary), RowKind::Summary) => true,
                _ => false,
            };
            match units.last_mut() {
                Some(unit) if joins_previous => unit.push(measured),
                _ => units.push(vec![measured]),
            }
        }

        let mut segment: Vec<PlacedRow<'_>> = Vec::new();
        let mut fresh = self.at_page_top();
        for mut unit in units {
            loop {
                let unit_height: f32 = unit.iter().map(|r| r.height).sum();
                if self.fits(unit_height) {
                    self.place_rows(unit, &mut segment);
                    fresh = false;
                    break;
                }

                if !fresh {
                    let repeat_header = unit[0].row.kind != RowKind::Header;
                    self.continue_table(table, table_x, &mut segment, repeat_header);
                    debug!(rows = unit.len(), "table continues on new page");
                    fresh = true;
                    continue;
                }

                // Too tall even for a fresh page: break the last body row
                // between lines and carry the rest over.
                let split = match unit.last() {
                    Some(last) if last.row.kind == RowKind::Body => {
                        let above: f32 = unit[..unit.len() - 1].iter().map(|r| r.height).sum();
                        let avail = self.cursor_y - self.geometry.frame_bottom() - above;
                        split_row(table, last, avail)
                    }
                    _ => None,
                };

                match split {
                    Some((head, rest)) => {
                        unit.pop();
                        unit.push(head);
                        self.place_rows(unit, &mut segment);
                        self.continue_table(table, table_x, &mut segment, true);
                        debug!("row split across pages");
                        unit = vec![rest];
                    }
                    None => {
                        self.place_rows(unit, &mut segment);
                        fresh = false;
                        break;
                    }
                }
            }
        }
        self.flush_table_segment(table, segment);
    }

    fn place_rows<'a>(&mut self, rows: Vec<MeasuredRow<'a>>, segment: &mut Vec<PlacedRow<'a>>) {
        for measured in rows {
            let top = self.cursor_y;
            self.cursor_y -= measured.height;
            segment.push(PlacedRow { measured, top });
        }
    }

    /// Draw what is placed so far, start a new page and optionally repeat
    /// the header row at its top
    fn continue_table<'a>(
        &mut self,
        table: &'a Table,
        table_x: f32,
        segment: &mut Vec<PlacedRow<'a>>,
        repeat_header: bool,
    ) {
        self.flush_table_segment(table, std::mem::take(segment));
        self.new_page();

        if repeat_header {
            if let Some(header) = table.header() {
                let repeated = measure_row(table, header, table_x);
                self.place_rows(vec![repeated], segment);
            }
        }
    }

    /// Draw backgrounds, then text, then rules, for rows on the current page
    fn flush_table_segment(&mut self, table: &Table, rows: Vec<PlacedRow<'_>>) {
        if rows.is_empty() {
            return;
        }
        let padding_x = table.padding_x;
        let padding_y = table.padding_y;
        let ops = self.ops();

        for placed in &rows {
            let bottom = placed.top - placed.measured.height;
            for cell in &placed.measured.cells {
                if let Some(color) = cell.cell.background {
                    ops.push(DrawOp::FillRect {
                        x: cell.x,
                        y: bottom,
                        width: cell.width,
                        height: placed.measured.height,
                        color,
                    });
                }
            }
        }

        for placed in &rows {
            for cell in &placed.measured.cells {
                let align = cell
                    .cell
                    .content
                    .as_ref()
                    .map(|p| p.align)
                    .unwrap_or(Align::Left);
                emit_lines(
                    &cell.lines,
                    align,
                    cell.x + padding_x,
                    (cell.width - 2.0 * padding_x).max(0.0),
                    placed.top - padding_y,
                    ops,
                );
            }
        }

        for placed in &rows {
            let top = placed.top;
            let bottom = top - placed.measured.height;
            let Some(first) = placed.measured.cells.first() else {
                continue;
            };
            let left = first.x;
            let right = placed
                .measured
                .cells
                .last()
                .map(|c| c.x + c.width)
                .unwrap_or(left);

            let mut rule = |x1: f32, y1: f32, x2: f32, y2: f32, width: f32| {
                ops.push(DrawOp::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    width,
                    color: table.grid_color,
                });
            };

            rule(left, top, right, top, table.grid_width);
            rule(left, bottom, right, bottom, table.grid_width);
            rule(left, top, left, bottom, table.grid_width);
            for cell in &placed.measured.cells {
                rule(cell.x + cell.width, top, cell.x + cell.width, bottom, table.grid_width);
            }
            for cell in &placed.measured.cells {
                if let Some(width) = cell.cell.rule_above {
                    rule(cell.x, top, cell.x + cell.width, top, width);
                }
            }
        }
    }
}
