//! Structured document description: styled runs grouped into paragraphs,
//! spacers, and tables with spanning cells. Nothing here knows about
//! pages or coordinates; see `layout` for that.

use super::metrics::FontFace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const LIGHT_GREY: Color = Color::rgb(0.827, 0.827, 0.827);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }
}

/// Font face, size and line spacing (all in points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f32,
    pub leading: f32,
}

impl TextStyle {
    pub const fn new(face: FontFace, size: f32, leading: f32) -> Self {
        TextStyle {
            face,
            size,
            leading,
        }
    }

    pub const fn with_face(self, face: FontFace) -> Self {
        TextStyle { face, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A piece of text in a single style
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub style: TextStyle,
}

impl Run {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Run {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub align: Align,
}

impl Paragraph {
    pub fn new() -> Self {
        Paragraph {
            runs: Vec::new(),
            align: Align::Left,
        }
    }

    /// Single-run paragraph
    pub fn plain(text: impl Into<String>, style: TextStyle) -> Self {
        Paragraph::new().run(text, style)
    }

    pub fn run(mut self, text: impl Into<String>, style: TextStyle) -> Self {
        self.runs.push(Run::new(text, style));
        self
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

impl Default for Paragraph {
    fn default() -> Self {
        Paragraph::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: Option<Paragraph>,
    /// Number of grid columns this cell covers
    pub span: usize,
    pub background: Option<Color>,
    /// Width of a rule drawn along the top edge of the cell, if any
    pub rule_above: Option<f32>,
}

impl Cell {
    pub fn new(content: Paragraph) -> Self {
        Cell {
            content: Some(content),
            span: 1,
            background: None,
            rule_above: None,
        }
    }

    pub fn text(text: impl Into<String>, style: TextStyle, align: Align) -> Self {
        Cell::new(Paragraph::plain(text, style).aligned(align))
    }

    /// Blank cell; with a span > 1 this is a merged region
    pub fn empty() -> Self {
        Cell {
            content: None,
            span: 1,
            background: None,
            rule_above: None,
        }
    }

    pub fn span(mut self, columns: usize) -> Self {
        self.span = columns.max(1);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn rule_above(mut self, width: f32) -> Self {
        self.rule_above = Some(width);
        self
    }

    pub fn text_content(&self) -> String {
        self.content.as_ref().map(Paragraph::text).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Repeated at the top of every page the table continues on
    Header,
    Body,
    /// Consecutive summary rows are kept on the same page
    Summary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub kind: RowKind,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(kind: RowKind, cells: Vec<Cell>) -> Self {
        Row { kind, cells }
    }
}

/// A ruled grid with fixed column widths
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<f32>,
    pub rows: Vec<Row>,
    /// Style used to size rows whose cells are all empty
    pub base_style: TextStyle,
    pub padding_x: f32,
    pub padding_y: f32,
    pub grid_width: f32,
    pub grid_color: Color,
}

impl Table {
    pub fn new(columns: Vec<f32>, base_style: TextStyle) -> Self {
        Table {
            columns,
            rows: Vec::new(),
            base_style,
            padding_x: 6.0,
            padding_y: 3.0,
            grid_width: 0.25,
            grid_color: Color::BLACK,
        }
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn width(&self) -> f32 {
        self.columns.iter().sum()
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.iter().find(|r| r.kind == RowKind::Header)
    }

    pub fn rows_of(&self, kind: RowKind) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(move |r| r.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    /// Vertical gap in points
    Spacer(f32),
    Table(Table),
}
