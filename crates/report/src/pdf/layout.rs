//! Page-builder layout engine
//!
//! A thin composition layer over `printpdf`: page templates, wrapped
//! paragraphs, and styled tables, so the renderer never touches raw
//! coordinates. Text metrics use the standard Helvetica advance widths
//! (approximated per glyph class), which is enough to wrap cell text
//! deterministically with the built-in faces.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocumentReference, PdfLayerReference,
    Point, Rgb,
};

use crate::error::{ReportError, Result};

/// Points to millimeters
pub const PT_TO_MM: f64 = 0.352_778;

/// Inches to millimeters
pub const IN_TO_MM: f64 = 25.4;

/// Default page margin, 0.5 in
pub const MARGIN_MM: f64 = 12.7;

/// Page dimensions in millimeters.
#[derive(Debug, Clone, Copy)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// US Letter, portrait (cover template)
pub const LETTER_PORTRAIT: PageSize = PageSize {
    width: 215.9,
    height: 279.4,
};

/// US Letter, landscape (module-page template)
pub const LETTER_LANDSCAPE: PageSize = PageSize {
    width: 279.4,
    height: 215.9,
};

/// RGB triple in the 0.0..=1.0 range
pub type ColorSpec = (f64, f64, f64);

pub const BLACK: ColorSpec = (0.0, 0.0, 0.0);
pub const WHITE: ColorSpec = (1.0, 1.0, 1.0);
pub const PASS_GREEN: ColorSpec = (0.0, 0.45, 0.13);
pub const FAIL_RED: ColorSpec = (0.75, 0.08, 0.08);

/// The two built-in faces every report uses.
pub struct Fonts {
    pub regular: IndirectFontRef,
    pub bold: IndirectFontRef,
}

impl Fonts {
    pub fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Render(e.to_string()))?;
        Ok(Self { regular, bold })
    }
}

/// Approximate Helvetica advance width, thousandths of an em.
fn char_width_milli(c: char) -> u32 {
    match c {
        'i' | 'j' | 'l' | '\'' | '|' => 222,
        'f' | 't' | 'I' | ' ' | '.' | ',' | ':' | ';' | '!' | '(' | ')' | '[' | ']' | '/'
        | '\\' => 278,
        'r' | '-' | '"' | '`' => 333,
        'm' | 'M' => 833,
        'w' => 722,
        'W' => 944,
        '%' => 889,
        'A'..='Z' => 667,
        _ => 556,
    }
}

/// Width of `text` at `size_pt`, in millimeters.
pub fn text_width_mm(text: &str, size_pt: f64) -> f64 {
    let milli: u32 = text.chars().map(char_width_milli).sum();
    f64::from(milli) / 1000.0 * size_pt * PT_TO_MM
}

/// Greedy word wrap into lines no wider than `max_mm`. Words wider than a
/// whole line are hard-split. Always yields at least one (possibly empty)
/// line so empty cells still occupy a row.
pub fn wrap(text: &str, size_pt: f64, max_mm: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_mm(&candidate, size_pt) <= max_mm {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        // The word alone may still overflow the line
        if text_width_mm(word, size_pt) <= max_mm {
            current = word.to_string();
        } else {
            for c in word.chars() {
                let grown = format!("{current}{c}");
                if !current.is_empty() && text_width_mm(&grown, size_pt) > max_mm {
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                } else {
                    current = grown;
                }
            }
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// One table cell: text plus optional styling overrides.
#[derive(Debug, Clone)]
pub struct Cell {
    pub text: String,
    pub color: Option<ColorSpec>,
    pub bold: bool,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            bold: false,
        }
    }

    pub fn colored(text: impl Into<String>, color: ColorSpec) -> Self {
        Self {
            color: Some(color),
            ..Self::new(text)
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::new(text)
        }
    }
}

/// Styling contract shared by every table in the report.
#[derive(Debug, Clone)]
pub struct TableStyle {
    pub font_size_pt: f64,
    pub header_bg: ColorSpec,
    pub header_fg: ColorSpec,
    pub zebra_bg: ColorSpec,
    pub footer_bg: ColorSpec,
    pub grid: ColorSpec,
    pub grid_pt: f64,
    pub pad_v_pt: f64,
    pub pad_h_pt: f64,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size_pt: 8.0,
            header_bg: (0.13, 0.17, 0.23),
            header_fg: WHITE,
            zebra_bg: (0.93, 0.94, 0.96),
            footer_bg: (0.78, 0.82, 0.88),
            grid: (0.35, 0.35, 0.35),
            grid_pt: 1.0,
            pad_v_pt: 6.0,
            pad_h_pt: 4.0,
        }
    }
}

/// Builds one physical page top-down. Created per page; the cursor only
/// ever moves toward the bottom margin.
pub struct PageBuilder<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
    size: PageSize,
    y: f64,
}

impl<'a> PageBuilder<'a> {
    /// Append a fresh page of `size` to the document. The portrait/
    /// landscape template switch is exactly this call with a different
    /// [`PageSize`].
    pub fn add_page(doc: &PdfDocumentReference, fonts: &'a Fonts, size: PageSize) -> Self {
        let (page, layer) = doc.add_page(Mm(size.width), Mm(size.height), "content");
        Self::on_layer(doc.get_page(page).get_layer(layer), fonts, size)
    }

    /// Build on an already existing page (the one `PdfDocument::new`
    /// creates).
    pub fn on_layer(layer: PdfLayerReference, fonts: &'a Fonts, size: PageSize) -> Self {
        Self {
            layer,
            fonts,
            size,
            y: size.height - MARGIN_MM,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.size.width - 2.0 * MARGIN_MM
    }

    /// Vertical gap
    pub fn spacer(&mut self, mm: f64) {
        self.y -= mm;
    }

    /// Centered single line (titles, subtitles).
    pub fn centered(&mut self, text: &str, size_pt: f64, bold: bool) {
        let x = (self.size.width - text_width_mm(text, size_pt)) / 2.0;
        let line_h = line_height(size_pt);
        self.draw_text(x, self.y - baseline_offset(size_pt), text, size_pt, bold, BLACK);
        self.y -= line_h;
    }

    /// Left-aligned single line.
    pub fn line(&mut self, text: &str, size_pt: f64, bold: bool) {
        let line_h = line_height(size_pt);
        self.draw_text(
            MARGIN_MM,
            self.y - baseline_offset(size_pt),
            text,
            size_pt,
            bold,
            BLACK,
        );
        self.y -= line_h;
    }

    /// Wrapped left-aligned paragraph.
    pub fn paragraph(&mut self, text: &str, size_pt: f64) {
        for line in wrap(text, size_pt, self.content_width()) {
            self.line(&line, size_pt, false);
        }
    }

    /// Render a full table: header, zebra-striped body, optional footer,
    /// then the grid. Column widths are given in inches and scaled down
    /// proportionally if they would overflow the content width.
    pub fn table(
        &mut self,
        widths_in: &[f64],
        header: &[&str],
        rows: &[Vec<Cell>],
        footer: Option<&[Cell]>,
        style: &TableStyle,
    ) {
        let mut widths: Vec<f64> = widths_in.iter().map(|w| w * IN_TO_MM).collect();
        let requested: f64 = widths.iter().sum();
        if requested > self.content_width() {
            let scale = self.content_width() / requested;
            for w in &mut widths {
                *w *= scale;
            }
        }
        let total: f64 = widths.iter().sum();
        let x0 = MARGIN_MM + (self.content_width() - total) / 2.0;

        let top = self.y;
        let mut boundaries = vec![top];

        let header_cells: Vec<Cell> = header.iter().map(|h| Cell::bold(*h)).collect();
        self.table_row(x0, &widths, &header_cells, Some(style.header_bg), style.header_fg, style);
        boundaries.push(self.y);

        for (i, row) in rows.iter().enumerate() {
            let bg = (i % 2 == 1).then_some(style.zebra_bg);
            self.table_row(x0, &widths, row, bg, BLACK, style);
            boundaries.push(self.y);
        }

        if let Some(cells) = footer {
            self.table_row(x0, &widths, cells, Some(style.footer_bg), BLACK, style);
            boundaries.push(self.y);
        }

        self.draw_grid(x0, &widths, &boundaries, style);
    }

    /// Draw one row and advance the cursor; returns nothing, the row
    /// height is implied by the cursor delta.
    fn table_row(
        &mut self,
        x0: f64,
        widths: &[f64],
        cells: &[Cell],
        bg: Option<ColorSpec>,
        default_fg: ColorSpec,
        style: &TableStyle,
    ) {
        let pad_v = style.pad_v_pt * PT_TO_MM;
        let pad_h = style.pad_h_pt * PT_TO_MM;
        let line_h = line_height(style.font_size_pt);

        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| wrap(&cell.text, style.font_size_pt, width - 2.0 * pad_h))
            .collect();
        let max_lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let row_h = max_lines as f64 * line_h + 2.0 * pad_v;

        if let Some(color) = bg {
            let total: f64 = widths.iter().sum();
            self.fill_rect(x0, self.y - row_h, total, row_h, color);
        }

        let mut x = x0;
        for ((cell, lines), width) in cells.iter().zip(&wrapped).zip(widths) {
            let fg = cell.color.unwrap_or(default_fg);
            let mut baseline = self.y - pad_v - baseline_offset(style.font_size_pt);
            for line in lines {
                self.draw_text(x + pad_h, baseline, line, style.font_size_pt, cell.bold, fg);
                baseline -= line_h;
            }
            x += width;
        }

        self.y -= row_h;
    }

    fn draw_grid(&self, x0: f64, widths: &[f64], boundaries: &[f64], style: &TableStyle) {
        let total: f64 = widths.iter().sum();
        let top = boundaries[0];
        let bottom = *boundaries.last().expect("table has at least a header row");

        self.layer.set_outline_color(rgb(style.grid));
        self.layer.set_outline_thickness(style.grid_pt);

        for y in boundaries {
            self.stroke_line((x0, *y), (x0 + total, *y));
        }
        let mut x = x0;
        self.stroke_line((x, top), (x, bottom));
        for width in widths {
            x += width;
            self.stroke_line((x, top), (x, bottom));
        }
    }

    fn draw_text(
        &self,
        x: f64,
        baseline: f64,
        text: &str,
        size_pt: f64,
        bold: bool,
        color: ColorSpec,
    ) {
        let font = if bold {
            &self.fonts.bold
        } else {
            &self.fonts.regular
        };
        self.layer.set_fill_color(rgb(color));
        self.layer.use_text(text, size_pt, Mm(x), Mm(baseline), font);
    }

    fn fill_rect(&self, x: f64, y: f64, width: f64, height: f64, color: ColorSpec) {
        self.layer.set_fill_color(rgb(color));
        let shape = Line {
            points: vec![
                (Point::new(Mm(x), Mm(y)), false),
                (Point::new(Mm(x + width), Mm(y)), false),
                (Point::new(Mm(x + width), Mm(y + height)), false),
                (Point::new(Mm(x), Mm(y + height)), false),
            ],
            is_closed: true,
            has_fill: true,
            has_stroke: false,
            is_clipping_path: false,
        };
        self.layer.add_shape(shape);
    }

    fn stroke_line(&self, from: (f64, f64), to: (f64, f64)) {
        let shape = Line {
            points: vec![
                (Point::new(Mm(from.0), Mm(from.1)), false),
                (Point::new(Mm(to.0), Mm(to.1)), false),
            ],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        };
        self.layer.add_shape(shape);
    }
}

fn rgb(color: ColorSpec) -> Color {
    Color::Rgb(Rgb::new(color.0, color.1, color.2, None))
}

/// Line height with leading
fn line_height(size_pt: f64) -> f64 {
    size_pt * PT_TO_MM * 1.35
}

/// Distance from the top of a line box to its baseline
fn baseline_offset(size_pt: f64) -> f64 {
    size_pt * PT_TO_MM * 0.85
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_grows_with_text() {
        let short = text_width_mm("ab", 10.0);
        let long = text_width_mm("abcdef", 10.0);
        assert!(long > short);
        assert!(short > 0.0);
    }

    #[test]
    fn test_wrap_short_text_is_single_line() {
        assert_eq!(wrap("hello world", 10.0, 200.0), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_respects_max_width() {
        let lines = wrap(
            "the quick brown fox jumps over the lazy dog again and again",
            10.0,
            30.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 10.0) <= 30.0, "line too wide: {line}");
        }
    }

    #[test]
    fn test_wrap_hard_splits_oversized_words() {
        let lines = wrap(&"x".repeat(200), 10.0, 25.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 10.0) <= 25.0);
        }
        // Nothing lost in the split
        assert_eq!(lines.concat(), "x".repeat(200));
    }

    #[test]
    fn test_wrap_empty_text_yields_one_empty_line() {
        assert_eq!(wrap("", 10.0, 50.0), vec![String::new()]);
    }

    #[test]
    fn test_wrap_is_deterministic() {
        let text = "deterministic wrapping of the same input text";
        assert_eq!(wrap(text, 9.0, 40.0), wrap(text, 9.0, 40.0));
    }
}
