//! Minimal SVG document builder and axis scaling helpers.

use crate::constants::AXIS_COLOR;
use std::fmt::Write;

/// Escape text for use in SVG/HTML content and attributes
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Text anchor for labels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Append-only SVG document.
///
/// Writing into a `String` cannot fail, so `write!` results are discarded.
pub struct SvgDocument {
    width: u32,
    height: u32,
    body: String,
}

impl SvgDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    pub fn width(&self) -> f64 {
        f64::from(self.width)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.height)
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, tooltip: Option<&str>) {
        let _ = write!(
            self.body,
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}">"#,
            x,
            y,
            w.max(0.0),
            h.max(0.0),
            fill
        );
        self.tooltip(tooltip);
        self.body.push_str("</rect>");
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        let _ = write!(
            self.body,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"/>"#,
            x1, y1, x2, y2, stroke, width
        );
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        if points.is_empty() {
            return;
        }
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        let _ = write!(
            self.body,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            coords.join(" "),
            stroke,
            width
        );
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], fill: &str, tooltip: Option<&str>) {
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        let _ = write!(
            self.body,
            r#"<polygon points="{}" fill="{}">"#,
            coords.join(" "),
            fill
        );
        self.tooltip(tooltip);
        self.body.push_str("</polygon>");
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, tooltip: Option<&str>) {
        let _ = write!(
            self.body,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}" fill-opacity="0.7">"#,
            cx, cy, r, fill
        );
        self.tooltip(tooltip);
        self.body.push_str("</circle>");
    }

    pub fn text(&mut self, x: f64, y: f64, text: &str, size: u32, anchor: Anchor) {
        let _ = write!(
            self.body,
            r#"<text x="{:.2}" y="{:.2}" font-size="{}" text-anchor="{}" fill="{}">{}</text>"#,
            x,
            y,
            size,
            anchor.as_str(),
            AXIS_COLOR,
            escape_xml(text)
        );
    }

    /// Text rotated about its anchor point, in degrees
    pub fn text_rotated(&mut self, x: f64, y: f64, text: &str, size: u32, anchor: Anchor, angle: f64) {
        let _ = write!(
            self.body,
            r#"<text x="{:.2}" y="{:.2}" font-size="{}" text-anchor="{}" fill="{}" transform="rotate({} {:.2} {:.2})">{}</text>"#,
            x,
            y,
            size,
            anchor.as_str(),
            AXIS_COLOR,
            angle,
            x,
            y,
            escape_xml(text)
        );
    }

    fn tooltip(&mut self, tooltip: Option<&str>) {
        if let Some(tip) = tooltip {
            let _ = write!(self.body, "<title>{}</title>", escape_xml(tip));
        }
    }

    /// Close the document
    pub fn finish(self, title: &str) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" "#,
                r#"font-family="Helvetica, Arial, sans-serif" role="img" aria-label="{t}">"#,
                r##"<rect width="100%" height="100%" fill="#ffffff"/>{body}</svg>"##
            ),
            w = self.width,
            h = self.height,
            t = escape_xml(title),
            body = self.body
        )
    }
}

/// Linear mapping from a data domain onto a pixel range
#[derive(Clone, Copy, Debug)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        let span = self.d1 - self.d0;
        if span.abs() < f64::EPSILON {
            return (self.r0 + self.r1) / 2.0;
        }
        self.r0 + (value - self.d0) / span * (self.r1 - self.r0)
    }
}

/// Round an axis maximum up to 1, 2 or 5 times a power of ten
pub fn nice_max(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(value.log10().floor());
    let normalized = value / magnitude;
    let step = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    step * magnitude
}

/// Short numeric label for axis ticks
pub fn format_tick(value: f64) -> String {
    if value.abs() >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value.abs() >= 10_000.0 {
        format!("{:.0}K", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}
