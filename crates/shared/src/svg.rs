use crate::{Geometry, ResolvedPanel};
use std::fmt::Write;

const BACKGROUND: &str = "#fbfaf8";
const STROKE: &str = "#c9c3bb";
const TEXT: &str = "#6b6460";
const COLUMNS: usize = 2;

/// Печатный лист с плоскими панелями в две колонки
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    pub scale: f64,
    pub gap: f64,
    pub padding: f64,
    pub labels: bool,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            scale: 24.0,
            gap: 24.0,
            padding: 24.0,
            labels: true,
        }
    }
}

impl SvgRenderer {
    pub fn with_scale(mut self, scale: f64) -> Self {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
        self
    }

    pub fn without_labels(mut self) -> Self {
        self.labels = false;
        self
    }

    pub fn render(&self, geometry: &Geometry) -> String {
        self.render_panels(&geometry.panels)
    }

    pub fn render_panels(&self, panels: &[ResolvedPanel]) -> String {
        if panels.is_empty() {
            return empty_sheet();
        }

        let sizes: Vec<(f64, f64)> = panels
            .iter()
            .map(|p| (p.width * self.scale, p.height * self.scale))
            .collect();

        let mut col_widths = [0.0_f64; COLUMNS];
        let mut row_heights: Vec<f64> = Vec::new();
        for (index, (width, height)) in sizes.iter().enumerate() {
            let col = index % COLUMNS;
            let row = index / COLUMNS;
            col_widths[col] = col_widths[col].max(*width);
            if row_heights.len() <= row {
                row_heights.push(0.0);
            }
            row_heights[row] = row_heights[row].max(*height);
        }

        let total_width =
            col_widths.iter().sum::<f64>() + self.gap * (COLUMNS - 1) as f64 + self.padding * 2.0;
        let total_height = row_heights.iter().sum::<f64>()
            + self.gap * row_heights.len().saturating_sub(1) as f64
            + self.padding * 2.0;

        let mut rects = String::new();
        let mut labels = String::new();
        let mut y = self.padding;
        for (row, row_height) in row_heights.iter().enumerate() {
            let mut x = self.padding;
            for col in 0..COLUMNS {
                let index = row * COLUMNS + col;
                let (Some(panel), Some((width, height))) = (panels.get(index), sizes.get(index))
                else {
                    break;
                };
                let _ = writeln!(
                    rects,
                    r##"  <rect x="{x}" y="{y}" width="{width}" height="{height}" fill="#ffffff" stroke="{STROKE}" stroke-width="2" rx="0" ry="0" stroke-linejoin="miter" />"##
                );
                if self.labels {
                    let _ = writeln!(
                        labels,
                        r#"  <text x="{}" y="{}" font-family="system-ui, sans-serif" font-size="14" fill="{TEXT}">{}</text>"#,
                        x + 8.0,
                        y + 18.0,
                        escape(panel.display_name())
                    );
                }
                x += col_widths[col] + self.gap;
            }
            y += row_height + self.gap;
        }

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {total_width} {total_height}" width="{total_width}" height="{total_height}">"#
        );
        let _ = writeln!(
            svg,
            r#"  <rect x="0" y="0" width="{total_width}" height="{total_height}" fill="{BACKGROUND}" />"#
        );
        svg.push_str(&rects);
        svg.push_str(&labels);
        svg.push_str("</svg>\n");
        svg
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn empty_sheet() -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 240" width="400" height="240">"#,
            "\n",
            r#"  <rect x="0" y="0" width="400" height="240" fill="{bg}" />"#,
            "\n",
            r#"  <text x="20" y="40" font-family="system-ui, sans-serif" font-size="14" fill="{text}">No panels defined</text>"#,
            "\n</svg>\n"
        ),
        bg = BACKGROUND,
        text = TEXT
    )
}
