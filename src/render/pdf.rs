//! A4 PDF 報告（printpdf，內建 Helvetica 字型）。

use crate::domain::analysis::AnalysisSummary;
use crate::utils::error::{Result, TrendsError};
use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
/// 10pt Helvetica 在 170mm 寬度下大約可放的字數
const WRAP_CHARS: usize = 95;

const OVERVIEW: &str = "This report provides a brief statistical overview of the United States economy \
using synthetic data designed to resemble realistic macroeconomic trends. The analysis explores GDP \
growth, inflation, unemployment rates and interest rates.";

const OBSERVATIONS: [&str; 4] = [
    "Total GDP increased steadily over the period, reflecting a strong post-pandemic recovery.",
    "Inflation peaked around 2022 and stabilized afterwards.",
    "The unemployment rate decreased gradually, suggesting improving labor market conditions.",
    "The correlation between inflation and interest rates was positive, consistent with typical \
     Federal Reserve monetary responses.",
];

const CONCLUSION: &str = "The simulated U.S. economy shows sustainable growth, moderate inflation \
and decreasing unemployment, which together signal macroeconomic stability for the outlook.";

pub const MISSING_CHART_NOTICE: &str =
    "Chart data not found. Please run the analysis command first.";

fn pdf_err<E: std::fmt::Display>(e: E) -> TrendsError {
    TrendsError::PdfError {
        message: e.to_string(),
    }
}

/// 依字數斷行
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
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

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// 由上往下排版的游標
struct Cursor {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Cursor {
    fn text(&mut self, text: &str, size: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= size * 0.5;
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, WRAP_CHARS) {
            self.text(&line, 10.0, false);
        }
        self.space(3.0);
    }

    fn heading(&mut self, text: &str, color: Color) {
        self.layer.set_fill_color(color);
        self.text(text, 13.0, true);
        self.layer.set_fill_color(rgb(0.0, 0.0, 0.0));
        self.space(1.0);
    }

    fn space(&mut self, mm: f32) {
        self.y -= mm;
    }
}

fn polyline(points: &[(f32, f32)]) -> Line {
    Line {
        points: points
            .iter()
            .map(|(x, y)| (Point::new(Mm(*x), Mm(*y)), false))
            .collect(),
        is_closed: false,
    }
}

/// 在 (left, bottom) 起、寬 width、高 height 的方框內畫實際 GDP 與迴歸線
fn draw_trend_figure(cursor: &mut Cursor, summary: &AnalysisSummary, height: f32) {
    let left = MARGIN + 10.0;
    let width = PAGE_WIDTH - 2.0 * MARGIN - 20.0;
    let bottom = cursor.y - height;
    let layer = &cursor.layer;

    let xs: Vec<f64> = summary.observations.iter().map(|o| o.year as f64).collect();
    let ys: Vec<f64> = summary
        .observations
        .iter()
        .map(|o| o.gdp)
        .chain(summary.predicted_gdp.iter().copied())
        .collect();
    let (x_min, x_max) = min_max(&xs);
    let (y_min, y_max) = min_max(&ys);
    let x_span = if x_max > x_min { x_max - x_min } else { 1.0 };
    let y_span = if y_max > y_min { y_max - y_min } else { 1.0 };

    let project = |x: f64, y: f64| -> (f32, f32) {
        (
            left + ((x - x_min) / x_span) as f32 * width,
            bottom + 5.0 + ((y - y_min) / y_span) as f32 * (height - 10.0),
        )
    };

    // 座標軸
    layer.set_outline_color(rgb(0.4, 0.4, 0.4));
    layer.set_outline_thickness(0.5);
    layer.add_line(polyline(&[
        (left, bottom + height),
        (left, bottom),
        (left + width, bottom),
    ]));

    let actual: Vec<(f32, f32)> = summary
        .observations
        .iter()
        .map(|o| project(o.year as f64, o.gdp))
        .collect();
    layer.set_outline_color(rgb(0.0, 0.467, 0.714));
    layer.set_outline_thickness(1.5);
    layer.add_line(polyline(&actual));

    let predicted: Vec<(f32, f32)> = xs
        .iter()
        .zip(&summary.predicted_gdp)
        .map(|(x, y)| project(*x, *y))
        .collect();
    layer.set_outline_color(rgb(0.85, 0.1, 0.1));
    layer.set_outline_thickness(1.0);
    layer.add_line(polyline(&predicted));

    for (obs, (x, _)) in summary.observations.iter().zip(&actual) {
        layer.use_text(
            obs.year.to_string(),
            8.0,
            Mm(*x - 3.0),
            Mm(bottom - 4.0),
            &cursor.regular,
        );
    }
    layer.use_text(
        format!("{:.2}", y_max),
        8.0,
        Mm(MARGIN - 8.0),
        Mm(bottom + height - 5.0),
        &cursor.regular,
    );
    layer.use_text(
        format!("{:.2}", y_min),
        8.0,
        Mm(MARGIN - 8.0),
        Mm(bottom + 5.0),
        &cursor.regular,
    );

    cursor.y = bottom - 10.0;
    cursor.layer.set_fill_color(rgb(0.0, 0.467, 0.714));
    cursor.text("Blue: actual GDP (Trillion USD)", 8.0, false);
    cursor.layer.set_fill_color(rgb(0.85, 0.1, 0.1));
    cursor.text("Red: linear regression (predicted GDP)", 8.0, false);
    cursor.layer.set_fill_color(rgb(0.0, 0.0, 0.0));
    cursor.space(4.0);
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// 產生 PDF 位元組；沒有分析結果時以提示文字取代圖表
pub fn render_report(
    title: &str,
    generated_on: NaiveDate,
    analysis: Option<&AnalysisSummary>,
) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    let mut cursor = Cursor {
        layer: doc.get_page(page).get_layer(layer),
        regular,
        bold,
        y: PAGE_HEIGHT - MARGIN - 5.0,
    };

    let navy = rgb(0.0, 0.2, 0.4);
    let blue = rgb(0.0, 0.298, 0.6);

    let period = match analysis.and_then(|a| a.first_year().zip(a.last_year())) {
        Some((first, last)) => format!(" ({}-{})", first, last),
        None => String::new(),
    };

    cursor.layer.set_fill_color(navy);
    cursor.text(&format!("{}{}", title, period), 18.0, true);
    cursor.layer.set_fill_color(rgb(0.0, 0.0, 0.0));
    cursor.text(
        &format!("Generated on {}", generated_on.format("%B %d, %Y")),
        10.0,
        false,
    );
    cursor.space(4.0);

    cursor.paragraph(OVERVIEW);

    match analysis {
        Some(summary) => {
            cursor.heading(
                &format!("Figure 1. U.S. GDP Trend and Regression{}", period),
                blue.clone(),
            );
            draw_trend_figure(&mut cursor, summary, 70.0);
        }
        None => {
            cursor.paragraph(MISSING_CHART_NOTICE);
        }
    }

    cursor.heading("Key Observations", blue.clone());
    for item in OBSERVATIONS {
        let mut lines = wrap_text(item, WRAP_CHARS - 4).into_iter();
        if let Some(first) = lines.next() {
            cursor.text(&format!("- {}", first), 10.0, false);
        }
        for line in lines {
            cursor.text(&format!("  {}", line), 10.0, false);
        }
    }
    cursor.space(3.0);

    cursor.heading("Regression Summary", blue.clone());
    match analysis {
        Some(summary) => {
            cursor.paragraph(&format!(
                "The linear regression model ({}) indicates a {} GDP trend; total GDP growth over \
                 the period was {:.2}%. Correlation (inflation vs interest rate) = {:.3}; \
                 correlation (GDP vs unemployment) = {:.3}.",
                summary.equation(),
                if summary.regression.slope >= 0.0 {
                    "clear upward"
                } else {
                    "downward"
                },
                summary.gdp_growth_pct,
                summary.corr_inflation_interest,
                summary.corr_gdp_unemployment
            ));
        }
        None => cursor.paragraph("No regression results are available yet."),
    }

    cursor.heading("Conclusion", blue);
    cursor.paragraph(CONCLUSION);

    doc.save_to_bytes().map_err(pdf_err)
}
