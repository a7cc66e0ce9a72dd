use crate::domain::dashboard::DashboardView;
use crate::domain::model::Indicator;
use crate::render::charts;
use crate::utils::error::{Result, TrendsError};
use serde::Serialize;
use tera::{Context, Tera};

const DASHBOARD_TEMPLATE: &str = include_str!("templates/dashboard.html");

#[derive(Debug, Serialize)]
struct MetricCard {
    label: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct CorrelationSection {
    svg: String,
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ProjectionSection {
    svg: String,
    summary: String,
}

#[derive(Debug, Serialize)]
struct DashboardPage {
    title: &'static str,
    subtitle: &'static str,
    year_min: i32,
    year_max: i32,
    indicators: String,
    rolling_window: usize,
    projection_months: usize,
    seed: u64,
    metrics: Vec<MetricCard>,
    timeseries_svg: String,
    rolling_headers: Vec<String>,
    rolling_rows: Vec<Vec<String>>,
    correlation: Option<CorrelationSection>,
    projection: Option<ProjectionSection>,
    csv_file: String,
    data_headers: Vec<&'static str>,
    data_rows: Vec<Vec<String>>,
}

fn template_err(e: tera::Error) -> TrendsError {
    // tera 的錯誤訊息在 source 鏈裡
    let mut message = e.to_string();
    let mut source = std::error::Error::source(&e);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    TrendsError::TemplateError { message }
}

fn format_value(indicator: Indicator, value: f64) -> String {
    match indicator {
        Indicator::Sp500 => format!("{:.0}", value),
        _ => format!("{:.2}", value),
    }
}

/// 專案摘要一句話
pub fn projection_summary(view: &DashboardView) -> Option<String> {
    view.projection.as_ref().map(|p| {
        format!(
            "last actual GDP = {:.2}T USD -> projected after {} months = {:.2}T USD ({:.2}% change)",
            p.last_actual,
            p.points.len(),
            p.projected_end,
            p.pct_change
        )
    })
}

/// 產生獨立的 HTML 儀表板頁面；`csv_file` 是頁面上的下載連結
pub fn render_dashboard(view: &DashboardView, csv_file: &str, seed: u64) -> Result<String> {
    let options = &view.options;

    let metrics = vec![
        MetricCard {
            label: "Average GDP (Trillion USD)",
            value: format!("{:.2}", view.metrics.avg_gdp),
        },
        MetricCard {
            label: "Average Inflation (%)",
            value: format!("{:.2}%", view.metrics.avg_inflation),
        },
        MetricCard {
            label: "Average Unemployment (%)",
            value: format!("{:.2}%", view.metrics.avg_unemployment),
        },
        MetricCard {
            label: "Avg Interest Rate (%)",
            value: format!("{:.2}%", view.metrics.avg_interest_rate),
        },
    ];

    let mut rolling_headers = vec!["Date".to_string()];
    rolling_headers.extend(
        view.rolling
            .indicators
            .iter()
            .map(|ind| format!("{}_roll", ind.column_name())),
    );
    let rolling_rows = view
        .rolling
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.date.to_string()];
            cells.extend(
                view.rolling
                    .indicators
                    .iter()
                    .zip(&row.values)
                    .map(|(ind, v)| format_value(*ind, *v)),
            );
            cells
        })
        .collect();

    let correlation = match &view.correlation {
        Some(matrix) => Some(CorrelationSection {
            svg: charts::correlation_heatmap_svg(matrix)?,
            headers: matrix.indicators.iter().map(|i| i.short_label()).collect(),
            rows: matrix
                .indicators
                .iter()
                .zip(&matrix.values)
                .map(|(ind, row)| {
                    let mut cells = vec![ind.short_label().to_string()];
                    cells.extend(row.iter().map(|cell| match cell {
                        Some(r) => format!("{:.3}", r),
                        None => "n/a".to_string(),
                    }));
                    cells
                })
                .collect(),
        }),
        None => None,
    };

    let projection = match (&view.projection, projection_summary(view)) {
        (Some(p), Some(summary)) => Some(ProjectionSection {
            svg: charts::projection_svg(&view.filtered, p)?,
            summary,
        }),
        _ => None,
    };

    let mut data_headers = vec!["Date"];
    data_headers.extend(Indicator::ALL.iter().map(|i| i.column_name()));
    let data_rows = view
        .filtered
        .records
        .iter()
        .map(|r| {
            let mut cells = vec![r.date.to_string()];
            cells.extend(
                Indicator::ALL
                    .iter()
                    .map(|ind| format_value(*ind, r.value(*ind))),
            );
            cells
        })
        .collect();

    let page = DashboardPage {
        title: "USA Economic Trends Dashboard",
        subtitle: "Interactive analysis of synthetic macroeconomic indicators",
        year_min: options.year_min,
        year_max: options.year_max,
        indicators: options
            .indicators
            .iter()
            .map(|i| i.short_label())
            .collect::<Vec<_>>()
            .join(", "),
        rolling_window: options.rolling_window,
        projection_months: options.projection_months,
        seed,
        metrics,
        timeseries_svg: charts::timeseries_svg(view)?,
        rolling_headers,
        rolling_rows,
        correlation,
        projection,
        csv_file: csv_file.to_string(),
        data_headers,
        data_rows,
    };

    let mut tera = Tera::default();
    tera.add_raw_template("dashboard.html", DASHBOARD_TEMPLATE)
        .map_err(template_err)?;
    let context = Context::from_serialize(&page).map_err(template_err)?;
    tera.render("dashboard.html", &context).map_err(template_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::{build_view, DashboardOptions};
    use crate::domain::synthetic::generate_monthly;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn view(options: &DashboardOptions) -> DashboardView {
        let ds = generate_monthly(&mut StdRng::seed_from_u64(42), 2020, 2025).unwrap();
        build_view(&ds, options).unwrap()
    }

    #[test]
    fn test_render_full_dashboard() {
        let v = view(&DashboardOptions::default());
        let html = render_dashboard(&v, "us_economic_filtered.csv", 42).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Average GDP (Trillion USD)"));
        assert!(html.contains("GDP_trillion_USD_roll"));
        assert!(html.contains("Correlation Matrix"));
        assert!(html.contains("Projection summary:"));
        assert!(html.contains("Theory &amp; Economic Interpretation"));
        // SVG 不能被跳脫
        assert!(html.contains("<svg"));
        assert!(html.contains("2025-12-31"));
        assert!(html.contains("seed 42"));
    }

    #[test]
    fn test_optional_sections_hidden() {
        let v = view(&DashboardOptions {
            show_correlation: false,
            projection_months: 0,
            ..DashboardOptions::default()
        });
        let html = render_dashboard(&v, "x.csv", 1).unwrap();
        assert!(!html.contains("<h2>Correlation Matrix</h2>"));
        assert!(!html.contains("Projection summary:"));
    }

    #[test]
    fn test_projection_summary_text() {
        let v = view(&DashboardOptions::default());
        let text = projection_summary(&v).unwrap();
        assert!(text.starts_with("last actual GDP = "));
        assert!(text.contains("after 6 months"));
    }
}
