//! SVG 圖表（plotters），嵌入儀表板 HTML 或單獨輸出。

use crate::domain::analysis::AnalysisSummary;
use crate::domain::dashboard::{CorrelationMatrix, DashboardView, Projection};
use crate::domain::model::{EconomicDataset, Indicator};
use crate::utils::error::{Result, TrendsError};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

pub const CHART_WIDTH: u32 = 960;
pub const CHART_HEIGHT: u32 = 480;

const GDP_BLUE: RGBColor = RGBColor(0, 119, 182);

fn chart_err<E: std::fmt::Display>(e: E) -> TrendsError {
    TrendsError::ChartError {
        message: e.to_string(),
    }
}

pub fn indicator_color(indicator: Indicator) -> RGBColor {
    match indicator {
        Indicator::Gdp => GDP_BLUE,
        Indicator::Inflation => RGBColor(230, 126, 34),
        Indicator::Unemployment => RGBColor(46, 139, 87),
        Indicator::InterestRate => RGBColor(142, 68, 173),
        Indicator::Sp500 => RGBColor(192, 57, 43),
    }
}

/// 上下各留 5% 空間；常數序列給一個固定寬度
fn padded_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span == 0.0 {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
        return (min - pad)..(max + pad);
    }
    (min - span * 0.05)..(max + span * 0.05)
}

/// 以月序號當 X 軸時的標籤
fn month_labels(dataset: &EconomicDataset) -> Vec<String> {
    dataset.records.iter().map(|r| r.month_label()).collect()
}

fn label_at(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 || (x - idx).abs() > 1e-6 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// RdYlBu_r：-1 藍、0 淡黃、+1 紅
pub fn diverging_color(value: f64) -> RGBColor {
    let blue = (49.0, 54.0, 149.0);
    let mid = (255.0, 255.0, 191.0);
    let red = (165.0, 0.0, 38.0);
    let v = value.clamp(-1.0, 1.0);
    let (from, to, t) = if v < 0.0 {
        (blue, mid, v + 1.0)
    } else {
        (mid, red, v)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

/// 年度 GDP 與迴歸線
pub fn gdp_trend_svg(summary: &AnalysisSummary) -> Result<String> {
    let years: Vec<f64> = summary.observations.iter().map(|o| o.year as f64).collect();
    let actual: Vec<(f64, f64)> = summary
        .observations
        .iter()
        .map(|o| (o.year as f64, o.gdp))
        .collect();
    let predicted: Vec<(f64, f64)> = years
        .iter()
        .copied()
        .zip(summary.predicted_gdp.iter().copied())
        .collect();

    let x_range = padded_range(years.iter().copied());
    let y_range = padded_range(
        actual
            .iter()
            .map(|p| p.1)
            .chain(predicted.iter().map(|p| p.1)),
    );
    let title = format!(
        "United States GDP Trend ({}-{})",
        summary.first_year().unwrap_or_default(),
        summary.last_year().unwrap_or_default()
    );

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(chart_err)?;

        let year_label = |x: &f64| {
            if (x - x.round()).abs() < 1e-6 {
                format!("{:.0}", x)
            } else {
                String::new()
            }
        };
        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("GDP (Trillion USD)")
            .x_labels(years.len().max(2))
            .x_label_formatter(&year_label)
            .light_line_style(&BLACK.mix(0.05))
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(LineSeries::new(actual.iter().copied(), GDP_BLUE.stroke_width(2)))
            .map_err(chart_err)?
            .label("Actual GDP (Trillion USD)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GDP_BLUE));
        chart
            .draw_series(
                actual
                    .iter()
                    .map(|&(x, y)| Circle::new((x, y), 4, GDP_BLUE.filled())),
            )
            .map_err(chart_err)?;

        chart
            .draw_series(LineSeries::new(predicted.iter().copied(), RED.stroke_width(2)))
            .map_err(chart_err)?
            .label("Linear Regression (Predicted GDP)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}

/// 多指標時間序列：GDP 在左軸，其餘指標在右軸
pub fn timeseries_svg(view: &DashboardView) -> Result<String> {
    let filtered = &view.filtered;
    let labels = month_labels(filtered);
    let n = filtered.len();
    let x_range = -0.5..(n as f64 - 0.5).max(0.5);

    let gdp_selected = view.options.indicators.contains(&Indicator::Gdp);
    let secondary: Vec<Indicator> = view
        .options
        .indicators
        .iter()
        .copied()
        .filter(|i| *i != Indicator::Gdp)
        .collect();

    let secondary_range =
        padded_range(secondary.iter().flat_map(|ind| filtered.column(*ind)));
    let primary_range = if gdp_selected {
        padded_range(filtered.column(Indicator::Gdp))
    } else {
        secondary_range.clone()
    };

    let series = |ind: Indicator| -> Vec<(f64, f64)> {
        filtered
            .column(ind)
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i as f64, v))
            .collect()
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Macroeconomic Indicators", ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), primary_range)
            .map_err(chart_err)?
            .set_secondary_coord(x_range, secondary_range);

        let month_label = |x: &f64| label_at(&labels, *x);
        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc(if gdp_selected {
                "GDP (Trillion USD)"
            } else {
                "Percent / Index"
            })
            .x_labels(8)
            .x_label_formatter(&month_label)
            .light_line_style(&BLACK.mix(0.05))
            .draw()
            .map_err(chart_err)?;
        chart
            .configure_secondary_axes()
            .y_desc("Percent / Index")
            .draw()
            .map_err(chart_err)?;

        if gdp_selected {
            let color = indicator_color(Indicator::Gdp);
            let points = series(Indicator::Gdp);
            chart
                .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
                .map_err(chart_err)?
                .label("GDP (Trillions USD)")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            chart
                .draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))
                .map_err(chart_err)?;
        }

        for ind in &secondary {
            let color = indicator_color(*ind);
            let points = series(*ind);
            let style = color.stroke_width(2);
            // S&P 500 以虛線區分
            let anno = if *ind == Indicator::Sp500 {
                chart.draw_secondary_series(DashedLineSeries::new(points.clone(), 6, 4, style))
            } else {
                chart.draw_secondary_series(LineSeries::new(points.clone(), style))
            };
            anno.map_err(chart_err)?
                .label(ind.short_label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            chart
                .draw_secondary_series(
                    points.into_iter().map(|p| Circle::new(p, 3, color.filled())),
                )
                .map_err(chart_err)?;
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}

/// 相關係數熱圖，附數值
pub fn correlation_heatmap_svg(matrix: &CorrelationMatrix) -> Result<String> {
    let k = matrix.indicators.len();
    let kf = k as f64;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (720, 520)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Correlation Matrix", ("sans-serif", 22))
            .margin(20)
            .build_cartesian_2d(-1.6..kf, 0.0..(kf + 0.8))
            .map_err(chart_err)?;

        let mut cells = Vec::with_capacity(k * k);
        let mut texts = Vec::with_capacity(k * k + 2 * k);
        let centered = TextStyle::from(("sans-serif", 14).into_font())
            .pos(Pos::new(HPos::Center, VPos::Center));
        let right = TextStyle::from(("sans-serif", 14).into_font())
            .pos(Pos::new(HPos::Right, VPos::Center));

        for (i, row) in matrix.values.iter().enumerate() {
            // 第 0 列畫在最上面
            let y0 = kf - 1.0 - i as f64;
            for (j, cell) in row.iter().enumerate() {
                let x0 = j as f64;
                let (fill, text) = match cell {
                    Some(r) => (diverging_color(*r), format!("{:.2}", r)),
                    None => (RGBColor(220, 220, 220), "n/a".to_string()),
                };
                cells.push(Rectangle::new(
                    [(x0, y0), (x0 + 1.0, y0 + 1.0)],
                    fill.filled(),
                ));
                texts.push(Text::new(text, (x0 + 0.5, y0 + 0.5), centered.clone()));
            }
            texts.push(Text::new(
                matrix.indicators[i].short_label().to_string(),
                (-0.1, y0 + 0.5),
                right.clone(),
            ));
        }
        for (j, ind) in matrix.indicators.iter().enumerate() {
            texts.push(Text::new(
                ind.short_label().to_string(),
                (j as f64 + 0.5, kf + 0.4),
                centered.clone(),
            ));
        }

        chart.draw_series(cells).map_err(chart_err)?;
        chart.draw_series(texts).map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}

/// GDP 實際值與線性推估
pub fn projection_svg(filtered: &EconomicDataset, projection: &Projection) -> Result<String> {
    let mut labels = month_labels(filtered);
    labels.extend(
        projection
            .points
            .iter()
            .map(|p| p.date.format("%Y-%m").to_string()),
    );

    let actual: Vec<(f64, f64)> = filtered
        .column(Indicator::Gdp)
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i as f64, v))
        .collect();
    // 推估線從最後一筆實際值接上
    let projected: Vec<(f64, f64)> = actual
        .last()
        .copied()
        .into_iter()
        .chain(
            projection
                .points
                .iter()
                .map(|p| (p.month_index as f64, p.gdp)),
        )
        .collect();

    let x_range = -0.5..(labels.len() as f64 - 0.5).max(0.5);
    let y_range = padded_range(actual.iter().chain(projected.iter()).map(|p| p.1));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("GDP: Actual vs Linear Projection", ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)
            .map_err(chart_err)?;

        let month_label = |x: &f64| label_at(&labels, *x);
        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("GDP (Trillion USD)")
            .x_labels(8)
            .x_label_formatter(&month_label)
            .light_line_style(&BLACK.mix(0.05))
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(LineSeries::new(actual.iter().copied(), GDP_BLUE.stroke_width(2)))
            .map_err(chart_err)?
            .label("Actual GDP")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GDP_BLUE));

        chart
            .draw_series(LineSeries::new(projected.iter().copied(), RED.stroke_width(2)))
            .map_err(chart_err)?
            .label(format!("Projection (+{} months)", projection.points.len()))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}
