use crate::table::{Cell, ResultTable};
use chrono::{DateTime, Utc};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt::Write;

pub const NO_DATA_MESSAGE: &str = "No data available.";

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 300.0;
const PADDING_X: f64 = 48.0;
const PADDING_Y: f64 = 40.0;
const TOP: f64 = 20.0;

const PALETTE: [&str; 10] = [
    "#4c78a8", "#f58518", "#e45756", "#72b7b2", "#54a24b", "#eeca3b", "#b279a2", "#ff9da6",
    "#9d755d", "#bab0ac",
];

/// One arc of a proportion chart, derived at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

pub fn no_data() -> String {
    format!(r#"<p class="warning">{NO_DATA_MESSAGE}</p>"#)
}

/// Time-series line: `x` must hold timestamps, `y` counts.
pub fn line_chart(table: &ResultTable, x: &str, y: &str) -> String {
    if table.is_empty() {
        return no_data();
    }

    let mut points: Vec<_> = table
        .column(x)
        .into_iter()
        .zip(table.column(y))
        .filter_map(|(time, value)| Some((time.as_timestamp()?, value.as_f64().unwrap_or(0.0))))
        .collect();
    if points.is_empty() {
        return no_data();
    }
    points.sort_by_key(|(time, _)| *time);

    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let scale = ValueScale::new(max);
    let first = points[0].0;
    let span = (points[points.len() - 1].0 - first).num_seconds() as f64;
    let px = |time: DateTime<Utc>| {
        if span > 0.0 {
            PADDING_X + (time - first).num_seconds() as f64 / span * (WIDTH - PADDING_X * 2.0)
        } else {
            WIDTH / 2.0
        }
    };

    let mut svg = open_svg("Edits over time");
    scale.grid(&mut svg);

    let path = points
        .iter()
        .enumerate()
        .map(|(i, (time, v))| {
            format!("{} {:.2} {:.2}", if i == 0 { 'M' } else { 'L' }, px(*time), scale.y(*v))
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(svg, r#"<path class="chart-line" d="{path}" />"#);

    let label_every = points.len().div_ceil(8).max(1);
    for (i, (time, value)) in points.iter().enumerate() {
        let _ = write!(
            svg,
            r#"<circle class="chart-point" cx="{:.2}" cy="{:.2}" r="3"><title>{} | {}</title></circle>"#,
            px(*time),
            scale.y(*value),
            time.format("%Y-%m-%d %H:%M"),
            format_value(*value)
        );
        if i % label_every == 0 {
            let _ = write!(
                svg,
                r#"<text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
                px(*time),
                HEIGHT - PADDING_Y + 18.0,
                time.format("%H:%M")
            );
        }
    }

    svg.push_str("</svg>");
    svg
}

/// One bar per row, labelled by `category`, height from `value`.
pub fn bar_chart(table: &ResultTable, category: &str, value: &str) -> String {
    if table.is_empty() {
        return no_data();
    }

    let labels = table.column(category);
    let values: Vec<f64> = table
        .column(value)
        .into_iter()
        .map(|cell| cell.as_f64().unwrap_or(0.0))
        .collect();
    let bars: Vec<(String, f64)> = (0..table.len())
        .map(|i| {
            let label = labels.get(i).map(|cell| cell.to_string()).unwrap_or_default();
            (label, values.get(i).copied().unwrap_or(0.0))
        })
        .collect();

    let max = bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let scale = ValueScale::new(max);
    let slot = (WIDTH - PADDING_X * 2.0) / bars.len() as f64;
    let bar_width = (slot * 0.7).max(1.0);

    let mut svg = open_svg("Bar chart");
    scale.grid(&mut svg);
    for (i, (label, v)) in bars.iter().enumerate() {
        let x = PADDING_X + i as f64 * slot + (slot - bar_width) / 2.0;
        let top = scale.y(*v);
        let label = escape_html(label);
        let _ = write!(
            svg,
            r#"<rect class="chart-bar" x="{x:.2}" y="{top:.2}" width="{bar_width:.2}" height="{:.2}"><title>{label} | {}</title></rect>"#,
            scale.y(0.0) - top,
            format_value(*v)
        );
        let _ = write!(
            svg,
            r#"<text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="middle">{label}</text>"#,
            x + bar_width / 2.0,
            HEIGHT - PADDING_Y + 18.0
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Maps the boolean `flag` column to "Bot"/"Human" and coerces `value` to a
/// number, with nulls and non-numeric cells becoming zero.
pub fn proportion_slices(table: &ResultTable, flag: &str, value: &str) -> Vec<Slice> {
    let flags = table.column(flag);
    let values = table.column(value);
    (0..table.len())
        .map(|i| Slice {
            label: flags.get(i).map(|cell| bot_label(cell)).unwrap_or("Unknown").to_string(),
            value: values
                .get(i)
                .and_then(|cell| cell.as_f64())
                .filter(|v| *v >= 0.0)
                .unwrap_or(0.0),
        })
        .collect()
}

pub fn bot_label(cell: &Cell) -> &'static str {
    match cell {
        Cell::Bool(true) | Cell::Int(1) => "Bot",
        Cell::Bool(false) | Cell::Int(0) => "Human",
        Cell::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => "Bot",
            "false" | "0" => "Human",
            _ => "Unknown",
        },
        _ => "Unknown",
    }
}

/// Circular chart with one arc per row, coloured by label. `inner_radius` of
/// zero draws a pie.
pub fn proportion_chart(table: &ResultTable, flag: &str, value: &str, inner_radius: u32) -> String {
    if table.is_empty() {
        return no_data();
    }

    let slices = proportion_slices(table, flag, value);
    let total: f64 = slices.iter().map(|slice| slice.value).sum();

    let (cx, cy) = (HEIGHT / 2.0, HEIGHT / 2.0);
    let outer = HEIGHT / 2.0 - 10.0;
    let inner = f64::from(inner_radius).min(outer - 1.0);

    let mut svg = open_svg("Proportion chart");
    if total <= 0.0 {
        let _ = write!(
            svg,
            r#"<circle class="chart-empty" cx="{cx}" cy="{cy}" r="{outer}" />"#
        );
    }

    // One colour and one legend entry per distinct label, in first-seen order.
    let mut categories: Vec<(&str, f64)> = Vec::new();
    for slice in &slices {
        match categories.iter_mut().find(|entry| entry.0 == slice.label) {
            Some(entry) => entry.1 += slice.value,
            None => categories.push((slice.label.as_str(), slice.value)),
        }
    }
    let color_of = |label: &str| {
        let slot = categories.iter().position(|(seen, _)| *seen == label).unwrap_or(0);
        PALETTE[slot % PALETTE.len()]
    };

    let mut start = -FRAC_PI_2;
    for slice in &slices {
        if total <= 0.0 || slice.value <= 0.0 {
            continue;
        }
        let color = color_of(slice.label.as_str());
        let fraction = slice.value / total;
        let end = start + fraction * TAU;
        let tooltip = format!("{} | {}", escape_html(&slice.label), format_value(slice.value));
        if fraction >= 0.9999 {
            full_ring(&mut svg, (cx, cy), outer, inner, color, &tooltip);
        } else {
            let _ = write!(
                svg,
                r#"<path d="{}" fill="{color}"><title>{tooltip}</title></path>"#,
                arc_path((cx, cy), outer, inner, start, end)
            );
        }
        start = end;
    }

    let legend_x = HEIGHT + 20.0;
    for (i, (label, value)) in categories.iter().enumerate() {
        let y = TOP + 20.0 + i as f64 * 24.0;
        let _ = write!(
            svg,
            r#"<rect x="{legend_x}" y="{:.2}" width="14" height="14" fill="{}" /><text class="chart-legend" x="{}" y="{:.2}">{} ({})</text>"#,
            y - 11.0,
            color_of(*label),
            legend_x + 22.0,
            y,
            escape_html(label),
            format_value(*value)
        );
    }

    svg.push_str("</svg>");
    svg
}

/// All rows and columns, verbatim.
pub fn raw_table(table: &ResultTable) -> String {
    if table.is_empty() {
        return no_data();
    }

    let mut html = String::from(r#"<div class="table-wrap"><table class="data-table"><thead><tr>"#);
    for column in &table.columns {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            let class = match cell {
                Cell::Int(_) | Cell::Float(_) => r#" class="num""#,
                _ => "",
            };
            let _ = write!(html, "<td{class}>{}</td>", escape_html(&cell.to_string()));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></div>");
    html
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn open_svg(label: &str) -> String {
    format!(
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{label}">"#
    )
}

/// Linear y-axis from zero to the largest value.
struct ValueScale {
    max: f64,
}

impl ValueScale {
    fn new(max: f64) -> Self {
        Self {
            max: if max > 0.0 { max } else { 1.0 },
        }
    }

    fn y(&self, value: f64) -> f64 {
        HEIGHT - PADDING_Y - value / self.max * (HEIGHT - TOP - PADDING_Y)
    }

    fn grid(&self, svg: &mut String) {
        const TICKS: u32 = 4;
        for i in 0..=TICKS {
            let value = self.max * f64::from(i) / f64::from(TICKS);
            let y = self.y(value);
            let _ = write!(
                svg,
                r#"<line class="chart-grid" x1="{PADDING_X}" y1="{y:.2}" x2="{}" y2="{y:.2}" /><text class="chart-label" x="{}" y="{:.2}" text-anchor="end">{}</text>"#,
                WIDTH - PADDING_X,
                PADDING_X - 8.0,
                y + 4.0,
                format_value(value.round())
            );
        }
    }
}

fn polar(center: (f64, f64), radius: f64, angle: f64) -> (f64, f64) {
    (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
}

fn arc_path(center: (f64, f64), outer: f64, inner: f64, start: f64, end: f64) -> String {
    let large = if end - start > std::f64::consts::PI { 1 } else { 0 };
    let (ox0, oy0) = polar(center, outer, start);
    let (ox1, oy1) = polar(center, outer, end);
    if inner <= 0.0 {
        return format!(
            "M {:.2} {:.2} L {ox0:.2} {oy0:.2} A {outer:.2} {outer:.2} 0 {large} 1 {ox1:.2} {oy1:.2} Z",
            center.0, center.1
        );
    }
    let (ix0, iy0) = polar(center, inner, start);
    let (ix1, iy1) = polar(center, inner, end);
    format!(
        "M {ox0:.2} {oy0:.2} A {outer:.2} {outer:.2} 0 {large} 1 {ox1:.2} {oy1:.2} L {ix1:.2} {iy1:.2} A {inner:.2} {inner:.2} 0 {large} 0 {ix0:.2} {iy0:.2} Z"
    )
}

fn full_ring(svg: &mut String, center: (f64, f64), outer: f64, inner: f64, color: &str, tooltip: &str) {
    let (cx, cy) = center;
    if inner <= 0.0 {
        let _ = write!(
            svg,
            r#"<circle cx="{cx}" cy="{cy}" r="{outer}" fill="{color}"><title>{tooltip}</title></circle>"#
        );
    } else {
        let _ = write!(
            svg,
            r#"<circle cx="{cx}" cy="{cy}" r="{:.2}" fill="none" stroke="{color}" stroke-width="{:.2}"><title>{tooltip}</title></circle>"#,
            (outer + inner) / 2.0,
            outer - inner
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::parse_payload;

    fn table(body: &str) -> ResultTable {
        parse_payload(body.as_bytes()).unwrap()
    }

    #[test]
    fn every_strategy_shows_warning_on_empty_table() {
        let empty = ResultTable::empty();
        for html in [
            line_chart(&empty, "hour", "total_edits"),
            bar_chart(&empty, "server_name", "total_edits"),
            proportion_chart(&empty, "is_bot", "total_edits", 50),
            raw_table(&empty),
        ] {
            assert!(html.contains(NO_DATA_MESSAGE));
            assert!(!html.contains("<svg"));
            assert!(!html.contains("<table"));
        }
    }

    #[test]
    fn proportion_coercion_leaves_no_nulls() {
        let t = table(
            r#"{"data": [
                {"is_bot": true, "total_edits": 10},
                {"is_bot": false, "total_edits": null},
                {"is_bot": null, "total_edits": "abc"},
                {"is_bot": false, "total_edits": "7"}
            ]}"#,
        );
        let slices = proportion_slices(&t, "is_bot", "total_edits");

        assert_eq!(slices.len(), 4);
        assert!(slices.iter().all(|slice| slice.value.is_finite()));
        assert_eq!(
            slices.iter().map(|s| s.value).collect::<Vec<_>>(),
            vec![10.0, 0.0, 0.0, 7.0]
        );
        assert_eq!(
            slices.iter().map(|s| s.label.as_str()).collect::<Vec<_>>(),
            vec!["Bot", "Human", "Unknown", "Human"]
        );
    }

    #[test]
    fn proportion_chart_missing_value_column_still_renders() {
        let t = table(r#"{"data": [{"is_bot": true}, {"is_bot": false}]}"#);
        let html = proportion_chart(&t, "is_bot", "total_edits", 50);
        assert!(html.contains("<svg"));
        assert!(html.contains("Bot (0)"));
        assert!(html.contains("Human (0)"));
    }

    #[test]
    fn proportion_chart_draws_one_arc_per_category() {
        let t = table(
            r#"{"data": [{"is_bot": true, "total_edits": 30}, {"is_bot": false, "total_edits": 70}]}"#,
        );
        let donut = proportion_chart(&t, "is_bot", "total_edits", 50);
        assert_eq!(donut.matches("<path").count(), 2);

        let pie = proportion_chart(&t, "is_bot", "total_edits", 0);
        assert_eq!(pie.matches("<path").count(), 2);
        assert_ne!(donut, pie);
    }

    #[test]
    fn line_chart_plots_each_timestamped_row() {
        let t = table(
            r#"{"data": [
                {"hour": "2024-01-01 02:00:00", "total_edits": 5},
                {"hour": "2024-01-01 00:00:00", "total_edits": 42},
                {"hour": null, "total_edits": 9}
            ]}"#,
        );
        let html = line_chart(&t, "hour", "total_edits");
        assert_eq!(html.matches("<circle").count(), 2);
        let first = html.find("00:00</text>").unwrap();
        let second = html.find("02:00</text>").unwrap();
        assert!(first < second);
    }

    fn point_xs(html: &str) -> Vec<f64> {
        html.split(r#"class="chart-point" cx=""#)
            .skip(1)
            .map(|rest| rest[..rest.find('"').unwrap()].parse().unwrap())
            .collect()
    }

    fn arc_fills(html: &str) -> Vec<&str> {
        html.split("<path d=")
            .skip(1)
            .map(|rest| {
                let start = rest.find(r#"fill=""#).unwrap() + 6;
                &rest[start..start + rest[start..].find('"').unwrap()]
            })
            .collect()
    }

    #[test]
    fn line_chart_spaces_points_by_time() {
        let t = table(
            r#"{"data": [
                {"hour": "2024-01-01 00:00:00", "total_edits": 1},
                {"hour": "2024-01-01 01:00:00", "total_edits": 2},
                {"hour": "2024-01-01 10:00:00", "total_edits": 3}
            ]}"#,
        );
        let xs = point_xs(&line_chart(&t, "hour", "total_edits"));

        assert_eq!(xs.len(), 3);
        assert!((xs[0] - PADDING_X).abs() < 0.01);
        assert!((xs[2] - (WIDTH - PADDING_X)).abs() < 0.01);
        let short_gap = xs[1] - xs[0];
        let long_gap = xs[2] - xs[1];
        assert!((long_gap - short_gap * 9.0).abs() < 0.1);
    }

    #[test]
    fn line_chart_centres_a_single_point() {
        let t = table(r#"{"data": [{"hour": "2024-01-01 00:00:00", "total_edits": 1}]}"#);
        let xs = point_xs(&line_chart(&t, "hour", "total_edits"));
        assert_eq!(xs, vec![WIDTH / 2.0]);
    }

    #[test]
    fn proportion_chart_colours_by_label() {
        let t = table(
            r#"{"data": [
                {"is_bot": true, "total_edits": 10},
                {"is_bot": true, "total_edits": 5},
                {"is_bot": false, "total_edits": 20}
            ]}"#,
        );
        let html = proportion_chart(&t, "is_bot", "total_edits", 50);
        let fills = arc_fills(&html);

        assert_eq!(fills.len(), 3);
        assert_eq!(fills[0], fills[1]);
        assert_ne!(fills[0], fills[2]);
        assert_eq!(html.matches(r#"class="chart-legend""#).count(), 2);
        assert!(html.contains("Bot (15)"));
        assert!(html.contains("Human (20)"));
        assert!(html.contains(&format!(r#"height="14" fill="{}""#, fills[2])));
    }

    #[test]
    fn slice_after_full_ring_starts_where_the_ring_ends() {
        let t = table(
            r#"{"data": [{"is_bot": true, "total_edits": 99995}, {"is_bot": false, "total_edits": 5}]}"#,
        );
        let html = proportion_chart(&t, "is_bot", "total_edits", 50);

        assert_eq!(html.matches("<path").count(), 1);
        assert!(html.contains(r#"<path d="M 149.96 10.00"#));
    }

    #[test]
    fn bar_chart_escapes_labels() {
        let t = table(r#"{"data": [{"server_name": "<en>", "total_edits": 3}]}"#);
        let html = bar_chart(&t, "server_name", "total_edits");
        assert_eq!(html.matches("<rect").count(), 1);
        assert!(html.contains("&lt;en&gt;"));
        assert!(!html.contains("<en>"));
    }

    #[test]
    fn raw_table_shows_all_columns_and_rows() {
        let t = table(
            r#"{"data": [{"title": "Main Page", "total_edits": 12}, {"title": "Rust", "total_edits": 4}]}"#,
        );
        let html = raw_table(&t);
        assert!(html.contains("<th>title</th><th>total_edits</th>"));
        assert_eq!(html.matches("<tr>").count(), 3);
        assert!(html.contains("Main Page"));
    }
}
