use crate::dashboard::Panel;
use crate::endpoints::{Column, EndpointRole, RenderStrategy};
use crate::render::{bar_chart, escape_html, line_chart, proportion_chart, raw_table};
use chrono::{DateTime, Utc};

/// Presentation knobs that do not change the data.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub donut_inner_radius: u32,
}

pub fn render_index(panels: &[Panel], options: RenderOptions, rendered_at: DateTime<Utc>) -> String {
    let column = |side: Column| {
        panels
            .iter()
            .filter(|panel| panel.endpoint.role.column() == side)
            .map(|panel| render_panel(panel, options))
            .collect::<Vec<_>>()
            .join("\n")
    };

    INDEX_HTML
        .replace("{{LEFT}}", &column(Column::Left))
        .replace("{{RIGHT}}", &column(Column::Right))
        .replace(
            "{{UPDATED}}",
            &rendered_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        )
}

pub fn render_panel(panel: &Panel, options: RenderOptions) -> String {
    let role = panel.endpoint.role;
    let table = panel.table.as_ref();
    let body = match role.strategy() {
        RenderStrategy::Line => line_chart(table, "hour", "total_edits"),
        RenderStrategy::Bar => bar_chart(table, "server_name", "total_edits"),
        RenderStrategy::Proportion => {
            proportion_chart(table, "is_bot", "total_edits", options.donut_inner_radius)
        }
        RenderStrategy::Table => raw_table(table),
    };
    let error = panel
        .error
        .as_deref()
        .map(|message| format!(r#"<div class="error" role="alert">{}</div>"#, escape_html(message)))
        .unwrap_or_default();

    format!(
        r#"<section class="panel" id="{}"><h2>{} {}</h2>{error}{body}</section>"#,
        role.key(),
        icon(role),
        role.title()
    )
}

fn icon(role: EndpointRole) -> &'static str {
    match role {
        EndpointRole::EditsOverTime => "&#128200;",
        EndpointRole::BotVsHuman => "&#129302;",
        EndpointRole::TopServers => "&#127760;",
        EndpointRole::TopUsers => "&#128101;",
        EndpointRole::TopPages => "&#128196;",
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Wikipedia Edits Dashboard</title>
  <style>
    :root {
      --bg: #f6f7f9;
      --ink: #262730;
      --muted: #6b6f76;
      --accent: #4c78a8;
      --card: #ffffff;
      --warn-bg: #fff8e1;
      --warn-ink: #8a6d00;
      --err-bg: #fdecea;
      --err-ink: #b3261e;
      --shadow: 0 12px 32px rgba(38, 39, 48, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Source Sans Pro", "Segoe UI", sans-serif;
      padding: 32px 24px 48px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
      margin-bottom: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 3vw, 2.4rem);
    }

    .updated {
      margin: 4px 0 0;
      color: var(--muted);
      font-size: 0.9rem;
    }

    button {
      appearance: none;
      border: 1px solid rgba(38, 39, 48, 0.2);
      background: white;
      border-radius: 8px;
      padding: 10px 16px;
      font-size: 1rem;
      cursor: pointer;
    }

    button:hover {
      border-color: var(--accent);
      color: var(--accent);
    }

    .columns {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(420px, 1fr));
      gap: 24px;
      align-items: start;
    }

    .column {
      display: grid;
      gap: 24px;
    }

    .panel {
      background: var(--card);
      border-radius: 16px;
      box-shadow: var(--shadow);
      padding: 20px;
    }

    .panel h2 {
      margin: 0 0 12px;
      font-size: 1.25rem;
    }

    .chart {
      width: 100%;
      height: 300px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 2.5;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-bar {
      fill: var(--accent);
    }

    .chart-grid {
      stroke: rgba(38, 39, 48, 0.1);
    }

    .chart-empty {
      fill: none;
      stroke: rgba(38, 39, 48, 0.1);
      stroke-width: 2;
    }

    .chart-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .chart-legend {
      fill: var(--ink);
      font-size: 13px;
    }

    .table-wrap {
      overflow-x: auto;
    }

    .data-table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.95rem;
    }

    .data-table th,
    .data-table td {
      text-align: left;
      padding: 6px 10px;
      border-bottom: 1px solid rgba(38, 39, 48, 0.08);
    }

    .data-table td.num {
      text-align: right;
      font-variant-numeric: tabular-nums;
    }

    .warning,
    .error {
      margin: 0 0 8px;
      padding: 12px 16px;
      border-radius: 8px;
    }

    .warning {
      background: var(--warn-bg);
      color: var(--warn-ink);
    }

    .error {
      background: var(--err-bg);
      color: var(--err-ink);
    }
  </style>
</head>
<body>
  <header>
    <div>
      <h1>Wikipedia Edits Dashboard &#128202;</h1>
      <p class="updated">Rendered {{UPDATED}}</p>
    </div>
    <form method="post" action="/refresh">
      <button type="submit">Refresh data</button>
    </form>
  </header>
  <main class="columns">
    <div class="column">
{{LEFT}}
    </div>
    <div class="column">
{{RIGHT}}
    </div>
  </main>
</body>
</html>
"#;
