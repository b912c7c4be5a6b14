use crate::models::{
    Dashboard, DayOfWeekPoint, HabitCard, HeatmapDay, HistoryEntry, Summary, WeeklyPoint,
    DEFAULT_COLOR, PALETTE,
};
use chrono::Datelike;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::f64::consts::PI;
use std::fmt::Write;

// Everything outside the unreserved set is escaped, so an id is always a single
// path segment or query value.
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn render_index(dashboard: &Dashboard, celebrate: Option<u32>) -> String {
    INDEX_HTML
        .replace("{{TODAY}}", &dashboard.today.to_string())
        .replace("{{BANNER}}", &render_banner(celebrate))
        .replace("{{STATS}}", &render_stats(&dashboard.summary))
        .replace("{{PALETTE}}", &render_palette(DEFAULT_COLOR, "new"))
        .replace("{{HABITS}}", &render_habits(&dashboard.habits))
        .replace(
            "{{FILTERS}}",
            &render_filters(&dashboard.habits, dashboard.filter.as_deref()),
        )
        .replace("{{MONTHS}}", &render_months(&dashboard.heatmap))
        .replace("{{HEATMAP}}", &render_heatmap(&dashboard.heatmap))
        .replace("{{WEEKLY_CHART}}", &render_weekly_chart(&dashboard.weekly_progress))
        .replace("{{RADAR_CHART}}", &render_radar_chart(&dashboard.day_of_week))
        .replace("{{HISTORY}}", &render_history(&dashboard.recent))
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
            '{' => out.push_str("&#123;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_banner(celebrate: Option<u32>) -> String {
    match celebrate.filter(|streak| *streak > 0) {
        Some(streak) => format!(
            r#"<div class="banner" role="status">&#127881; {streak} day streak achieved!</div>"#
        ),
        None => String::new(),
    }
}

fn render_stats(summary: &Summary) -> String {
    let tiles = [
        ("Total Commits", summary.total_commits.to_string()),
        ("Current Streak", summary.current_streak.to_string()),
        ("Longest Streak", summary.longest_streak.to_string()),
        ("Habits", summary.total_habits.to_string()),
        ("This Week", format!("{}%", summary.weekly_completion_rate)),
        ("Today", summary.today_commits.to_string()),
    ];

    tiles
        .iter()
        .map(|(label, value)| {
            format!(
                r#"<div class="stat"><span class="label">{label}</span><span class="value">{value}</span></div>"#
            )
        })
        .collect()
}

fn render_palette(selected: &str, scope: &str) -> String {
    let scope = escape_html(scope);
    PALETTE
        .iter()
        .map(|color| {
            let checked = if color.eq_ignore_ascii_case(selected) { " checked" } else { "" };
            format!(
                r#"<label class="color-option" style="--swatch: {color}"><input type="radio" name="color" value="{color}" id="{scope}-{slug}"{checked} /><span></span></label>"#,
                slug = color.trim_start_matches('#'),
            )
        })
        .collect()
}

fn render_habits(habits: &[HabitCard]) -> String {
    if habits.is_empty() {
        return r#"<div class="empty-state"><h3>No habits yet</h3><p>Create your first habit above and start committing daily.</p></div>"#
            .to_string();
    }

    let mut out = String::from(r#"<div class="habits-grid">"#);
    for habit in habits {
        let id = url_component(&habit.id);
        let name = escape_html(&habit.name);
        let color = escape_html(&habit.color);
        let (commit_class, commit_label, disabled) = if habit.committed_today {
            ("commit-btn completed", "&#10003; Committed Today", " disabled")
        } else {
            ("commit-btn", "Commit Today", "")
        };

        let _ = write!(
            out,
            r#"<article class="habit-card" style="--habit-color: {color}">
  <div class="habit-header">
    <div class="habit-name">{name}</div>
    <form method="post" action="/habits/{id}/delete" onsubmit="return confirm('Delete this habit? All commit history will be lost.')">
      <button class="habit-action-btn" type="submit" title="Delete">&#128465;</button>
    </form>
  </div>
  <div class="habit-stats">
    <span>&#128293; {streak} day streak</span>
    <span>&#9989; {total} commits</span>
  </div>
  <form method="post" action="/habits/{id}/commit">
    <button class="{commit_class}" type="submit"{disabled}>{commit_label}</button>
  </form>
  <details class="edit">
    <summary>Edit</summary>
    <form method="post" action="/habits/{id}/edit" class="habit-form">
      <input type="text" name="name" value="{name}" required maxlength="80" />
      <div class="color-picker">{palette}</div>
      <button type="submit">Save Changes</button>
    </form>
  </details>
</article>"#,
            streak = habit.current_streak,
            total = habit.total_commits,
            palette = render_palette(&habit.color, &habit.id),
        );
    }
    out.push_str("</div>");
    out
}

fn render_filters(habits: &[HabitCard], filter: Option<&str>) -> String {
    let mut out = String::new();
    let all_class = if filter.is_none() { "filter-tab active" } else { "filter-tab" };
    let _ = write!(out, r#"<a class="{all_class}" href="/">All Habits</a>"#);
    for habit in habits {
        let class = if filter == Some(habit.id.as_str()) {
            "filter-tab active"
        } else {
            "filter-tab"
        };
        let _ = write!(
            out,
            r#"<a class="{class}" href="/?habit={id}">{name}</a>"#,
            id = url_component(&habit.id),
            name = escape_html(&habit.name),
        );
    }
    out
}

fn render_heatmap(days: &[HeatmapDay]) -> String {
    days.iter()
        .map(|day| {
            let plural = if day.count == 1 { "" } else { "s" };
            format!(
                r#"<div class="contribution-day" data-level="{level}" data-date="{date}" title="{date}: {count} commit{plural}"></div>"#,
                level = day.level,
                date = day.date,
                count = day.count,
            )
        })
        .collect()
}

/// Month labels in the order they appear across the heatmap.
fn render_months(days: &[HeatmapDay]) -> String {
    let mut months: Vec<u32> = Vec::new();
    for day in days {
        let month = day.date.month0();
        if months.last() != Some(&month) {
            months.push(month);
        }
    }
    months
        .iter()
        .map(|month| format!("<div>{}</div>", MONTHS[*month as usize]))
        .collect()
}

pub fn render_weekly_chart(weeks: &[WeeklyPoint]) -> String {
    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 260.0;
    const PAD_X: f64 = 40.0;
    const PAD_TOP: f64 = 20.0;
    const PAD_BOTTOM: f64 = 34.0;

    if weeks.is_empty() {
        return r#"<svg class="chart" viewBox="0 0 600 260" role="img" aria-label="Commits per week"><text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text></svg>"#
            .to_string();
    }

    let max = weeks.iter().map(|w| w.commits).max().unwrap_or(0).max(1) as f64;
    let plot_height = HEIGHT - PAD_TOP - PAD_BOTTOM;
    let slot = (WIDTH - PAD_X * 2.0) / weeks.len() as f64;
    let bar_width = slot * 0.6;
    let y = |value: f64| HEIGHT - PAD_BOTTOM - value / max * plot_height;

    let mut svg = format!(
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Commits per week">"#
    );

    let ticks = 4;
    for i in 0..=ticks {
        let value = max * f64::from(i) / f64::from(ticks);
        let y_pos = y(value);
        let _ = write!(
            svg,
            r#"<line class="chart-grid" x1="{PAD_X}" y1="{y_pos:.2}" x2="{x2}" y2="{y_pos:.2}" /><text class="chart-label" x="{lx}" y="{ly:.2}" text-anchor="end">{label}</text>"#,
            x2 = WIDTH - PAD_X,
            lx = PAD_X - 8.0,
            ly = y_pos + 4.0,
            label = format_tick(value),
        );
    }

    for (index, week) in weeks.iter().enumerate() {
        let x = PAD_X + slot * index as f64 + (slot - bar_width) / 2.0;
        let top = y(week.commits as f64);
        let _ = write!(
            svg,
            r#"<rect class="chart-bar" x="{x:.2}" y="{top:.2}" width="{bar_width:.2}" height="{h:.2}" rx="4"><title>Week of {label}: {commits} commits</title></rect><text class="chart-label" x="{cx:.2}" y="{ly}" text-anchor="middle">{label}</text>"#,
            h = HEIGHT - PAD_BOTTOM - top,
            label = escape_html(&week.label),
            commits = week.commits,
            cx = x + bar_width / 2.0,
            ly = HEIGHT - PAD_BOTTOM + 18.0,
        );
    }

    svg.push_str("</svg>");
    svg
}

pub fn render_radar_chart(days: &[DayOfWeekPoint]) -> String {
    const SIZE: f64 = 320.0;
    const RADIUS: f64 = 115.0;
    let center = SIZE / 2.0;

    let mut svg = format!(
        r#"<svg class="chart radar" viewBox="0 0 {SIZE} {SIZE}" role="img" aria-label="Completion rate by day of week">"#
    );
    if days.is_empty() {
        svg.push_str("</svg>");
        return svg;
    }

    let count = days.len();
    let point = |index: usize, fraction: f64| {
        let angle = -PI / 2.0 + 2.0 * PI * index as f64 / count as f64;
        (
            center + RADIUS * fraction * angle.cos(),
            center + RADIUS * fraction * angle.sin(),
        )
    };

    for step in 1..=5 {
        let fraction = f64::from(step) / 5.0;
        let ring = (0..count)
            .map(|index| {
                let (x, y) = point(index, fraction);
                format!("{x:.2},{y:.2}")
            })
            .collect::<Vec<_>>()
            .join(" ");
        let _ = write!(svg, r#"<polygon class="radar-grid" points="{ring}" />"#);
    }

    for (index, day) in days.iter().enumerate() {
        let (x, y) = point(index, 1.0);
        let (lx, ly) = point(index, 1.16);
        let _ = write!(
            svg,
            r#"<line class="radar-grid" x1="{center}" y1="{center}" x2="{x:.2}" y2="{y:.2}" /><text class="radar-label" x="{lx:.2}" y="{ly:.2}" text-anchor="middle" dominant-baseline="middle">{label}</text>"#,
            label = escape_html(&day.day),
        );
    }

    let shape = days
        .iter()
        .enumerate()
        .map(|(index, day)| {
            let (x, y) = point(index, f64::from(day.rate.min(100)) / 100.0);
            format!("{x:.2},{y:.2}")
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(svg, r#"<polygon class="radar-shape" points="{shape}" />"#);

    for (index, day) in days.iter().enumerate() {
        let (x, y) = point(index, f64::from(day.rate.min(100)) / 100.0);
        let _ = write!(
            svg,
            r#"<circle class="radar-point" cx="{x:.2}" cy="{y:.2}" r="4"><title>{label}: {rate}% completion rate</title></circle>"#,
            label = escape_html(&day.day),
            rate = day.rate,
        );
    }

    svg.push_str("</svg>");
    svg
}

fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return r#"<p class="empty-history">No commits yet. Start building your streak!</p>"#
            .to_string();
    }

    let mut out = String::from(r#"<div class="history-list">"#);
    for entry in entries {
        let _ = write!(
            out,
            r#"<div class="history-item" style="--habit-color: {color}"><div class="history-dot"></div><div class="history-content"><div class="history-habit">{name}</div><div class="history-time">{ago}</div></div></div>"#,
            color = escape_html(&entry.color),
            name = escape_html(&entry.habit_name),
            ago = escape_html(&entry.time_ago),
        );
    }
    out.push_str("</div>");
    out
}

fn format_tick(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

fn url_component(value: &str) -> String {
    utf8_percent_encode(value, URL_COMPONENT).to_string()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>HabitCommit</title>
  <style>
    :root {
      --bg: #0d1117;
      --panel: #161b22;
      --border: #30363d;
      --ink: #f0f6fc;
      --muted: #8b949e;
      --accent: #22c55e;
      --level-0: #161b22;
      --level-1: #0e4429;
      --level-2: #006d32;
      --level-3: #26a641;
      --level-4: #39d353;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
      flex-wrap: wrap;
      gap: 8px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.1rem;
    }

    .subtitle {
      margin: 0;
      color: var(--muted);
    }

    section {
      background: var(--panel);
      border: 1px solid var(--border);
      border-radius: 12px;
      padding: 20px;
    }

    .banner {
      background: rgba(34, 197, 94, 0.15);
      border: 1px solid var(--accent);
      border-radius: 12px;
      padding: 14px 18px;
      font-weight: 600;
      animation: pop 600ms ease;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 12px;
    }

    .stat {
      display: flex;
      flex-direction: column;
      gap: 4px;
    }

    .stat .label {
      color: var(--muted);
      font-size: 0.85rem;
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .habit-form {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    input[type="text"] {
      background: var(--bg);
      color: var(--ink);
      border: 1px solid var(--border);
      border-radius: 8px;
      padding: 10px 12px;
      min-width: 220px;
    }

    button {
      background: var(--accent);
      color: #0d1117;
      border: none;
      border-radius: 8px;
      padding: 10px 16px;
      font-weight: 600;
      cursor: pointer;
    }

    button:disabled {
      cursor: default;
      opacity: 0.7;
    }

    .color-picker {
      display: flex;
      gap: 6px;
    }

    .color-option input {
      display: none;
    }

    .color-option span {
      display: block;
      width: 22px;
      height: 22px;
      border-radius: 50%;
      background: var(--swatch);
      border: 2px solid transparent;
      cursor: pointer;
    }

    .color-option input:checked + span {
      border-color: var(--ink);
    }

    .habits-grid {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(240px, 1fr));
      gap: 14px;
    }

    .habit-card {
      border: 1px solid var(--border);
      border-left: 4px solid var(--habit-color);
      border-radius: 10px;
      padding: 14px;
      display: grid;
      gap: 10px;
    }

    .habit-header {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .habit-name {
      font-weight: 600;
    }

    .habit-action-btn {
      background: transparent;
      padding: 4px;
    }

    .habit-stats {
      display: flex;
      gap: 14px;
      color: var(--muted);
      font-size: 0.9rem;
    }

    .commit-btn {
      width: 100%;
      background: var(--habit-color);
    }

    .commit-btn.completed {
      background: transparent;
      color: var(--habit-color);
      border: 1px solid var(--habit-color);
    }

    .edit summary {
      color: var(--muted);
      cursor: pointer;
      font-size: 0.85rem;
    }

    .edit .habit-form {
      margin-top: 8px;
    }

    .empty-state,
    .empty-history {
      color: var(--muted);
      text-align: center;
    }

    .filter-tabs {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
      margin-bottom: 12px;
    }

    .filter-tab {
      color: var(--muted);
      text-decoration: none;
      border: 1px solid var(--border);
      border-radius: 999px;
      padding: 4px 12px;
      font-size: 0.85rem;
    }

    .filter-tab.active {
      color: var(--ink);
      border-color: var(--accent);
    }

    .contribution-months {
      display: flex;
      justify-content: space-between;
      color: var(--muted);
      font-size: 0.75rem;
      margin-bottom: 6px;
    }

    .contribution-graph {
      display: grid;
      grid-template-rows: repeat(7, 11px);
      grid-auto-flow: column;
      grid-auto-columns: 11px;
      gap: 3px;
      overflow-x: auto;
    }

    .contribution-day {
      border-radius: 2px;
      background: var(--level-0);
      outline: 1px solid rgba(240, 246, 252, 0.05);
    }

    .contribution-day[data-level="1"] { background: var(--level-1); }
    .contribution-day[data-level="2"] { background: var(--level-2); }
    .contribution-day[data-level="3"] { background: var(--level-3); }
    .contribution-day[data-level="4"] { background: var(--level-4); }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 20px;
    }

    .chart {
      width: 100%;
      height: auto;
    }

    .chart-grid,
    .radar-grid {
      stroke: rgba(48, 54, 61, 0.8);
      fill: none;
    }

    .chart-bar {
      fill: rgba(34, 197, 94, 0.6);
      stroke: rgba(34, 197, 94, 1);
      stroke-width: 2;
    }

    .chart-label,
    .radar-label {
      fill: var(--muted);
      font-size: 11px;
    }

    .radar-label {
      fill: var(--ink);
      font-weight: 600;
    }

    .radar-shape {
      fill: rgba(34, 197, 94, 0.2);
      stroke: rgba(34, 197, 94, 1);
      stroke-width: 2;
    }

    .radar-point {
      fill: rgba(34, 197, 94, 1);
      stroke: var(--ink);
    }

    .history-list {
      display: grid;
      gap: 10px;
    }

    .history-item {
      display: flex;
      gap: 10px;
      align-items: center;
    }

    .history-dot {
      width: 10px;
      height: 10px;
      border-radius: 50%;
      background: var(--habit-color);
    }

    .history-time {
      color: var(--muted);
      font-size: 0.8rem;
    }

    @keyframes pop {
      from {
        opacity: 0;
        transform: scale(0.96);
      }
      to {
        opacity: 1;
        transform: scale(1);
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>HabitCommit</h1>
      <p class="subtitle">Commit to your habits every day. Today is {{TODAY}}.</p>
    </header>
    {{BANNER}}
    <section class="stats">{{STATS}}</section>
    <section>
      <h2>New habit</h2>
      <form method="post" action="/habits" class="habit-form">
        <input type="text" name="name" placeholder="e.g. Read 20 pages" required maxlength="80" />
        <div class="color-picker">{{PALETTE}}</div>
        <button type="submit">Create Habit</button>
      </form>
    </section>
    <section>
      <h2>Habits</h2>
      {{HABITS}}
    </section>
    <section>
      <h2>Contributions</h2>
      <nav class="filter-tabs">{{FILTERS}}</nav>
      <div class="contribution-months">{{MONTHS}}</div>
      <div class="contribution-graph">{{HEATMAP}}</div>
    </section>
    <div class="charts">
      <section>
        <h2>Commits per week</h2>
        {{WEEKLY_CHART}}
      </section>
      <section>
        <h2>Completion by day of week</h2>
        {{RADAR_CHART}}
      </section>
    </div>
    <section>
      <h2>Recent activity</h2>
      {{HISTORY}}
    </section>
  </main>
</body>
</html>
"#;
