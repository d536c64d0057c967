use crate::error::Result;
use crate::model::{AgeOutput, WeekRow, SCHEMA_VERSION};
use chrono::Utc;
use std::path::Path;

/// Render the weekly table as a self-contained interactive HTML chart:
/// time axis, age on the left axis, counts on the right, hover tooltip
/// and legend. Everything is inlined; the file needs no network access.
pub fn write_html(
    path: &Path,
    title: &str,
    since: Option<&str>,
    until: Option<&str>,
    rows: &[WeekRow],
) -> Result<()> {
    let output = AgeOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        title: title.to_string(),
        since: since.map(str::to_string),
        until: until.map(str::to_string),
        rows: rows.to_vec(),
    };

    let html = TEMPLATE
        .replace("__TITLE__", &escape_html(title))
        .replace("__DATA__", &serde_json::to_string(&output)?);

    std::fs::write(path, html)?;
    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<style>
  html, body { margin: 0; height: 100%; font-family: sans-serif; }
  #chart { width: 100%; height: 100%; }
  h1 { position: absolute; top: 4px; left: 60px; font-size: 16px; font-weight: 600; }
  .tooltip {
    position: absolute; display: none; pointer-events: none;
    background: #fff; border: 1px solid #aaa; border-radius: 3px;
    padding: 6px 8px; font-size: 12px; white-space: pre; box-shadow: 1px 1px 4px rgba(0,0,0,.25);
  }
  .legend { position: absolute; bottom: 6px; left: 60px; font-size: 12px; }
  .legend span { margin-right: 18px; }
  .swatch { display: inline-block; width: 10px; height: 10px; margin-right: 4px; }
</style>
</head>
<body>
<h1>__TITLE__</h1>
<svg id="chart"></svg>
<div class="tooltip" id="tooltip"></div>
<div class="legend" id="legend"></div>
<script>
const OUTPUT = __DATA__;
const ROWS = OUTPUT.rows.map(r => Object.assign({}, r, { t: Date.parse(r.date) }));

const COLORS = {
  age: "#1f77b4",
  commits: "#ff7f0e",
  newcomers: "#2ca02c",
  active: "#9467bd",
};

const svg = document.getElementById("chart");
const tooltip = document.getElementById("tooltip");
const NS = "http://www.w3.org/2000/svg";
const margin = { top: 34, right: 55, bottom: 50, left: 60 };

function el(name, attrs) {
  const node = document.createElementNS(NS, name);
  for (const key in attrs) node.setAttribute(key, attrs[key]);
  return node;
}

function isoWeekLabel(t) {
  const d = new Date(t);
  const day = new Date(Date.UTC(d.getUTCFullYear(), d.getUTCMonth(), d.getUTCDate()));
  const dow = day.getUTCDay() || 7;
  day.setUTCDate(day.getUTCDate() + 4 - dow);
  const yearStart = Date.UTC(day.getUTCFullYear(), 0, 1);
  const week = Math.ceil(((day - yearStart) / 86400000 + 1) / 7);
  return day.getUTCFullYear() + "-W" + String(week).padStart(2, "0");
}

function draw() {
  svg.innerHTML = "";
  if (ROWS.length === 0) return;

  const width = svg.clientWidth, height = svg.clientHeight;
  const w = width - margin.left - margin.right;
  const h = height - margin.top - margin.bottom;

  const t0 = ROWS[0].t, t1 = ROWS[ROWS.length - 1].t;
  const span = Math.max(t1 - t0, 1);
  const maxAge = Math.max(...ROWS.map(r => r.commit_author_age), 0.1);
  const maxCount = Math.max(...ROWS.map(r =>
    Math.max(r.commit_count, r.newcomers_count, r.active_count)), 1);

  const x = t => margin.left + (t - t0) / span * w;
  const yAge = v => margin.top + h - v / maxAge * h;
  const yCount = v => margin.top + h - v / maxCount * h;

  // axes
  svg.appendChild(el("line", { x1: margin.left, y1: margin.top + h,
    x2: margin.left + w, y2: margin.top + h, stroke: "#333" }));
  svg.appendChild(el("line", { x1: margin.left, y1: margin.top,
    x2: margin.left, y2: margin.top + h, stroke: "#333" }));
  svg.appendChild(el("line", { x1: margin.left + w, y1: margin.top,
    x2: margin.left + w, y2: margin.top + h, stroke: "#333" }));

  for (let i = 0; i <= 5; i++) {
    const fAge = (maxAge * i / 5).toFixed(1);
    const fCount = Math.round(maxCount * i / 5);
    const y = margin.top + h - h * i / 5;
    const left = el("text", { x: margin.left - 8, y: y + 4,
      "text-anchor": "end", "font-size": 11, fill: "#333" });
    left.textContent = fAge;
    svg.appendChild(left);
    const right = el("text", { x: margin.left + w + 8, y: y + 4,
      "text-anchor": "start", "font-size": 11, fill: "#333" });
    right.textContent = fCount;
    svg.appendChild(right);
    svg.appendChild(el("line", { x1: margin.left, y1: y, x2: margin.left + w,
      y2: y, stroke: "#eee" }));
  }

  const ticks = Math.min(ROWS.length, 8);
  for (let i = 0; i < ticks; i++) {
    const t = t0 + span * i / Math.max(ticks - 1, 1);
    const label = el("text", { x: x(t), y: margin.top + h + 18,
      "text-anchor": "middle", "font-size": 11, fill: "#333" });
    label.textContent = new Date(t).toISOString().slice(0, 10);
    svg.appendChild(label);
  }

  const axisLeft = el("text", { x: 14, y: margin.top - 12, "font-size": 11, fill: "#333" });
  axisLeft.textContent = "Commit author age (years)";
  svg.appendChild(axisLeft);
  const axisRight = el("text", { x: margin.left + w - 30, y: margin.top - 12,
    "font-size": 11, fill: "#333" });
  axisRight.textContent = "Counts";
  svg.appendChild(axisRight);

  // newcomer bars
  const barWidth = Math.max(w / Math.max(span / 604800000, 1) * 0.7, 1);
  for (const r of ROWS) {
    if (r.newcomers_count === 0) continue;
    svg.appendChild(el("rect", {
      x: x(r.t) - barWidth / 2, y: yCount(r.newcomers_count),
      width: barWidth, height: margin.top + h - yCount(r.newcomers_count),
      fill: COLORS.newcomers, "fill-opacity": 0.6 }));
  }

  // raw age scatter
  for (const r of ROWS) {
    svg.appendChild(el("circle", { cx: x(r.t), cy: yAge(r.commit_author_age),
      r: 2, fill: COLORS.age, "fill-opacity": 0.15 }));
  }

  const polyline = (points, color) => {
    if (points.length < 2) return;
    svg.appendChild(el("polyline", { points: points.join(" "), fill: "none",
      stroke: color, "stroke-width": 2 }));
  };

  polyline(ROWS.filter(r => r.commit_author_age_smooth != null)
    .map(r => x(r.t) + "," + yAge(r.commit_author_age_smooth)), COLORS.age);
  polyline(ROWS.filter(r => r.commit_count_smooth != null)
    .map(r => x(r.t) + "," + yCount(r.commit_count_smooth)), COLORS.commits);
  polyline(ROWS.map(r => x(r.t) + "," + yCount(r.active_count)), COLORS.active);

  // hover crosshair + tooltip snapping to the nearest week
  const cursor = el("line", { y1: margin.top, y2: margin.top + h,
    stroke: "#999", "stroke-dasharray": "3,3", visibility: "hidden" });
  svg.appendChild(cursor);

  svg.onmousemove = event => {
    const rect = svg.getBoundingClientRect();
    const mx = event.clientX - rect.left;
    if (mx < margin.left || mx > margin.left + w) { svg.onmouseleave(); return; }
    const t = t0 + (mx - margin.left) / w * span;
    let nearest = ROWS[0];
    for (const r of ROWS) {
      if (Math.abs(r.t - t) < Math.abs(nearest.t - t)) nearest = r;
    }
    cursor.setAttribute("x1", x(nearest.t));
    cursor.setAttribute("x2", x(nearest.t));
    cursor.setAttribute("visibility", "visible");
    tooltip.style.display = "block";
    tooltip.style.left = Math.min(event.clientX + 12, rect.width - 190) + "px";
    tooltip.style.top = (event.clientY + 12) + "px";
    tooltip.textContent =
      "Date: " + isoWeekLabel(nearest.t) +
      "\nCommit author age: " + nearest.commit_author_age.toFixed(2) +
      "\nNumber of commits: " + nearest.commit_count +
      "\nNewcomers: " + nearest.newcomers_count +
      "\nActive contributors: " + nearest.active_count;
  };
  svg.onmouseleave = () => {
    cursor.setAttribute("visibility", "hidden");
    tooltip.style.display = "none";
  };
}

const legend = document.getElementById("legend");
legend.innerHTML = [
  ["Commit author average age (years)", COLORS.age],
  ["Number of commits (smoothed)", COLORS.commits],
  ["Number of newcomers", COLORS.newcomers],
  ["Active contributors", COLORS.active],
].map(([label, color]) =>
  '<span><span class="swatch" style="background:' + color + '"></span>' + label + "</span>"
).join("");

window.onresize = draw;
draw();
</script>
</body>
</html>
"##;
