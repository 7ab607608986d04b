use crate::render::ReportData;

/// Render a self-contained HTML report (data embedded as JSON).
///
/// The template is filled with `replace` rather than `format!()`: the page is
/// full of `{}` from CSS and JS template literals.
pub fn render_html_report(data: &ReportData) -> anyhow::Result<String> {
    // "</" inside a string would end the script element early.
    let json = serde_json::to_string(data)?.replace("</", "<\\/");
    let title = escape_html(&data.title);

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  .container { display: flex; height: calc(100vh - 58px); }
  .main { flex: 1; overflow: auto; }
  .sidebar { width: 380px; border-left: 1px solid #ddd; padding: 12px; overflow: auto; }

  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .pill.bad { border-color: #e5a0a0; background: #fff1f1; }
  .muted { color: #777; font-size: 12px; }

  svg { display: block; margin: 0 auto; }
  .edge { stroke: #9aa4b2; stroke-width: 1.5; cursor: pointer; }
  .edge:hover, .edge.selected { stroke: #1f6feb; stroke-width: 3; }
  .node circle { stroke: #fff; stroke-width: 2; cursor: pointer; }
  .node.selected circle { stroke: #1f6feb; stroke-width: 4; }
  .node text { font-size: 12px; fill: #222; pointer-events: none; }
  .t-Person { fill: #4c8bf5; }
  .t-Place { fill: #2ea043; }
  .t-Institution { fill: #d29922; }
  .t-Group { fill: #a371f7; }
  .t-other { fill: #8b949e; }

  table { border-collapse: collapse; width: 100%; margin-top: 8px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; vertical-align: top; }
  th { width: 35%; color: #555; font-weight: 600; }
  td { word-break: break-word; }
  ul.issues { padding-left: 18px; font-size: 13px; color: #a40e26; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>

<div class="container">
  <div class="main">
    <svg id="graph" xmlns="http://www.w3.org/2000/svg"></svg>
  </div>

  <div class="sidebar">
    <h2 id="title">Select a node or edge</h2>
    <div id="meta" class="muted"></div>
    <table id="inspector" style="display:none;"><tbody id="inspectorBody"></tbody></table>
    <ul class="issues" id="issues"></ul>
  </div>
</div>

<script>
// Embedded report data (JSON object literal)
const DATA = __DATA__;
const SVG_NS = "http://www.w3.org/2000/svg";

const state = { selected: null };

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function renderSummary() {
  const t = DATA.totals;
  const f = DATA.filters;
  const el = document.getElementById("summary");
  el.innerHTML = `
    <span class="pill">nodes: <b>${t.shown_nodes}</b> / ${t.nodes}</span>
    <span class="pill">edges: <b>${t.shown_edges}</b> / ${t.edges}</span>
    <span class="pill">type: <b>${escapeHtml(f.node_type)}</b></span>
    <span class="pill">relationship: <b>${escapeHtml(f.relationship)}</b></span>
    <span class="pill">search: <b>${escapeHtml(f.search || "-")}</b></span>
    <span class="pill ${DATA.issues.length ? "bad" : ""}">issues: <b>${DATA.issues.length}</b></span>
  `;

  const list = document.getElementById("issues");
  for (const issue of DATA.issues) {
    const li = document.createElement("li");
    li.textContent = `[${issue.location}] ${issue.message}`;
    list.appendChild(li);
  }
}

function typeClass(t) {
  return ["Person", "Place", "Institution", "Group"].includes(t) ? "t-" + t : "t-other";
}

function renderGraph() {
  const svg = document.getElementById("graph");
  svg.innerHTML = "";
  svg.setAttribute("width", DATA.canvas);
  svg.setAttribute("height", DATA.canvas);
  svg.setAttribute("viewBox", `0 0 ${DATA.canvas} ${DATA.canvas}`);

  const pos = new Map();
  for (const el of DATA.elements) {
    if (el.group === "nodes") pos.set(String(el.data.id), el.position);
  }

  // Parallel edges between the same pair fan out as arcs.
  const seen = new Map();
  for (const el of DATA.elements) {
    if (el.group !== "edges") continue;
    const a = pos.get(String(el.data.source));
    const b = pos.get(String(el.data.target));
    if (!a || !b) continue;

    const key = [String(el.data.source), String(el.data.target)].sort().join("\u0000");
    const k = seen.get(key) || 0;
    seen.set(key, k + 1);

    const mx = (a.x + b.x) / 2, my = (a.y + b.y) / 2;
    const dx = b.x - a.x, dy = b.y - a.y;
    const len = Math.hypot(dx, dy) || 1;
    const bend = k === 0 ? 0 : Math.ceil(k / 2) * 24 * (k % 2 ? 1 : -1);
    const cx = mx - (dy / len) * bend, cy = my + (dx / len) * bend;

    const path = document.createElementNS(SVG_NS, "path");
    path.setAttribute("d", `M ${a.x} ${a.y} Q ${cx} ${cy} ${b.x} ${b.y}`);
    path.setAttribute("fill", "none");
    path.setAttribute("class", "edge" + (state.selected === el.data.id ? " selected" : ""));
    const tip = document.createElementNS(SVG_NS, "title");
    tip.textContent = String(el.data.relationship_type);
    path.appendChild(tip);
    path.onclick = () => select(el);
    svg.appendChild(path);
  }

  for (const el of DATA.elements) {
    if (el.group !== "nodes" || !el.position) continue;
    const g = document.createElementNS(SVG_NS, "g");
    g.setAttribute("class", "node" + (state.selected === el.data.id ? " selected" : ""));
    g.onclick = () => select(el);

    const c = document.createElementNS(SVG_NS, "circle");
    c.setAttribute("cx", el.position.x);
    c.setAttribute("cy", el.position.y);
    c.setAttribute("r", 14);
    c.setAttribute("class", typeClass(el.data.type));
    g.appendChild(c);

    const label = document.createElementNS(SVG_NS, "text");
    label.setAttribute("x", el.position.x + 18);
    label.setAttribute("y", el.position.y + 4);
    label.textContent = String(el.data.label);
    g.appendChild(label);

    svg.appendChild(g);
  }
}

function select(el) {
  state.selected = el.data.id;
  const isNode = el.group === "nodes";
  document.getElementById("title").textContent = isNode
    ? String(el.data.label)
    : `${el.data.source} → ${el.data.target}`;
  document.getElementById("meta").textContent = isNode ? "node" : "edge";

  const tbl = document.getElementById("inspector");
  const body = document.getElementById("inspectorBody");
  body.innerHTML = "";
  tbl.style.display = "table";
  for (const [key, value] of el.inspector) {
    const tr = document.createElement("tr");
    tr.innerHTML = `<th>${escapeHtml(key)}</th><td>${escapeHtml(value)}</td>`;
    body.appendChild(tr);
  }

  renderGraph();
}

renderSummary();
renderGraph();
</script>
</body>
</html>
"#;

    Ok(TEMPLATE.replace("__TITLE__", &title).replace("__DATA__", &json))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
