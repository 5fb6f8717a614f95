use super::{fill, js_string};
use crate::dashboard::{SortOrder, StatusFilter};
use crate::models::{Entry, Status};
use maud::{html, Markup};

pub const EMPTY_TABLE_MESSAGE: &str = "No entries found.";
pub const LOAD_FAILED_MESSAGE: &str = "Error loading entries. Please try again later.";

const SORT_OPTIONS: [(&str, &str); 2] = [("desc", "Newest First"), ("asc", "Oldest First")];
const FILTER_OPTIONS: [(&str, &str); 3] = [
    ("all", "All"),
    ("Authorized", "Authorized"),
    ("Unauthorized", "Unauthorized"),
];

/// Renders the page with `rows` as the first paint of the table.
pub fn render(api_base_url: &str, order: SortOrder, filter: &StatusFilter, rows: &[Entry]) -> String {
    // Rows carry stored text, so they go in last.
    fill(DASHBOARD_HTML, "ParkSense Dashboard")
        .replace("{{API_BASE}}", &js_string(api_base_url))
        .replace("{{EMPTY_MESSAGE}}", &js_string(EMPTY_TABLE_MESSAGE))
        .replace("{{LOAD_FAILED}}", &js_string(LOAD_FAILED_MESSAGE))
        .replace("{{SORT_OPTIONS}}", &render_options(&SORT_OPTIONS, order.as_str()).into_string())
        .replace("{{FILTER_OPTIONS}}", &render_options(&FILTER_OPTIONS, filter.as_str()).into_string())
        .replace("{{ROWS}}", &render_rows(rows).into_string())
}

fn render_options(options: &[(&str, &str)], selected: &str) -> Markup {
    html! {
        @for (value, label) in options {
            option value=(value) selected[*value == selected] { (label) }
        }
    }
}

/// Table body markup. An empty list yields exactly one placeholder row.
pub fn render_rows(rows: &[Entry]) -> Markup {
    html! {
        @if rows.is_empty() {
            tr.placeholder { td colspan="4" { (EMPTY_TABLE_MESSAGE) } }
        }
        @for entry in rows {
            tr data-id=(entry.id) {
                td {
                    @if let Some(image) = entry.image.as_deref().filter(|image| !image.is_empty()) {
                        img src={ "data:image/jpeg;base64," (image) } alt="Car Image";
                    } @else {
                        span.no-image { "No image" }
                    }
                }
                td { (entry.plate_number) }
                td class=(Status::css_class(&entry.status)) { (entry.status) }
                td { (entry.timestamp) }
            }
        }
    }
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>{{STYLE}}
    .controls {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      gap: 12px;
    }

    select {
      border-radius: 999px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 8px 14px;
      font: inherit;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      background: white;
      border-radius: 20px;
      overflow: hidden;
    }

    th,
    td {
      padding: 12px;
      text-align: left;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    td img {
      width: 120px;
      border-radius: 10px;
    }

    td.authorized {
      color: var(--ok);
      font-weight: 600;
    }

    td.unauthorized {
      color: var(--bad);
      font-weight: 600;
    }

    .no-image {
      color: #8b857d;
    }
  </style>
</head>
<body>
  <main class="app dashboard">
    <header>
      <h1>ParkSense Dashboard</h1>
    </header>

    <form class="controls" method="get" action="/dashboard">
      <label for="sort">Sort by:</label>
      <select id="sort" name="sort" aria-label="Sort table by timestamp">{{SORT_OPTIONS}}</select>
      <label for="filter">Filter by:</label>
      <select id="filter" name="status" aria-label="Filter table by status">{{FILTER_OPTIONS}}</select>
      <noscript><button type="submit">Apply</button></noscript>
    </form>

    <div id="error" class="error-message" role="alert"></div>

    <table aria-label="Car entry log">
      <thead>
        <tr>
          <th>Car Image</th>
          <th>Detected Plate</th>
          <th>Status</th>
          <th>Time</th>
        </tr>
      </thead>
      <tbody id="rows">
{{ROWS}}
      </tbody>
    </table>
    <a href="/" class="back-link">&larr; Back to Home</a>
  </main>

  <script>
    const API_BASE = {{API_BASE}};
    const EMPTY_MESSAGE = {{EMPTY_MESSAGE}};
    const LOAD_FAILED = {{LOAD_FAILED}};

    const sortEl = document.getElementById('sort');
    const filterEl = document.getElementById('filter');
    const rowsEl = document.getElementById('rows');
    const errorEl = document.getElementById('error');

    let entries = null;

    const escapeHtml = (value) =>
      String(value ?? '')
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;')
        .replace(/'/g, '&#39;');

    const sortEntries = (list, order) => {
      const keyed = list.map((entry, index) => ({ entry, index, time: Date.parse(entry.timestamp) }));
      keyed.sort((a, b) => {
        const ta = Number.isNaN(a.time) ? -Infinity : a.time;
        const tb = Number.isNaN(b.time) ? -Infinity : b.time;
        const diff = order === 'asc' ? ta - tb : tb - ta;
        return diff === 0 || Number.isNaN(diff) ? a.index - b.index : diff;
      });
      return keyed.map((item) => item.entry);
    };

    const filterEntries = (list, status) =>
      status === 'all' ? list : list.filter((entry) => entry.status === status);

    const rowHtml = (entry) => {
      const image = entry.image
        ? `<img src="data:image/jpeg;base64,${escapeHtml(entry.image)}" alt="Car Image" />`
        : '<span class="no-image">No image</span>';
      const statusClass = entry.status === 'Authorized' ? 'authorized' : 'unauthorized';
      return `<tr data-id="${escapeHtml(entry._id)}"><td>${image}</td><td>${escapeHtml(entry.plate_number)}</td>` +
        `<td class="${statusClass}">${escapeHtml(entry.status)}</td><td>${escapeHtml(entry.timestamp)}</td></tr>`;
    };

    const render = () => {
      if (entries === null) {
        return;
      }
      const visible = filterEntries(sortEntries(entries, sortEl.value), filterEl.value);
      rowsEl.innerHTML = visible.length === 0
        ? `<tr class="placeholder"><td colspan="4">${EMPTY_MESSAGE}</td></tr>`
        : visible.map(rowHtml).join('\n');
    };

    sortEl.addEventListener('change', render);
    filterEl.addEventListener('change', render);

    fetch(`${API_BASE}/api/entries`)
      .then((res) => {
        if (!res.ok) {
          throw new Error(`status ${res.status}`);
        }
        return res.json();
      })
      .then((data) => {
        entries = Array.isArray(data) ? data : [];
        errorEl.textContent = '';
        render();
      })
      .catch(() => {
        errorEl.textContent = LOAD_FAILED;
        entries = [];
        render();
      });
  </script>
</body>
</html>
"#;
