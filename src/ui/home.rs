use super::{fill, js_string};

pub fn render(api_base_url: &str) -> String {
    fill(HOME_HTML, "ParkSense Home").replace("{{API_BASE}}", &js_string(api_base_url))
}

const HOME_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>{{STYLE}}
    .btn-container {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }
  </style>
</head>
<body>
  <main class="app home">
    <header>
      <h1>ParkSense Home</h1>
      <p class="subtitle">Log cars at the gate and review who came in.</p>
    </header>
    <div class="btn-container">
      <a class="btn primary" href="/upload" aria-label="Go to upload page">Upload Car Image</a>
      <a class="btn" href="/dashboard" aria-label="Go to dashboard page">View Dashboard</a>
    </div>
  </main>

  <script>
    const API_BASE = {{API_BASE}};

    console.log('[ParkSense] Home Page Loaded:', { timestamp: new Date().toISOString() });

    fetch(`${API_BASE}/`)
      .then((res) => {
        if (!res.ok) {
          throw new Error(`status ${res.status}`);
        }
        return res.json();
      })
      .then((data) => console.log('[ParkSense] Home Data:', data))
      .catch((err) => console.error('[ParkSense] Home Fetch Error:', err));

    document.querySelectorAll('.btn').forEach((button) => {
      button.addEventListener('click', (event) => {
        event.currentTarget.classList.add('clicked');
        const target = event.currentTarget;
        setTimeout(() => target.classList.remove('clicked'), 200);
      });
    });
  </script>
</body>
</html>
"#;
