//! Server-rendered pages. Each page is a template with `{{NAME}}`
//! placeholders plus an inline script that talks to the API listener.

pub mod dashboard;
pub mod home;
pub mod upload;

/// A JavaScript string literal safe to embed in an inline `<script>`.
/// Markup built from stored data goes through `maud` instead.
pub fn js_string(raw: &str) -> String {
    serde_json::Value::String(raw.to_string())
        .to_string()
        .replace("</", "<\\/")
}

fn fill(template: &str, title: &str) -> String {
    template
        .replace("{{STYLE}}", STYLE)
        .replace("{{TITLE}}", title)
}

const STYLE: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f6;
      --bg-2: #b9d3e0;
      --ink: #1f2a30;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --ok: #2d7a4b;
      --bad: #c63b2b;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3edf2 60%, #f4f7f9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
      animation: rise 600ms ease;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f5c57;
    }

    .btn,
    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
      box-shadow: 0 10px 24px rgba(47, 72, 88, 0.3);
      transition: transform 150ms ease, box-shadow 150ms ease;
      text-decoration: none;
      display: inline-flex;
      align-items: center;
      justify-content: center;
    }

    .btn.primary,
    button.primary {
      background: var(--accent);
      box-shadow: 0 10px 24px rgba(255, 107, 74, 0.3);
    }

    .btn.clicked,
    button:active {
      transform: scale(0.96);
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 20px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 14px;
    }

    .error-message {
      color: var(--bad);
      min-height: 1.2em;
    }

    .result {
      color: var(--ok);
      font-weight: 600;
      min-height: 1.2em;
    }

    .back-link {
      color: var(--accent-2);
      font-weight: 600;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 28px 22px;
      }
      button,
      .btn {
        width: 100%;
      }
    }
"#;
