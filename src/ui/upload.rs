use super::{fill, js_string};

pub const MISSING_CAPTURE_MESSAGE: &str = "Please capture an image.";
pub const BLANK_TEXT_MESSAGE: &str = "Please enter some text.";
pub const UPLOAD_FAILED_MESSAGE: &str = "Error uploading image.";
pub const TEXT_FAILED_MESSAGE: &str = "Error submitting text.";

pub fn render(api_base_url: &str) -> String {
    fill(UPLOAD_HTML, "Capture Car Image or Details")
        .replace("{{API_BASE}}", &js_string(api_base_url))
        .replace("{{MISSING_CAPTURE}}", &js_string(MISSING_CAPTURE_MESSAGE))
        .replace("{{BLANK_TEXT}}", &js_string(BLANK_TEXT_MESSAGE))
        .replace("{{UPLOAD_FAILED}}", &js_string(UPLOAD_FAILED_MESSAGE))
        .replace("{{TEXT_FAILED}}", &js_string(TEXT_FAILED_MESSAGE))
}

// Each submission path reports errors in its own area.
const UPLOAD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>{{STYLE}}
    video,
    #preview {
      width: 100%;
      max-width: 500px;
      border-radius: 16px;
      background: #10181c;
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
    }

    textarea {
      width: 100%;
      border-radius: 14px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 12px;
      font: inherit;
    }
  </style>
</head>
<body>
  <main class="app upload">
    <header>
      <h1>Capture Car Image or Details</h1>
    </header>

    <section class="card">
      <form id="image-form">
        <video id="camera" autoplay playsinline muted></video>
        <canvas id="frame" hidden></canvas>
        <div class="row">
          <button type="button" id="capture-btn">Capture Image</button>
          <button type="submit" class="primary">Upload Image</button>
        </div>
      </form>
      <img id="preview" alt="Captured Preview" hidden />
      <div id="camera-error" class="error-message" role="alert"></div>
      <div id="image-error" class="error-message" role="alert"></div>
    </section>

    <section class="card">
      <form id="text-form">
        <textarea
          id="text"
          rows="4"
          placeholder="Describe the car or parking details"
          aria-label="Enter car or parking details"
        ></textarea>
        <div class="row">
          <button type="submit" class="primary">Submit Text</button>
        </div>
      </form>
      <div id="text-error" class="error-message" role="alert"></div>
    </section>

    <div id="result" class="result" aria-live="polite"></div>
    <a href="/" class="back-link">&larr; Back to Home</a>
  </main>

  <script>
    const API_BASE = {{API_BASE}};
    const MESSAGES = {
      missingCapture: {{MISSING_CAPTURE}},
      blankText: {{BLANK_TEXT}},
      uploadFailed: {{UPLOAD_FAILED}},
      textFailed: {{TEXT_FAILED}}
    };

    const video = document.getElementById('camera');
    const canvas = document.getElementById('frame');
    const preview = document.getElementById('preview');
    const cameraErrorEl = document.getElementById('camera-error');
    const imageErrorEl = document.getElementById('image-error');
    const textErrorEl = document.getElementById('text-error');
    const resultEl = document.getElementById('result');
    const textEl = document.getElementById('text');

    let stream = null;
    let pendingCapture = null;
    let previewUrl = null;
    let captureSeq = 0;

    const serverError = async (res) => {
      try {
        const body = await res.json();
        return typeof body.error === 'string' && body.error ? body.error : null;
      } catch (_) {
        return null;
      }
    };

    const stopCamera = () => {
      if (stream) {
        stream.getTracks().forEach((track) => track.stop());
        stream = null;
      }
    };

    const startCamera = async () => {
      try {
        if (!navigator.mediaDevices || !navigator.mediaDevices.getUserMedia) {
          throw new Error('camera API unavailable');
        }
        stream = await navigator.mediaDevices.getUserMedia({
          video: { facingMode: 'environment' }
        });
        video.srcObject = stream;
      } catch (err) {
        cameraErrorEl.textContent = 'Error accessing camera: ' + err.message;
      }
    };

    const clearCapture = () => {
      pendingCapture = null;
      if (previewUrl) {
        URL.revokeObjectURL(previewUrl);
        previewUrl = null;
      }
      preview.removeAttribute('src');
      preview.hidden = true;
    };

    // The preview only ever shows the blob that Upload would send.
    document.getElementById('capture-btn').addEventListener('click', () => {
      if (!stream || !video.videoWidth) {
        return;
      }
      clearCapture();
      const seq = ++captureSeq;
      canvas.width = video.videoWidth;
      canvas.height = video.videoHeight;
      canvas.getContext('2d').drawImage(video, 0, 0);

      canvas.toBlob((blob) => {
        if (seq !== captureSeq || !blob) {
          return;
        }
        previewUrl = URL.createObjectURL(blob);
        pendingCapture = blob;
        preview.src = previewUrl;
        preview.hidden = false;
      }, 'image/jpeg');
    });

    document.getElementById('image-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      if (!pendingCapture) {
        imageErrorEl.textContent = MESSAGES.missingCapture;
        return;
      }

      const form = new FormData();
      form.append('file', pendingCapture, 'captured-image.jpg');

      try {
        const res = await fetch(`${API_BASE}/upload`, { method: 'POST', body: form });
        if (!res.ok) {
          imageErrorEl.textContent = (await serverError(res)) || MESSAGES.uploadFailed;
          return;
        }
        const data = await res.json();
        resultEl.textContent = `Plate: ${data.plate_number} | Status: ${data.status} | Time: ${data.timestamp}`;
        clearCapture();
        imageErrorEl.textContent = '';
      } catch (_) {
        imageErrorEl.textContent = MESSAGES.uploadFailed;
      }
    });

    document.getElementById('text-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const text = textEl.value;
      if (!text.trim()) {
        textErrorEl.textContent = MESSAGES.blankText;
        return;
      }

      try {
        const res = await fetch(`${API_BASE}/text`, {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ text })
        });
        if (!res.ok) {
          textErrorEl.textContent = (await serverError(res)) || MESSAGES.textFailed;
          return;
        }
        const data = await res.json();
        resultEl.textContent = `Response: ${data.message} | Time: ${data.timestamp}`;
        textEl.value = '';
        textErrorEl.textContent = '';
      } catch (_) {
        textErrorEl.textContent = MESSAGES.textFailed;
      }
    });

    window.addEventListener('pagehide', stopCamera);
    startCamera();
  </script>
</body>
</html>
"#;
