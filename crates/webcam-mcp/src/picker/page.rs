//! The picker's single HTML page.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Camera Selection</title>
  <style>
    body { font-family: system-ui, sans-serif; background: #f4f5f7; margin: 0; padding: 24px; }
    h1 { margin-top: 0; }
    .status { margin-bottom: 16px; color: #444; }
    .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 16px; }
    .card { background: #fff; border-radius: 8px; padding: 12px; border: 2px solid transparent; }
    .card.selected { border-color: #2e7d32; }
    .card img { width: 100%; aspect-ratio: 4 / 3; object-fit: cover; background: #222; border-radius: 4px; }
    .name { font-weight: 600; margin-top: 8px; }
    .id { font-size: 12px; color: #777; word-break: break-all; }
    button { margin-top: 8px; width: 100%; padding: 8px; border: 0; border-radius: 4px; background: #1565c0; color: #fff; cursor: pointer; }
    button:disabled { background: #9e9e9e; cursor: default; }
  </style>
</head>
<body>
  <h1>Select Camera</h1>
  <div id="status" class="status">Loading cameras...</div>
  <div id="grid" class="grid"></div>
  <script>
    let selected = null;

    async function load() {
      const status = document.getElementById('status');
      try {
        const res = await fetch('/api/cameras');
        const data = await res.json();
        selected = data.selectedCamera;
        render(data.cameras);
        status.textContent = data.cameras.length
          ? 'Click a camera to use it for captures and recordings.'
          : 'No cameras found. Please check your camera connections.';
      } catch (err) {
        status.textContent = 'Failed to load cameras: ' + err;
      }
    }

    function render(cameras) {
      const grid = document.getElementById('grid');
      grid.innerHTML = '';
      cameras.forEach((camera) => {
        const card = document.createElement('div');
        card.className = 'card' + (camera.id === selected ? ' selected' : '');

        const img = document.createElement('img');
        img.alt = camera.name;
        const refresh = () => {
          img.src = '/api/camera/preview/' + encodeURIComponent(camera.id) + '?t=' + Date.now();
        };
        refresh();
        setInterval(refresh, 2000);

        const name = document.createElement('div');
        name.className = 'name';
        name.textContent = camera.name;

        const id = document.createElement('div');
        id.className = 'id';
        id.textContent = camera.id;

        const button = document.createElement('button');
        button.textContent = camera.id === selected ? 'Selected' : 'Select';
        button.disabled = camera.id === selected;
        button.onclick = () => choose(camera.id);

        card.append(img, name, id, button);
        grid.appendChild(card);
      });
    }

    async function choose(cameraId) {
      const res = await fetch('/api/camera/select', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ cameraId }),
      });
      if (res.ok) {
        document.getElementById('status').textContent = 'Selected ' + cameraId + '. You can close this window.';
        await load();
      } else {
        const data = await res.json().catch(() => ({}));
        document.getElementById('status').textContent = 'Selection failed: ' + (data.error || res.status);
      }
    }

    load();
  </script>
</body>
</html>
"#;
