//! Embedded HTML/CSS/JS frontend for the binwatch dashboard.
//!
//! The page is compiled into the binary as a string constant. No external
//! assets, no build tools, no CDN dependencies.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>binwatch — Bin Status</title>
<style>
:root {
  --primary: #003366;
  --secondary: #007C89;
  --grey: #5F666D;
  --light-grey: #E5E5E5;
  --success: #4CAF50;
  --warning: #FFC107;
  --danger: #F44336;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: #f4f6f8; color: #1b1f23; font-family: var(--font); font-size: 14px; }

header {
  background: var(--primary);
  color: #fff;
  padding: 20px 24px;
  display: flex;
  justify-content: space-between;
  align-items: center;
}
header h1 { font-size: 22px; font-weight: 600; }
header p { opacity: 0.8; font-size: 13px; }
header button {
  background: var(--secondary);
  color: #fff;
  border: none;
  border-radius: var(--radius);
  padding: 8px 14px;
  cursor: pointer;
}

main { max-width: 960px; margin: 0 auto; padding: 24px; }

.summary { display: flex; gap: 12px; margin-bottom: 20px; }
.summary div {
  flex: 1;
  background: #fff;
  border-radius: var(--radius);
  padding: 12px 16px;
  border-top: 4px solid var(--light-grey);
}
.summary .low { border-color: var(--success); }
.summary .medium { border-color: var(--warning); }
.summary .high { border-color: var(--danger); }
.summary strong { font-size: 22px; display: block; }

.bins { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 16px; }
.bin { background: #fff; border-radius: var(--radius); padding: 16px; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
.bin h2 { font-size: 16px; display: flex; justify-content: space-between; align-items: center; }
.bin .dot { width: 12px; height: 12px; border-radius: 50%; }
.bin .id { color: var(--grey); font-size: 12px; margin: 4px 0 12px; }
.bar { height: 10px; background: var(--light-grey); border-radius: 5px; overflow: hidden; }
.bar span { display: block; height: 100%; }
.pct { font-weight: 600; margin-top: 6px; }
.usage { color: var(--grey); font-size: 12px; }

.message { background: #fff; border-radius: var(--radius); padding: 24px; text-align: center; color: var(--grey); }
.message.error { color: var(--danger); }

nav { margin-top: 32px; }
nav h3 { font-size: 14px; color: var(--grey); margin-bottom: 8px; }
nav ul { list-style: none; display: flex; flex-wrap: wrap; gap: 8px; }
nav li { background: #fff; border-radius: var(--radius); padding: 6px 10px; }
nav li.placeholder { opacity: 0.5; }
</style>
</head>
<body>
<header>
  <div>
    <h1>🗑️ Bin Status</h1>
    <p>Monitor fill levels of waste bins in real-time</p>
  </div>
  <button id="refresh">🔄 Refresh</button>
</header>
<main>
  <section class="summary">
    <div class="low"><strong id="count-low">–</strong>Low</div>
    <div class="medium"><strong id="count-medium">–</strong>Medium</div>
    <div class="high"><strong id="count-high">–</strong>High</div>
  </section>
  <section id="bins" class="bins"></section>
  <nav>
    <h3>Pages</h3>
    <ul id="pages"></ul>
  </nav>
</main>
<script>
function escapeHtml(s) {
  return String(s).replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
}

function showMessage(text, isError) {
  const el = document.getElementById('bins');
  el.innerHTML = '<div class="message' + (isError ? ' error' : '') + '">' + escapeHtml(text) + '</div>';
}

async function loadBins() {
  showMessage('Loading…', false);
  try {
    const resp = await fetch('/api/bins');
    const data = await resp.json();
    if (!resp.ok) {
      showMessage(data.error || 'Failed to load bin status. Please try again.', true);
      return;
    }
    document.getElementById('count-low').textContent = data.counts.low;
    document.getElementById('count-medium').textContent = data.counts.medium;
    document.getElementById('count-high').textContent = data.counts.high;
    if (data.bins.length === 0) {
      showMessage('No bins reported.', false);
      return;
    }
    document.getElementById('bins').innerHTML = data.bins.map(bin => `
      <article class="bin">
        <h2>${escapeHtml(bin.name)}<span class="dot" style="background:${bin.color}"></span></h2>
        <div class="id">📍 ID: ${escapeHtml(bin.id)}</div>
        <div class="bar"><span style="width:${bin.percentage}%;background:${bin.color}"></span></div>
        <div class="pct" style="color:${bin.color}">${bin.percentage.toFixed(1)}%</div>
        <div class="usage">Usage Count: ${bin.usage_count.toFixed(1)}</div>
      </article>`).join('');
  } catch (e) {
    showMessage('Failed to load bin status. Please try again.', true);
  }
}

async function loadPages() {
  const resp = await fetch('/api/pages');
  const pages = await resp.json();
  document.getElementById('pages').innerHTML = pages.map(p =>
    `<li class="${p.placeholder ? 'placeholder' : ''}">${p.icon} ${escapeHtml(p.title)}</li>`).join('');
}

document.getElementById('refresh').addEventListener('click', loadBins);
loadBins();
loadPages();
</script>
</body>
</html>
"##;
