pub fn render_index(theme: &str, month_key: &str) -> String {
    INDEX_HTML
        .replace("{{THEME}}", theme)
        .replace("{{MONTH}}", month_key)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" data-theme="{{THEME}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Running Crew</title>
  <script src="https://cdn.jsdelivr.net/npm/canvas-confetti@1.9.3/dist/confetti.browser.min.js"></script>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --muted: #8b857d;
    }

    [data-theme="dark"] {
      --bg: #15171c;
      --ink: #f1ede6;
      --accent-2: #9ec5dd;
      --card: rgba(34, 37, 44, 0.92);
      --muted: #9a948c;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      display: grid;
      gap: 24px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      margin: 0;
    }

    section {
      background: var(--card);
      border-radius: 24px;
      padding: 24px;
      display: grid;
      gap: 14px;
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    input {
      border-radius: 12px;
      border: 1px solid var(--muted);
      padding: 10px 12px;
      font: inherit;
      background: transparent;
      color: inherit;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.secondary {
      background: var(--accent-2);
    }

    .runner, .event {
      display: grid;
      grid-template-columns: 1fr auto;
      gap: 6px;
      padding: 12px 0;
      border-bottom: 1px solid rgba(128, 128, 128, 0.2);
    }

    .bar {
      height: 8px;
      border-radius: 999px;
      background: rgba(128, 128, 128, 0.2);
      overflow: hidden;
      grid-column: 1 / -1;
    }

    .bar span {
      display: block;
      height: 100%;
      background: var(--accent);
    }

    .badge {
      font-size: 0.8rem;
      font-weight: 600;
    }

    .badge.finished { color: var(--muted); }
    .badge.reg-closed { color: #e74c3c; }
    .badge.urgent { color: #ff9f43; }
    .badge.upcoming { color: #54a0ff; }

    .wheel-wrap {
      position: relative;
      width: 260px;
      height: 260px;
      margin: 0 auto;
    }

    .wheel {
      width: 100%;
      height: 100%;
      border-radius: 50%;
    }

    .pointer {
      position: absolute;
      top: -10px;
      left: 50%;
      transform: translateX(-50%);
      border: 10px solid transparent;
      border-top: 18px solid var(--ink);
    }

    #status {
      min-height: 1.2em;
      color: var(--muted);
    }

    .locked main {
      display: none;
    }
  </style>
</head>
<body>
  <div class="app">
    <header class="row">
      <h1>Running Crew</h1>
      <button class="secondary" id="theme-toggle">Theme</button>
    </header>
    <p id="status"></p>

    <section id="login">
      <h2>Crew code</h2>
      <div class="row">
        <input id="code" type="password" placeholder="Access code" />
        <button id="login-btn">Enter</button>
      </div>
    </section>

    <main>
      <section>
        <h2>Leaderboard <small id="month">{{MONTH}}</small></h2>
        <div class="row">
          <input id="name" placeholder="Name" />
          <input id="avatar" placeholder="Avatar (emoji or image URL)" />
          <input id="goal" type="number" min="1" step="0.1" placeholder="Goal (km)" />
          <button id="add-runner">Join</button>
        </div>
        <div id="runners"></div>
      </section>

      <section>
        <h2>Lucky wheel</h2>
        <div class="wheel-wrap">
          <div class="pointer"></div>
          <div class="wheel" id="wheel"></div>
        </div>
        <div class="row">
          <button id="spin">Spin</button>
          <button class="secondary" id="reset">Reset</button>
          <strong id="winner"></strong>
        </div>
      </section>

      <section>
        <h2>Races</h2>
        <div class="row">
          <input id="title" placeholder="Race title" />
          <input id="race-date" type="datetime-local" />
          <input id="reg-end" type="date" />
          <input id="location" placeholder="Location" />
          <input id="url" placeholder="Link" />
          <button id="add-event">Save</button>
          <button class="secondary" id="cancel-edit" hidden>Cancel</button>
        </div>
        <div id="events"></div>
      </section>
    </main>
  </div>

  <script>
    const statusEl = document.getElementById('status');

    const setStatus = (message) => {
      statusEl.textContent = message || '';
    };

    const escapeHtml = (value) =>
      String(value ?? '').replace(/[&<>"']/g, (ch) => ({
        '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;',
      })[ch]);

    const fireConfetti = (burst) => {
      if (!burst || !window.confetti) return;
      window.confetti({
        particleCount: burst.particle_count,
        spread: burst.spread,
        origin: { y: burst.origin_y },
      });
    };

    const api = async (method, path, body) => {
      const options = { method, headers: {} };
      if (body !== undefined) {
        options.headers['Content-Type'] = 'application/json';
        options.body = JSON.stringify(body);
      }
      const resp = await fetch(path, options);
      if (!resp.ok) {
        throw new Error(await resp.text());
      }
      return resp.json();
    };

    const showFeedback = (feedback) => {
      if (!feedback) return;
      if (feedback.alerts.length) setStatus(feedback.alerts.join(' '));
      feedback.confetti.forEach(fireConfetti);
      feedback.vibrations.forEach((pattern) => navigator.vibrate && navigator.vibrate(pattern));
    };

    const refreshAuth = async () => {
      const status = await api('GET', '/api/auth');
      document.body.classList.toggle('locked', !status.logged_in);
      document.getElementById('login').hidden = status.logged_in;
      if (status.logged_in) await refreshAll();
    };

    const avatarHtml = (avatar) => {
      if (!avatar) return '';
      if (/^https?:\/\//.test(avatar)) {
        return `<img src="${escapeHtml(avatar)}" alt="" width="24" height="24" style="border-radius:50%;vertical-align:middle" /> `;
      }
      return `${escapeHtml(avatar)} `;
    };

    const renderRunners = (board) => {
      document.getElementById('month').textContent = board.month_key;
      const list = document.getElementById('runners');
      list.innerHTML = '';
      board.ranked.forEach((runner, index) => {
        const row = document.createElement('div');
        row.className = 'runner';
        const streak = runner.streak ? ` · ${runner.streak}d streak` : '';
        const cheers = runner.cheers ? ` · ${runner.cheers} cheers` : '';
        row.innerHTML = `
          <div>${avatarHtml(runner.avatar)}<strong>${index + 1}. ${escapeHtml(runner.name)}</strong> ${runner.current} / ${runner.goal} km (${runner.rate}%)${streak}${cheers}</div>
          <div class="row">
            <input type="number" step="0.1" placeholder="km" />
            <button data-act="log">Log</button>
            <button class="secondary" data-act="cheer">Cheer</button>
            <button class="secondary" data-act="delete">Delete</button>
          </div>
          <div class="bar"><span style="width:${runner.rate}%"></span></div>`;
        row.querySelector('[data-act="log"]').onclick = async () => {
          const distance = parseFloat(row.querySelector('input').value);
          try {
            const result = await api('POST', `/api/runners/${runner.id}/distance`, { distance });
            showFeedback(result.feedback);
            await refreshRunners();
          } catch (err) {
            setStatus(err.message);
          }
        };
        row.querySelector('[data-act="cheer"]').onclick = async () => {
          await api('POST', `/api/runners/${runner.id}/cheer`);
          await refreshRunners();
        };
        row.querySelector('[data-act="delete"]').onclick = async () => {
          const confirmed = confirm('Delete this runner? This cannot be undone.');
          await api('DELETE', `/api/runners/${runner.id}?confirm=${confirmed}`);
          await refreshRunners();
        };
        list.appendChild(row);
      });
    };

    const refreshRunners = async () => {
      renderRunners(await api('GET', '/api/runners'));
      await refreshWheel();
    };

    const renderWheel = (wheel) => {
      const wheelEl = document.getElementById('wheel');
      const stops = wheel.slices.map((slice) => `${slice.color} ${slice.start}deg ${slice.end}deg`);
      wheelEl.style.background = stops.length ? `conic-gradient(from 0deg, ${stops.join(', ')})` : 'rgba(128,128,128,0.2)';
      wheelEl.style.transition = wheel.phase === 'spinning' ? 'transform 3s cubic-bezier(0.25, 0.1, 0.25, 1)' : 'none';
      wheelEl.style.transform = `rotate(${wheel.rotation}deg)`;
      document.getElementById('winner').textContent = wheel.winner ? `Winner: ${wheel.winner}` : '';
    };

    let lastPhase = null;

    const refreshWheel = async () => {
      const wheel = await api('GET', '/api/wheel');
      renderWheel(wheel);
      return wheel;
    };

    const pollWheel = async () => {
      const wheel = await refreshWheel();
      if (wheel.phase === 'landed' && lastPhase === 'spinning') fireConfetti(wheel.celebration);
      lastPhase = wheel.phase;
      if (wheel.phase === 'spinning') setTimeout(pollWheel, 500);
    };

    let editingId = null;

    const refreshEvents = async () => {
      const events = await api('GET', '/api/events');
      const list = document.getElementById('events');
      list.innerHTML = '';
      events.forEach((event) => {
        const row = document.createElement('div');
        row.className = 'event';
        row.innerHTML = `
          <div><strong>${escapeHtml(event.title)}</strong> ${escapeHtml(event.race_date_label)} · ${escapeHtml(event.location)}</div>
          <div class="badge ${event.badge_class}">${escapeHtml(event.badge_label)}</div>
          <div>${escapeHtml(event.registration_label)}</div>
          <div class="row">
            <button class="secondary" data-act="edit">Edit</button>
            <button class="secondary" data-act="delete">Delete</button>
          </div>`;
        row.querySelector('[data-act="edit"]').onclick = () => {
          editingId = event.id;
          document.getElementById('title').value = event.title;
          document.getElementById('race-date').value = event.raceDate;
          document.getElementById('reg-end').value = event.regEndDate || '';
          document.getElementById('location').value = event.location;
          document.getElementById('url').value = event.url;
          document.getElementById('cancel-edit').hidden = false;
        };
        row.querySelector('[data-act="delete"]').onclick = async () => {
          const confirmed = confirm('Delete this event?');
          await api('DELETE', `/api/events/${event.id}?confirm=${confirmed}`);
          await refreshEvents();
        };
        list.appendChild(row);
      });
    };

    const resetEventForm = async () => {
      const { draft } = await api('GET', '/api/events/draft');
      editingId = null;
      document.getElementById('cancel-edit').hidden = true;
      document.getElementById('title').value = '';
      document.getElementById('race-date').value = draft.raceDate;
      document.getElementById('reg-end').value = draft.regEndDate || '';
      document.getElementById('location').value = '';
      document.getElementById('url').value = '';
    };

    const refreshAll = async () => {
      await refreshRunners();
      await refreshEvents();
      await resetEventForm();
    };

    document.getElementById('login-btn').onclick = async () => {
      const codeEl = document.getElementById('code');
      const result = await api('POST', '/api/auth/login', { code: codeEl.value });
      showFeedback(result.feedback);
      if (result.accepted) {
        setStatus('Welcome back!');
        setTimeout(refreshAuth, 2100);
      } else {
        codeEl.value = '';
        setStatus('Wrong code');
        setTimeout(() => setStatus(''), 1000);
      }
    };

    document.getElementById('theme-toggle').onclick = async () => {
      const { theme } = await api('POST', '/api/theme/toggle');
      document.documentElement.dataset.theme = theme;
    };

    document.getElementById('add-runner').onclick = async () => {
      try {
        const result = await api('POST', '/api/runners', {
          name: document.getElementById('name').value,
          goal: parseFloat(document.getElementById('goal').value) || 0,
          avatar: document.getElementById('avatar').value.trim(),
        });
        showFeedback(result.feedback);
        await refreshRunners();
      } catch (err) {
        setStatus(err.message);
      }
    };

    document.getElementById('spin').onclick = async () => {
      const wheel = await api('POST', '/api/wheel/spin');
      renderWheel(wheel);
      lastPhase = wheel.phase;
      setTimeout(pollWheel, 500);
    };

    document.getElementById('reset').onclick = async () => {
      renderWheel(await api('POST', '/api/wheel/reset'));
    };

    document.getElementById('add-event').onclick = async () => {
      try {
        const [method, path] = editingId === null
          ? ['POST', '/api/events']
          : ['PUT', `/api/events/${editingId}`];
        await api(method, path, {
          title: document.getElementById('title').value,
          raceDate: document.getElementById('race-date').value,
          regEndDate: document.getElementById('reg-end').value,
          location: document.getElementById('location').value,
          url: document.getElementById('url').value,
        });
        await refreshEvents();
        await resetEventForm();
      } catch (err) {
        setStatus(err.message);
      }
    };

    document.getElementById('cancel-edit').onclick = () => {
      resetEventForm().catch((err) => setStatus(err.message));
    };

    refreshAuth().catch((err) => setStatus(err.message));
  </script>
</body>
</html>
"#;
