use chrono::NaiveDate;

pub fn render_index(today: NaiveDate) -> String {
    INDEX_HTML.replace("{{TODAY}}", &today.format("%Y-%m-%d").to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Fitness Tracker</title>
  <style>
    :root {
      --bg: #f1f5f9;
      --ink: #1e293b;
      --muted: #64748b;
      --accent: #3b82f6;
      --card: #ffffff;
      --danger: #ef4444;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", system-ui, sans-serif;
    }

    main {
      max-width: 720px;
      margin: 0 auto;
      padding: 24px 16px 96px;
      display: grid;
      gap: 16px;
    }

    .card {
      background: var(--card);
      border-radius: 16px;
      padding: 16px;
      box-shadow: 0 6px 20px rgba(15, 23, 42, 0.06);
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 12px;
    }

    .stat .value {
      display: block;
      font-size: 1.5rem;
      font-weight: 600;
    }

    .stat .label {
      color: var(--muted);
      font-size: 0.8rem;
      text-transform: uppercase;
    }

    form {
      display: grid;
      gap: 8px;
    }

    input, select, textarea, button {
      font: inherit;
      padding: 10px 12px;
      border-radius: 10px;
      border: 1px solid #cbd5e1;
    }

    button {
      background: var(--accent);
      color: white;
      border: none;
      cursor: pointer;
    }

    button.danger {
      background: var(--danger);
    }

    nav {
      position: fixed;
      bottom: 0;
      left: 0;
      right: 0;
      display: flex;
      justify-content: space-around;
      background: var(--card);
      border-top: 1px solid #e2e8f0;
      padding: 8px;
    }

    nav button {
      background: transparent;
      color: var(--muted);
    }

    nav button.active {
      color: var(--accent);
      font-weight: 600;
    }

    .view {
      display: none;
    }

    .view.active {
      display: grid;
      gap: 16px;
    }

    ul.list {
      list-style: none;
      margin: 0;
      padding: 0;
    }

    ul.list li {
      display: flex;
      justify-content: space-between;
      padding: 8px 0;
      border-bottom: 1px solid #f1f5f9;
    }

    .bars {
      display: flex;
      align-items: flex-end;
      gap: 3px;
      height: 140px;
    }

    .bars div {
      flex: 1;
      background: var(--accent);
      border-radius: 3px 3px 0 0;
      min-height: 2px;
    }

    .status {
      color: var(--muted);
      min-height: 1.2em;
    }
  </style>
</head>
<body>
  <main>
    <p class="status" id="status"></p>

    <section class="view active" data-view="dashboard">
      <div class="card stats" id="dashboard-stats"></div>
      <div class="card">
        <h2>Recent Activity</h2>
        <ul class="list" id="recent"></ul>
      </div>
    </section>

    <section class="view" data-view="weight">
      <form class="card" id="weight-form">
        <input name="weight" type="number" step="0.1" min="0" placeholder="Weight (kg)" required />
        <input name="date" type="date" value="{{TODAY}}" required />
        <input name="notes" placeholder="Notes (optional)" />
        <button type="submit">Log Weight</button>
      </form>
      <div class="card stats" id="weight-stats"></div>
      <div class="card"><ul class="list" id="weights"></ul></div>
    </section>

    <section class="view" data-view="workouts">
      <form class="card" id="workout-form">
        <select name="type" id="workout-type">
          <option value="gym">Gym</option>
          <option value="home">Home</option>
          <option value="kettlebell">Kettlebell</option>
        </select>
        <input name="date" type="date" value="{{TODAY}}" required />
        <input name="duration" type="number" min="0" placeholder="Duration (min)" />
        <input name="exercise" list="suggestions" placeholder="Exercise" required />
        <datalist id="suggestions"></datalist>
        <input name="sets" type="number" min="1" placeholder="Sets" />
        <input name="reps" type="number" min="0" placeholder="Reps" />
        <input name="load" type="number" step="0.5" min="0" placeholder="Weight per set (kg)" />
        <textarea name="notes" placeholder="Notes (optional)"></textarea>
        <button type="submit">Save Workout</button>
      </form>
      <div class="card stats" id="workout-stats"></div>
      <div class="card"><ul class="list" id="workouts"></ul></div>
    </section>

    <section class="view" data-view="charts">
      <div class="card">
        <h2>Weight Progress</h2>
        <div class="bars" id="weight-chart"></div>
      </div>
      <div class="card">
        <h2>Workouts, last 30 days</h2>
        <div class="bars" id="frequency"></div>
      </div>
      <div class="card">
        <h2>Workout Types</h2>
        <ul class="list" id="types"></ul>
      </div>
      <div class="card">
        <h2>Weekly Summary</h2>
        <ul class="list" id="weekly"></ul>
      </div>
      <div class="card stats" id="chart-summary"></div>
    </section>

    <section class="view" data-view="profile">
      <div class="card stats" id="profile-stats"></div>
      <div class="card">
        <form id="import-form">
          <button type="button" id="export">Export Data</button>
          <input type="file" id="import-file" accept="application/json" />
          <button type="submit">Import Data</button>
          <button type="button" class="danger" id="clear">Clear All Data</button>
        </form>
      </div>
    </section>
  </main>

  <nav>
    <button data-tab="dashboard" class="active">Home</button>
    <button data-tab="weight">Weight</button>
    <button data-tab="workouts">Workouts</button>
    <button data-tab="charts">Charts</button>
    <button data-tab="profile">Profile</button>
  </nav>

  <script>
    const $ = (id) => document.getElementById(id);
    const setStatus = (text) => { $('status').textContent = text; };

    // Every value interpolated into markup goes through esc(); stored data
    // can carry arbitrary strings (imported workout types, notes, ids).
    const esc = (value) => String(value ?? '')
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;')
      .replace(/"/g, '&quot;')
      .replace(/'/g, '&#39;');

    const api = async (path, options = {}) => {
      const res = await fetch(path, options);
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const send = (path, method, body) => api(path, {
      method,
      headers: { 'content-type': 'application/json' },
      body: JSON.stringify(body)
    });

    const stats = (el, pairs) => {
      el.innerHTML = pairs
        .map(([label, value]) => `<div class="stat"><span class="value">${esc(value ?? '-')}</span><span class="label">${esc(label)}</span></div>`)
        .join('');
    };

    const signed = (change) => (change > 0 ? '+' : '') + change.toFixed(1);

    let weightEntries = [];
    let workoutEntries = [];

    const loaders = {
      dashboard: async () => {
        const d = await api('/api/dashboard');
        stats($('dashboard-stats'), [
          ['Current (kg)', d.current_weight],
          ['Change (kg)', signed(d.weight_change)],
          ['This Week', d.workouts_this_week],
          ['Total Workouts', d.total_workouts]
        ]);
        $('recent').innerHTML = d.recent_activity
          .map((a) => `<li><span>${esc(a.description)}</span><span>${esc(a.date)}</span></li>`)
          .join('') || '<li>Start by logging your weight or adding a workout</li>';
      },
      weight: async () => {
        const [entries, s] = await Promise.all([api('/api/weights'), api('/api/stats/weight')]);
        weightEntries = entries;
        stats($('weight-stats'), [['Latest', s.latest], ['Lowest', s.min], ['Highest', s.max], ['Entries', s.count]]);
        const changes = new Map(s.changes.map((c) => [c.id, c.change]));
        $('weights').innerHTML = entries
          .map((e) => {
            const change = changes.get(e.id);
            const delta = change == null ? '' : ` (${esc(signed(change))})`;
            return `<li><span>${esc(e.date)}: ${esc(e.weight)} kg${delta}</span><span>`
              + `<button data-edit-weight="${esc(e.id)}">Edit</button> `
              + `<button class="danger" data-weight="${esc(e.id)}">Delete</button></span></li>`;
          })
          .join('');
      },
      workouts: async () => {
        const [entries, s] = await Promise.all([api('/api/workouts'), api('/api/stats/workouts')]);
        workoutEntries = entries;
        stats($('workout-stats'), [
          ['Total', s.total],
          ['This Week', s.this_week],
          ['Avg Duration', s.average_duration],
          ['Exercises', s.total_exercises]
        ]);
        $('workouts').innerHTML = entries
          .map((w) => `<li><span>${esc(w.date)}: ${esc(w.type)}, ${esc(w.exercises.length)} exercises, ${esc(w.duration)} min</span><span>`
            + `<button data-edit-workout="${esc(w.id)}">Edit</button> `
            + `<button class="danger" data-workout="${esc(w.id)}">Delete</button></span></li>`)
          .join('');
        loadSuggestions();
      },
      charts: async () => {
        const [series, frequency, types, weekly, summary] = await Promise.all([
          api('/api/charts/weight'),
          api('/api/charts/frequency?days=30'),
          api('/api/charts/types'),
          api('/api/charts/weekly'),
          api('/api/charts/summary')
        ]);
        const low = Math.min(...series.map((p) => p.weight));
        const high = Math.max(...series.map((p) => p.weight));
        const span = Math.max(1, high - low);
        $('weight-chart').innerHTML = series
          .map((p) => `<div title="${esc(p.date)}: ${esc(p.weight)} kg" style="height:${10 + ((p.weight - low) / span) * 90}%"></div>`)
          .join('') || 'No weight data';
        const peak = Math.max(1, ...frequency.map((d) => d.workouts));
        $('frequency').innerHTML = frequency
          .map((d) => `<div title="${esc(d.date)}" style="height:${(d.workouts / peak) * 100}%"></div>`)
          .join('');
        $('types').innerHTML = types
          .map((t) => `<li><span style="color:${esc(t.color)}">${esc(t.label)}</span><span>${esc(t.count)}</span></li>`)
          .join('');
        $('weekly').innerHTML = weekly
          .map((w) => `<li><span>${esc(w.week_start)}</span><span>${esc(w.workouts)} workouts, ${esc(w.total_exercises)} exercises, ${esc(w.total_duration)} min</span></li>`)
          .join('');
        stats($('chart-summary'), [
          ['Total Change (kg)', summary.total_weight_change == null ? null : summary.total_weight_change.toFixed(1)],
          ['Weight Entries', summary.weight_entries],
          ['Total Workouts', summary.total_workouts],
          ['Total Hours', summary.total_hours]
        ]);
      },
      profile: async () => {
        const p = await api('/api/profile');
        stats($('profile-stats'), [['Weight Entries', p.weight_entries], ['Workouts', p.total_workouts], ['Data (KB)', p.data_size_kb]]);
      }
    };

    let active = 'dashboard';
    const show = (tab) => {
      active = tab;
      document.querySelectorAll('.view').forEach((v) => v.classList.toggle('active', v.dataset.view === tab));
      document.querySelectorAll('nav button').forEach((b) => b.classList.toggle('active', b.dataset.tab === tab));
      loaders[tab]().catch((err) => setStatus(err.message));
    };

    const loadSuggestions = async () => {
      const names = await api(`/api/exercises/${encodeURIComponent($('workout-type').value)}`);
      $('suggestions').innerHTML = names.map((n) => `<option value="${esc(n)}"></option>`).join('');
    };

    const editWeight = (id) => {
      const entry = weightEntries.find((e) => e.id === id);
      if (!entry) return;
      const weight = prompt('Weight (kg)', entry.weight);
      if (weight === null) return;
      const notes = prompt('Notes', entry.notes || '');
      send(`/api/weights/${encodeURIComponent(id)}`, 'PUT', { weight: parseFloat(weight), notes: notes || null })
        .then(() => show('weight'))
        .catch((err) => setStatus(err.message));
    };

    const editWorkout = (id) => {
      const workout = workoutEntries.find((w) => w.id === id);
      if (!workout) return;
      const duration = prompt('Duration (min)', workout.duration);
      if (duration === null) return;
      const notes = prompt('Notes', workout.notes || '');
      send(`/api/workouts/${encodeURIComponent(id)}`, 'PUT', {
        type: workout.type,
        date: workout.date,
        duration: parseInt(duration, 10) || 0,
        notes: notes || null,
        exercises: workout.exercises.map((e) => ({ name: e.name, sets: e.sets }))
      }).then(() => show('workouts')).catch((err) => setStatus(err.message));
    };

    document.querySelectorAll('nav button').forEach((b) => b.addEventListener('click', () => show(b.dataset.tab)));
    $('workout-type').addEventListener('change', () => loadSuggestions().catch((err) => setStatus(err.message)));

    $('weight-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const f = new FormData(event.target);
      send('/api/weights', 'POST', {
        weight: parseFloat(f.get('weight')),
        date: f.get('date'),
        notes: f.get('notes') || null
      }).then(() => { event.target.reset(); show('weight'); }).catch((err) => setStatus(err.message));
    });

    $('workout-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const f = new FormData(event.target);
      const setCount = parseInt(f.get('sets'), 10) || 1;
      const reps = parseInt(f.get('reps'), 10);
      const load = parseFloat(f.get('load'));
      const sets = Array.from({ length: setCount }, () => ({
        reps: Number.isNaN(reps) ? null : reps,
        weight: Number.isNaN(load) ? null : load
      }));
      send('/api/workouts', 'POST', {
        type: f.get('type'),
        date: f.get('date'),
        duration: parseInt(f.get('duration'), 10) || 0,
        notes: f.get('notes') || null,
        exercises: [{ name: f.get('exercise'), sets }]
      }).then(() => { event.target.reset(); show('workouts'); }).catch((err) => setStatus(err.message));
    });

    document.addEventListener('click', (event) => {
      const { weight, workout, editWeight: weightId, editWorkout: workoutId } = event.target.dataset;
      if (weight) {
        api(`/api/weights/${encodeURIComponent(weight)}`, { method: 'DELETE' }).then(() => show('weight')).catch((err) => setStatus(err.message));
      } else if (workout) {
        api(`/api/workouts/${encodeURIComponent(workout)}`, { method: 'DELETE' }).then(() => show('workouts')).catch((err) => setStatus(err.message));
      } else if (weightId) {
        editWeight(weightId);
      } else if (workoutId) {
        editWorkout(workoutId);
      }
    });

    $('export').addEventListener('click', () => { window.location = '/api/export'; });

    $('import-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const file = $('import-file').files[0];
      if (!file) return;
      try {
        const res = await fetch('/api/import', { method: 'POST', body: await file.text() });
        if (!res.ok) throw new Error(await res.text());
        setStatus('Data imported successfully!');
        show('profile');
      } catch (err) {
        setStatus(err.message);
      }
      $('import-file').value = '';
    });

    $('clear').addEventListener('click', () => {
      if (!confirm('Delete all weight entries and workouts?')) return;
      api('/api/data', { method: 'DELETE' })
        .then(() => { setStatus('All data has been cleared.'); show('profile'); })
        .catch((err) => setStatus(err.message));
    });

    show(active);
  </script>
</body>
</html>
"#;
