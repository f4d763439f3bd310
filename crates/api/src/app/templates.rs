//! Embedded HTML templates for the browser pages.
//!
//! Placeholders look like `{{name}}` and are filled by `pages::render`.

pub const STYLESHEET: &str = r#":root {
    --bg: #0f0f12;
    --panel: #18181c;
    --border: #2a2a30;
    --text: #ececec;
    --muted: #9a9aa5;
    --accent: #e5484d;
    --font: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
}
* { box-sizing: border-box; }
body { margin: 0; background: var(--bg); color: var(--text); font-family: var(--font); }
header { display: flex; justify-content: space-between; align-items: center; padding: 16px 24px; border-bottom: 1px solid var(--border); }
header a { color: var(--text); text-decoration: none; margin-left: 16px; }
main { max-width: 960px; margin: 0 auto; padding: 32px 24px; }
form { display: flex; flex-direction: column; gap: 12px; max-width: 420px; }
input, textarea { background: var(--panel); border: 1px solid var(--border); color: var(--text); padding: 10px; border-radius: 6px; }
button { background: var(--accent); color: white; border: 0; padding: 10px; border-radius: 6px; cursor: pointer; }
.error { color: var(--accent); min-height: 1.2em; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 20px; }
.card { background: var(--panel); border: 1px solid var(--border); border-radius: 8px; overflow: hidden; }
.card img { width: 100%; display: block; }
.card .body { padding: 12px; }
.card a { color: var(--text); }
.muted { color: var(--muted); font-size: 0.9em; }
.player { width: 100%; aspect-ratio: 16 / 9; border: 0; }
"#;

const HEAD: &str = r#"<meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="stylesheet" href="/assets/remi.css">"#;

const NAV: &str = r#"<header>
        <a href="/"><strong>Remi</strong></a>
        <nav>
            <a href="/movies">Share</a>
            <a href="/login">Sign in</a>
            <a href="/register">Sign up</a>
        </nav>
    </header>"#;

pub fn home() -> String {
    page(
        "Remi // Movies",
        r#"<main>
        <h1>Shared movies</h1>
        <div id="movies" class="grid"></div>
        <p id="error" class="error"></p>
    </main>
    <script>
        const API = "{{url}}";
        const escapeHtml = (s) => String(s).replace(/[&<>"']/g, (c) => ({
            "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;"
        }[c]));
        fetch(API + "/api/v1/listMovies?limit=100")
            .then((r) => r.json())
            .then((data) => {
                if (data.error) { throw new Error(data.error); }
                document.getElementById("movies").innerHTML = data.movies.map((m) => `
                    <div class="card">
                        <a href="/movie?id=${encodeURIComponent(m.id)}"><img src="${escapeHtml(m.thumbnail)}" alt=""></a>
                        <div class="body">
                            <a href="/movie?id=${encodeURIComponent(m.id)}"><strong>${escapeHtml(m.name)}</strong></a>
                            <div class="muted">Shared by ${escapeHtml(m.shared_by)}</div>
                            <p>${escapeHtml(m.description)}</p>
                        </div>
                    </div>`).join("");
            })
            .catch((e) => { document.getElementById("error").textContent = e.message; });
    </script>"#,
    )
}

pub fn login() -> String {
    page(
        "Remi // Sign in",
        r#"<main>
        <h1>Sign in</h1>
        <form id="form">
            <input name="username" placeholder="Username" autocomplete="username">
            <input name="password" type="password" placeholder="Password" autocomplete="current-password">
            <button type="submit">Sign in</button>
            <p id="error" class="error"></p>
        </form>
    </main>
    <script>
        const API = "{{url}}";
        document.getElementById("form").addEventListener("submit", async (ev) => {
            ev.preventDefault();
            const form = new FormData(ev.target);
            const res = await fetch(API + "/api/v1/login", {
                method: "POST",
                headers: { "Content-Type": "application/json" },
                body: JSON.stringify({ username: form.get("username"), password: form.get("password") }),
            });
            const data = await res.json();
            if (!res.ok) { document.getElementById("error").textContent = data.error; return; }
            localStorage.setItem("remi.token", data.token);
            localStorage.setItem("remi.name", data.name);
            window.location.href = "/";
        });
    </script>"#,
    )
}

pub fn register() -> String {
    page(
        "Remi // Sign up",
        r#"<main>
        <h1>Create an account</h1>
        <form id="form">
            <input name="name" placeholder="Display name">
            <input name="username" placeholder="Username" autocomplete="username">
            <input name="password" type="password" placeholder="Password" autocomplete="new-password">
            <button type="submit">Sign up</button>
            <p id="error" class="error"></p>
        </form>
    </main>
    <script>
        const API = "{{url}}";
        document.getElementById("form").addEventListener("submit", async (ev) => {
            ev.preventDefault();
            const form = new FormData(ev.target);
            const res = await fetch(API + "/api/v1/register", {
                method: "POST",
                headers: { "Content-Type": "application/json" },
                body: JSON.stringify({
                    username: form.get("username"),
                    password: form.get("password"),
                    name: form.get("name"),
                }),
            });
            if (!res.ok) { document.getElementById("error").textContent = (await res.json()).error; return; }
            window.location.href = "/login";
        });
    </script>"#,
    )
}

pub fn movie_create() -> String {
    page(
        "Remi // Share a movie",
        r#"<main>
        <h1>Share a YouTube movie</h1>
        <form id="form">
            <input name="name" placeholder="Title">
            <input name="link" placeholder="https://www.youtube.com/watch?v=...">
            <textarea name="description" rows="4" placeholder="Why is it worth watching?"></textarea>
            <button type="submit">Share</button>
            <p id="error" class="error"></p>
        </form>
    </main>
    <script>
        const API = "{{url}}";
        document.getElementById("form").addEventListener("submit", async (ev) => {
            ev.preventDefault();
            const token = localStorage.getItem("remi.token");
            if (!token) { window.location.href = "/login"; return; }
            const form = new FormData(ev.target);
            const res = await fetch(API + "/api/v1/createMovie", {
                method: "POST",
                headers: { "Content-Type": "application/json", "Authorization": token },
                body: JSON.stringify({
                    name: form.get("name"),
                    link: form.get("link"),
                    description: form.get("description"),
                }),
            });
            const data = await res.json();
            if (res.status === 401) { window.location.href = "/login"; return; }
            if (!res.ok) { document.getElementById("error").textContent = data.error; return; }
            window.location.href = "/movie?id=" + encodeURIComponent(data.id);
        });
    </script>"#,
    )
}

pub fn movie_view() -> String {
    page(
        "Remi // {{name}}",
        r#"<main>
        <iframe class="player" src="{{link}}" allowfullscreen></iframe>
        <h1>{{name}}</h1>
        <p class="muted">Shared by {{shared_by}}</p>
        <p>{{description}}</p>
    </main>"#,
    )
}

pub fn not_found() -> String {
    page(
        "Remi // Not found",
        r#"<main>
        <h1>Not found</h1>
        <p class="muted">That movie doesn't exist. <a href="/">Back to the feed</a></p>
    </main>"#,
    )
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n    {HEAD}\n    <title>{title}</title>\n</head>\n<body>\n    {NAV}\n    {body}\n</body>\n</html>\n"
    )
}
