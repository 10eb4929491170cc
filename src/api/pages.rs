use crate::{store::Account, utils::escape_html};

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | spotisearch</title>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body
    )
}

fn errors_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|error| format!("<li>{}</li>", escape_html(error)))
        .collect();
    format!(r#"<ul class="errors">{}</ul>"#, items)
}

/// Search page. `token_authentication_failed` carries the reason the
/// account's Spotify token could not be refreshed.
pub fn home(account: &Account, token_authentication_failed: Option<&str>) -> String {
    let notice = match token_authentication_failed {
        Some(reason) => format!(
            r#"<p class="error" id="token_authentication_failed">Could not authenticate with Spotify: {}</p>"#,
            escape_html(reason)
        ),
        None => String::new(),
    };

    let body = format!(
        r#"<header>
<span>Logged in as {username}</span>
<a href="/logout">Logout</a>
</header>
{notice}
<form id="search-form">
<input type="text" id="query" name="query" placeholder="Search an artist" autofocus>
<button type="submit">Search</button>
</form>
<pre id="results"></pre>
<script>
document.getElementById("search-form").addEventListener("submit", async (event) => {{
  event.preventDefault();
  const query = document.getElementById("query").value.trim();
  const response = await fetch("/search/" + encodeURIComponent(query) + "/");
  document.getElementById("results").textContent =
    JSON.stringify(await response.json(), null, 2);
}});
</script>"#,
        username = escape_html(&account.username),
        notice = notice
    );
    layout("Home", &body)
}

pub fn login(email: &str, errors: &[String]) -> String {
    let body = format!(
        r#"<h1>Login</h1>
{errors}
<form method="post" action="/login">
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Login</button>
</form>
<p>No account yet? <a href="/signup">Sign up</a></p>"#,
        errors = errors_list(errors),
        email = escape_html(email)
    );
    layout("Login", &body)
}

pub fn signup(email: &str, username: &str, errors: &[String]) -> String {
    let body = format!(
        r#"<h1>Sign up</h1>
{errors}
<form method="post" action="/signup">
<label>Email <input type="email" name="email" value="{email}" required></label>
<small>Required. Please enter a valid email.</small>
<label>Username <input type="text" name="username" value="{username}" required></label>
<label>Password <input type="password" name="password1" required></label>
<label>Password confirmation <input type="password" name="password2" required></label>
<button type="submit">Sign up</button>
</form>
<p>Already registered? <a href="/login">Login</a></p>"#,
        errors = errors_list(errors),
        email = escape_html(email),
        username = escape_html(username)
    );
    layout("Sign up", &body)
}
