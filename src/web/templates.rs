use chrono::{Datelike, Utc};

const PAGE_BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; min-height: 100vh; display: flex; flex-direction: column; }
        header { background: #ffffff; padding: 2rem 1.5rem; border-bottom: 1px solid #e2e8f0; }
        .header-bar { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; }
        .header-bar h1 { margin: 0; }
        .logout-form button { padding: 0.6rem 1.3rem; border-radius: 999px; }
        main { flex: 1; padding: 2rem 1.5rem; max-width: 960px; width: 100%; margin: 0 auto; box-sizing: border-box; }
        section { margin-bottom: 2.5rem; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); }
        .panel h2 { margin-top: 0; }
        label { display: block; margin: 1rem 0 0.5rem; font-weight: 600; color: #0f172a; }
        input[type="text"], input[type="password"], input[type="file"], select { width: 100%; padding: 0.75rem; border-radius: 8px; border: 1px solid #cbd5f5; background: #f8fafc; color: #0f172a; box-sizing: border-box; }
        button { padding: 0.75rem 1.2rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; cursor: pointer; transition: background 0.15s ease; }
        button:hover { background: #1d4ed8; }
        button.danger { background: #dc2626; }
        button.danger:hover { background: #b91c1c; }
        .actions { margin-top: 1.25rem; }
        table { width: 100%; border-collapse: collapse; margin-top: 1rem; }
        th, td { padding: 0.65rem 0.85rem; border-bottom: 1px solid #e2e8f0; text-align: left; }
        td.action { width: 1%; white-space: nowrap; }
        td form { margin: 0; }
        details { background: #ffffff; border: 1px solid #e2e8f0; border-radius: 12px; padding: 1rem 1.25rem; margin-bottom: 1rem; }
        summary { font-weight: 600; cursor: pointer; }
        .download-link { color: #2563eb; font-weight: 600; text-decoration: none; }
        .download-link:hover { text-decoration: underline; }
        .flash { padding: 1rem 1.25rem; border-radius: 10px; margin-bottom: 1.5rem; font-weight: 600; border: 1px solid transparent; }
        .flash.success { background: #ecfdf3; border-color: #bbf7d0; color: #166534; }
        .flash.error { background: #fef2f2; border-color: #fecaca; color: #b91c1c; }
        .flash.info { background: #eff6ff; border-color: #bfdbfe; color: #1d4ed8; }
        .app-footer { margin-top: 3rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
"#;

pub struct PageLayout<'a> {
    pub title: &'a str,
    pub heading: &'a str,
    pub flash_html: &'a str,
    pub body_html: &'a str,
    pub show_logout: bool,
}

pub fn render_page(layout: PageLayout<'_>) -> String {
    let PageLayout {
        title,
        heading,
        flash_html,
        body_html,
        show_logout,
    } = layout;

    let logout_html = if show_logout {
        r#"<form class="logout-form" method="post" action="/logout"><button type="submit">Logout</button></form>"#
    } else {
        ""
    };
    let footer = render_footer();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>
{styles}
    </style>
</head>
<body>
    <header>
        <div class="header-bar">
            <h1>{heading}</h1>
            {logout_html}
        </div>
    </header>
    <main>
        {flash_html}
{body_html}
        {footer}
    </main>
</body>
</html>"#,
        title = escape_html(title),
        heading = escape_html(heading),
        styles = PAGE_BASE_STYLES,
        logout_html = logout_html,
        flash_html = flash_html,
        body_html = body_html,
        footer = footer,
    )
}

pub fn render_login_page(flash_html: &str) -> String {
    let body = r#"        <section class="panel">
            <form method="post" action="/login">
                <label for="username">Username</label>
                <input id="username" type="text" name="username" autocomplete="username" required>
                <label for="password">Password</label>
                <input id="password" type="password" name="password" autocomplete="current-password" required>
                <div class="actions"><button type="submit">Login</button></div>
            </form>
        </section>"#;

    render_page(PageLayout {
        title: "Resource Portal",
        heading: "Login Page",
        flash_html,
        body_html: body,
        show_logout: false,
    })
}

pub fn render_footer() -> String {
    let current_year = Utc::now().year();
    format!(
        r#"<footer class="app-footer">© {year} Resource Portal</footer>"#,
        year = current_year
    )
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Percent-encode a value for use inside a query string.
pub fn encode_query_value(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_covers_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn query_values_are_percent_encoded() {
        assert_eq!(encode_query_value("Data Structures & Algo"), "Data%20Structures%20%26%20Algo");
        assert_eq!(encode_query_value("OS-2"), "OS-2");
    }

    #[test]
    fn login_page_has_form_and_flash() {
        let html = render_login_page(r#"<div class="flash error">Invalid credentials!</div>"#);
        assert!(html.contains(r#"action="/login""#));
        assert!(html.contains("Invalid credentials!"));
        assert!(!html.contains(r#"action="/logout""#));
    }
}
