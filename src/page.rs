// Landing page: a static HTML document with a download button for the
// shared file, stored under a random 8-character key.

use rand::Rng;

pub const PAGE_CONTENT_TYPE: &str = "text/html; charset=utf-8";

const KEY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const KEY_LEN: usize = 8;

/// Random landing page key, 8 characters from `[a-z0-9]`.
pub fn random_key() -> String {
    random_key_with(&mut rand::thread_rng())
}

pub fn random_key_with<R: Rng>(rng: &mut R) -> String {
    (0..KEY_LEN)
        .map(|_| KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())] as char)
        .collect()
}

/// Size in megabytes with one decimal, e.g. `1.0`.
pub fn size_in_mb(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / 1_048_576.0)
}

/// Render the landing page for a file called `name` of `size` bytes that
/// can be downloaded from `url`.
pub fn render(name: &str, size: u64, url: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
    <head>
        <meta charset="utf-8">
        <title>Download</title>
        <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/twitter-bootstrap/3.3.4/css/bootstrap.min.css">
        <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/bootswatch/3.3.4/yeti/bootstrap.min.css">
        <style>
            body {{
                display: table-cell;
                vertical-align: middle;
                width: 100vw;
                height: 100vh;
            }}

            h2 {{
                margin-bottom: 32px;
            }}
        </style>
    </head>
    <body>
        <div class="container center-block">
            <div class="text-center">
                <h2>{name}</h2>
                <p>
                    <a class="btn btn-primary btn-lg" href="{url}" role="button" download>
                        <span class="glyphicon glyphicon-download-alt"></span>
                        Download
                    </a>
                    &nbsp;&nbsp;
                    <span class="text-muted">{size} MB</span>
                </p>
            </div>
        </div>
    </body>
</html>
"#,
        name = escape(name),
        url = escape(url),
        size = size_in_mb(size),
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
