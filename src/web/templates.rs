use minijinja::Environment;
use serde::Serialize;
use std::sync::OnceLock;

// Template names carry .html so minijinja applies HTML auto-escaping to the
// user-supplied CSV content.
const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><title>Sentiment Analysis</title></head>
<body>
  <h1>Sentiment Analysis</h1>
  <p>Upload a CSV file for sentiment analysis.</p>
  <form action="/columns" method="post" enctype="multipart/form-data">
    <input type="file" name="file" accept=".csv" required>
    <button type="submit">Upload</button>
  </form>
</body>
</html>
"#;

const COLUMNS_HTML: &str = r#"<!doctype html>
<html>
<head><title>Sentiment Analysis</title></head>
<body>
  <h1>Sentiment Analysis</h1>
  <p>{{ filename }} — {{ row_count }} rows. Select the content column.</p>
  <form action="/analyze" method="post">
    <select name="column">
      {% for column in columns %}
      <option value="{{ column }}">{{ column }}</option>
      {% endfor %}
    </select>
    <input type="hidden" name="csv_b64" value="{{ csv_b64 }}">
    <input type="hidden" name="filename" value="{{ filename }}">
    <button type="submit">Analyze</button>
  </form>
</body>
</html>
"#;

const PREVIEW_HTML: &str = r#"<!doctype html>
<html>
<head><title>Sentiment Analysis</title></head>
<body>
  <h1>Results — {{ filename }}</h1>
  <table border="1" cellpadding="4">
    <tr><th>{{ column }}</th><th>Sentiment</th></tr>
    {% for row in rows %}
    <tr><td>{{ row.text }}</td><td>{{ row.sentiment }}</td></tr>
    {% endfor %}
  </table>
  <form action="/download" method="post">
    <input type="hidden" name="csv_b64" value="{{ result_b64 }}">
    <input type="hidden" name="filename" value="{{ download_name }}">
    <button type="submit">Download CSV</button>
  </form>
  <p><a href="/">Analyze another file</a></p>
</body>
</html>
"#;

static TEMPLATES: OnceLock<Environment<'static>> = OnceLock::new();

fn environment() -> &'static Environment<'static> {
    TEMPLATES.get_or_init(|| {
        let mut env = Environment::new();
        for (name, src) in [
            ("index.html", INDEX_HTML),
            ("columns.html", COLUMNS_HTML),
            ("preview.html", PREVIEW_HTML),
        ] {
            env.add_template(name, src)
                .unwrap_or_else(|err| panic!("failed to compile template {name}: {err}"));
        }
        env
    })
}

pub fn render(name: &str, ctx: &impl Serialize) -> Result<String, minijinja::Error> {
    environment().get_template(name)?.render(ctx)
}
