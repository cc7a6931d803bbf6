use minijinja::Environment;
use std::fmt;

const RAW: &str = r#"<span class="dump-raw dump-{{ kind }}">{{ text }}</span>"#;

const OBJECT: &str = r#"<table class="dump-object">
{%- if type_name %}<thead><tr><th colspan="2">{{ type_name }}</th></tr></thead>{% endif %}
<tbody>
{%- for row in rows %}
<tr><td class="dump-key">{{ row.key }}</td><td class="dump-value">{{ row.value }}</td></tr>
{%- endfor %}
</tbody>
</table>"#;

const ARRAY: &str = r#"<div class="dump-array">
{%- if type_name %}<span class="dump-type">{{ type_name }}</span> {% endif -%}
[{% for item in items %}{% if not loop.first %}, {% endif %}{{ item }}{% endfor %}]</div>"#;

const GRID: &str = r#"<table class="dump-grid">
<thead>
{%- if type_name %}
<tr><th colspan="{{ columns|length + 1 }}">{{ type_name }} ({{ rows|length }} items)</th></tr>
{%- endif %}
<tr><th></th>{% for column in columns %}<th>{{ column }}</th>{% endfor %}</tr>
</thead>
<tbody>
{%- for row in rows %}
<tr><td class="dump-index">{{ loop.index0 }}</td>{% for cell in row %}<td>{{ cell }}</td>{% endfor %}</tr>
{%- endfor %}
</tbody>
</table>"#;

const DUMP_CONTAINER: &str = r#"<div class="dump{% if single %} dump-single{% endif %}">
{%- if source %}<div class="dump-source">{{ source }}</div>{% endif %}
{%- if time %}<div class="dump-time">{{ time }}</div>{% endif %}
<div class="dump-body">{{ value }}</div>
</div>"#;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>dumppad</title>
<style>
body { font-family: monospace; }
table { border-collapse: collapse; margin: 2px 0; }
th, td { border: 1px solid #888; padding: 2px 6px; vertical-align: top; text-align: left; }
.dump { border-bottom: 1px solid #ccc; padding: 4px 0; }
.dump-single, .dump-single .dump-body { display: inline; }
.dump-source { font-weight: bold; }
.dump-time { color: #888; font-size: smaller; }
.dump-type { color: #2b91af; }
</style>
</head>
<body>
{%- if message %}
<p class="pad-message">{{ message }}</p>
{%- endif %}
{%- for dump in dumps %}
{{ dump }}
{%- endfor %}
<footer>Listening on port {{ port }}</footer>
{%- if auto_scroll %}
<script>window.scrollTo(0, document.body.scrollHeight);</script>
{%- endif %}
</body>
</html>
"#;

const TEMPLATES: &[(&str, &str)] = &[
    ("raw.html", RAW),
    ("object.html", OBJECT),
    ("array.html", ARRAY),
    ("grid.html", GRID),
    ("dump_container.html", DUMP_CONTAINER),
    ("page.html", PAGE),
];

/// Template rendering failure.
#[derive(Debug)]
pub struct RenderError(minijinja::Error);

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to render dump: {}", self.0)
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        RenderError(err)
    }
}

/// The HTML templates used by the format providers and the pad view.
///
/// Every template name ends in `.html`, so minijinja escapes interpolated text;
/// fragments produced by nested providers are passed in as safe strings.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Compile the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if a built-in template has a syntax error.
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render the named template with `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the template is unknown or fails to render.
    pub fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, RenderError> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}
