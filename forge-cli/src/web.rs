//! Web form for running the pipeline
//!
//! `GET /` renders a single textarea and a "Generate Solution" button.
//! `POST /generate` runs the pipeline for the submitted requirement and renders
//! every artifact. Pipeline errors are caught here and shown in the page.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::extract::State;
use base64::Engine as _;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Router};
use forge_core::pipeline::LogProgress;
use forge_core::{
    AgentRole, ArtifactSink, ChatBackend, FsSink, MemorySink, Pipeline, PipelineConfig,
    PipelineReport,
};
use serde::Deserialize;
use tokio::sync::Mutex;

/// Shared state for the web form
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn ChatBackend>,
    config: PipelineConfig,
    persist: bool,
    // Persisted runs share one output directory
    run_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create state that keeps artifacts in memory
    pub fn new(backend: Arc<dyn ChatBackend>, config: PipelineConfig) -> Self {
        Self {
            backend,
            config,
            persist: false,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Write artifacts to the configured output directory
    pub fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    fn sink(&self) -> forge_core::Result<Arc<dyn ArtifactSink>> {
        if self.persist {
            let sink = FsSink::new(&self.config.output_dir);
            sink.prepare()?;
            Ok(Arc::new(sink))
        } else {
            Ok(Arc::new(MemorySink::new()))
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateForm {
    #[serde(default)]
    requirement: String,
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn index() -> Html<String> {
    Html(page("", None))
}

async fn generate(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> (StatusCode, Html<String>) {
    if form.requirement.trim().is_empty() {
        let body = "<div class=\"error\">Please enter your requirements first.</div>";
        return (
            StatusCode::BAD_REQUEST,
            Html(page(&form.requirement, Some(body.to_string()))),
        );
    }

    let _guard = if state.persist {
        Some(state.run_lock.lock().await)
    } else {
        None
    };

    let log = Arc::new(LogProgress::new());
    let result = match state.sink() {
        Ok(sink) => {
            Pipeline::from_config(&state.config, Arc::clone(&state.backend), sink)
                .with_progress(log.clone())
                .run(&form.requirement)
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            tracing::info!(passed = report.review_passed, "Web pipeline run completed");
            (
                StatusCode::OK,
                Html(page(&form.requirement, Some(render_report(&report, &log.lines())))),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Web pipeline run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(page(&form.requirement, Some(render_error(&e, &log.lines())))),
            )
        }
    }
}

fn page(requirement: &str, results: Option<String>) -> String {
    let mut agents = String::new();
    for (i, role) in AgentRole::all().iter().enumerate() {
        let _ = writeln!(
            agents,
            "<li><strong>{}. {}</strong> - {}</li>",
            i + 1,
            role.name(),
            role.description()
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Multi-Agent Coding System</title>
<style>
body {{ font-family: sans-serif; margin: 2rem auto; max-width: 72rem; }}
textarea {{ width: 100%; height: 12rem; }}
pre {{ background: #f4f4f4; padding: 1rem; overflow-x: auto; }}
.ok {{ color: #1a7f37; }}
.warn {{ color: #9a6700; }}
.error {{ color: #cf222e; }}
</style>
</head>
<body>
<h1>Automated Project Creation Using Agents</h1>
<h2>Generate code from natural language requirements</h2>
<details open>
<summary>About this system</summary>
<p>This system uses a multi-agent pipeline powered by LLMs to convert natural language requirements into working code.</p>
<ol style="list-style: none">
{agents}</ol>
</details>
<h2>Requirements Input</h2>
<form method="post" action="/generate">
<textarea name="requirement" placeholder="Example: Create a weather application that fetches current weather data from an API based on user-provided location...">{requirement}</textarea>
<p><button type="submit">Generate Solution</button></p>
</form>
{results}
</body>
</html>
"#,
        agents = agents,
        requirement = escape_html(requirement),
        results = results.unwrap_or_default(),
    )
}

fn section(title: &str, content: &str) -> String {
    format!("<h3>{}</h3>\n<pre>{}</pre>\n", title, escape_html(content))
}

/// A section with a download link for its artifact
fn artifact(title: &str, content: &str, label: &str, file_name: &str, mime: &str) -> String {
    let mut html = section(title, content);
    let _ = writeln!(html, "{}", download_link(content, label, file_name, mime));
    html
}

fn download_link(content: &str, label: &str, file_name: &str, mime: &str) -> String {
    format!(
        "<p><a download=\"{}\" href=\"data:{};charset=utf-8;base64,{}\">{}</a></p>",
        escape_html(file_name),
        mime,
        base64::engine::general_purpose::STANDARD.encode(content),
        escape_html(label)
    )
}

fn render_report(report: &PipelineReport, log: &[String]) -> String {
    let badge = if report.review_passed {
        "<p class=\"ok\">&#10003; Code passed review</p>".to_string()
    } else {
        format!(
            "<p class=\"warn\">&#9888; Code did not pass all reviews ({} revisions)</p>",
            report.revisions
        )
    };

    let mut html = format!(
        "<p>Solution generated in {:.2} seconds!</p>\n",
        report.elapsed.as_secs_f64()
    );
    html.push_str(&artifact(
        "Structured Requirements",
        &report.structured_requirement,
        "Download Structured Requirements",
        "structured_requirements.json",
        "application/json",
    ));
    html.push_str("<h3>Generated Code</h3>\n");
    html.push_str(&badge);
    let _ = writeln!(html, "<pre>{}</pre>", escape_html(&report.code));
    let _ = writeln!(
        html,
        "{}",
        download_link(&report.code, "Download Code", "main.py", "text/plain")
    );
    html.push_str(&artifact(
        "Documentation",
        &report.documentation,
        "Download Documentation",
        "documentation.md",
        "text/plain",
    ));
    html.push_str(&artifact(
        "Test Cases",
        &report.tests,
        "Download Tests",
        "test_main.py",
        "text/plain",
    ));
    html.push_str(&artifact(
        "UI Code",
        &report.ui_code,
        "Download UI Code",
        "app.py",
        "text/plain",
    ));
    html.push_str(&section("System Log", &log.join("\n")));
    html
}

fn render_error(error: &forge_core::Error, log: &[String]) -> String {
    let mut chain = format!("{:?}", error);
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let _ = write!(chain, "\nCaused by: {}", cause);
        source = std::error::Error::source(cause);
    }

    let mut html = format!(
        "<div class=\"error\">Error: {}</div>\n",
        escape_html(&error.to_string())
    );
    html.push_str(&format!("<pre>{}</pre>\n", escape_html(&chain)));
    html.push_str(&section("System Log", &log.join("\n")));
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
