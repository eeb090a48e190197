use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;

use crate::analysis::AnalysisResult;
use crate::FlowError;

pub const LOADING_TEXT: &str = "Loading analysis…";
pub const HEADING: &str = "Loan Application Analysis";
pub const FOOTER: &str = "Generated by ServoLend AI";

/// What the analysis view is showing. Leaves `Loading` exactly once per mount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ViewState {
    #[default]
    Loading,
    Error { error: String },
    Ready(AnalysisResult),
}

impl ViewState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    /// Apply the outcome of a fetch cycle. Returns `false` and leaves the state untouched when
    /// the cycle has already settled.
    pub fn settle(&mut self, outcome: Result<AnalysisResult, FlowError>) -> bool {
        if self.is_terminal() {
            return false;
        }
        *self = Self::from(outcome);
        true
    }

    pub fn render(&self) -> String {
        match self {
            Self::Loading => format!(
                "<div class=\"loader\" aria-busy=\"true\">{LOADING_TEXT}</div>"
            ),
            Self::Error { error } => format!(
                "<div class=\"alert alert-error\" role=\"alert\"><p>Error: {}</p></div>",
                escape_text(error)
            ),
            Self::Ready(result) => {
                let mut out = String::new();
                out.push_str("<section class=\"analysis\">");
                out.push_str(&format!("<h2>{HEADING}</h2>"));
                out.push_str("<div class=\"prose\">");
                out.push_str(&render_markdown(&result.message));
                out.push_str("</div>");
                out.push_str(&format!("<footer>{FOOTER}</footer>"));
                out.push_str("</section>");
                out
            }
        }
    }
}

impl From<Result<AnalysisResult, FlowError>> for ViewState {
    fn from(outcome: Result<AnalysisResult, FlowError>) -> Self {
        match outcome {
            Ok(result) => Self::Ready(result),
            Err(err) => Self::Error {
                error: err.to_string(),
            },
        }
    }
}

/// Markdown to HTML. Raw HTML in the source is emitted as escaped text, never as markup.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(message: &str) -> ViewState {
        ViewState::Ready(AnalysisResult {
            message: message.to_string(),
        })
    }

    #[test]
    fn starts_loading() {
        assert_eq!(ViewState::default(), ViewState::Loading);
        assert!(ViewState::default().render().contains("aria-busy"));
    }

    #[test]
    fn settles_once() {
        let mut state = ViewState::Loading;

        assert!(state.settle(Err(FlowError::AnalysisRequestFailed)));
        assert!(!state.settle(Ok(AnalysisResult {
            message: "late".to_string()
        })));
        assert_eq!(
            state,
            ViewState::Error {
                error: "Failed to fetch analysis".to_string()
            }
        );
    }

    #[test]
    fn ready_renders_markdown_then_footer() {
        let html = ready("**Approved**").render();

        assert!(html.contains("<strong>Approved</strong>"));
        assert!(html.contains(HEADING));
        let body = html.find("<strong>").unwrap();
        let footer = html.find(FOOTER).unwrap();
        assert!(body < footer);
    }

    #[test]
    fn ready_escapes_raw_html_from_service() {
        let html =
            ready("**ok** <script>alert(1)</script>\n\n<img src=x onerror=alert(2)>").render();

        assert!(html.contains("<strong>ok</strong>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("&lt;img src=x onerror=alert(2)&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn error_renders_escaped_alert() {
        let state = ViewState::from(Err::<AnalysisResult, _>(FlowError::transport(
            "<script>bad</script>",
        )));
        let html = state.render();

        assert!(html.contains("role=\"alert\""));
        assert!(html.contains("Error: &lt;script&gt;bad&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn serializes_with_status_tag() {
        assert_eq!(
            serde_json::to_value(ready("ok")).unwrap(),
            serde_json::json!({"status": "ready", "message": "ok"})
        );
        assert_eq!(
            serde_json::to_value(ViewState::Error {
                error: "x".to_string()
            })
            .unwrap(),
            serde_json::json!({"status": "error", "error": "x"})
        );
    }
}
