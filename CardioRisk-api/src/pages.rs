//! Server-rendered HTML for the screening form and its result

use std::collections::HashMap;
use std::fmt::Write;

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

use cardio_risk_domain::entities::{ExplanationOutcome, RiskAssessment};

/// Form inputs in display order: name, label, input attributes
const FORM_INPUTS: [(&str, &str, &str); 11] = [
    ("age", "Age (years)", r#"type="number" step="any" min="1" max="120""#),
    ("gender", "Gender (1 = female, 2 = male)", r#"type="number" min="1" max="2""#),
    ("ap_hi", "Systolic blood pressure", r#"type="number" min="50" max="300""#),
    ("ap_lo", "Diastolic blood pressure", r#"type="number" min="30" max="200""#),
    ("cholesterol", "Cholesterol (1 = normal, 2 = above, 3 = well above)", r#"type="number" min="1" max="3""#),
    ("gluc", "Glucose (1 = normal, 2 = above, 3 = well above)", r#"type="number" min="1" max="3""#),
    ("smoke", "Smoker (0 = no, 1 = yes)", r#"type="number" min="0" max="1""#),
    ("alco", "Alcohol intake (0 = no, 1 = yes)", r#"type="number" min="0" max="1""#),
    ("active", "Physically active (0 = no, 1 = yes)", r#"type="number" min="0" max="1""#),
    ("bmi", "BMI", r#"type="number" step="any" min="10" max="80""#),
    ("relatives", "First-degree relatives with heart disease", r#"type="number" min="0" max="20""#),
];

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
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

/// Whether a link or image destination is relative or uses http, https or mailto
fn is_safe_destination(destination: &str) -> bool {
    let cleaned: String = destination
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match cleaned.find(':') {
        None => true,
        Some(idx) => {
            let scheme = &cleaned[..idx];
            scheme.contains(|c| matches!(c, '/' | '?' | '#'))
                || matches!(scheme, "http" | "https" | "mailto")
        }
    }
}

/// Render Markdown to HTML; raw HTML in the source is shown as text
///
/// Links and images with any other scheme keep only their text.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    // One entry per open link or image: whether its tags are dropped
    let mut dropped: Vec<bool> = Vec::new();
    let parser = Parser::new_ext(markdown, options).filter_map(move |event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Link { ref dest_url, .. }) | Event::Start(Tag::Image { ref dest_url, .. }) => {
            let unsafe_destination = !is_safe_destination(dest_url);
            dropped.push(unsafe_destination);
            (!unsafe_destination).then_some(event)
        }
        Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
            (!dropped.pop().unwrap_or(false)).then_some(event)
        }
        other => Some(other),
    });

    let mut rendered = String::new();
    html::push_html(&mut rendered, parser);
    rendered
}

/// HTML for an explanation outcome
pub fn render_explanation(outcome: &ExplanationOutcome) -> String {
    match outcome {
        ExplanationOutcome::Generated { text } => render_markdown(text),
        ExplanationOutcome::Unavailable { .. } => {
            format!("<p class=\"fallback\">{}</p>\n", escape_html(outcome.display_text()))
        }
    }
}

/// The form page, optionally with an error banner
pub fn render_form_page(values: &HashMap<String, String>, error: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(message) = error {
        let _ = writeln!(body, "<p class=\"error\" role=\"alert\">{}</p>", escape_html(message));
    }
    body.push_str(&render_form(values));
    layout(&body)
}

/// The form page followed by the assessment result
pub fn render_result_page(values: &HashMap<String, String>, assessment: &RiskAssessment) -> String {
    let mut body = render_form(values);

    let _ = writeln!(body, "<section class=\"result\">");
    let _ = writeln!(
        body,
        "<h2>Estimated cardiovascular risk: {:.2}%</h2>",
        assessment.risk_percent
    );
    let _ = writeln!(
        body,
        "<p class=\"category category-{}\">{}</p>",
        escape_html(&format!("{:?}", assessment.category).to_lowercase()),
        escape_html(assessment.category.label())
    );
    if assessment.family_history {
        let _ = writeln!(
            body,
            "<p class=\"family\">Family history adjustment applied (x{}).</p>",
            assessment.multiplier
        );
    }

    let _ = writeln!(body, "<h3>Top contributing factors</h3>\n<ol>");
    for factor in &assessment.top_factors {
        let _ = writeln!(body, "<li>{}</li>", escape_html(&factor.name));
    }
    let _ = writeln!(body, "</ol>");

    let _ = writeln!(body, "<h3>Explanation</h3>\n<div class=\"explanation\">");
    body.push_str(&render_explanation(&assessment.explanation));
    let _ = writeln!(body, "</div>\n</section>");

    layout(&body)
}

/// A bare error page for failures that are not about the form input
pub fn render_error_page(message: &str) -> String {
    layout(&format!("<p class=\"error\" role=\"alert\">{}</p>\n", escape_html(message)))
}

fn render_form(values: &HashMap<String, String>) -> String {
    let mut form = String::from("<form method=\"post\" action=\"/predict\">\n");
    for (name, label, attrs) in FORM_INPUTS {
        let value = values.get(name).map(|v| escape_html(v)).unwrap_or_default();
        let _ = writeln!(
            form,
            "<label for=\"{name}\">{label}</label>\n<input id=\"{name}\" name=\"{name}\" {attrs} value=\"{value}\" required>",
        );
    }
    form.push_str("<button type=\"submit\">Assess risk</button>\n</form>\n");
    form
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Cardiovascular Risk Screening</title>\n\
         </head>\n\
         <body>\n\
         <h1>Cardiovascular Risk Screening</h1>\n\
         {}\
         <footer><p>This tool provides probabilistic risk screening. It is NOT a medical diagnosis.</p></footer>\n\
         </body>\n\
         </html>\n",
        body
    )
}
