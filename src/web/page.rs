//! Server-rendered HTML for the prediction form

use crate::submission::Outcome;
use crate::types::{InputBounds, PolicyHolder, Region, Sex, Smoker};
use std::fmt::Write;

pub const TITLE: &str = "Medical Insurance Cost Predictor";

const STYLE: &str = "body{font-family:sans-serif;max-width:42rem;margin:2rem auto;padding:0 1rem;color:#262730}\
label{display:block;margin-top:1rem;font-weight:600}\
input,select{width:100%;padding:.4rem;margin-top:.25rem;box-sizing:border-box}\
button{margin-top:1.5rem;padding:.5rem 1rem}\
.banner{margin-top:1.5rem;padding:1rem;border-radius:.4rem}\
.success{background:#dff5e3}.warning{background:#fff6d6}.error{background:#fde2e2}";

/// Escape text for use in HTML content and attribute values
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Result banner shown under the form
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub kind: &'static str,
    pub html: String,
}

impl Banner {
    pub fn warning(text: &str) -> Self {
        Self {
            kind: "warning",
            html: multiline(text),
        }
    }
}

impl From<&Outcome> for Banner {
    fn from(outcome: &Outcome) -> Self {
        let html = match outcome {
            Outcome::Estimate(estimate) => format!(
                "Estimated Insurance Cost: <strong>{}</strong>",
                escape(&estimate.display)
            ),
            other => multiline(&other.message()),
        };
        Self {
            kind: outcome.kind(),
            html,
        }
    }
}

fn multiline(text: &str) -> String {
    escape(text).replace('\n', "<br>")
}

/// Full page: form with the given values plus an optional result banner
pub fn render_form(bounds: &InputBounds, record: &PolicyHolder, banner: Option<&Banner>) -> String {
    let mut body = String::new();
    body.push_str("<h2>Enter Your Information</h2>\n");
    body.push_str("<form method=\"post\" action=\"/predict\">\n");

    number_input(
        &mut body,
        "age",
        "Age",
        &record.age.to_string(),
        &bounds.age.range.start().to_string(),
        &bounds.age.range.end().to_string(),
        &bounds.age.step.to_string(),
    );
    number_input(
        &mut body,
        "bmi",
        "BMI (Body Mass Index)",
        &format!("{:.1}", record.bmi),
        &format!("{:.1}", bounds.bmi.range.start()),
        &format!("{:.1}", bounds.bmi.range.end()),
        &format!("{}", bounds.bmi.step),
    );
    number_input(
        &mut body,
        "children",
        "Number of Children",
        &record.children.to_string(),
        &bounds.children.range.start().to_string(),
        &bounds.children.range.end().to_string(),
        &bounds.children.step.to_string(),
    );
    select(
        &mut body,
        "sex",
        "Sex",
        Sex::ALL.iter().map(|s| s.as_str()),
        record.sex.as_str(),
    );
    select(
        &mut body,
        "smoker",
        "Smoker",
        Smoker::ALL.iter().map(|s| s.as_str()),
        record.smoker.as_str(),
    );
    select(
        &mut body,
        "region",
        "Region",
        Region::ALL.iter().map(|r| r.as_str()),
        record.region.as_str(),
    );

    body.push_str("<button type=\"submit\">Predict Insurance Cost</button>\n</form>\n");

    if let Some(banner) = banner {
        let _ = writeln!(
            body,
            "<div class=\"banner {}\" role=\"status\">{}</div>",
            banner.kind, banner.html
        );
    }

    body.push_str(ABOUT);
    document(&body)
}

/// Page shown when the model could not be loaded at startup
pub fn render_unavailable(message: &str) -> String {
    document(&format!(
        "<div class=\"banner error\" role=\"alert\">{}</div>\n",
        multiline(message)
    ))
}

fn number_input(
    out: &mut String,
    name: &str,
    label: &str,
    value: &str,
    min: &str,
    max: &str,
    step: &str,
) {
    let _ = writeln!(
        out,
        "<label for=\"{name}\">{label}</label>\n\
         <input type=\"number\" id=\"{name}\" name=\"{name}\" value=\"{value}\" \
         min=\"{min}\" max=\"{max}\" step=\"{step}\" required>",
        name = name,
        label = escape(label),
        value = escape(value),
        min = min,
        max = max,
        step = step,
    );
}

fn select<'a>(
    out: &mut String,
    name: &str,
    label: &str,
    options: impl Iterator<Item = &'a str>,
    selected: &str,
) {
    let _ = writeln!(
        out,
        "<label for=\"{name}\">{label}</label>\n<select id=\"{name}\" name=\"{name}\">",
        name = name,
        label = escape(label)
    );
    for option in options {
        let marker = if option == selected { " selected" } else { "" };
        let _ = writeln!(
            out,
            "<option value=\"{value}\"{marker}>{value}</option>",
            value = escape(option),
            marker = marker
        );
    }
    out.push_str("</select>\n");
}

fn document(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = TITLE,
        style = STYLE,
        body = body
    )
}

const ABOUT: &str = "<hr>\n<h3>About This App</h3>\n\
<p>This application estimates <strong>medical insurance costs</strong> based on a \
machine learning model trained on features like:</p>\n\
<ul><li>Age</li><li>Sex</li><li>BMI</li><li>Number of children</li>\
<li>Smoking status</li><li>Residential region</li></ul>\n\
<p>Make sure to enter realistic values to get a reliable prediction.</p>\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CostEstimate;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_form_carries_bounds_and_defaults() {
        let html = render_form(&InputBounds::with_bmi_max(100.0), &PolicyHolder::default(), None);

        assert!(html.contains("<title>Medical Insurance Cost Predictor</title>"));
        assert!(html.contains("name=\"age\" value=\"30\" min=\"18\" max=\"100\" step=\"1\""));
        assert!(html.contains("name=\"bmi\" value=\"25.0\" min=\"10.0\" max=\"100.0\" step=\"0.1\""));
        assert!(html.contains("name=\"children\" value=\"0\" min=\"0\" max=\"10\" step=\"1\""));
        assert!(html.contains("<option value=\"northeast\" selected>"));
        assert!(html.contains("Predict Insurance Cost"));
        assert!(html.contains("About This App"));
        assert!(!html.contains("class=\"banner"));
    }

    #[test]
    fn test_estimate_banner() {
        let outcome = Outcome::Estimate(CostEstimate::new(5000.0));
        let banner = Banner::from(&outcome);
        assert_eq!(banner.kind, "success");
        assert_eq!(banner.html, "Estimated Insurance Cost: <strong>$5,000.00</strong>");
    }

    #[test]
    fn test_error_banner_is_escaped() {
        let outcome = Outcome::Failed("bad <input>".to_string());
        let banner = Banner::from(&outcome);
        assert_eq!(banner.kind, "error");
        assert_eq!(
            banner.html,
            "An error occurred during prediction:<br><br>bad &lt;input&gt;"
        );
    }

    #[test]
    fn test_unavailable_page_has_no_form() {
        let html = render_unavailable("Model file not found.");
        assert!(html.contains("Model file not found."));
        assert!(!html.contains("<form"));
    }
}
