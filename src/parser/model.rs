use serde::Serialize;

/// Structured output of rendering page content.
///
/// Every field is optional: an absent rendering backend yields the empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: Option<String>,
    pub html_title: Option<String>,
    pub html_subtitle: Option<String>,
    pub html_body: Option<String>,
}

