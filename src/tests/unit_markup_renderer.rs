use crate::parser::markdown::make_id;
use crate::parser::{RenderError, Rendered, Renderer};

fn render(content: &str) -> Rendered {
    Renderer::markdown(false)
        .render(content)
        .expect("Markdown backend should always render")
}

// a lone leading heading is promoted to the document title and the
// remaining headings become sections
#[test]
fn test_title_promotion_and_sections() {
    let rendered = render("Hello\n=====\n\nHow are you?\n\nTopics\n------");

    assert_eq!(rendered.title.as_deref(), Some("Hello"));
    assert_eq!(rendered.subtitle, None);
    assert_eq!(
        rendered.body.as_deref(),
        Some(
            "<p>How are you?</p>\n\
             <div class=\"section\" id=\"topics\">\n\
             <h1>Topics</h1>\n\
             </div>\n"
        )
    );
    assert_eq!(
        rendered.html_title.as_deref(),
        Some("<h1 class=\"title\">Hello</h1>\n")
    );
    assert_eq!(
        rendered.html_body.as_deref(),
        Some(
            "<div class=\"document\">\n\
             <h1 class=\"title\">Hello</h1>\n\
             <p>How are you?</p>\n\
             <div class=\"section\" id=\"topics\">\n\
             <h1>Topics</h1>\n\
             </div>\n\
             </div>\n"
        )
    );
}

#[test]
fn test_section_body_like_docutils() {
    let rendered =
        render("\nHello\n=====\n\nThis is a dummy.\n\nSub section\n-----------\n\nYeah.");

    assert!(rendered.body.unwrap().contains(
        "<p>This is a dummy.</p>\n\
         <div class=\"section\" id=\"sub-section\">\n\
         <h1>Sub section</h1>\n<p>Yeah.</p>\n\
         </div>\n"
    ));
}

#[test]
fn test_subtitle_promotion() {
    let rendered = render("Title\n=====\n\nSub\n---\n\nText.");

    assert_eq!(rendered.title.as_deref(), Some("Title"));
    assert_eq!(rendered.subtitle.as_deref(), Some("Sub"));
    assert_eq!(
        rendered.html_subtitle.as_deref(),
        Some("<h2 class=\"subtitle\" id=\"sub\">Sub</h2>\n")
    );
    assert_eq!(rendered.body.as_deref(), Some("<p>Text.</p>\n"));
}

#[test]
fn test_nested_sections() {
    let rendered = render("# A\n\nintro\n\n## B\n\nb text\n\n### C\n\nc\n\n## D\n\nd");

    assert_eq!(rendered.title.as_deref(), Some("A"));
    assert_eq!(
        rendered.body.as_deref(),
        Some(
            "<p>intro</p>\n\
             <div class=\"section\" id=\"b\">\n<h1>B</h1>\n<p>b text</p>\n\
             <div class=\"section\" id=\"c\">\n<h2>C</h2>\n<p>c</p>\n</div>\n\
             </div>\n\
             <div class=\"section\" id=\"d\">\n<h1>D</h1>\n<p>d</p>\n</div>\n"
        )
    );
}

// two top-level headings means neither is the title
#[test]
fn test_no_title_with_sibling_headings() {
    let rendered = render("# One\n\nfirst\n\n# Two\n\nsecond");

    assert_eq!(rendered.title, None);
    assert_eq!(rendered.html_title, None);
    assert_eq!(
        rendered.body.as_deref(),
        Some(
            "<div class=\"section\" id=\"one\">\n<h1>One</h1>\n<p>first</p>\n</div>\n\
             <div class=\"section\" id=\"two\">\n<h1>Two</h1>\n<p>second</p>\n</div>\n"
        )
    );
}

#[test]
fn test_no_title_when_content_comes_first() {
    let rendered = render("Intro text.\n\n# Heading");
    assert_eq!(rendered.title, None);
    assert!(rendered.body.unwrap().starts_with("<p>Intro text.</p>\n"));
}

#[test]
fn test_duplicate_section_ids() {
    let rendered = render("# X\n\n## Same\n\none\n\n## Same\n\ntwo");
    let body = rendered.body.unwrap();
    assert!(body.contains("id=\"same\""));
    assert!(body.contains("id=\"same-1\""));
}

#[test]
fn test_title_is_escaped() {
    let rendered = render("# Fish & Chips <3\n\nyum");
    assert_eq!(rendered.title.as_deref(), Some("Fish &amp; Chips &lt;3"));
    assert_eq!(
        rendered.html_title.as_deref(),
        Some("<h1 class=\"title\">Fish &amp; Chips &lt;3</h1>\n")
    );
}

#[test]
fn test_plain_content_and_tables() {
    let rendered = render("content1");
    assert_eq!(rendered.title, None);
    assert_eq!(rendered.body.as_deref(), Some("<p>content1</p>\n"));

    let rendered = render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
    let body = rendered.body.unwrap();
    assert!(body.contains("<table>"));
    assert!(body.contains("<del>gone</del>"));
}

#[test]
fn test_headings_inside_blockquotes_are_not_sections() {
    let rendered = render("> # Quoted\n\ntext");
    assert_eq!(rendered.title, None);
    let body = rendered.body.unwrap();
    assert!(body.contains("<blockquote>"));
    assert!(!body.contains("class=\"section\""));
}

#[test]
fn test_rendering_is_deterministic() {
    let content = "Hello\n=====\n\n## A\n\n## A\n";
    assert_eq!(render(content), render(content));
}

#[test]
fn test_missing_backend_degrades_to_empty() {
    let renderer = Renderer::new(None, false);
    let rendered = renderer.render("# Hello").expect("Should degrade silently");
    assert_eq!(rendered, Rendered::default());

    let renderer = Renderer::from_name("restructuredtext", false);
    assert_eq!(renderer.render("# Hello"), Ok(Rendered::default()));
}

#[test]
fn test_missing_backend_is_fatal_when_strict() {
    let renderer = Renderer::new(None, true);
    assert_eq!(renderer.render("# Hello"), Err(RenderError::BackendMissing));
}

#[test]
fn test_make_id() {
    assert_eq!(make_id("Sub section"), "sub-section");
    assert_eq!(make_id("  Hello, World! "), "hello-world");
    assert_eq!(make_id("---"), "");
}
