use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use comrak::options::Options;
use comrak::{Arena, format_html, parse_document};

use crate::domain::entities::Post;

use super::RenderError;

/// Comrak renderer with an Ammonia allow-list applied to its output.
pub struct MarkdownRenderer {
    options: Options<'static>,
    sanitizer: AmmoniaBuilder<'static>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self {
            options: default_options(),
            sanitizer: build_sanitizer(),
        }
    }

    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);

        let mut html = String::new();
        format_html(root, &self.options, &mut html).map_err(|err| RenderError::Markdown {
            message: err.to_string(),
        })?;

        Ok(self.sanitizer.clean(&html).to_string())
    }

    /// HTML for a post body. Bodies beginning with `<` are already HTML and
    /// are returned as stored.
    pub fn render_body(&self, post: &Post) -> Result<String, RenderError> {
        if post.body_is_html() {
            return Ok(post.body.clone());
        }
        self.render(&post.body)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn default_options() -> Options<'static> {
    let mut options = Options::default();

    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.superscript = true;
    ext.footnotes = true;
    ext.description_lists = true;

    let render = &mut options.render;
    render.github_pre_lang = true;
    // Raw HTML is kept here and filtered by the sanitizer afterwards.
    render.r#unsafe = true;

    options
}

fn build_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "blockquote",
        "br",
        "code",
        "dd",
        "del",
        "div",
        "dl",
        "dt",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "input",
        "kbd",
        "li",
        "ol",
        "p",
        "pre",
        "s",
        "section",
        "span",
        "strong",
        "sub",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
    ]);
    builder.tags(tags);

    builder.add_generic_attributes(&["class", "id", "title", "lang"]);
    builder.add_tag_attributes("img", &["alt", "width", "height", "loading"]);
    builder.add_tag_attributes("code", &["class", "data-language"]);
    builder.add_tag_attributes("pre", &["lang"]);
    builder.add_tag_attributes("th", &["align"]);
    builder.add_tag_attributes("td", &["align"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);

    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Author;

    fn post_with_body(body: &str) -> Post {
        Post {
            id: "p1".into(),
            title: "Title".into(),
            body: body.into(),
            categories: Vec::new(),
            tags: Vec::new(),
            author: Author {
                name: "Ada".into(),
                email: "ada@example.com".into(),
            },
            thumbnail: String::new(),
            created_at: 0,
        }
    }

    #[test]
    fn renders_markdown_emphasis_and_headings() {
        let html = MarkdownRenderer::new()
            .render("# Hello\n\nSome *emphasis* here.")
            .expect("render markdown");

        assert!(html.contains("<h1>Hello</h1>"), "{html}");
        assert!(html.contains("<em>emphasis</em>"), "{html}");
    }

    #[test]
    fn renders_tables() {
        let html = MarkdownRenderer::new()
            .render("| a | b |\n|---|---|\n| 1 | 2 |\n")
            .expect("render table");

        assert!(html.contains("<table>"), "{html}");
        assert!(html.contains("<td>1</td>"), "{html}");
    }

    #[test]
    fn strips_scripts_from_inline_html() {
        let html = MarkdownRenderer::new()
            .render("hello <script>alert(1)</script>")
            .expect("render markdown");

        assert!(!html.contains("<script"), "{html}");
        assert!(html.contains("hello"), "{html}");
    }

    #[test]
    fn html_bodies_pass_through_unchanged() {
        let body = "<div class=\"raw\"><script>kept()</script></div>";
        let rendered = MarkdownRenderer::new()
            .render_body(&post_with_body(body))
            .expect("pass through");

        assert_eq!(rendered, body);
    }

    #[test]
    fn markdown_bodies_are_rendered() {
        let rendered = MarkdownRenderer::new()
            .render_body(&post_with_body("plain **bold**"))
            .expect("render body");

        assert_eq!(rendered.trim(), "<p>plain <strong>bold</strong></p>");
    }
}
