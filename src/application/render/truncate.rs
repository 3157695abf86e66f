//! Word-budget truncation of rendered HTML.
//!
//! A word is a maximal run of non-whitespace characters inside one text
//! node; markup never counts and always separates words. When the budget is
//! exceeded, output stops right after the last kept word, `…` is appended to
//! it, everything that follows is dropped, and every element still open at
//! the cut is closed.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::{ContentType, EndTag};
use lol_html::{RewriteStrSettings, doc_comments, doc_text, element, rewrite_str};

use super::RenderError;

const ELLIPSIS: &str = "…";

/// Elements whose start tag implicitly ends an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "main", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Elements that stop the search for an implicitly ended `<p>`.
const P_SCOPE: &[&str] = &["button", "caption", "html", "table", "td", "template", "th"];

type EndTagHandler =
    Box<dyn FnOnce(&mut EndTag<'_>) -> Result<(), Box<dyn std::error::Error + Send + Sync>>>;

/// Truncate `html` to at most `words` words.
///
/// Input that fits the budget is returned byte-for-byte. A budget of zero
/// yields an empty string for any input containing words.
pub fn truncate_html_words(html: &str, words: usize) -> Result<String, RenderError> {
    let total = count_words(html)?;
    if total <= words {
        return Ok(html.to_string());
    }
    if words == 0 {
        return Ok(String::new());
    }

    let state = Rc::new(RefCell::new(CutState::new(words)));

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", {
                let state = Rc::clone(&state);
                move |el| {
                    if state.borrow().cut {
                        el.remove();
                        return Ok(());
                    }
                    let name = el.tag_name();
                    state.borrow_mut().close_implied_by(&name);
                    let Some(handlers) = el.end_tag_handlers() else {
                        return Ok(());
                    };
                    state.borrow_mut().open.push(name);
                    let state = Rc::clone(&state);
                    let on_end: EndTagHandler = Box::new(move |end: &mut EndTag<'_>| {
                        state.borrow_mut().close(&end.name());
                        Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
                    });
                    handlers.push(on_end);
                    Ok(())
                }
            })],
            document_content_handlers: vec![
                doc_text!({
                    let state = Rc::clone(&state);
                    move |chunk| {
                        let mut state = state.borrow_mut();
                        if state.cut {
                            chunk.remove();
                            return Ok(());
                        }

                        let text = chunk.as_str().to_string();
                        let mut at = state.cursor.cut_point(&text);
                        if at.is_none() && chunk.last_in_text_node() && state.cursor.end_node() {
                            at = Some(text.len());
                        }
                        if let Some(index) = at {
                            state.cut = true;
                            let kept = format!("{}{ELLIPSIS}", &text[..index]);
                            chunk.replace(&kept, ContentType::Html);
                        }
                        Ok(())
                    }
                }),
                doc_comments!({
                    let state = Rc::clone(&state);
                    move |comment| {
                        if state.borrow().cut {
                            comment.remove();
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Malformed {
        message: err.to_string(),
    })?;

    let mut output = rewritten;
    let state = state.borrow();
    for name in state.open.iter().rev() {
        output.push_str("</");
        output.push_str(name);
        output.push('>');
    }
    Ok(output)
}

/// Number of words in the text content of `html`.
pub(crate) fn count_words(html: &str) -> Result<usize, RenderError> {
    let cursor = Rc::new(RefCell::new(WordCursor::new(usize::MAX)));

    rewrite_str(
        html,
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!({
                let cursor = Rc::clone(&cursor);
                move |chunk| {
                    let mut cursor = cursor.borrow_mut();
                    let _ = cursor.cut_point(chunk.as_str());
                    if chunk.last_in_text_node() {
                        cursor.end_node();
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Malformed {
        message: err.to_string(),
    })?;

    let seen = cursor.borrow().seen;
    Ok(seen)
}

struct CutState {
    cursor: WordCursor,
    cut: bool,
    /// Elements opened before the cut whose end tag has not been seen yet.
    open: Vec<String>,
}

impl CutState {
    fn new(budget: usize) -> Self {
        Self {
            cursor: WordCursor::new(budget),
            cut: false,
            open: Vec::new(),
        }
    }

    /// An end tag closes the matching element and everything opened inside it.
    fn close(&mut self, name: &str) {
        if let Some(index) = self.open.iter().rposition(|open| open == name) {
            self.open.truncate(index);
        }
    }

    /// Forget elements whose end tag the input may omit before `name` starts.
    fn close_implied_by(&mut self, name: &str) {
        let implied = match name {
            "li" => self.find_open(&["li"], &["ol", "ul", "menu"]),
            "dt" | "dd" => self.find_open(&["dt", "dd"], &["dl"]),
            _ if CLOSES_P.contains(&name) => self.find_open(&["p"], P_SCOPE),
            _ => None,
        };
        if let Some(index) = implied {
            self.open.truncate(index);
        }
    }

    fn find_open(&self, targets: &[&str], boundaries: &[&str]) -> Option<usize> {
        for (index, open) in self.open.iter().enumerate().rev() {
            if targets.contains(&open.as_str()) {
                return Some(index);
            }
            if boundaries.contains(&open.as_str()) {
                return None;
            }
        }
        None
    }
}

/// Streaming word counter that survives text split across chunks.
struct WordCursor {
    budget: usize,
    seen: usize,
    in_word: bool,
}

impl WordCursor {
    fn new(budget: usize) -> Self {
        Self {
            budget,
            seen: 0,
            in_word: false,
        }
    }

    /// Feed the next piece of a text node. Returns the byte offset right
    /// after the last word that fits the budget, once that word has ended.
    fn cut_point(&mut self, text: &str) -> Option<usize> {
        for (index, ch) in text.char_indices() {
            if ch.is_whitespace() {
                if self.in_word && self.seen == self.budget {
                    self.in_word = false;
                    return Some(index);
                }
                self.in_word = false;
            } else if !self.in_word {
                self.in_word = true;
                self.seen += 1;
            }
        }
        None
    }

    /// Close the current text node. True when the last word that fits the
    /// budget ends exactly at the node boundary.
    fn end_node(&mut self) -> bool {
        let ends_budget = self.in_word && self.seen == self.budget;
        self.in_word = false;
        ends_budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (1..=n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn short_input_is_returned_unchanged() {
        let html = "<p>Just  a <em>few</em>\nwords.</p><!-- note -->";
        assert_eq!(truncate_html_words(html, 85).expect("truncate"), html);
    }

    #[test]
    fn exact_budget_is_not_truncated() {
        let html = format!("<p>{}</p>", words(85));
        assert_eq!(truncate_html_words(&html, 85).expect("truncate"), html);
    }

    #[test]
    fn cuts_after_last_kept_word_and_closes_tags() {
        let html = "<div><p>one two <strong>three four</strong> five</p></div>";

        let truncated = truncate_html_words(html, 3).expect("truncate");

        assert_eq!(
            truncated,
            "<div><p>one two <strong>three…</strong></p></div>"
        );
    }

    #[test]
    fn cut_at_text_node_end_appends_ellipsis_to_the_word() {
        let html = "<p>one <em>two</em> three</p>";

        let truncated = truncate_html_words(html, 2).expect("truncate");

        assert_eq!(truncated, "<p>one <em>two…</em></p>");
    }

    #[test]
    fn drops_elements_and_comments_after_the_cut() {
        let html = "<p>alpha beta gamma</p><!-- hidden --><img src=\"x.png\"><p>delta</p>";

        let truncated = truncate_html_words(html, 2).expect("truncate");

        assert_eq!(truncated, "<p>alpha beta…</p>");
    }

    #[test]
    fn closes_elements_the_input_left_open() {
        let html = "<section><p>one two three";

        let truncated = truncate_html_words(html, 2).expect("truncate");

        assert_eq!(truncated, "<section><p>one two…</p></section>");
    }

    #[test]
    fn end_tag_also_closes_elements_left_open_inside_it() {
        let html = "<ul><li>a b<li>c d</ul><p>e f</p>";

        let truncated = truncate_html_words(html, 3).expect("truncate");

        assert_eq!(truncated, "<ul><li>a b<li>c…</ul>");
    }

    #[test]
    fn new_paragraph_ends_the_previous_one() {
        let html = "<p>one<p>two three";

        let truncated = truncate_html_words(html, 2).expect("truncate");

        assert_eq!(truncated, "<p>one<p>two…</p>");
    }

    #[test]
    fn inner_list_items_do_not_close_outer_ones() {
        let html = "<ul><li>a<ul><li>b<li>c d</ul></li></ul>";

        let truncated = truncate_html_words(html, 3).expect("truncate");

        assert_eq!(truncated, "<ul><li>a<ul><li>b<li>c…</ul></li></ul>");
    }

    #[test]
    fn void_elements_are_not_closed() {
        let html = "<p>one<br>two three</p>";

        let truncated = truncate_html_words(html, 2).expect("truncate");

        assert_eq!(truncated, "<p>one<br>two…</p>");
    }

    #[test]
    fn output_never_exceeds_budget() {
        let html = format!("<p>{}</p><ul><li>{}</li></ul>", words(60), words(60));

        let truncated = truncate_html_words(&html, 85).expect("truncate");

        assert_eq!(count_words(&truncated).expect("count"), 85);
        assert!(truncated.ends_with("w25…</li></ul>"), "{truncated}");
    }

    #[test]
    fn truncation_is_deterministic() {
        let html = format!("<article><h2>Title</h2><p>{}</p></article>", words(200));

        let first = truncate_html_words(&html, 85).expect("truncate");
        let second = truncate_html_words(&html, 85).expect("truncate");

        assert_eq!(first, second);
    }

    #[test]
    fn zero_budget_yields_empty_output() {
        assert_eq!(truncate_html_words("<p>a b</p>", 0).expect("truncate"), "");
        assert_eq!(truncate_html_words("<p></p>", 0).expect("truncate"), "<p></p>");
    }

    #[test]
    fn markup_separates_words() {
        assert_eq!(count_words("<p>one<b>two</b>three</p>").expect("count"), 3);
        assert_eq!(count_words("<p title=\"not counted\">  </p>").expect("count"), 0);
    }
}
