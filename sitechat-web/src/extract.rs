//! Visible text and anchor extraction over a parsed HTML document.

use scraper::Html;

/// Elements whose text content never reaches the reader.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// All text nodes of `html` in document order, minus hidden elements.
///
/// Whitespace runs collapse to a single space and the result is trimmed.
///
/// ```
/// use sitechat_web::extract::visible_text;
///
/// let html = "<html><head><style>p { color: red }</style></head>
///             <body><h1>Products</h1>\n  <p>Sauce   Labs Backpack</p>
///             <script>track()</script></body></html>";
/// assert_eq!(visible_text(html), "Products Sauce Labs Backpack");
/// ```
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}

/// `href` values of every anchor that carries one, in document order.
///
/// Values are returned raw; resolution against a base is the caller's job.
pub fn anchor_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .tree
        .root()
        .descendants()
        .filter_map(|node| node.value().as_element())
        .filter(|el| el.name() == "a")
        .filter_map(|el| el.attr("href"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_elements_are_skipped_at_any_depth() {
        let html = r#"
            <body>
              <div>Visible<noscript><p>enable js</p></noscript></div>
              <template><span>later</span></template>
              <div><script type="text/javascript">var x = "<p>no</p>";</script>tail</div>
            </body>"#;
        assert_eq!(visible_text(html), "Visible tail");
    }

    #[test]
    fn entities_are_decoded_and_title_is_kept() {
        let html = "<html><head><title>Swag&nbsp;Labs</title></head><body>A &amp; B</body></html>";
        // Non-breaking space counts as whitespace.
        assert_eq!(visible_text(html), "Swag Labs A & B");
    }

    #[test]
    fn empty_or_markup_only_documents_yield_empty_text() {
        assert_eq!(visible_text(""), "");
        assert_eq!(visible_text("<div>  \n\t </div><script>x()</script>"), "");
    }

    #[test]
    fn anchors_in_document_order() {
        let html = r##"
            <nav><a href="/b.html">B</a></nav>
            <a>no href</a>
            <main><p><a href="https://other.example/x">X</a></p><a href="#top">top</a></main>
            <a href="">empty</a>"##;
        assert_eq!(
            anchor_hrefs(html),
            vec!["/b.html", "https://other.example/x", "#top", ""]
        );
    }

    #[test]
    fn no_anchors() {
        assert!(anchor_hrefs("<p>plain</p>").is_empty());
    }
}
