//! Embedding directives ("shortcodes") placed in page content.
//!
//! A directive looks like `[tag]`, `[tag /]` or `[tag key="value" flag]`.
//! Doubling the brackets (`[[tag]]`) escapes it and emits `[tag]` literally.
//! Tags nobody registered are left in the content as written.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Attributes written on a directive. Positional values are keyed by their
/// index (`"0"`, `"1"`, ...).
pub type ShortcodeAttrs = BTreeMap<String, String>;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\[?)([A-Za-z0-9_-]+)(\s[^\[\]]*?)?(/)?\](\]?)")
        .expect("directive pattern is valid")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"([A-Za-z0-9_-]+)\s*=\s*"([^"]*)"|([A-Za-z0-9_-]+)\s*=\s*'([^']*)'|([A-Za-z0-9_-]+)\s*=\s*([^\s'"]+)|"([^"]*)"|'([^']*)'|(\S+)"#,
    )
    .expect("attribute pattern is valid")
});

/// A handler that replaces its directive with rendered markup.
pub trait Shortcode: Send + Sync {
    fn tag(&self) -> &'static str;

    fn render(&self, attrs: &ShortcodeAttrs) -> anyhow::Result<String>;
}

/// Registered directive handlers, keyed by tag.
#[derive(Clone, Default)]
pub struct ShortcodeSet {
    handlers: BTreeMap<&'static str, Arc<dyn Shortcode>>,
}

impl ShortcodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. A later handler for the same tag replaces the
    /// earlier one.
    pub fn register(&mut self, shortcode: Arc<dyn Shortcode>) {
        let tag = shortcode.tag();
        if self.handlers.insert(tag, shortcode).is_some() {
            tracing::warn!(tag, "shortcode handler replaced");
        } else {
            tracing::debug!(tag, "shortcode registered");
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Render a single directive by tag, outside of page content.
    pub fn render(&self, tag: &str, attrs: &ShortcodeAttrs) -> Option<anyhow::Result<String>> {
        self.handlers.get(tag).map(|handler| handler.render(attrs))
    }

    /// Replace every registered directive in `content`.
    ///
    /// A failing handler is logged and its directive is replaced by nothing,
    /// so one broken directive never fails the whole page.
    pub fn expand(&self, content: &str) -> String {
        DIRECTIVE
            .replace_all(content, |caps: &Captures<'_>| self.expand_one(caps))
            .into_owned()
    }

    fn expand_one(&self, caps: &Captures<'_>) -> String {
        let whole = &caps[0];
        let tag = &caps[2];
        let Some(handler) = self.handlers.get(tag) else {
            return whole.to_string();
        };

        let open = caps.get(1).map_or("", |m| m.as_str());
        let close = caps.get(5).map_or("", |m| m.as_str());
        if !open.is_empty() && !close.is_empty() {
            return whole[1..whole.len() - 1].to_string();
        }

        let attrs = parse_attrs(caps.get(3).map_or("", |m| m.as_str()));
        match handler.render(&attrs) {
            Ok(markup) => format!("{open}{markup}{close}"),
            Err(error) => {
                tracing::error!(tag, error = %error, "shortcode render failed");
                format!("{open}{close}")
            }
        }
    }
}

/// Parse the attribute text of a directive.
pub fn parse_attrs(text: &str) -> ShortcodeAttrs {
    let mut attrs = ShortcodeAttrs::new();
    let mut position = 0usize;

    for caps in ATTRIBUTE.captures_iter(text) {
        let named = [(1, 2), (3, 4), (5, 6)]
            .into_iter()
            .find_map(|(k, v)| Some((caps.get(k)?.as_str(), caps.get(v)?.as_str())));

        if let Some((key, value)) = named {
            attrs.insert(key.to_lowercase(), value.to_string());
            continue;
        }

        let value = [7, 8, 9]
            .into_iter()
            .find_map(|i| caps.get(i))
            .map_or("", |m| m.as_str());
        if value == "/" {
            continue;
        }
        attrs.insert(position.to_string(), value.to_string());
        position += 1;
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Shortcode for Echo {
        fn tag(&self) -> &'static str {
            "echo"
        }

        fn render(&self, attrs: &ShortcodeAttrs) -> anyhow::Result<String> {
            let pairs: Vec<String> = attrs.iter().map(|(k, v)| format!("{k}={v}")).collect();
            Ok(format!("<echo {}>", pairs.join(",")))
        }
    }

    struct Broken;

    impl Shortcode for Broken {
        fn tag(&self) -> &'static str {
            "broken"
        }

        fn render(&self, _attrs: &ShortcodeAttrs) -> anyhow::Result<String> {
            anyhow::bail!("storage offline")
        }
    }

    fn set() -> ShortcodeSet {
        let mut set = ShortcodeSet::new();
        set.register(Arc::new(Echo));
        set.register(Arc::new(Broken));
        set
    }

    #[test]
    fn test_expands_bare_directive() {
        assert_eq!(set().expand("a [echo] b"), "a <echo > b");
    }

    #[test]
    fn test_expands_self_closing_directive() {
        assert_eq!(set().expand("[echo /]"), "<echo >");
        assert_eq!(set().expand("[echo/]"), "<echo >");
    }

    #[test]
    fn test_passes_attributes() {
        let out = set().expand(r#"[echo genre="sci-fi" limit=3 order='asc' flag]"#);
        assert_eq!(out, "<echo 0=flag,genre=sci-fi,limit=3,order=asc>");
    }

    #[test]
    fn test_escaped_directive_renders_literally() {
        assert_eq!(set().expand("see [[echo]] here"), "see [echo] here");
    }

    #[test]
    fn test_unknown_directive_is_left_alone() {
        let content = "[gallery ids=\"1,2\"] and [[other]]";
        assert_eq!(set().expand(content), content);
    }

    #[test]
    fn test_similar_tag_prefix_is_not_matched() {
        assert_eq!(set().expand("[echo-more]"), "[echo-more]");
    }

    #[test]
    fn test_failing_handler_yields_empty_replacement() {
        assert_eq!(set().expand("<p>[broken]</p>"), "<p></p>");
    }

    #[test]
    fn test_expands_every_occurrence() {
        assert_eq!(set().expand("[echo][echo]"), "<echo ><echo >");
    }

    #[test]
    fn test_attribute_names_are_lowercased() {
        let attrs = parse_attrs(r#" Genre="Fiction""#);
        assert_eq!(attrs.get("genre").map(String::as_str), Some("Fiction"));
    }

    #[test]
    fn test_tags_are_listed_sorted() {
        assert_eq!(set().tags(), ["broken", "echo"]);
    }
}
