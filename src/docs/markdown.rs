// HTML-to-Markdown conversion of manual pages, with links retargeted to the install directory
use std::path::Path;

use htmd::element_handler::Handlers;
use htmd::{Element, HtmlToMarkdown};
use scraper::{Html, Selector};
use url::Url;

/// A manual page converted for display outside the vendor help viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub title: Option<String>,
    pub markdown: String,
}

/// Build an htmd converter for a page located at `page_path`.
///
/// Relative `href`/`src` values are resolved against the page into absolute
/// `file://` URIs so images, stylesheets and cross-links keep working once
/// the markdown is shown somewhere else.
pub fn build_converter(page_path: &Path) -> HtmlToMarkdown {
    let base = Url::from_file_path(page_path).ok();
    let link_base = base.clone();

    HtmlToMarkdown::builder()
        .skip_tags(vec!["head", "script", "style", "noscript"])
        // <a>: retarget href, drop script links
        .add_handler(
            vec!["a"],
            move |handlers: &dyn Handlers, element: Element| {
                let content = handlers.walk_children(element.node).content;
                let Some(href) = attr(&element, "href") else {
                    return Some(content.into());
                };
                if href.trim_start().to_ascii_lowercase().starts_with("javascript:") {
                    return Some(content.into());
                }
                if content.trim().is_empty() {
                    return Some("".into());
                }
                let target = retarget(link_base.as_ref(), &href);
                Some(format!("[{}]({})", content, target).into())
            },
        )
        // <img>: retarget src
        .add_handler(
            vec!["img"],
            move |_handlers: &dyn Handlers, element: Element| {
                let src = attr(&element, "src")?;
                let alt = attr(&element, "alt").unwrap_or_default();
                let target = retarget(base.as_ref(), &src);
                Some(format!("![{}]({})", alt, target).into())
            },
        )
        .build()
}

/// Resolve a reference found in a page against that page's URI
pub fn retarget(base: Option<&Url>, reference: &str) -> String {
    let reference = reference.trim();
    if let Ok(absolute) = Url::parse(reference) {
        return absolute.to_string();
    }
    // Manuals written on Windows use backslashes in relative links
    let reference = reference.replace('\\', "/");
    match base.map(|b| b.join(&reference)) {
        Some(Ok(resolved)) => resolved.to_string(),
        _ => reference,
    }
}

/// Convert a manual page to markdown and pull out its `<title>`.
pub fn render_page(html: &str, page_path: &Path) -> RenderedPage {
    let converter = build_converter(page_path);
    let markdown = converter
        .convert(html)
        .unwrap_or_default()
        .trim()
        .to_string();
    RenderedPage {
        title: page_title(html),
        markdown,
    }
}

fn page_title(html: &str) -> Option<String> {
    use std::sync::OnceLock;
    static TITLE: OnceLock<Selector> = OnceLock::new();
    let selector = TITLE.get_or_init(|| Selector::parse("title").expect("invalid title selector"));

    let document = Html::parse_document(html);
    let title = document.select(selector).next()?;
    let text = title.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

fn attr(element: &Element, name: &str) -> Option<String> {
    element
        .attrs
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| a.value.to_string())
}
