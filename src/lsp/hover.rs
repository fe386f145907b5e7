//! Hover content formatting for the LSP server.

use url::Url;

use crate::session::Lookup;

/// Format a keyword lookup as markdown for a hover tooltip.
///
/// `page` is the located manual page, linked as "More information" when known.
pub fn build_hover_content(lookup: &Lookup, page: Option<&Url>) -> String {
    let Some(record) = &lookup.record else {
        return format!("No documentation found for keyword: {}", lookup.keyword);
    };

    let mut parts = vec![format!("📖 **{}**", lookup.keyword)];

    if !record.description.is_empty() {
        parts.push(record.description.clone());
    }

    if let Some(url) = page {
        parts.push(format!("🔗 [More information]({url})"));
    }

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeywordRecord;

    fn make_lookup(description: Option<&str>) -> Lookup {
        Lookup {
            keyword: "PERMI".to_string(),
            record: description.map(|d| KeywordRecord {
                description: d.to_string(),
                file: "imex/permi.htm".to_string(),
            }),
        }
    }

    #[test]
    fn full_result() {
        let url = Url::parse("file:///opt/cmg/2023.10/imex/permi.htm").unwrap();
        let md = build_hover_content(&make_lookup(Some("Permeability in I")), Some(&url));
        assert!(md.contains("**PERMI**"));
        assert!(md.contains("Permeability in I"));
        assert!(md.contains("[More information](file:///opt/cmg/2023.10/imex/permi.htm)"));
    }

    #[test]
    fn page_not_installed() {
        let md = build_hover_content(&make_lookup(Some("Permeability in I")), None);
        assert!(md.contains("Permeability in I"));
        assert!(!md.contains("More information"));
    }

    #[test]
    fn empty_description() {
        let md = build_hover_content(&make_lookup(Some("")), None);
        assert_eq!(md, "📖 **PERMI**");
    }

    #[test]
    fn not_found() {
        let md = build_hover_content(&make_lookup(None), None);
        assert_eq!(md, "No documentation found for keyword: PERMI");
    }
}
