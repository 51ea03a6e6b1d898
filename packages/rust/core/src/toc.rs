//! Table-of-contents generation over processed documents.

use mergedown_markdown::anchor;
use mergedown_shared::{MergeConfig, TocStyle};

use crate::processor::ProcessedDocument;

/// Renders a linked outline of the merged documents.
pub struct TocGenerator {
    config: MergeConfig,
}

impl TocGenerator {
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Generate the table of contents.
    ///
    /// Returns an empty string when TOC generation is disabled or there are
    /// no documents. One entry per document, rendered per the configured
    /// style; when `toc_depth > 1`, nested entries per extracted header at
    /// or below that depth, indented two spaces per level beyond 1 and
    /// anchored as `<doc-slug>--<header-slug>`.
    pub fn generate(&self, documents: &[ProcessedDocument]) -> String {
        if !self.config.generate_toc || documents.is_empty() {
            return String::new();
        }

        let mut lines = vec!["# Table of Contents".to_string(), String::new()];

        for doc in documents {
            let name = doc.name();
            let slug = anchor(&name);

            lines.push(match self.config.toc_style {
                TocStyle::Links => format!("- [{name}](#{slug})"),
                TocStyle::Numbered => format!("{}. [{name}](#{slug})", doc.index),
                TocStyle::Plain => format!("- {name}"),
            });

            if self.config.toc_depth > 1 {
                for (level, text) in &doc.headers {
                    if *level <= self.config.toc_depth {
                        let indent = "  ".repeat(usize::from(*level) - 1);
                        lines.push(match self.config.toc_style {
                            TocStyle::Links => {
                                let header_anchor = format!("{slug}--{}", anchor(text));
                                format!("{indent}- [{text}](#{header_anchor})")
                            }
                            _ => format!("{indent}- {text}"),
                        });
                    }
                }
            }
        }

        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::Utc;

    use super::*;

    fn doc(name: &str, index: usize, headers: Vec<(u8, &str)>) -> ProcessedDocument {
        ProcessedDocument {
            source_path: PathBuf::from(format!("{name}.md")),
            original_content: String::new(),
            content: String::new(),
            headers: headers
                .into_iter()
                .map(|(level, text)| (level, text.to_string()))
                .collect(),
            keywords: Vec::new(),
            front_matter: None,
            size: 0,
            modified: Utc::now(),
            index,
            total_count: 2,
        }
    }

    #[test]
    fn linked_entries_with_nested_headers() {
        let config = MergeConfig {
            toc_depth: 2,
            ..MergeConfig::default()
        };
        let generator = TocGenerator::new(&config);
        let docs = vec![doc(
            "setup-guide",
            1,
            vec![(1, "Setup Guide"), (2, "First Steps"), (3, "Too Deep")],
        )];

        let toc = generator.generate(&docs);
        assert!(toc.starts_with("# Table of Contents\n\n"));
        assert!(toc.contains("- [setup-guide](#setup-guide)"));
        assert!(toc.contains("- [Setup Guide](#setup-guide--setup-guide)"));
        assert!(toc.contains("  - [First Steps](#setup-guide--first-steps)"));
        assert!(!toc.contains("Too Deep"));
        assert!(toc.ends_with("\n---\n"));
    }

    #[test]
    fn numbered_style_numbers_documents_only() {
        let config = MergeConfig {
            toc_style: TocStyle::Numbered,
            ..MergeConfig::default()
        };
        let generator = TocGenerator::new(&config);
        let docs = vec![
            doc("alpha", 1, vec![(2, "Inner")]),
            doc("beta", 2, vec![]),
        ];

        let toc = generator.generate(&docs);
        assert!(toc.contains("1. [alpha](#alpha)"));
        assert!(toc.contains("2. [beta](#beta)"));
        // Nested entries fall back to plain text for non-link styles
        assert!(toc.contains("  - Inner"));
        assert!(!toc.contains("(#alpha--inner)"));
    }

    #[test]
    fn plain_style_has_no_links() {
        let config = MergeConfig {
            toc_style: TocStyle::Plain,
            ..MergeConfig::default()
        };
        let generator = TocGenerator::new(&config);
        let toc = generator.generate(&[doc("notes", 1, vec![])]);
        assert!(toc.contains("- notes"));
        assert!(!toc.contains("(#"));
    }

    #[test]
    fn depth_one_never_nests() {
        let config = MergeConfig {
            toc_depth: 1,
            ..MergeConfig::default()
        };
        let generator = TocGenerator::new(&config);
        let docs = vec![doc("page", 1, vec![(1, "Top Header")])];
        let toc = generator.generate(&docs);
        assert!(toc.contains("- [page](#page)"));
        assert!(!toc.contains("Top Header"));
    }

    #[test]
    fn disabled_or_empty_yields_nothing() {
        let config = MergeConfig {
            generate_toc: false,
            ..MergeConfig::default()
        };
        let generator = TocGenerator::new(&config);
        assert_eq!(generator.generate(&[doc("a", 1, vec![])]), "");

        let generator = TocGenerator::new(&MergeConfig::default());
        assert_eq!(generator.generate(&[]), "");
    }
}
