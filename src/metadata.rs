//! Document metadata extraction.
//!
//! The pipeline only needs one [`RawDocument`] per source file and gets it
//! through the [`DocumentExtractor`] trait, so builds can plug in their own
//! front-matter handling. [`MarkdownExtractor`] is the stock implementation.
//!
//! ## Sources
//!
//! - **Front matter**: an optional YAML block between `---` fences at the top
//!   of the file (`id`, `title`, `description`, `slug`, `sidebar_label`,
//!   `custom_edit_url`, `last_update_author`). Unknown keys are ignored; they
//!   belong to the renderer.
//! - **Markdown body**: the first level-1 heading and the first paragraph,
//!   read with pulldown-cmark.
//! - **File path**: directory and file stem.
//!
//! ## Resolution priority
//!
//! Each field is resolved independently. The first non-empty value wins:
//!
//! - **Id**: front matter `id` → file stem (prefixed with the directory)
//! - **Title**: front matter `title` → first `# heading` → id
//! - **Description**: front matter `description` → first paragraph → empty
//! - **Slug**: `/` for the home page → front matter `slug` → `/<dir>/<id>`
//! - **Edit URL**: front matter `custom_edit_url` → `edit_url` option + path

use crate::config::DocsOptions;
use crate::naming::{normalize_url, posix_path, resolve_slug};
use crate::types::{RawDocument, VersionMetadata};
use crate::versions::VersionCatalog;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
    #[error("Document id `{0}` must not contain '/'")]
    InvalidId(String),
    #[error("Unterminated front matter block")]
    UnterminatedFrontMatter,
}

/// Everything an extractor may need besides the file itself.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub site_dir: &'a Path,
    pub version: &'a VersionMetadata,
    pub options: &'a DocsOptions,
}

/// Turns one discovered source file into a [`RawDocument`].
///
/// Called concurrently from the rayon pool, hence `Sync`.
pub trait DocumentExtractor: Sync {
    /// `relative_path` is relative to the version's docs root.
    fn extract(
        &self,
        ctx: &ExtractContext<'_>,
        relative_path: &Path,
    ) -> Result<RawDocument, ExtractError>;
}

/// Front matter keys the extractor understands.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub sidebar_label: Option<String>,
    pub custom_edit_url: Option<String>,
    pub last_update_author: Option<String>,
}

/// Stock extractor for markdown files with YAML front matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownExtractor;

impl DocumentExtractor for MarkdownExtractor {
    fn extract(
        &self,
        ctx: &ExtractContext<'_>,
        relative_path: &Path,
    ) -> Result<RawDocument, ExtractError> {
        let full_path = ctx.version.docs_dir_path.join(relative_path);
        let content = fs::read_to_string(&full_path)?;
        let (front_matter, body) = split_front_matter(&content)?;
        let front_matter = parse_front_matter(front_matter)?;

        let dir = relative_path.parent().map(posix_path).unwrap_or_default();
        let stem = relative_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base_id = resolve(&[front_matter.id.as_deref()]).unwrap_or(stem);
        if base_id.contains('/') {
            return Err(ExtractError::InvalidId(base_id));
        }
        let unversioned_id = if dir.is_empty() {
            base_id.clone()
        } else {
            format!("{dir}/{base_id}")
        };

        let is_docs_home_page = ctx.options.home_page_id.as_deref() == Some(unversioned_id.as_str());
        let slug = if is_docs_home_page {
            "/".to_string()
        } else {
            let declared = resolve(&[front_matter.slug.as_deref()]);
            resolve_slug(&dir, declared.as_deref().unwrap_or(&base_id))
        };
        let permalink = normalize_url(&[ctx.version.version_path.as_str(), slug.as_str()]);

        let headline = read_headline(body);
        let title = resolve(&[front_matter.title.as_deref(), headline.title.as_deref()])
            .unwrap_or_else(|| base_id.clone());
        let description = resolve(&[
            front_matter.description.as_deref(),
            headline.first_paragraph.as_deref(),
        ])
        .unwrap_or_default();

        let site_relative = posix_path(full_path.strip_prefix(ctx.site_dir).unwrap_or(&full_path));
        let edit_url = resolve(&[front_matter.custom_edit_url.as_deref()]).or_else(|| {
            ctx.options
                .edit_url
                .as_deref()
                .map(|base| normalize_url(&[base, site_relative.as_str()]))
        });

        let last_updated_at = if ctx.options.show_last_update_time {
            fs::metadata(&full_path)?
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
        } else {
            None
        };
        let last_updated_by = if ctx.options.show_last_update_author {
            resolve(&[front_matter.last_update_author.as_deref()])
        } else {
            None
        };

        Ok(RawDocument {
            version: ctx.version.version_name.clone(),
            id: VersionCatalog::global_id(ctx.version, &unversioned_id),
            unversioned_id,
            is_docs_home_page,
            title,
            description,
            source: format!("@site/{site_relative}"),
            slug,
            permalink,
            sidebar_label: resolve(&[front_matter.sidebar_label.as_deref()]),
            edit_url,
            last_updated_at,
            last_updated_by,
        })
    }
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value (trimmed).
pub fn resolve(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Split a `---` fenced front matter block from the body.
///
/// Returns `(None, content)` when the file does not open with a fence.
pub fn split_front_matter(content: &str) -> Result<(Option<&str>, &str), ExtractError> {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return Ok((None, content));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let front_matter = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((Some(front_matter), body));
        }
        offset += line.len();
    }
    Err(ExtractError::UnterminatedFrontMatter)
}

/// Parse a front matter block; an absent or blank block yields defaults.
pub fn parse_front_matter(source: Option<&str>) -> Result<FrontMatter, ExtractError> {
    match source {
        Some(yaml) if !yaml.trim().is_empty() => Ok(serde_yaml::from_str(yaml)?),
        _ => Ok(FrontMatter::default()),
    }
}

/// Title and description candidates read from the markdown body.
#[derive(Debug, Default, PartialEq)]
pub struct Headline {
    pub title: Option<String>,
    pub first_paragraph: Option<String>,
}

/// Find the first level-1 heading and the first paragraph of a body.
pub fn read_headline(body: &str) -> Headline {
    enum Capture {
        None,
        Title(String),
        Paragraph(String),
    }

    let mut headline = Headline::default();
    let mut capture = Capture::None;

    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if headline.title.is_none() => capture = Capture::Title(String::new()),
            Event::Start(Tag::Paragraph) if headline.first_paragraph.is_none() => {
                capture = Capture::Paragraph(String::new());
            }
            Event::Text(text) | Event::Code(text) => match &mut capture {
                Capture::Title(buf) | Capture::Paragraph(buf) => buf.push_str(&text),
                Capture::None => {}
            },
            Event::SoftBreak | Event::HardBreak => {
                if let Capture::Paragraph(buf) = &mut capture {
                    buf.push(' ');
                }
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                if let Capture::Title(buf) = std::mem::replace(&mut capture, Capture::None) {
                    headline.title = resolve(&[Some(&buf)]);
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if let Capture::Paragraph(buf) = std::mem::replace(&mut capture, Capture::None) {
                    headline.first_paragraph = resolve(&[Some(&buf)]);
                }
            }
            _ => {}
        }
        if headline.title.is_some() && headline.first_paragraph.is_some() {
            break;
        }
    }
    headline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::version_in;
    use tempfile::TempDir;

    fn extract(
        tmp: &TempDir,
        version: &VersionMetadata,
        options: &DocsOptions,
        relative: &str,
        content: &str,
    ) -> Result<RawDocument, ExtractError> {
        let path = version.docs_dir_path.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        let ctx = ExtractContext {
            site_dir: tmp.path(),
            version,
            options,
        };
        MarkdownExtractor.extract(&ctx, Path::new(relative))
    }

    // =========================================================================
    // resolve() tests
    // =========================================================================

    #[test]
    fn resolve_picks_first_non_empty() {
        assert_eq!(
            resolve(&[None, Some("  "), Some("Heading"), Some("Stem")]),
            Some("Heading".to_string())
        );
        assert_eq!(resolve(&[None, None]), None);
    }

    // =========================================================================
    // front matter
    // =========================================================================

    #[test]
    fn split_without_front_matter() {
        let (fm, body) = split_front_matter("# Title\n").unwrap();
        assert!(fm.is_none());
        assert_eq!(body, "# Title\n");
    }

    #[test]
    fn split_with_front_matter() {
        let (fm, body) = split_front_matter("---\ntitle: Hello\n---\n# Body\n").unwrap();
        assert_eq!(fm, Some("title: Hello\n"));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn unterminated_front_matter_is_error() {
        assert!(matches!(
            split_front_matter("---\ntitle: Hello\n# Body\n"),
            Err(ExtractError::UnterminatedFrontMatter)
        ));
    }

    #[test]
    fn blank_front_matter_gives_defaults() {
        let fm = parse_front_matter(Some("\n")).unwrap();
        assert!(fm.title.is_none());
    }

    #[test]
    fn unknown_front_matter_keys_are_ignored() {
        let fm = parse_front_matter(Some("title: A\nhide_title: true\n")).unwrap();
        assert_eq!(fm.title.as_deref(), Some("A"));
    }

    #[test]
    fn malformed_front_matter_is_error() {
        assert!(matches!(
            parse_front_matter(Some("title: [unclosed\n")),
            Err(ExtractError::FrontMatter(_))
        ));
    }

    // =========================================================================
    // headline
    // =========================================================================

    #[test]
    fn headline_reads_h1_and_first_paragraph() {
        let headline = read_headline("## Not this\n\n# The `Title`\n\nFirst line\nsecond line.\n\nMore.");
        assert_eq!(headline.title.as_deref(), Some("The Title"));
        assert_eq!(
            headline.first_paragraph.as_deref(),
            Some("First line second line.")
        );
    }

    #[test]
    fn headline_empty_body() {
        assert_eq!(read_headline(""), Headline::default());
    }

    // =========================================================================
    // MarkdownExtractor
    // =========================================================================

    #[test]
    fn ids_and_permalinks_from_path() {
        let tmp = TempDir::new().unwrap();
        let version = version_in(tmp.path(), "next", &[]);
        let options = DocsOptions::default();

        let doc = extract(&tmp, &version, &options, "guides/install.md", "# Install\n\nSteps.").unwrap();
        assert_eq!(doc.unversioned_id, "guides/install");
        assert_eq!(doc.id, "guides/install");
        assert_eq!(doc.slug, "/guides/install");
        assert_eq!(doc.permalink, "/docs/guides/install");
        assert_eq!(doc.title, "Install");
        assert_eq!(doc.description, "Steps.");
        assert_eq!(doc.source, "@site/docs/guides/install.md");
        assert!(!doc.is_docs_home_page);
    }

    #[test]
    fn released_version_ids_are_prefixed() {
        let tmp = TempDir::new().unwrap();
        let version = version_in(tmp.path(), "1.0.0", &["1.0.0"]);
        let options = DocsOptions::default();

        let doc = extract(&tmp, &version, &options, "intro.md", "Hello").unwrap();
        assert_eq!(doc.id, "version-1.0.0/intro");
        assert_eq!(doc.unversioned_id, "intro");
        assert_eq!(doc.version, "1.0.0");
        assert_eq!(doc.permalink, "/docs/intro");
        assert_eq!(doc.source, "@site/versioned_docs/version-1.0.0/intro.md");
    }

    #[test]
    fn front_matter_overrides() {
        let tmp = TempDir::new().unwrap();
        let version = version_in(tmp.path(), "next", &["1.0.0"]);
        let options = DocsOptions::default();

        let doc = extract(
            &tmp,
            &version,
            &options,
            "guides/setup.mdx",
            "---\nid: getting-started\ntitle: Getting Started\ndescription: How to start\nslug: start\nsidebar_label: Start\n---\n# Ignored\n",
        )
        .unwrap();
        assert_eq!(doc.unversioned_id, "guides/getting-started");
        assert_eq!(doc.title, "Getting Started");
        assert_eq!(doc.description, "How to start");
        assert_eq!(doc.slug, "/guides/start");
        assert_eq!(doc.permalink, "/docs/next/guides/start");
        assert_eq!(doc.sidebar_label.as_deref(), Some("Start"));
    }

    #[test]
    fn absolute_front_matter_slug() {
        let tmp = TempDir::new().unwrap();
        let version = version_in(tmp.path(), "next", &[]);
        let options = DocsOptions::default();

        let doc = extract(&tmp, &version, &options, "guides/a.md", "---\nslug: /elsewhere\n---\n").unwrap();
        assert_eq!(doc.permalink, "/docs/elsewhere");
    }

    #[test]
    fn title_falls_back_to_id() {
        let tmp = TempDir::new().unwrap();
        let version = version_in(tmp.path(), "next", &[]);
        let options = DocsOptions::default();

        let doc = extract(&tmp, &version, &options, "notes.md", "Just text.").unwrap();
        assert_eq!(doc.title, "notes");
        assert_eq!(doc.description, "Just text.");
    }

    #[test]
    fn home_page_gets_root_slug() {
        let tmp = TempDir::new().unwrap();
        let version = version_in(tmp.path(), "next", &["1.0.0"]);
        let options = DocsOptions {
            home_page_id: Some("intro".to_string()),
            ..DocsOptions::default()
        };

        let doc = extract(&tmp, &version, &options, "intro.md", "# Intro").unwrap();
        assert!(doc.is_docs_home_page);
        assert_eq!(doc.slug, "/");
        assert_eq!(doc.permalink, "/docs/next/");
    }

    #[test]
    fn id_with_slash_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let version = version_in(tmp.path(), "next", &[]);
        let options = DocsOptions::default();

        let err = extract(&tmp, &version, &options, "a.md", "---\nid: a/b\n---\n").unwrap_err();
        assert!(matches!(err, ExtractError::InvalidId(id) if id == "a/b"));
    }

    #[test]
    fn edit_url_from_option_and_front_matter() {
        let tmp = TempDir::new().unwrap();
        let version = version_in(tmp.path(), "next", &[]);
        let options = DocsOptions {
            edit_url: Some("https://github.com/org/repo/edit/main/".to_string()),
            ..DocsOptions::default()
        };

        let doc = extract(&tmp, &version, &options, "guides/a.md", "# A").unwrap();
        assert_eq!(
            doc.edit_url.as_deref(),
            Some("https://github.com/org/repo/edit/main/docs/guides/a.md")
        );

        let doc = extract(
            &tmp,
            &version,
            &options,
            "guides/b.md",
            "---\ncustom_edit_url: https://example.com/b\n---\n",
        )
        .unwrap();
        assert_eq!(doc.edit_url.as_deref(), Some("https://example.com/b"));
    }

    #[test]
    fn last_update_only_when_enabled() {
        let tmp = TempDir::new().unwrap();
        let version = version_in(tmp.path(), "next", &[]);
        let content = "---\nlast_update_author: Ada\n---\n# A";

        let doc = extract(&tmp, &version, &DocsOptions::default(), "a.md", content).unwrap();
        assert!(doc.last_updated_at.is_none());
        assert!(doc.last_updated_by.is_none());

        let options = DocsOptions {
            show_last_update_time: true,
            show_last_update_author: true,
            ..DocsOptions::default()
        };
        let doc = extract(&tmp, &version, &options, "a.md", content).unwrap();
        assert!(doc.last_updated_at.is_some_and(|t| t > 0));
        assert_eq!(doc.last_updated_by.as_deref(), Some("Ada"));
    }
}
