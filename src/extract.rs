//! Job posting extraction from a startit.rs listing page.
//!
//! A listing page mixes three presentation tiers of postings. Extraction
//! runs in two passes:
//!
//! 1. **Partition**: every posting node is located by its tier marker and
//!    tagged with the tier. Tiers are concatenated premium → standard → mini,
//!    document order is kept within a tier.
//! 2. **Shape extraction**: each tagged node is normalized into a
//!    [`JobRecord`] using the [`PostingShape`] registered for its tier.
//!
//! The three tiers differ only in where the content lives and how the
//! company name is read, so a single routine handles all of them, driven by
//! the descriptors in [`SHAPES`].
//!
//! Extraction is fail-fast: a node missing any required element aborts the
//! whole pass with [`ScrapeError::Extraction`]; no partial list is returned.

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::ScrapeError;
use crate::models::{JobRecord, RawPosting, Tier};

/// How the company name is read from a posting's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyRule {
    /// Text of the first link in the first `div` when that link holds a
    /// single text node; otherwise the text of the `span` label nested in
    /// the link.
    LinkOrLabel,
    /// Own text of the first `div`.
    OwnText,
}

/// Markup description of one posting tier.
#[derive(Debug, Clone, Copy)]
pub struct PostingShape {
    pub tier: Tier,
    /// Container holding the posting content. `None` reads the posting node
    /// itself.
    pub content: Option<&'static str>,
    pub company: CompanyRule,
    /// Sub-container the tag `small`s live in. `None` collects every `small`
    /// within the content.
    pub tag_container: Option<&'static str>,
}

/// Shapes of the tiers currently served by startit.rs.
pub const SHAPES: [PostingShape; 3] = [
    PostingShape {
        tier: Tier::Premium,
        content: Some("div.listing-oglas-premium-text"),
        company: CompanyRule::LinkOrLabel,
        tag_container: None,
    },
    PostingShape {
        tier: Tier::Standard,
        content: Some("div.listing-oglas-standard-text"),
        company: CompanyRule::LinkOrLabel,
        tag_container: None,
    },
    PostingShape {
        tier: Tier::Mini,
        content: None,
        company: CompanyRule::OwnText,
        tag_container: Some("div.oglas-mini-tagovi"),
    },
];

struct CompiledShape {
    tier: Tier,
    content: Option<Selector>,
    company: CompanyRule,
    tag_container: Option<Selector>,
}

/// Partitions a listing page and extracts its job records.
pub struct MarkupExtractor {
    markers: Vec<(Tier, Selector)>,
    shapes: Vec<CompiledShape>,
    heading: Selector,
    link: Selector,
    block: Selector,
    label: Selector,
    small: Selector,
}

fn compile(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector {
        css: css.to_string(),
        reason: e.to_string(),
    })
}

/// Own text nodes of an element, concatenated and trimmed.
fn own_text(el: ElementRef<'_>) -> String {
    el.children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Text of an element that holds exactly one text node, possibly through a
/// chain of single-child elements. `None` for mixed or empty content.
fn sole_text(el: ElementRef<'_>) -> Option<String> {
    let mut node = *el;
    loop {
        let mut children = node.children();
        let child = children.next()?;
        if children.next().is_some() {
            return None;
        }
        match child.value() {
            Node::Text(text) => return Some(text.trim().to_string()),
            Node::Element(_) => node = child,
            _ => return None,
        }
    }
}

fn full_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl MarkupExtractor {
    /// Extractor for the current startit.rs markup.
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_shapes(&SHAPES)
    }

    /// Extractor that only knows the given shapes. Postings of any other
    /// tier are still partitioned and fail with
    /// [`ScrapeError::UnknownJobType`].
    pub fn with_shapes(shapes: &[PostingShape]) -> Result<Self, ScrapeError> {
        let markers = Tier::ALL
            .iter()
            .map(|&tier| -> Result<(Tier, Selector), ScrapeError> {
                Ok((tier, compile(tier.marker())?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let shapes = shapes
            .iter()
            .map(|shape| -> Result<CompiledShape, ScrapeError> {
                Ok(CompiledShape {
                    tier: shape.tier,
                    content: shape.content.map(compile).transpose()?,
                    company: shape.company,
                    tag_container: shape.tag_container.map(compile).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            markers,
            shapes,
            heading: compile("h1")?,
            link: compile("a")?,
            block: compile("div")?,
            label: compile("span")?,
            small: compile("small")?,
        })
    }

    /// Parse raw markup and extract every posting on the page.
    pub fn extract(&self, html: &str) -> Result<Vec<JobRecord>, ScrapeError> {
        let document = Html::parse_document(html);
        self.extract_document(&document)
    }

    /// Extract every posting of an already parsed page, in partition order.
    pub fn extract_document(&self, document: &Html) -> Result<Vec<JobRecord>, ScrapeError> {
        let postings = self.partition(document);
        tracing::debug!(
            premium = postings.iter().filter(|p| p.tier == Tier::Premium).count(),
            standard = postings.iter().filter(|p| p.tier == Tier::Standard).count(),
            mini = postings.iter().filter(|p| p.tier == Tier::Mini).count(),
            "partitioned listing page"
        );

        postings
            .iter()
            .map(|posting| self.extract_posting(posting))
            .collect()
    }

    /// Locate all posting nodes and tag them with their tier.
    pub fn partition<'a>(&self, document: &'a Html) -> Vec<RawPosting<'a>> {
        let mut postings = Vec::new();
        for (tier, marker) in &self.markers {
            postings.extend(
                document
                    .select(marker)
                    .enumerate()
                    .map(|(index, node)| RawPosting {
                        tier: *tier,
                        index,
                        node,
                    }),
            );
        }
        postings
    }

    /// Normalize one tagged posting node into a job record.
    pub fn extract_posting(&self, posting: &RawPosting<'_>) -> Result<JobRecord, ScrapeError> {
        let shape = self
            .shapes
            .iter()
            .find(|shape| shape.tier == posting.tier)
            .ok_or(ScrapeError::UnknownJobType(posting.tier))?;

        let missing = |missing: &'static str| ScrapeError::Extraction {
            tier: posting.tier,
            index: posting.index,
            missing,
        };

        let content = match &shape.content {
            Some(selector) => posting
                .node
                .select(selector)
                .next()
                .ok_or_else(|| missing("content container"))?,
            None => posting.node,
        };

        let heading_link = content
            .select(&self.heading)
            .next()
            .and_then(|heading| heading.select(&self.link).next())
            .ok_or_else(|| missing("heading link"))?;
        let url = heading_link
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or_else(|| missing("heading link href"))?
            .to_string();
        let job_title = non_empty(full_text(heading_link)).ok_or_else(|| missing("job title"))?;

        let company_block = content
            .select(&self.block)
            .next()
            .ok_or_else(|| missing("company block"))?;
        let company_title = match shape.company {
            CompanyRule::LinkOrLabel => {
                let company_link = company_block
                    .select(&self.link)
                    .next()
                    .ok_or_else(|| missing("company link"))?;
                match sole_text(company_link).and_then(non_empty) {
                    Some(title) => title,
                    None => company_link
                        .select(&self.label)
                        .next()
                        .map(full_text)
                        .and_then(non_empty)
                        .ok_or_else(|| missing("company label"))?,
                }
            }
            CompanyRule::OwnText => {
                non_empty(own_text(company_block)).ok_or_else(|| missing("company title"))?
            }
        };

        let tag_scope = match &shape.tag_container {
            Some(selector) => content
                .select(selector)
                .next()
                .ok_or_else(|| missing("tag container"))?,
            None => content,
        };
        let tags = self
            .extract_tags(tag_scope)
            .ok_or_else(|| missing("tag link"))?;

        Ok(JobRecord {
            company_title,
            job_title,
            url,
            tags,
        })
    }

    /// Text of the first link in every `small` under `scope`, in document
    /// order. `None` if any `small` carries no usable link.
    fn extract_tags(&self, scope: ElementRef<'_>) -> Option<Vec<String>> {
        scope
            .select(&self.small)
            .map(|small| {
                small
                    .select(&self.link)
                    .next()
                    .map(full_text)
                    .and_then(non_empty)
            })
            .collect()
    }
}
