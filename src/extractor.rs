mod blocks;
mod forms;
mod landmarks;
mod links;
mod navigation;
mod text;
mod visibility;

use crate::error::Result;
use crate::grouper;
use crate::host::HostNode;
use crate::lexicon::TextClassifier;
use crate::logging::logger::*;
use crate::logging::logging_defs::*;
use crate::logging::PerfConsoleListener;
use crate::models::{
    ButtonSnapshot, ContentBlock, ExtractOptions, FormSnapshot, Heading, Landmark, LinkSnapshot,
    NavLink, PageSnapshot, SearchDescriptor, SourceContext,
};
use crate::utils::{find_first_by_tag, normalize_text, resolve_base_uri, to_absolute_uri};
use blocks::BlockWalker;
use std::collections::HashSet;
use std::rc::Rc;
use visibility::visible_elements;

fn create_perf_logger(options: &ExtractOptions) -> PerfLogger {
    let mut listeners: Vec<Listener> = vec![];
    if options.debug {
        listeners.push(Rc::new(PerfConsoleListener::new(options.debug_categories)));
    }
    PerfLogger::new(listeners)
}

/// What every harvester needs to know about the page being read.
pub struct Page<'a> {
    /// The address the document was loaded from.
    pub doc_uri: &'a str,
    /// `doc_uri` with any `<base href>` applied; relative references resolve
    /// against it.
    pub base_uri: &'a str,
    pub classifier: &'a TextClassifier,
    pub options: &'a ExtractOptions,
}

impl Page<'_> {
    pub fn resolve(&self, raw: &str) -> String {
        to_absolute_uri(raw, self.base_uri)
    }

    /// The document address in the same normalized form as resolved hrefs.
    pub fn page_address(&self) -> String {
        to_absolute_uri(self.doc_uri, self.doc_uri)
    }
}

/// Everything the extractor reads off one document, before grouping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContent {
    /// Content blocks in depth-first document order.
    pub blocks: Vec<ContentBlock>,
    pub landmarks: Vec<Landmark>,
    pub headings: Vec<Heading>,
    pub nav_links: Vec<NavLink>,
    pub forms: Vec<FormSnapshot>,
    pub buttons: Vec<ButtonSnapshot>,
    pub links: Vec<LinkSnapshot>,
    pub search: Option<SearchDescriptor>,
}

/// The region blocks are read from: the first `main` landmark, else the
/// body, else the whole document.
fn locate_root<N: HostNode>(document: &N) -> (N, SourceContext) {
    let main = visible_elements(document)
        .into_iter()
        .find(|n| n.has_tag("main") || n.role().as_deref() == Some("main"));
    if let Some(main) = main {
        return (main, SourceContext::Main);
    }
    match find_first_by_tag(document, "body") {
        Some(body) => (body, SourceContext::Body),
        None => (document.clone(), SourceContext::Body),
    }
}

fn document_title<N: HostNode>(document: &N) -> String {
    find_first_by_tag(document, "title")
        .map(|t| text::extract_text(&t))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

fn document_lang<N: HostNode>(document: &N) -> String {
    find_first_by_tag(document, "html")
        .and_then(|html| html.attr("lang"))
        .map(|lang| normalize_text(&lang))
        .filter(|lang| !lang.is_empty())
        .unwrap_or_else(|| "en".to_string())
}

pub struct Extractor<N: HostNode> {
    document: N,
    doc_uri: String,
    base_uri: String,
    options: ExtractOptions,
    classifier: TextClassifier,
    logger: PerfLogger,
}

impl<N: HostNode> Extractor<N> {
    /// Prepare an extractor for `document`, compiling the lexicon in
    /// `options`.  Fails only when the lexicon carries an invalid pattern.
    pub fn new(document: N, doc_uri: &str, options: ExtractOptions) -> Result<Extractor<N>> {
        let classifier = TextClassifier::new(&options.lexicon)?;
        let base_uri = match find_first_by_tag(&document, "base").and_then(|b| b.attr("href")) {
            Some(href) => resolve_base_uri(doc_uri, &href),
            None => doc_uri.to_string(),
        };
        Ok(Extractor {
            document,
            doc_uri: doc_uri.to_string(),
            base_uri,
            logger: create_perf_logger(&options),
            options,
            classifier,
        })
    }

    fn page(&self) -> Page<'_> {
        Page {
            doc_uri: &self.doc_uri,
            base_uri: &self.base_uri,
            classifier: &self.classifier,
            options: &self.options,
        }
    }

    /// Walk the document once for content blocks and harvest every side
    /// collection.
    pub fn extract_content(&self) -> Result<ExtractedContent> {
        let logger = &self.logger;
        let document = &self.document;
        let page = self.page();

        start_span!(logger, LOCATE_ROOT);
        let (root, context) = locate_root(document);
        annotate_span!(logger, LOCATE_ROOT, format!("{context:?}"));
        end_span!(logger, LOCATE_ROOT);

        start_span!(logger, HARVEST_LANDMARKS);
        let landmarks = landmarks::harvest_landmarks(document);
        end_span!(logger, HARVEST_LANDMARKS);

        start_span!(logger, HARVEST_HEADINGS);
        let headings = landmarks::harvest_headings(document);
        end_span!(logger, HARVEST_HEADINGS);

        start_span!(logger, HARVEST_NAV_LINKS);
        let nav_links = navigation::harvest_nav_links(document, &page);
        annotate_span!(logger, HARVEST_NAV_LINKS, format!("{} links", nav_links.len()));
        end_span!(logger, HARVEST_NAV_LINKS);

        start_span!(logger, EXTRACT_BLOCKS);
        let known_headings = headings.iter().map(|h| h.text.clone()).collect::<HashSet<_>>();
        let blocks = BlockWalker::new(&page, &known_headings).walk(&root, context);
        end_span!(logger, EXTRACT_BLOCKS);
        let blocks = blocks?;

        start_span!(logger, HARVEST_FORMS);
        let forms = forms::harvest_forms(document, &page);
        end_span!(logger, HARVEST_FORMS);

        start_span!(logger, HARVEST_BUTTONS);
        let buttons = forms::harvest_buttons(document, &page);
        end_span!(logger, HARVEST_BUTTONS);

        start_span!(logger, HARVEST_LINKS);
        let nav_hrefs = nav_links.iter().map(|l| l.href.clone()).collect::<HashSet<_>>();
        let paragraphs = blocks
            .iter()
            .filter(|b| b.is_paragraph())
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>();
        let links = links::harvest_links(document, &page, &nav_hrefs, &paragraphs);
        end_span!(logger, HARVEST_LINKS);

        start_span!(logger, DETECT_SEARCH);
        let search = forms::detect_search(document, &page);
        end_span!(logger, DETECT_SEARCH);

        d!({
            tracing::trace!(
                blocks = blocks.len(),
                forms = forms.len(),
                buttons = buttons.len(),
                links = links.len(),
                "content extracted"
            );
        });

        Ok(ExtractedContent {
            blocks,
            landmarks,
            headings,
            nav_links,
            forms,
            buttons,
            links,
            search,
        })
    }

    /// Run the whole pipeline: extraction, then grouping and scoring.
    pub fn extract(self) -> Result<PageSnapshot> {
        let logger = &self.logger;
        start_span!(logger, EXTRACT);
        let content = self.extract_content();
        add_point_to_span!(logger, EXTRACT, "content extracted");
        let content = match content {
            Ok(content) => content,
            Err(e) => {
                annotate_span!(logger, EXTRACT, "extraction failed");
                end_span!(logger, EXTRACT);
                return Err(e);
            }
        };
        let content_groups =
            grouper::group_with(content.blocks, self.options.collapse_floor, logger);
        end_span!(logger, EXTRACT);

        Ok(PageSnapshot {
            url: self.doc_uri.clone(),
            title: document_title(&self.document),
            lang: document_lang(&self.document),
            landmarks: content.landmarks,
            headings: content.headings,
            nav_links: content.nav_links,
            content_groups,
            forms: content.forms,
            buttons: content.buttons,
            links: content.links,
            search: content.search,
        })
    }
}
