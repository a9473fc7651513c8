//! PDF concatenation using lopdf
//!
//! Every source is loaded before anything is written, so a bad source never
//! leaves a file behind. Pages are appended in list order and, within one
//! source, in their original order.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use chrono::Local;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, warn};

use crate::config::{OutputSpec, DEFAULT_OUTPUT_NAME};
use crate::error::{Error, Result, SourceFault};
use crate::order::FileOrderModel;
use crate::pdf::metadata::{derive_title, stamp_info, DocumentInfo};
use crate::pdf::write::{with_default_extension, write_atomically};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic Parent chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

/// Options for concatenating PDFs
#[derive(Debug, Clone)]
pub struct ConcatOptions {
    /// Input PDF file paths in the order they should be concatenated
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path; `.pdf` is appended when missing
    pub output_path: PathBuf,
    /// Title used when the output file name yields none
    pub title: String,
}

impl ConcatOptions {
    pub fn new(input_paths: Vec<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_paths,
            output_path: output_path.into(),
            title: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }

    /// Snapshot the current list and output settings
    pub fn from_model(model: &FileOrderModel, output: &OutputSpec) -> Self {
        Self {
            input_paths: model.paths(),
            output_path: output.path(),
            title: output.title.clone(),
        }
    }
}

/// A successfully written document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concatenated {
    /// Final path, including the enforced extension
    pub output_path: PathBuf,
    pub source_count: usize,
    pub page_count: usize,
}

/// Concatenate the input PDFs into a single document
///
/// # Example
///
/// ```no_run
/// use pdf_concatenator::pdf::{concatenate, ConcatOptions};
/// use std::path::PathBuf;
///
/// let options = ConcatOptions::new(
///     vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
///     "out",
/// );
///
/// let done = concatenate(&options).expect("Failed to concatenate");
/// assert_eq!(done.output_path, PathBuf::from("out.pdf"));
/// ```
pub fn concatenate(options: &ConcatOptions) -> Result<Concatenated> {
    run(options).inspect_err(|err| warn!(error = %err, stage = "failed", "concatenation aborted"))
}

/// Run [`concatenate`] on a worker thread
///
/// Joining the handle yields the same result the synchronous call would.
pub fn spawn_concatenate(options: ConcatOptions) -> Result<JoinHandle<Result<Concatenated>>> {
    let handle = thread::Builder::new()
        .name("concatenate".to_string())
        .spawn(move || concatenate(&options))?;
    Ok(handle)
}

fn run(options: &ConcatOptions) -> Result<Concatenated> {
    if options.input_paths.is_empty() {
        return Err(Error::EmptyInput);
    }

    // One timestamp for both dates
    let started = Local::now().naive_local();
    let output_path = with_default_extension(&options.output_path);

    debug!(stage = "opening-sources", count = options.input_paths.len());
    let sources = options
        .input_paths
        .iter()
        .map(|path| load_source(path))
        .collect::<Result<Vec<_>>>()?;
    let source_count = sources.len();

    debug!(stage = "merging");
    let (mut merged, page_count) = flatten(sources)?;

    debug!(stage = "writing-metadata");
    let info = DocumentInfo::at(derive_title(&output_path, &options.title), started);
    stamp_info(&mut merged, &info);

    debug!(stage = "saving", path = %output_path.display());
    write_atomically(&mut merged, &output_path)?;

    info!(
        path = %output_path.display(),
        sources = source_count,
        pages = page_count,
        "concatenation complete"
    );

    Ok(Concatenated {
        output_path,
        source_count,
        page_count,
    })
}

/// Load a source document, classifying every way it can be unusable
pub fn load_source(path: &Path) -> Result<Document> {
    let bytes = fs::read(path).map_err(|e| Error::source_open(path, SourceFault::from_io(&e)))?;
    let doc = Document::load_mem(&bytes)
        .map_err(|e| Error::source_open(path, SourceFault::from_pdf(&e)))?;

    if doc.is_encrypted() {
        return Err(Error::source_open(path, SourceFault::Encrypted));
    }
    if doc.get_pages().is_empty() {
        return Err(Error::source_open(path, SourceFault::NoPages));
    }

    debug!(path = %path.display(), pages = doc.get_pages().len(), "loaded source");
    Ok(doc)
}

/// Append the pages of every document, in order, to a new document
///
/// Returns the document and its page count. The sources' catalogs and page
/// tree nodes are dropped, and whatever they alone referenced (outlines,
/// forms, info dictionaries) is pruned.
fn flatten(sources: Vec<Document>) -> Result<(Document, usize)> {
    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in sources {
        inherit_page_attributes(&mut doc)?;

        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // get_pages is keyed by page number, so values come out in page order
        page_ids.extend(doc.get_pages().into_values());

        objects.extend(
            doc.objects
                .into_iter()
                .filter(|(_, object)| !is_structure_node(object)),
        );
    }

    let mut merged = Document::with_version("1.5");
    merged.objects.extend(objects);
    // Fresh ids must not collide with the renumbered source objects
    merged.max_id = max_id - 1;

    let pages_id = merged.new_object_id();
    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_ids.len() as i64));
    pages.set("Kids", Object::Array(kids));

    let catalog_id = merged.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged.objects.insert(pages_id, Object::Dictionary(pages));
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        let page = merged.get_dictionary_mut(page_id)?;
        page.set("Parent", Object::Reference(pages_id));
    }

    let pruned = merged.prune_objects();
    debug!(pruned = pruned.len(), "dropped unreferenced objects");
    merged.renumber_objects();

    Ok((merged, page_ids.len()))
}

/// Catalog and intermediate page tree nodes of a source
fn is_structure_node(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Catalog" || name == b"Pages")
}

/// Copy attributes held by ancestor page tree nodes onto each page
fn inherit_page_attributes(doc: &mut Document) -> Result<()> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let inherited: Vec<(&[u8], Object)> = {
            let page = doc.get_dictionary(page_id)?;
            INHERITABLE
                .iter()
                .filter(|key| !page.has(key))
                .filter_map(|&key| inherited_value(doc, page, key).map(|value| (key, value)))
                .collect()
        };

        if inherited.is_empty() {
            continue;
        }

        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key.to_vec(), value);
        }
    }

    Ok(())
}

fn inherited_value(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}
