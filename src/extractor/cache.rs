//! `cache.xml`: one `text` entry per book with its creation and bookmark dates.

use super::{ExtractContext, ExtractObserver, Extraction, book_entries};
use crate::error::Result;
use crate::xml::{XmlNode, validate_attributes};

pub(super) fn extract<N: XmlNode>(
    container: &N,
    ctx: &ExtractContext,
    observer: &mut dyn ExtractObserver,
) -> Result<Extraction> {
    extract_library_entries(container, "text", ctx, observer)
}

/// Entry shape shared with `media.xml`, which differs only in its tag name.
pub(super) fn extract_library_entries<N: XmlNode>(
    container: &N,
    entry_tag: &str,
    ctx: &ExtractContext,
    observer: &mut dyn ExtractObserver,
) -> Result<Extraction> {
    let mut out = Extraction::default();

    for (entry, path) in book_entries(container, entry_tag, ctx, observer) {
        if ctx.features.book_creation_date
            && let Some(&[date]) = validate_attributes(entry, &["date"]).as_deref()
        {
            out.record(ctx, date, &path, || Ok("Creation date ".to_string()))?;
        }

        if ctx.features.bookmark_date {
            for child in entry.element_children() {
                if child.name() == "bookmarkDate" {
                    let date = child.first_child_xml().unwrap_or_default();
                    out.record(ctx, &date, &path, || Ok("Bookmark date".to_string()))?;
                }
            }
        }

        out.entries.push(path);
    }

    Ok(out)
}
