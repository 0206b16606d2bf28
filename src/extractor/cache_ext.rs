//! `cacheExt.xml`: positions, dictionary lookups, markups and page history.

use super::{ExtractContext, ExtractObserver, Extraction, book_entries, decode_payload};
use crate::error::Result;
use crate::xml::{XmlNode, first_named_child, text_of_named_child, validate_attributes};

/// Attributes every page-anchored node must carry.
const PAGE_ATTRIBUTES: [&str; 4] = ["date", "page", "pages", "pageOffset"];

pub(super) fn extract<N: XmlNode>(
    container: &N,
    ctx: &ExtractContext,
    observer: &mut dyn ExtractObserver,
) -> Result<Extraction> {
    let mut out = Extraction::default();

    for (entry, path) in book_entries(container, "text", ctx, observer) {
        for child in entry.element_children() {
            match child.name() {
                "currentPosition" if ctx.features.current_position => {
                    current_position(child, &path, ctx, &mut out)?
                }
                "preferences" if ctx.features.dictionary_history => {
                    dictionary_history(child, &path, ctx, &mut out)?
                }
                "markups" => markups(child, "", &path, ctx, &mut out)?,
                "deletedMarkups" => markups(child, "(Deleted) ", &path, ctx, &mut out)?,
                "history" if ctx.features.history => history(child, &path, ctx, &mut out)?,
                _ => {}
            }
        }
        out.entries.push(path);
    }

    Ok(out)
}

fn current_position<N: XmlNode>(
    node: &N,
    path: &str,
    ctx: &ExtractContext,
    out: &mut Extraction,
) -> Result<()> {
    let Some([date, page, pages, offset]) = page_attributes(node) else {
        return Ok(());
    };
    out.record(ctx, date, path, || {
        Ok(format!(
            "Current position page {} of {} (offset {})",
            page, pages, offset
        ))
    })
}

fn dictionary_history<N: XmlNode>(
    preferences: &N,
    path: &str,
    ctx: &ExtractContext,
    out: &mut Extraction,
) -> Result<()> {
    let Some(histories) = first_named_child(preferences, "dicHistories") else {
        return Ok(());
    };

    for lookup in histories
        .element_children()
        .filter(|node| node.name() == "dicHist")
    {
        let Some(&[date, word, dictionary]) =
            validate_attributes(lookup, &["date", "word", "contentsID"]).as_deref()
        else {
            tracing::debug!(book = path, "dicHist without date/word/contentsID");
            continue;
        };
        out.record(ctx, date, path, || {
            Ok(format!(
                "Looked for word \"{}\" in dictionary \"{}\"",
                word, dictionary
            ))
        })?;
    }
    Ok(())
}

fn markups<N: XmlNode>(
    container: &N,
    prefix: &str,
    path: &str,
    ctx: &ExtractContext,
    out: &mut Extraction,
) -> Result<()> {
    let features = &ctx.features;

    for markup in container.element_children() {
        let enabled = match markup.name() {
            "freehand" => features.freehand_markups,
            "annotation" => features.annotation_markups,
            "bookmark" | "bookmark2" => features.bookmark_markups,
            _ => false,
        };
        if !enabled {
            continue;
        }
        let Some([date, page, pages, offset]) = page_attributes(markup) else {
            tracing::debug!(book = path, markup = markup.name(), "incomplete markup");
            continue;
        };
        let at = format!("at page {} of {} (offset {})", page, pages, offset);

        out.record(ctx, date, path, || {
            let what = match markup.name() {
                "freehand" => format!(
                    "Freehand markup ({})",
                    text_of_named_child(markup, "svgFile")
                ),
                "annotation" => format!(
                    "Annotation markup (\"{}\", from {} to {})",
                    markup.attribute("name").unwrap_or_default(),
                    decode_payload(&text_of_named_child(markup, "start"))?,
                    decode_payload(&text_of_named_child(markup, "end"))?
                ),
                "bookmark2" => format!(
                    "Bookmark2 markup ({})",
                    decode_payload(&text_of_named_child(markup, "mark"))?
                ),
                _ => "Bookmark markup".to_string(),
            };
            Ok(format!("{}{} {}", prefix, what, at))
        })?;
    }
    Ok(())
}

fn history<N: XmlNode>(
    history: &N,
    path: &str,
    ctx: &ExtractContext,
    out: &mut Extraction,
) -> Result<()> {
    for item in history
        .element_children()
        .filter(|node| node.name() == "item")
    {
        let Some([date, page, pages, offset]) = page_attributes(item) else {
            continue;
        };
        out.record(ctx, date, path, || {
            Ok(format!(
                "Reading page {} of {} (offset {})",
                page, pages, offset
            ))
        })?;
    }
    Ok(())
}

fn page_attributes<N: XmlNode>(node: &N) -> Option<[&str; 4]> {
    validate_attributes(node, &PAGE_ATTRIBUTES)?.try_into().ok()
}
