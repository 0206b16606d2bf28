//! `media.xml`: `cache:text` records under `xdbLite/records`.

use super::cache::extract_library_entries;
use super::{ExtractContext, ExtractObserver, Extraction};
use crate::error::Result;
use crate::xml::XmlNode;

pub(super) fn extract<N: XmlNode>(
    records: &N,
    ctx: &ExtractContext,
    observer: &mut dyn ExtractObserver,
) -> Result<Extraction> {
    extract_library_entries(records, "cache:text", ctx, observer)
}
