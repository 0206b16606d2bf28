use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary reader storage root holding any of the three metadata files
pub struct DeviceDir {
    dir: TempDir,
}

impl DeviceDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn path_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn with_cache(self, entries: &str) -> Self {
        self.write("cache.xml", &wrap("cache", entries))
    }

    pub fn with_cache_ext(self, entries: &str) -> Self {
        self.write("cacheExt.xml", &wrap("cacheExt", entries))
    }

    pub fn with_media(self, entries: &str) -> Self {
        self.write(
            "media.xml",
            &format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                 <xdbLite xmlns:cache=\"http://www.kinoma.com/FskCache/1\">\n\
                 <records>\n{}\n</records>\n</xdbLite>\n",
                entries
            ),
        )
    }

    pub fn write(self, name: &str, content: &str) -> Self {
        fs::write(self.dir.path().join(name), content).expect("Failed to write fixture");
        self
    }
}

fn wrap(container: &str, entries: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <{0} xmlns=\"http://www.kinoma.com/FskCache/1\">\n{1}\n</{0}>\n",
        container, entries
    )
}

/// A `history/item` entry for one book
pub fn history_entry(path: &str, items: &[(&str, u32)]) -> String {
    let items: String = items
        .iter()
        .map(|(date, page)| {
            format!(
                "    <item date=\"{}\" page=\"{}\" pages=\"200\" pageOffset=\"0\"/>\n",
                date, page
            )
        })
        .collect();
    format!(
        "  <text path=\"{}\">\n    <history>\n{}    </history>\n  </text>",
        path, items
    )
}

/// A `cache.xml`/`media.xml` entry with one bookmark date
pub fn bookmark_entry(tag: &str, path: &str, date: &str) -> String {
    format!(
        "  <{0} path=\"{1}\">\n    <bookmarkDate>{2}</bookmarkDate>\n  </{0}>",
        tag, path, date
    )
}
