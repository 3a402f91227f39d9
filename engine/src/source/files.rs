//! Batch input from a directory tree.
//!

use std::fs;
use std::path::{Path, PathBuf};
use std::vec::IntoIter;

use tracing::{debug, info, trace};
use walkdir::WalkDir;

use crate::{Origin, Raw, Source, SourceError};

/// Extensions we pick up, compared on the whole path string.
const EXTENSIONS: [&str; 2] = [".xml", ".cot"];

/// All matching files under a directory, read one by one in path order.
///
#[derive(Debug)]
pub struct FileSource {
    root: PathBuf,
    files: IntoIter<PathBuf>,
}

impl FileSource {
    /// Walk `root` recursively and sort the result.  An unreadable tree is fatal.
    ///
    #[tracing::instrument]
    pub fn new(root: &Path) -> Result<Self, SourceError> {
        let mut files = vec![];
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| SourceError::Walk(root.to_path_buf(), e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            let name = path.to_string_lossy();
            if EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
                files.push(path);
            }
        }
        // Plain byte order on the whole path, `01.xml` comes before `01/a.xml`
        files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        info!("{} files in {:?}", files.len(), root);

        Ok(FileSource {
            root: root.to_path_buf(),
            files: files.into_iter(),
        })
    }

    /// Files not handed out yet.
    ///
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl Source for FileSource {
    /// A file we can not read is returned as a non-fatal error, the next call moves on.
    ///
    #[tracing::instrument(skip(self), fields(root = ?self.root))]
    fn next_document(&mut self) -> Option<Result<Raw, SourceError>> {
        let path = self.files.next()?;
        trace!("reading {:?}", path);

        let res = match fs::read_to_string(&path) {
            Ok(data) => {
                debug!("{} bytes from {:?}", data.len(), path);
                Ok(Raw {
                    origin: Origin::File(path),
                    data,
                })
            }
            Err(e) => Err(SourceError::Read(path, e)),
        };
        Some(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.xml"), "b").unwrap();
        fs::write(dir.path().join("a.cot"), "a").unwrap();
        fs::write(dir.path().join("sub/c.xml"), "c").unwrap();
        fs::write(dir.path().join("notes.txt"), "nope").unwrap();
        fs::write(dir.path().join("d.XML"), "nope").unwrap();
        dir
    }

    #[test]
    fn test_files_sorted_and_filtered() {
        let dir = tree();
        let mut src = FileSource::new(dir.path()).unwrap();
        assert_eq!(3, src.remaining());

        let mut got = vec![];
        while let Some(raw) = src.next_document() {
            got.push(raw.unwrap().data);
        }
        assert_eq!(vec!["a", "b", "c"], got);
    }

    #[test]
    fn test_files_sorted_on_whole_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("01")).unwrap();
        fs::write(dir.path().join("01.xml"), "file-01.xml").unwrap();
        fs::write(dir.path().join("01/a.xml"), "file-01/a.xml").unwrap();
        fs::write(dir.path().join("00.xml"), "file-00.xml").unwrap();

        let mut src = FileSource::new(dir.path()).unwrap();
        let mut got = vec![];
        while let Some(raw) = src.next_document() {
            got.push(raw.unwrap().data);
        }
        assert_eq!(vec!["file-00.xml", "file-01.xml", "file-01/a.xml"], got);
    }

    #[test]
    fn test_files_origin() {
        let dir = tree();
        let mut src = FileSource::new(dir.path()).unwrap();

        let raw = src.next_document().unwrap().unwrap();
        assert_eq!(Some("a.cot".to_string()), raw.origin.file_name());
    }

    #[test]
    fn test_files_missing_root() {
        let res = FileSource::new(Path::new("/nonexistent/cotwatch/samples"));
        assert!(matches!(res, Err(SourceError::Walk(..))));
    }

    #[cfg(unix)]
    #[test]
    fn test_files_unreadable_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.xml"), [0xff, 0xfe, 0x00]).unwrap();
        fs::write(dir.path().join("b.xml"), "ok").unwrap();

        let mut src = FileSource::new(dir.path()).unwrap();
        let first = src.next_document().unwrap();
        match first {
            Err(e) => assert!(!e.is_fatal()),
            Ok(_) => panic!("invalid UTF-8 must not be read"),
        }
        assert_eq!("ok", src.next_document().unwrap().unwrap().data);
        assert!(src.next_document().is_none());
    }
}
