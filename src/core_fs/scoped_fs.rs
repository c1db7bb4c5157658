use crate::core_fs::error::FsError;
use log::warn;
use std::ffi::OsStr;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// A filesystem handle jailed to a single root directory.
///
/// Paths handed to the handle are *virtual*: `/` is the jail root and a
/// leading slash never refers to the host filesystem. Every path is first
/// normalized lexically (a `..` that would climb above the root is refused,
/// not clamped), then resolved against the canonical, symlink-following
/// location on disk. Anything that does not land inside the canonical root
/// fails with [`FsError::AccessDenied`].
#[derive(Debug, Clone)]
pub struct ScopedFs {
    root: Arc<Path>,
}

/// A directory entry as returned by [`ScopedFs::list`].
#[derive(Debug)]
pub struct DirEntryInfo {
    pub name: String,
    /// Metadata of the entry itself; symlinks are not followed.
    pub metadata: Metadata,
}

impl ScopedFs {
    /// Binds a new handle to `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, FsError> {
        let root = root.as_ref();
        let canonical = fs::canonicalize(root)
            .map_err(|e| FsError::RootUnavailable(format!("{}: {}", root.display(), e)))?;
        if !canonical.is_dir() {
            return Err(FsError::RootUnavailable(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        Ok(Self {
            root: Arc::from(canonical),
        })
    }

    /// The canonical host path of the jail root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a virtual path to a host path inside the root, following
    /// symlinks all the way. The final component may not exist yet.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        let relative = normalize(path)?;
        self.confine(path, &self.root.join(relative))
    }

    /// Resolves the directory entry named by `path` without following its
    /// final component. The parent must resolve inside the root. The root
    /// itself is not an entry and is refused.
    fn resolve_entry(&self, path: &str) -> Result<PathBuf, FsError> {
        let relative = normalize(path)?;
        let name = match relative.file_name() {
            Some(name) => name.to_owned(),
            None => return Err(FsError::AccessDenied(path.to_string())),
        };
        let parent = relative.parent().unwrap_or_else(|| Path::new(""));
        let parent = self.confine(path, &self.root.join(parent))?;
        Ok(parent.join(name))
    }

    fn confine(&self, requested: &str, candidate: &Path) -> Result<PathBuf, FsError> {
        // Canonicalize the longest existing prefix, then re-append the rest.
        let mut existing = candidate;
        let mut tail: Vec<&OsStr> = Vec::new();
        let canonical = loop {
            match fs::canonicalize(existing) {
                Ok(canonical) => break canonical,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    if fs::symlink_metadata(existing).is_ok() {
                        warn!("Refusing dangling symlink in path {:?}", requested);
                        return Err(FsError::AccessDenied(requested.to_string()));
                    }
                    match (existing.parent(), existing.file_name()) {
                        (Some(parent), Some(name)) => {
                            tail.push(name);
                            existing = parent;
                        }
                        _ => return Err(FsError::NotFound(requested.to_string())),
                    }
                }
                Err(err) => return Err(FsError::from_io(requested, err)),
            }
        };

        let resolved = tail
            .iter()
            .rev()
            .fold(canonical, |path, part| path.join(part));
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            warn!(
                "Path {:?} escapes jail root {}",
                requested,
                self.root.display()
            );
            Err(FsError::AccessDenied(requested.to_string()))
        }
    }

    /// Resolves `path` to a directory and returns its normalized virtual form.
    pub fn virtual_dir(&self, path: &str) -> Result<String, FsError> {
        let host = self.resolve(path)?;
        let metadata = fs::metadata(&host).map_err(|e| FsError::from_io(path, e))?;
        if !metadata.is_dir() {
            return Err(FsError::NotFound(path.to_string()));
        }
        Ok(self.to_virtual(&host))
    }

    fn to_virtual(&self, host: &Path) -> String {
        let relative = host.strip_prefix(&self.root).unwrap_or_else(|_| Path::new(""));
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("/{}", parts.join("/"))
    }

    pub fn open(&self, path: &str) -> Result<File, FsError> {
        let host = self.resolve(path)?;
        File::open(host).map_err(|e| FsError::from_io(path, e))
    }

    /// Opens `path` for writing, creating or truncating it.
    pub fn create(&self, path: &str) -> Result<File, FsError> {
        let host = self.resolve(path)?;
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(host)
            .map_err(|e| FsError::from_io(path, e))
    }

    pub fn append(&self, path: &str) -> Result<File, FsError> {
        let host = self.resolve(path)?;
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(host)
            .map_err(|e| FsError::from_io(path, e))
    }

    pub fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        let host = self.resolve(path)?;
        fs::metadata(host).map_err(|e| FsError::from_io(path, e))
    }

    /// Lists a directory, sorted by name.
    pub fn list(&self, path: &str) -> Result<Vec<DirEntryInfo>, FsError> {
        let host = self.resolve(path)?;
        let mut entries = Vec::new();
        for entry in fs::read_dir(host).map_err(|e| FsError::from_io(path, e))? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            entries.push(DirEntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                metadata,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    pub fn create_dir(&self, path: &str) -> Result<(), FsError> {
        let host = self.resolve(path)?;
        fs::create_dir(host).map_err(|e| FsError::from_io(path, e))
    }

    /// Removes a file or symlink. A symlink is removed, never its target.
    pub fn remove_file(&self, path: &str) -> Result<(), FsError> {
        let host = self.resolve_entry(path)?;
        fs::remove_file(host).map_err(|e| FsError::from_io(path, e))
    }

    /// Removes an empty directory. The root cannot be removed.
    pub fn remove_dir(&self, path: &str) -> Result<(), FsError> {
        let host = self.resolve_entry(path)?;
        fs::remove_dir(host).map_err(|e| FsError::from_io(path, e))
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        let source = self.resolve_entry(from)?;
        let target = self.resolve_entry(to)?;
        fs::rename(source, target).map_err(|e| FsError::from_io(from, e))
    }
}

/// Lexically normalizes a virtual path into a root-relative path made only of
/// normal components.
fn normalize(path: &str) -> Result<PathBuf, FsError> {
    let mut parts: Vec<&OsStr> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(FsError::AccessDenied(path.to_string()));
                }
            }
            Component::Prefix(_) => return Err(FsError::AccessDenied(path.to_string())),
        }
    }
    Ok(parts.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::TempDir;

    fn jail() -> (TempDir, ScopedFs) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("pub")).unwrap();
        fs::write(dir.path().join("pub/readme.txt"), b"hello").unwrap();
        let scoped = ScopedFs::new(dir.path()).unwrap();
        (dir, scoped)
    }

    fn assert_denied<T: std::fmt::Debug>(result: Result<T, FsError>) {
        match result {
            Err(FsError::AccessDenied(_)) => {}
            other => panic!("expected AccessDenied, got {:?}", other),
        }
    }

    #[test]
    fn test_root_is_canonical() {
        let (dir, scoped) = jail();
        assert_eq!(scoped.root(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_root_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let result = ScopedFs::new(dir.path().join("missing"));
        assert!(matches!(result, Err(FsError::RootUnavailable(_))));
    }

    #[test]
    fn test_file_root_is_unavailable() {
        let (dir, _) = jail();
        let result = ScopedFs::new(dir.path().join("pub/readme.txt"));
        assert!(matches!(result, Err(FsError::RootUnavailable(_))));
    }

    #[test]
    fn test_traversal_above_root_is_denied() {
        let (_dir, scoped) = jail();
        assert_denied(scoped.resolve("../../etc/passwd"));
        assert_denied(scoped.resolve(".."));
        assert_denied(scoped.resolve("pub/../../x"));
        assert_denied(scoped.resolve("/pub/../../../etc"));
        assert_denied(scoped.open("../../etc/passwd"));
    }

    #[test]
    fn test_traversal_inside_root_is_allowed() {
        let (_dir, scoped) = jail();
        let resolved = scoped.resolve("pub/../pub/./readme.txt").unwrap();
        assert_eq!(resolved, scoped.root().join("pub/readme.txt"));
    }

    #[test]
    fn test_absolute_paths_are_root_relative() {
        let (_dir, scoped) = jail();
        let resolved = scoped.resolve("/etc/passwd").unwrap();
        assert_eq!(resolved, scoped.root().join("etc/passwd"));
        assert!(matches!(scoped.open("/etc/passwd"), Err(FsError::NotFound(_))));

        let mut content = String::new();
        scoped
            .open("/pub/readme.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn test_root_resolves_to_itself() {
        let (_dir, scoped) = jail();
        assert_eq!(scoped.resolve("/").unwrap(), scoped.root());
        assert_eq!(scoped.resolve("").unwrap(), scoped.root());
        assert_eq!(scoped.virtual_dir("/").unwrap(), "/");
    }

    #[test]
    fn test_virtual_dir() {
        let (_dir, scoped) = jail();
        assert_eq!(scoped.virtual_dir("pub").unwrap(), "/pub");
        assert_eq!(scoped.virtual_dir("/pub/..").unwrap(), "/");
        assert!(matches!(
            scoped.virtual_dir("pub/readme.txt"),
            Err(FsError::NotFound(_))
        ));
    }

    #[test]
    fn test_create_list_rename_remove() {
        let (_dir, scoped) = jail();
        scoped.create_dir("/incoming").unwrap();
        scoped
            .create("/incoming/a.bin")
            .unwrap()
            .write_all(b"12345")
            .unwrap();
        scoped
            .append("/incoming/a.bin")
            .unwrap()
            .write_all(b"678")
            .unwrap();
        assert_eq!(scoped.stat("incoming/a.bin").unwrap().len(), 8);

        let names: Vec<String> = scoped
            .list("/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["incoming", "pub"]);

        scoped.rename("/incoming/a.bin", "/pub/b.bin").unwrap();
        assert!(scoped.stat("/incoming/a.bin").is_err());
        assert_eq!(scoped.stat("/pub/b.bin").unwrap().len(), 8);

        scoped.remove_file("/pub/b.bin").unwrap();
        scoped.remove_dir("/incoming").unwrap();
        assert!(matches!(scoped.stat("/incoming"), Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_root_cannot_be_removed_or_renamed() {
        let (_dir, scoped) = jail();
        assert_denied(scoped.remove_dir("/"));
        assert_denied(scoped.remove_dir("pub/.."));
        assert_denied(scoped.rename("/", "/elsewhere"));
        assert_denied(scoped.rename("/pub", "/"));
    }

    #[test]
    fn test_rename_out_of_root_is_denied() {
        let (_dir, scoped) = jail();
        assert_denied(scoped.rename("/pub/readme.txt", "../stolen.txt"));
        assert!(scoped.stat("/pub/readme.txt").is_ok());
    }

    #[cfg(unix)]
    mod symlinks {
        use super::*;
        use std::os::unix::fs::symlink;

        #[test]
        fn test_symlink_out_of_root_is_denied() {
            let (dir, scoped) = jail();
            let outside = TempDir::new().unwrap();
            fs::write(outside.path().join("secret.txt"), b"top secret").unwrap();
            symlink(outside.path(), dir.path().join("escape")).unwrap();

            assert_denied(scoped.resolve("escape"));
            assert_denied(scoped.open("escape/secret.txt"));
            assert_denied(scoped.list("/escape"));
            assert_denied(scoped.create("escape/planted.txt"));
            assert_denied(scoped.create_dir("escape/newdir"));
            assert!(!outside.path().join("planted.txt").exists());
        }

        #[test]
        fn test_file_symlink_out_of_root_is_denied() {
            let (dir, scoped) = jail();
            let outside = TempDir::new().unwrap();
            let target = outside.path().join("passwd");
            fs::write(&target, b"root:x:0:0").unwrap();
            symlink(&target, dir.path().join("passwd")).unwrap();

            assert_denied(scoped.open("passwd"));
            assert_denied(scoped.stat("/passwd"));
            assert_denied(scoped.create("passwd"));
            assert_eq!(fs::read(&target).unwrap(), b"root:x:0:0");
        }

        #[test]
        fn test_dangling_symlink_is_denied() {
            let (dir, scoped) = jail();
            let outside = TempDir::new().unwrap();
            symlink(outside.path().join("not-yet"), dir.path().join("dangling")).unwrap();

            assert_denied(scoped.create("dangling"));
            assert!(!outside.path().join("not-yet").exists());
        }

        #[test]
        fn test_symlink_inside_root_is_followed() {
            let (dir, scoped) = jail();
            symlink(dir.path().join("pub"), dir.path().join("shortcut")).unwrap();

            let mut content = String::new();
            scoped
                .open("/shortcut/readme.txt")
                .unwrap()
                .read_to_string(&mut content)
                .unwrap();
            assert_eq!(content, "hello");
            assert_eq!(scoped.virtual_dir("shortcut").unwrap(), "/pub");
        }

        #[test]
        fn test_removing_escaping_symlink_keeps_target() {
            let (dir, scoped) = jail();
            let outside = TempDir::new().unwrap();
            let target = outside.path().join("keep.txt");
            fs::write(&target, b"keep").unwrap();
            symlink(&target, dir.path().join("link")).unwrap();

            scoped.remove_file("link").unwrap();
            assert!(target.exists());
            assert!(fs::symlink_metadata(dir.path().join("link")).is_err());
        }

        #[test]
        fn test_symlinked_root_is_canonicalized() {
            let base = TempDir::new().unwrap();
            fs::create_dir(base.path().join("real")).unwrap();
            fs::write(base.path().join("real/file.txt"), b"x").unwrap();
            symlink(base.path().join("real"), base.path().join("alias")).unwrap();

            let scoped = ScopedFs::new(base.path().join("alias")).unwrap();
            assert_eq!(
                scoped.root(),
                base.path().join("real").canonicalize().unwrap()
            );
            assert_eq!(scoped.stat("file.txt").unwrap().len(), 1);
        }
    }
}
