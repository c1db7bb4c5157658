// Filesystem jail: every session sees only its own root directory.

pub mod error;
pub mod scoped_fs;

pub use error::FsError;
pub use scoped_fs::{DirEntryInfo, ScopedFs};
