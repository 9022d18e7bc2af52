use super::{Clock, FileDescriptor, RequestContext, Result, StorageDirectory, SystemClock, UploadResolver};
use std::path::PathBuf;

/// Default resolver: every file goes into the same directory, named `<epoch-millis>-<original name>`.
///
/// The original name is used verbatim. Path separators, `..` segments and empty names are not
/// rejected or rewritten.
#[derive(Debug, Clone)]
pub struct TimestampResolver<C = SystemClock> {
    directory: StorageDirectory,
    clock: C,
}

impl TimestampResolver {
    pub fn new(directory: StorageDirectory) -> Self {
        Self::with_clock(directory, SystemClock)
    }
}

impl<C: Clock> TimestampResolver<C> {
    pub fn with_clock(directory: StorageDirectory, clock: C) -> Self {
        Self { directory, clock }
    }

    pub fn directory(&self) -> &StorageDirectory {
        &self.directory
    }

    /// Storage filename for a client-supplied name at the current instant
    pub fn filename_for(&self, original_name: &str) -> String {
        format!("{}-{}", self.clock.now_millis(), original_name)
    }
}

impl<C: Clock> UploadResolver for TimestampResolver<C> {
    fn resolve_destination(&self, _ctx: &RequestContext, _file: &FileDescriptor) -> Result<PathBuf> {
        Ok(self.directory.path().to_path_buf())
    }

    fn resolve_filename(&self, _ctx: &RequestContext, file: &FileDescriptor) -> Result<String> {
        Ok(self.filename_for(&file.original_name))
    }
}
