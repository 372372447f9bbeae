//! Scoped file opening with default-filling policy resolution.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::spec::{
    EnumFileDirection, EnumFileUnit, EnumTextEncoding, FileOpError, SpecOpenOptions,
};
use crate::util::{derive_resolved_open, open_scoped_file};

/// An open file handle scoped to one `with_file` call.
///
/// Carries the resolved element unit and text encoding alongside the
/// platform handle. The handle is only ever lent to the caller's closure by
/// `&mut`, so it cannot outlive its scope; release happens on every exit
/// path, including unwinds.
#[derive(Debug)]
pub struct ScopedFile {
    file: fs::File,
    path: PathBuf,
    unit: EnumFileUnit,
    encoding: EnumTextEncoding,
}

impl ScopedFile {
    /// Element unit this handle was opened with.
    pub fn unit(&self) -> EnumFileUnit {
        self.unit
    }

    /// Text encoding this handle was opened with.
    pub fn encoding(&self) -> EnumTextEncoding {
        self.encoding
    }

    /// Path this handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte length reported by file metadata.
    pub fn byte_length(&self) -> Result<u64, FileOpError> {
        match self.file.metadata() {
            Ok(stat_file) => Ok(stat_file.len()),
            Err(e) => Err(FileOpError::UnknownLength {
                path: self.path.clone(),
                message: e.to_string(),
            }),
        }
    }
}

impl Read for ScopedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for ScopedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Open `path` as directed by `spec_open_options`, pass the handle to
/// `body`, and release the handle when `body` returns.
///
/// Behavior:
/// - Unset options resolve to their defaults; the missing-path default
///   depends on the direction and on the resolved existing-path rule.
/// - Exactly one handle is opened per call, before `body` runs.
/// - The handle is released on every exit path, including error returns
///   from `body` and unwinds through it.
/// - Platform failures keep their error kind (`NotFound`, `AlreadyExists`)
///   with the path attached to the message.
///
/// Returns whatever `body` returns.
pub fn with_file<P, T, F>(
    path: P,
    spec_open_options: SpecOpenOptions,
    body: F,
) -> Result<T, FileOpError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut ScopedFile) -> Result<T, FileOpError>,
{
    let path_file = path.as_ref().to_path_buf();
    let spec_resolved = derive_resolved_open(&spec_open_options);
    let file = open_scoped_file(&path_file, &spec_resolved)?;
    let mut scoped_file = ScopedFile {
        file,
        path: path_file,
        unit: spec_resolved.unit,
        encoding: spec_resolved.encoding,
    };
    body(&mut scoped_file)
}

/// Open `path` for input and run `body`.
///
/// The direction is fixed by this wrapper; a `direction` supplied in
/// `spec_open_options` is a usage error, signaled before anything is opened
/// or created.
pub fn with_input_file<P, T, F>(
    path: P,
    spec_open_options: SpecOpenOptions,
    body: F,
) -> Result<T, FileOpError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut ScopedFile) -> Result<T, FileOpError>,
{
    if spec_open_options.direction.is_some() {
        return Err(FileOpError::Usage(
            "Arg `direction` must not be supplied to `with_input_file`.".to_string(),
        ));
    }
    let spec_fixed = SpecOpenOptions {
        direction: Some(EnumFileDirection::Input),
        ..spec_open_options
    };
    with_file(path, spec_fixed, body)
}

/// Open `path` for output and run `body`.
///
/// The direction is fixed by this wrapper; a `direction` supplied in
/// `spec_open_options` is a usage error, signaled before anything is opened
/// or created.
pub fn with_output_file<P, T, F>(
    path: P,
    spec_open_options: SpecOpenOptions,
    body: F,
) -> Result<T, FileOpError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut ScopedFile) -> Result<T, FileOpError>,
{
    if spec_open_options.direction.is_some() {
        return Err(FileOpError::Usage(
            "Arg `direction` must not be supplied to `with_output_file`.".to_string(),
        ));
    }
    let spec_fixed = SpecOpenOptions {
        direction: Some(EnumFileDirection::Output),
        ..spec_open_options
    };
    with_file(path, spec_fixed, body)
}
