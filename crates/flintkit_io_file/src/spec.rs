//! Open-policy models, per-call option structs, and the top-level error type.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::conf::{N_SIZE_BUFFER_DEFAULT, N_SIZE_BYTES_INITIAL_DEFAULT};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Transfer direction of an opened file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFileDirection {
    /// Read from the file.
    Input,
    /// Write to the file.
    Output,
}

/// Element unit a handle transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFileUnit {
    /// Raw octets.
    Byte,
    /// Decoded characters.
    Char,
}

/// Behavior when an output path already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFileExistsStrategy {
    /// Signal the platform already-exists error.
    Error,
    /// Discard existing content and write from empty.
    Truncate,
    /// Keep existing content and continue at the end.
    Append,
    /// Keep existing content and write in place from the start.
    Overwrite,
}

/// Behavior when the path does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumFileMissingStrategy {
    /// Signal the platform not-found error.
    Error,
    /// Create an empty file first.
    Create,
}

/// Text encoding applied by character-unit transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumTextEncoding {
    /// UTF-8 (default).
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per character.
    Latin1,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OptionStructs

/// Input options for `with_file`.
///
/// `None` means "not supplied"; resolution fills each blank from the other
/// parameters, in dependency order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecOpenOptions {
    /// Transfer direction.
    pub direction: Option<EnumFileDirection>,
    /// Element unit.
    pub unit: Option<EnumFileUnit>,
    /// Existing-path behavior (consulted for output handles).
    pub rule_exists: Option<EnumFileExistsStrategy>,
    /// Missing-path behavior.
    pub rule_missing: Option<EnumFileMissingStrategy>,
    /// Text encoding for `Char` unit handles.
    pub encoding: Option<EnumTextEncoding>,
}

/// Input options for `read_file_into_string` / `read_stream_into_string`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecStringReadOptions {
    /// Chunk size in bytes for the transfer loop.
    pub size_buffer: usize,
    /// Text encoding of the source bytes.
    pub encoding: EnumTextEncoding,
    /// Missing-path behavior (file reads only).
    pub rule_missing: Option<EnumFileMissingStrategy>,
}

impl Default for SpecStringReadOptions {
    fn default() -> Self {
        Self {
            size_buffer: N_SIZE_BUFFER_DEFAULT,
            encoding: EnumTextEncoding::Utf8,
            rule_missing: None,
        }
    }
}

/// Input options for `write_string_into_file`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecStringWriteOptions {
    /// Existing-path behavior; unset resolves to `Error`.
    pub rule_exists: Option<EnumFileExistsStrategy>,
    /// Missing-path behavior.
    pub rule_missing: Option<EnumFileMissingStrategy>,
    /// Text encoding of the written bytes.
    pub encoding: EnumTextEncoding,
}

/// Input options for `read_stream_into_bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecBytesReadOptions {
    /// Initial capacity in bytes of the result buffer.
    pub size_initial: usize,
}

impl Default for SpecBytesReadOptions {
    fn default() -> Self {
        Self {
            size_initial: N_SIZE_BYTES_INITIAL_DEFAULT,
        }
    }
}

/// Input options for `write_bytes_into_file`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecBytesWriteOptions {
    /// Existing-path behavior; unset resolves to `Error`.
    pub rule_exists: Option<EnumFileExistsStrategy>,
    /// Missing-path behavior.
    pub rule_missing: Option<EnumFileMissingStrategy>,
}

/// Input options for `copy_file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFileCopyOptions {
    /// Element unit shared by the source and destination handles.
    pub unit: EnumFileUnit,
    /// Existing-destination behavior.
    pub rule_exists_dst: EnumFileExistsStrategy,
    /// Chunk size in bytes for the transfer loop.
    pub size_buffer: usize,
    /// Flush the destination after the transfer completes.
    pub if_finish_output: bool,
    /// Preserve permissions, times, and extended attributes (Linux).
    pub if_preserve_metadata: bool,
    /// Text encoding for `Char` unit copies.
    pub encoding: EnumTextEncoding,
}

impl Default for SpecFileCopyOptions {
    fn default() -> Self {
        Self {
            unit: EnumFileUnit::Byte,
            rule_exists_dst: EnumFileExistsStrategy::Truncate,
            size_buffer: N_SIZE_BUFFER_DEFAULT,
            if_finish_output: false,
            if_preserve_metadata: false,
            encoding: EnumTextEncoding::Utf8,
        }
    }
}

/// Input options for `copy_stream`.
#[derive(Debug)]
pub struct SpecStreamCopyOptions<'a> {
    /// Caller-owned scratch buffer reused across calls; must be non-empty.
    pub buffer: Option<&'a mut [u8]>,
    /// Chunk size in bytes when no caller buffer is supplied.
    pub size_buffer: usize,
    /// Flush the output after the transfer completes.
    pub if_finish_output: bool,
}

impl Default for SpecStreamCopyOptions<'_> {
    fn default() -> Self {
        Self {
            buffer: None,
            size_buffer: N_SIZE_BUFFER_DEFAULT,
            if_finish_output: false,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// "Operation failed" errors for every public call in this crate.
#[derive(Debug)]
pub enum FileOpError {
    /// Invalid argument or argument combination, detected before any
    /// resource is opened or created.
    Usage(String),
    /// Bytes or characters invalid under the active text encoding.
    Encoding(String),
    /// Byte length of a file could not be determined.
    UnknownLength {
        /// File whose length was requested.
        path: PathBuf,
        /// Underlying failure text.
        message: String,
    },
    /// Platform failure, kind preserved.
    Io(io::Error),
}

impl FileOpError {
    /// Platform error kind when the failure came from the platform.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for FileOpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) => write!(f, "{msg}"),
            Self::Encoding(msg) => write!(f, "{msg}"),
            Self::UnknownLength { path, message } => {
                write!(
                    f,
                    "Failed to determine byte length of {}: {message}",
                    path.display()
                )
            }
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FileOpError {}

impl From<io::Error> for FileOpError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::{
        EnumFileExistsStrategy, EnumFileUnit, EnumTextEncoding, FileOpError, SpecFileCopyOptions,
        SpecOpenOptions, SpecStringReadOptions,
    };

    #[test]
    fn open_options_default_leaves_every_parameter_unset() {
        let spec_open_options = SpecOpenOptions::default();
        assert_eq!(spec_open_options.direction, None);
        assert_eq!(spec_open_options.unit, None);
        assert_eq!(spec_open_options.rule_exists, None);
        assert_eq!(spec_open_options.rule_missing, None);
        assert_eq!(spec_open_options.encoding, None);
    }

    #[test]
    fn copy_options_default_replaces_destination_silently() {
        let spec_fc_options = SpecFileCopyOptions::default();
        assert_eq!(spec_fc_options.unit, EnumFileUnit::Byte);
        assert_eq!(
            spec_fc_options.rule_exists_dst,
            EnumFileExistsStrategy::Truncate
        );
        assert_eq!(spec_fc_options.size_buffer, 4096);
        assert!(!spec_fc_options.if_finish_output);
    }

    #[test]
    fn string_read_options_default_buffer_and_encoding() {
        let spec_sr_options = SpecStringReadOptions::default();
        assert_eq!(spec_sr_options.size_buffer, 4096);
        assert_eq!(spec_sr_options.encoding, EnumTextEncoding::Utf8);
        assert_eq!(spec_sr_options.rule_missing, None);
    }

    #[test]
    fn error_io_kind_is_preserved_through_wrapping() {
        let err = FileOpError::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));

        let err_usage = FileOpError::Usage("Arg `size_buffer` must be >= 1.".to_string());
        assert_eq!(err_usage.io_kind(), None);
    }

    #[test]
    fn error_display_names_the_path_for_unknown_length() {
        let err = FileOpError::UnknownLength {
            path: PathBuf::from("/tmp/sample.bin"),
            message: "metadata unavailable".to_string(),
        };
        let txt = err.to_string();
        assert!(txt.contains("/tmp/sample.bin"));
        assert!(txt.contains("metadata unavailable"));
    }
}
