//! `flintkit_io_file` v1:
//! Scoped file opening and whole-content transfer helpers.
//!
//! - `open`  : policy-resolved scoped opening
//! - `text`  : whole-file / whole-stream string transfer
//! - `bytes` : whole-file / whole-stream byte transfer
//! - `copy`  : file-to-file and stream-to-stream copy
//! - `conf`  : constants and default option factories
//! - `spec`  : enums/options/errors
//! - `util`  : shared helper functions

pub mod bytes;
pub mod conf;
pub mod copy;
pub mod open;
pub mod spec;
pub mod text;
mod util;

pub use bytes::{read_file_into_bytes, read_stream_into_bytes, write_bytes_into_file};
pub use copy::{copy_file, copy_stream};
pub use open::{ScopedFile, with_file, with_input_file, with_output_file};
pub use spec::{
    EnumFileDirection, EnumFileExistsStrategy, EnumFileMissingStrategy, EnumFileUnit,
    EnumTextEncoding, FileOpError, SpecBytesReadOptions, SpecBytesWriteOptions,
    SpecFileCopyOptions, SpecOpenOptions, SpecStreamCopyOptions, SpecStringReadOptions,
    SpecStringWriteOptions,
};
pub use text::{read_file_into_string, read_stream_into_string, write_string_into_file};
