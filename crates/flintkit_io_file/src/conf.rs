//! Transfer constants and default option factories.

use crate::spec::{SpecFileCopyOptions, SpecOpenOptions, SpecStreamCopyOptions};

/// Chunk size in bytes for buffered transfer loops.
pub const N_SIZE_BUFFER_DEFAULT: usize = 4096;
/// Initial capacity in bytes for unknown-length stream reads.
pub const N_SIZE_BYTES_INITIAL_DEFAULT: usize = 4096;

/// Build default open options (every parameter left unset).
pub fn derive_default_open_options() -> SpecOpenOptions {
    SpecOpenOptions::default()
}

/// Build default file copy options.
pub fn derive_default_file_copy_options() -> SpecFileCopyOptions {
    SpecFileCopyOptions::default()
}

/// Build default stream copy options (fresh internal buffer).
pub fn derive_default_stream_copy_options() -> SpecStreamCopyOptions<'static> {
    SpecStreamCopyOptions::default()
}
