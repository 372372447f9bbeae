//! Whole-file and whole-stream byte transfer.

use std::io::{Read, Write};
use std::path::Path;

use crate::open::{with_input_file, with_output_file};
use crate::spec::{
    EnumFileUnit, FileOpError, SpecBytesReadOptions, SpecBytesWriteOptions, SpecOpenOptions,
};

/// Read the entire file at `path` into a freshly allocated byte buffer.
///
/// The exact length is taken from file metadata up front; the buffer is
/// allocated once at that length and filled with a single exact read. A
/// length that cannot be determined, or that exceeds addressable memory,
/// signals [`FileOpError::UnknownLength`].
pub fn read_file_into_bytes<P>(path: P) -> Result<Vec<u8>, FileOpError>
where
    P: AsRef<Path>,
{
    let spec_open_options = SpecOpenOptions {
        unit: Some(EnumFileUnit::Byte),
        ..SpecOpenOptions::default()
    };
    with_input_file(path, spec_open_options, |scoped_file| {
        let n_length_raw = scoped_file.byte_length()?;
        let n_length = usize::try_from(n_length_raw).map_err(|_| FileOpError::UnknownLength {
            path: scoped_file.path().to_path_buf(),
            message: "Length exceeds addressable memory.".to_string(),
        })?;
        let mut v_content = vec![0u8; n_length];
        scoped_file.read_exact(&mut v_content)?;
        Ok(v_content)
    })
}

/// Read `input` to its end into a freshly allocated byte buffer.
///
/// No length is assumed knowable; the buffer starts at `size_initial`
/// capacity and grows as needed. The stream is consumed but never closed.
pub fn read_stream_into_bytes<R>(
    input: &mut R,
    spec_br_options: SpecBytesReadOptions,
) -> Result<Vec<u8>, FileOpError>
where
    R: Read + ?Sized,
{
    let mut v_content = Vec::with_capacity(spec_br_options.size_initial);
    input.read_to_end(&mut v_content)?;
    Ok(v_content)
}

/// Write `bytes` to the file at `path` in one call.
///
/// An unset `rule_exists` resolves to `Error`: an existing file signals the
/// platform already-exists error unless a replacement rule is supplied.
pub fn write_bytes_into_file<P>(
    bytes: &[u8],
    path: P,
    spec_bw_options: SpecBytesWriteOptions,
) -> Result<(), FileOpError>
where
    P: AsRef<Path>,
{
    let spec_open_options = SpecOpenOptions {
        unit: Some(EnumFileUnit::Byte),
        rule_exists: spec_bw_options.rule_exists,
        rule_missing: spec_bw_options.rule_missing,
        ..SpecOpenOptions::default()
    };
    with_output_file(path, spec_open_options, |scoped_file| {
        scoped_file.write_all(bytes)?;
        Ok(())
    })
}
