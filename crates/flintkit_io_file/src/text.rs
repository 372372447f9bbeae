//! Whole-file and whole-stream string transfer.

use std::io::{self, Read};
use std::path::Path;

use crate::open::{with_input_file, with_output_file};
use crate::spec::{
    EnumFileUnit, FileOpError, SpecOpenOptions, SpecStringReadOptions, SpecStringWriteOptions,
};
use crate::util::{TextChunkDecoder, validate_size_buffer, write_text_units};

/// Read the entire file at `path` into a freshly allocated string.
///
/// Behavior:
/// - Opens for character input; an unset `rule_missing` signals the
///   platform not-found error.
/// - Transfers in chunks of `size_buffer` bytes; the total size is never
///   assumed known in advance, so arbitrarily large files stream through a
///   fixed-size buffer.
/// - Multi-byte sequences split at a chunk boundary decode across the
///   boundary; invalid or truncated sequences signal an encoding error.
///
/// Returns the decoded contents.
pub fn read_file_into_string<P>(
    path: P,
    spec_sr_options: SpecStringReadOptions,
) -> Result<String, FileOpError>
where
    P: AsRef<Path>,
{
    validate_size_buffer(spec_sr_options.size_buffer)?;

    let spec_open_options = SpecOpenOptions {
        unit: Some(EnumFileUnit::Char),
        rule_missing: spec_sr_options.rule_missing,
        encoding: Some(spec_sr_options.encoding),
        ..SpecOpenOptions::default()
    };
    with_input_file(path, spec_open_options, |scoped_file| {
        read_stream_into_string(scoped_file, spec_sr_options)
    })
}

/// Read `input` to its end, decoding into a freshly allocated string.
///
/// The stream is consumed but never closed; ownership stays with the
/// caller. `rule_missing` has no meaning here and is ignored.
pub fn read_stream_into_string<R>(
    input: &mut R,
    spec_sr_options: SpecStringReadOptions,
) -> Result<String, FileOpError>
where
    R: Read + ?Sized,
{
    validate_size_buffer(spec_sr_options.size_buffer)?;

    let mut decoder = TextChunkDecoder::new(spec_sr_options.encoding);
    let mut v_buffer = vec![0u8; spec_sr_options.size_buffer];
    let mut c_content = String::new();
    loop {
        let n_read = match input.read(&mut v_buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FileOpError::Io(e)),
        };
        decoder.decode_chunk(&v_buffer[..n_read], &mut c_content)?;
    }
    decoder.finish()?;
    Ok(c_content)
}

/// Write `text` to the file at `path` in one call.
///
/// An unset `rule_exists` resolves to `Error`: an existing file signals the
/// platform already-exists error unless a replacement rule is supplied.
pub fn write_string_into_file<P>(
    text: &str,
    path: P,
    spec_sw_options: SpecStringWriteOptions,
) -> Result<(), FileOpError>
where
    P: AsRef<Path>,
{
    let spec_open_options = SpecOpenOptions {
        unit: Some(EnumFileUnit::Char),
        rule_exists: spec_sw_options.rule_exists,
        rule_missing: spec_sw_options.rule_missing,
        encoding: Some(spec_sw_options.encoding),
        ..SpecOpenOptions::default()
    };
    with_output_file(path, spec_open_options, |scoped_file| {
        write_text_units(scoped_file, text, spec_sw_options.encoding)
    })
}
