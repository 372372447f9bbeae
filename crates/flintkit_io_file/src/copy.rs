//! File-to-file and stream-to-stream copy.

use std::io::{self, Read, Write};
use std::path::Path;

use crate::open::{with_input_file, with_output_file};
use crate::spec::{
    EnumFileUnit, EnumTextEncoding, FileOpError, SpecFileCopyOptions, SpecOpenOptions,
    SpecStreamCopyOptions,
};
use crate::util::{TextChunkDecoder, apply_copy_metadata, validate_size_buffer, write_text_units};

/// Copy `input` to `output` until end of input.
///
/// Behavior:
/// - Transfers through the caller's scratch buffer when one is supplied (an
///   empty buffer is a usage error), else through a fresh `size_buffer`
///   byte allocation. A caller buffer lets hot paths reuse one allocation
///   across many calls.
/// - A zero-length read ends the transfer; interrupted reads are retried.
/// - Optionally flushes `output` after the last write.
/// - Neither stream is closed; both are borrowed and stay with the caller.
///
/// Returns the number of bytes moved.
pub fn copy_stream<R, W>(
    input: &mut R,
    output: &mut W,
    spec_cs_options: SpecStreamCopyOptions<'_>,
) -> Result<u64, FileOpError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let SpecStreamCopyOptions {
        buffer,
        size_buffer,
        if_finish_output,
    } = spec_cs_options;

    let mut v_scratch;
    let v_buffer: &mut [u8] = match buffer {
        Some(v_caller) => {
            if v_caller.is_empty() {
                return Err(FileOpError::Usage(
                    "Arg `buffer` must hold at least one byte.".to_string(),
                ));
            }
            v_caller
        }
        None => {
            validate_size_buffer(size_buffer)?;
            v_scratch = vec![0u8; size_buffer];
            &mut v_scratch
        }
    };

    let mut n_copied: u64 = 0;
    loop {
        let n_read = match input.read(v_buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FileOpError::Io(e)),
        };
        output.write_all(&v_buffer[..n_read])?;
        n_copied += n_read as u64;
    }

    if if_finish_output {
        output.flush()?;
    }
    Ok(n_copied)
}

/// Copy the file at `from` onto the file at `to`.
///
/// Behavior:
/// - The source opens first; a missing source fails before the destination
///   is touched.
/// - The destination rule defaults to `Truncate`: an existing destination
///   is replaced silently, unlike the strict whole-file writers.
/// - The destination missing-path rule is left unset and resolves from the
///   destination rule: `Append` and `Overwrite` destinations must already
///   exist, the other rules create.
/// - `Byte` unit streams raw octets. `Char` decodes and re-encodes under
///   `encoding`, validating the text while copying.
/// - Optionally flushes the destination after the transfer, and optionally
///   preserves permissions, timestamps, and extended attributes (Linux)
///   once both handles are released.
///
/// Returns the transferred element count: bytes for `Byte`, characters for
/// `Char`.
pub fn copy_file<P, Q>(
    from: P,
    to: Q,
    spec_fc_options: SpecFileCopyOptions,
) -> Result<u64, FileOpError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    validate_size_buffer(spec_fc_options.size_buffer)?;

    let path_file_src = from.as_ref().to_path_buf();
    let path_file_dst = to.as_ref().to_path_buf();

    let spec_open_src = SpecOpenOptions {
        unit: Some(spec_fc_options.unit),
        encoding: Some(spec_fc_options.encoding),
        ..SpecOpenOptions::default()
    };
    let spec_open_dst = SpecOpenOptions {
        unit: Some(spec_fc_options.unit),
        rule_exists: Some(spec_fc_options.rule_exists_dst),
        encoding: Some(spec_fc_options.encoding),
        ..SpecOpenOptions::default()
    };

    let n_copied = with_input_file(&path_file_src, spec_open_src, |scoped_file_src| {
        with_output_file(&path_file_dst, spec_open_dst, |scoped_file_dst| {
            match spec_fc_options.unit {
                EnumFileUnit::Byte => copy_stream(
                    scoped_file_src,
                    scoped_file_dst,
                    SpecStreamCopyOptions {
                        size_buffer: spec_fc_options.size_buffer,
                        if_finish_output: spec_fc_options.if_finish_output,
                        ..SpecStreamCopyOptions::default()
                    },
                ),
                EnumFileUnit::Char => copy_char_units(
                    scoped_file_src,
                    scoped_file_dst,
                    spec_fc_options.size_buffer,
                    spec_fc_options.if_finish_output,
                    spec_fc_options.encoding,
                ),
            }
        })
    })?;

    if spec_fc_options.if_preserve_metadata {
        apply_copy_metadata(&path_file_src, &path_file_dst)?;
    }
    Ok(n_copied)
}

fn copy_char_units<R, W>(
    input: &mut R,
    output: &mut W,
    size_buffer: usize,
    if_finish_output: bool,
    encoding: EnumTextEncoding,
) -> Result<u64, FileOpError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut decoder = TextChunkDecoder::new(encoding);
    let mut v_buffer = vec![0u8; size_buffer];
    let mut c_chunk = String::new();
    let mut n_copied: u64 = 0;
    loop {
        let n_read = match input.read(&mut v_buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FileOpError::Io(e)),
        };
        c_chunk.clear();
        decoder.decode_chunk(&v_buffer[..n_read], &mut c_chunk)?;
        write_text_units(output, &c_chunk, encoding)?;
        n_copied += c_chunk.chars().count() as u64;
    }
    decoder.finish()?;

    if if_finish_output {
        output.flush()?;
    }
    Ok(n_copied)
}
