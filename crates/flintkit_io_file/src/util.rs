use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::spec::{
    EnumFileDirection, EnumFileExistsStrategy, EnumFileMissingStrategy, EnumFileUnit,
    EnumTextEncoding, FileOpError, SpecOpenOptions,
};

////////////////////////////////////////////////////////////////////////////////
// #region PolicyResolution

/// Open parameters after default resolution; no blanks remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SpecResolvedOpen {
    pub(crate) direction: EnumFileDirection,
    pub(crate) unit: EnumFileUnit,
    pub(crate) rule_exists: EnumFileExistsStrategy,
    pub(crate) rule_missing: EnumFileMissingStrategy,
    pub(crate) encoding: EnumTextEncoding,
}

/// Resolve unset open parameters to their defaults.
///
/// Supplied parameters always win; only blanks are filled. Blanks resolve in
/// dependency order, so the `rule_missing` default can see a `rule_exists`
/// the caller supplied:
/// - `direction`: `Input`.
/// - `unit`: `Char`.
/// - `encoding`: `Utf8`.
/// - `rule_exists`: `Error` (consulted for `Output` handles).
/// - `rule_missing`: `Error` for `Input`. For `Output`, `Error` when the
///   resolved `rule_exists` is `Overwrite` or `Append` (both continue from
///   existing content), else `Create`.
pub(crate) fn derive_resolved_open(spec_open_options: &SpecOpenOptions) -> SpecResolvedOpen {
    let direction = spec_open_options
        .direction
        .unwrap_or(EnumFileDirection::Input);
    let unit = spec_open_options.unit.unwrap_or(EnumFileUnit::Char);
    let encoding = spec_open_options.encoding.unwrap_or_default();
    let rule_exists = spec_open_options
        .rule_exists
        .unwrap_or(EnumFileExistsStrategy::Error);
    let rule_missing = spec_open_options.rule_missing.unwrap_or(match direction {
        EnumFileDirection::Input => EnumFileMissingStrategy::Error,
        EnumFileDirection::Output => match rule_exists {
            EnumFileExistsStrategy::Overwrite | EnumFileExistsStrategy::Append => {
                EnumFileMissingStrategy::Error
            }
            EnumFileExistsStrategy::Error | EnumFileExistsStrategy::Truncate => {
                EnumFileMissingStrategy::Create
            }
        },
    });

    SpecResolvedOpen {
        direction,
        unit,
        rule_exists,
        rule_missing,
        encoding,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PlatformOpen

fn derive_open_error(path: &Path, e: io::Error) -> io::Error {
    io::Error::new(e.kind(), format!("Failed to open {} ({e})", path.display()))
}

/// Open `path` with the platform flags derived from resolved policies.
///
/// Input handles open read-only; the `Create` missing rule retries with
/// read+write+create only after a not-found, so existing read-only files
/// still open. Output handles map the `(rule_exists, rule_missing)` pair
/// onto write/append/truncate/create/create-new flags. The `(Error, Error)`
/// pair fails whichever way the probe goes and never opens or creates
/// anything.
pub(crate) fn open_scoped_file(
    path: &Path,
    spec_resolved: &SpecResolvedOpen,
) -> Result<fs::File, FileOpError> {
    let mut cfg_open = fs::OpenOptions::new();
    match spec_resolved.direction {
        EnumFileDirection::Input => match spec_resolved.rule_missing {
            EnumFileMissingStrategy::Error => {
                cfg_open.read(true);
            }
            EnumFileMissingStrategy::Create => {
                match fs::OpenOptions::new().read(true).open(path) {
                    Ok(file) => return Ok(file),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        cfg_open.read(true).write(true).create(true);
                    }
                    Err(e) => return Err(FileOpError::Io(derive_open_error(path, e))),
                }
            }
        },
        EnumFileDirection::Output => {
            match (spec_resolved.rule_exists, spec_resolved.rule_missing) {
                (EnumFileExistsStrategy::Error, EnumFileMissingStrategy::Create) => {
                    cfg_open.write(true).create_new(true);
                }
                (EnumFileExistsStrategy::Error, EnumFileMissingStrategy::Error) => {
                    // Both resolved rules demand failure; probe, never open.
                    return match fs::symlink_metadata(path) {
                        Ok(_) => Err(FileOpError::Io(io::Error::new(
                            io::ErrorKind::AlreadyExists,
                            format!("Failed to open {} (entity already exists)", path.display()),
                        ))),
                        Err(e) => Err(FileOpError::Io(derive_open_error(path, e))),
                    };
                }
                (EnumFileExistsStrategy::Truncate, rule_missing) => {
                    cfg_open.write(true).truncate(true);
                    if rule_missing == EnumFileMissingStrategy::Create {
                        cfg_open.create(true);
                    }
                }
                (EnumFileExistsStrategy::Append, rule_missing) => {
                    cfg_open.append(true);
                    if rule_missing == EnumFileMissingStrategy::Create {
                        cfg_open.create(true);
                    }
                }
                (EnumFileExistsStrategy::Overwrite, rule_missing) => {
                    cfg_open.write(true);
                    if rule_missing == EnumFileMissingStrategy::Create {
                        cfg_open.create(true);
                    }
                }
            }
        }
    }

    cfg_open
        .open(path)
        .map_err(|e| FileOpError::Io(derive_open_error(path, e)))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TextCodec

/// Incremental decoder for chunked byte input.
///
/// A multi-byte sequence cut at a chunk boundary is carried (at most three
/// bytes) into the next call instead of being rejected.
#[derive(Debug)]
pub(crate) struct TextChunkDecoder {
    encoding: EnumTextEncoding,
    v_carry: Vec<u8>,
}

impl TextChunkDecoder {
    pub(crate) fn new(encoding: EnumTextEncoding) -> Self {
        Self {
            encoding,
            v_carry: Vec::new(),
        }
    }

    /// Decode one chunk, appending completed characters to `c_out`.
    pub(crate) fn decode_chunk(
        &mut self,
        v_chunk: &[u8],
        c_out: &mut String,
    ) -> Result<(), FileOpError> {
        match self.encoding {
            EnumTextEncoding::Latin1 => {
                c_out.reserve(v_chunk.len());
                for &n_byte in v_chunk {
                    c_out.push(char::from(n_byte));
                }
                Ok(())
            }
            EnumTextEncoding::Utf8 => {
                if self.v_carry.is_empty() {
                    return self._decode_utf8_chunk(v_chunk, c_out);
                }
                let mut v_joined = std::mem::take(&mut self.v_carry);
                v_joined.extend_from_slice(v_chunk);
                self._decode_utf8_chunk(&v_joined, c_out)
            }
        }
    }

    fn _decode_utf8_chunk(
        &mut self,
        v_bytes: &[u8],
        c_out: &mut String,
    ) -> Result<(), FileOpError> {
        match std::str::from_utf8(v_bytes) {
            Ok(c_text) => {
                c_out.push_str(c_text);
                Ok(())
            }
            Err(e) => {
                if e.error_len().is_some() {
                    return Err(FileOpError::Encoding(
                        "Invalid UTF-8 byte sequence in input.".to_string(),
                    ));
                }
                let (v_head, v_tail) = v_bytes.split_at(e.valid_up_to());
                c_out.push_str(std::str::from_utf8(v_head).unwrap_or_default());
                self.v_carry.extend_from_slice(v_tail);
                Ok(())
            }
        }
    }

    /// Signal an encoding error if bytes of an unfinished sequence remain.
    pub(crate) fn finish(&self) -> Result<(), FileOpError> {
        if self.v_carry.is_empty() {
            return Ok(());
        }
        Err(FileOpError::Encoding(
            "Truncated multi-byte sequence at end of input.".to_string(),
        ))
    }
}

/// Encode `text` under `encoding` and write it to `output` in one call.
pub(crate) fn write_text_units<W>(
    output: &mut W,
    text: &str,
    encoding: EnumTextEncoding,
) -> Result<(), FileOpError>
where
    W: Write + ?Sized,
{
    match encoding {
        EnumTextEncoding::Utf8 => {
            output.write_all(text.as_bytes())?;
            Ok(())
        }
        EnumTextEncoding::Latin1 => {
            let mut v_encoded = Vec::with_capacity(text.len());
            for chr in text.chars() {
                let n_code = u32::from(chr);
                if n_code > 0xFF {
                    return Err(FileOpError::Encoding(format!(
                        "Character U+{n_code:04X} is not representable in Latin-1."
                    )));
                }
                v_encoded.push(n_code as u8);
            }
            output.write_all(&v_encoded)?;
            Ok(())
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Validation

pub(crate) fn validate_size_buffer(size_buffer: usize) -> Result<(), FileOpError> {
    if size_buffer == 0 {
        return Err(FileOpError::Usage(
            "Arg `size_buffer` must be >= 1.".to_string(),
        ));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LinuxMetadata

/// Carry source permissions, timestamps, and xattrs onto the destination.
pub(crate) fn apply_copy_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    #[cfg(target_os = "linux")]
    {
        apply_metadata_linux(path_file_src, path_file_dst)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (path_file_src, path_file_dst);
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn apply_metadata_linux(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;

    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////


#[cfg(test)]
mod tests {
    use super::testkit::{TestDir, write_text};
    use super::{
        SpecResolvedOpen, TextChunkDecoder, derive_resolved_open, open_scoped_file,
        validate_size_buffer, write_text_units,
    };
    use crate::spec::{
        EnumFileDirection, EnumFileExistsStrategy, EnumFileMissingStrategy, EnumFileUnit,
        EnumTextEncoding, FileOpError, SpecOpenOptions,
    };

    #[test]
    fn resolution_blank_options_default_to_char_input() {
        let spec_resolved = derive_resolved_open(&SpecOpenOptions::default());
        assert_eq!(
            spec_resolved,
            SpecResolvedOpen {
                direction: EnumFileDirection::Input,
                unit: EnumFileUnit::Char,
                rule_exists: EnumFileExistsStrategy::Error,
                rule_missing: EnumFileMissingStrategy::Error,
                encoding: EnumTextEncoding::Utf8,
            }
        );
    }

    #[test]
    fn resolution_output_defaults_to_create_on_missing() {
        let spec_resolved = derive_resolved_open(&SpecOpenOptions {
            direction: Some(EnumFileDirection::Output),
            ..SpecOpenOptions::default()
        });
        assert_eq!(spec_resolved.rule_exists, EnumFileExistsStrategy::Error);
        assert_eq!(spec_resolved.rule_missing, EnumFileMissingStrategy::Create);
    }

    #[test]
    fn resolution_append_and_overwrite_require_existing_file() {
        for rule_exists in [
            EnumFileExistsStrategy::Append,
            EnumFileExistsStrategy::Overwrite,
        ] {
            let spec_resolved = derive_resolved_open(&SpecOpenOptions {
                direction: Some(EnumFileDirection::Output),
                rule_exists: Some(rule_exists),
                ..SpecOpenOptions::default()
            });
            assert_eq!(spec_resolved.rule_missing, EnumFileMissingStrategy::Error);
        }
    }

    #[test]
    fn resolution_supplied_missing_rule_wins_over_dependent_default() {
        let spec_resolved = derive_resolved_open(&SpecOpenOptions {
            direction: Some(EnumFileDirection::Output),
            rule_exists: Some(EnumFileExistsStrategy::Append),
            rule_missing: Some(EnumFileMissingStrategy::Create),
            ..SpecOpenOptions::default()
        });
        assert_eq!(spec_resolved.rule_missing, EnumFileMissingStrategy::Create);
    }

    #[test]
    fn open_error_error_pair_fails_both_ways_without_creating() {
        let tmp = TestDir::new();
        let spec_resolved = SpecResolvedOpen {
            direction: EnumFileDirection::Output,
            unit: EnumFileUnit::Char,
            rule_exists: EnumFileExistsStrategy::Error,
            rule_missing: EnumFileMissingStrategy::Error,
            encoding: EnumTextEncoding::Utf8,
        };

        let path_missing = tmp.path().join("absent.txt");
        let err = open_scoped_file(&path_missing, &spec_resolved).expect_err("must fail");
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
        assert!(!path_missing.exists());

        let path_present = tmp.path().join("present.txt");
        write_text(&path_present, "x");
        let err = open_scoped_file(&path_present, &spec_resolved).expect_err("must fail");
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::AlreadyExists));
    }

    #[test]
    fn validate_size_buffer_rejects_zero() {
        let err = validate_size_buffer(0).expect_err("zero must fail");
        assert!(matches!(err, FileOpError::Usage(_)));
        assert!(validate_size_buffer(1).is_ok());
    }

    #[test]
    fn decoder_joins_multibyte_sequence_split_across_chunks() {
        let mut decoder = TextChunkDecoder::new(EnumTextEncoding::Utf8);
        let mut c_out = String::new();
        decoder
            .decode_chunk(&[0x6E, 0xC3], &mut c_out)
            .expect("first chunk");
        decoder.decode_chunk(&[0xA9], &mut c_out).expect("second chunk");
        decoder.finish().expect("finish");
        assert_eq!(c_out, "n\u{e9}");
    }

    #[test]
    fn decoder_carries_four_byte_sequence_one_byte_at_a_time() {
        let v_bytes = "\u{1F48E}".as_bytes();
        let mut decoder = TextChunkDecoder::new(EnumTextEncoding::Utf8);
        let mut c_out = String::new();
        for &n_byte in v_bytes {
            decoder.decode_chunk(&[n_byte], &mut c_out).expect("chunk");
        }
        decoder.finish().expect("finish");
        assert_eq!(c_out, "\u{1F48E}");
    }

    #[test]
    fn decoder_rejects_invalid_byte() {
        let mut decoder = TextChunkDecoder::new(EnumTextEncoding::Utf8);
        let mut c_out = String::new();
        let err = decoder
            .decode_chunk(&[0x61, 0xFF], &mut c_out)
            .expect_err("invalid byte must fail");
        assert!(matches!(err, FileOpError::Encoding(_)));
    }

    #[test]
    fn decoder_finish_rejects_truncated_tail() {
        let mut decoder = TextChunkDecoder::new(EnumTextEncoding::Utf8);
        let mut c_out = String::new();
        decoder.decode_chunk(&[0xC3], &mut c_out).expect("chunk");
        let err = decoder.finish().expect_err("truncated tail must fail");
        assert!(matches!(err, FileOpError::Encoding(_)));
    }

    #[test]
    fn decoder_latin1_maps_every_byte_to_one_char() {
        let mut decoder = TextChunkDecoder::new(EnumTextEncoding::Latin1);
        let mut c_out = String::new();
        decoder
            .decode_chunk(&[0x63, 0x61, 0x66, 0xE9], &mut c_out)
            .expect("latin1 chunk");
        decoder.finish().expect("finish");
        assert_eq!(c_out, "caf\u{e9}");
    }

    #[test]
    fn encoder_latin1_round_trips_and_rejects_wide_chars() {
        let mut v_out: Vec<u8> = Vec::new();
        write_text_units(&mut v_out, "caf\u{e9}", EnumTextEncoding::Latin1).expect("encode");
        assert_eq!(v_out, vec![0x63, 0x61, 0x66, 0xE9]);

        let mut v_reject: Vec<u8> = Vec::new();
        let err = write_text_units(&mut v_reject, "\u{20AC}", EnumTextEncoding::Latin1)
            .expect_err("wide char must fail");
        assert!(matches!(err, FileOpError::Encoding(_)));
    }

    #[test]
    fn encoder_utf8_writes_source_bytes() {
        let mut v_out: Vec<u8> = Vec::new();
        write_text_units(&mut v_out, "n\u{e9}", EnumTextEncoding::Utf8).expect("encode");
        assert_eq!(v_out, vec![0x6E, 0xC3, 0xA9]);
    }
}
