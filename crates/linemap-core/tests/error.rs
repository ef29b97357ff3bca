//! Tests for error handling

use std::path::PathBuf;

use linemap_core::builder::RecordError;
use linemap_core::error::{CodecError, LineMapError, Result};
use linemap_core::source::SourceError;
use linemap_core::Address;

#[test]
fn test_module_not_found_display()
{
    let error = LineMapError::ModuleNotFound(PathBuf::from("/opt/app/server"));
    let message = format!("{}", error);
    assert!(message.contains("Module not found"));
    assert!(message.contains("/opt/app/server"));
}

#[test]
fn test_enumeration_failures_display()
{
    let error = LineMapError::SymbolEnumerationFailed("no symbol table".to_string());
    assert!(format!("{}", error).contains("Unable to enumerate symbols"));

    let error = LineMapError::LineEnumerationFailed("bad line program".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Unable to enumerate lines"));
    assert!(message.contains("bad line program"));
}

#[test]
fn test_codec_error_converts()
{
    let error: LineMapError = CodecError::UnsupportedVersion(9).into();
    match error {
        LineMapError::Codec(CodecError::UnsupportedVersion(9)) => {}
        other => panic!("Expected Codec variant, got {other:?}"),
    }
}

#[test]
fn test_io_error_converts()
{
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
    let error: LineMapError = io.into();
    assert!(matches!(error, LineMapError::Io(_)));
    assert!(format!("{}", error).contains("read-only"));
}

#[test]
fn test_source_error_display()
{
    let error = SourceError::Dwarf("unexpected end of section".to_string());
    assert!(format!("{}", error).contains("DWARF"));
}

#[test]
fn test_record_error_display()
{
    let error = RecordError::LineOutOfRange {
        line: 1 << 40,
        address: Address::new(0x10),
    };
    let message = format!("{}", error);
    assert!(message.contains("32 bits"));
    assert!(message.contains("0x00000010"));
}

#[test]
fn test_result_type()
{
    // Test that Result type is properly aliased
    let _result: Result<()> = Ok(());
    let _error_result: Result<()> = Err(LineMapError::InvalidArgument("out".to_string()));
}
