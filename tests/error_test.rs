//! Tests for error types

use polycomp::Error;

#[test]
fn test_invalid_input_error() {
    let error = Error::InvalidInput("filler content must be between 0% and 50%".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid input"));
    assert!(error_str.contains("between 0% and 50%"));
}

#[test]
fn test_unknown_category_lists_known_labels() {
    let error = Error::UnknownCategory {
        field: "Filler_Type".to_string(),
        label: "Graphene".to_string(),
        known: "Lignin, Starch".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("Unknown Filler_Type category 'Graphene'"));
    assert!(error_str.contains("Known categories: Lignin, Starch"));
}

#[test]
fn test_artifact_error_suggests_retraining() {
    let error = Error::Artifact("cannot read artifacts/model.pcm".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Artifact error"));
    assert!(error_str.contains("polycomp train"));
}

#[test]
fn test_checksum_mismatch_hex() {
    let error = Error::ChecksumMismatch {
        expected: 0xDEAD_BEEF,
        actual: 0x0000_00FF,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("0xdeadbeef"));
    assert!(error_str.contains("0x000000ff"));
}

#[test]
fn test_storage_error() {
    let error = Error::StorageError("file not found".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Storage error"));
    assert!(error_str.contains("file not found"));
}

#[test]
fn test_recoverability() {
    assert!(Error::InvalidInput("x".to_string()).is_recoverable());
    assert!(Error::Prediction("x".to_string()).is_recoverable());
    assert!(!Error::Artifact("x".to_string()).is_recoverable());
    assert!(!Error::Config("x".to_string()).is_recoverable());
    assert!(!Error::ChecksumMismatch {
        expected: 1,
        actual: 2
    }
    .is_recoverable());
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: Error = json_error.into();
    assert!(matches!(error, Error::Serialization(_)));
}

#[test]
fn test_other_error() {
    let error = Error::Other("custom error message".to_string());
    let error_str = format!("{error}");
    assert_eq!(error_str, "custom error message");
}

#[test]
fn test_error_debug() {
    let error = Error::Training("no rows".to_string());
    let debug_str = format!("{error:?}");
    assert!(debug_str.contains("Training"));
}

#[test]
fn test_result_type_alias() {
    #[allow(clippy::unnecessary_wraps)]
    fn returns_result() -> polycomp::Result<i32> {
        Ok(42)
    }

    let result = returns_result();
    assert!(result.is_ok());
    assert_eq!(result.unwrap(), 42);
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> polycomp::Result<i32> {
        Err(Error::Other("test error".to_string()))
    }

    let result = returns_error();
    assert!(result.is_err());
}
