/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use tesstrain::errors::PipelineError;
use tesstrain::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "eng.Arial.exp0.box", "T 0 0 1 1 0")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));
    Ok(())
}

/// Test that a missing output is classified as such
#[test]
fn test_check_readable_withMissingFile_shouldReportMissingOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("eng.Arial.exp0.box");

    let err = FileManager::check_readable(&missing).unwrap_err();
    assert!(matches!(err, PipelineError::MissingOutput(path) if path == missing));
    Ok(())
}

/// Test that missing phase inputs are precondition errors
#[test]
fn test_require_input_withMissingFile_shouldReportPrecondition() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let err = FileManager::require_input(temp_dir.path().join("eng.training_text")).unwrap_err();
    assert!(matches!(err, PipelineError::Precondition { .. }));
    Ok(())
}

/// Test that empty artifacts fail verification
#[test]
fn test_verify_artifact_withEmptyFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let empty = common::create_test_file(temp_dir.path(), "eng.unicharset", "")?;
    let full = common::create_test_file(temp_dir.path(), "eng.xheights", "Arial 24\n")?;

    assert!(matches!(FileManager::verify_artifact(&empty), Err(PipelineError::EmptyOutput(_))));
    assert!(FileManager::verify_artifact(&full).is_ok());
    Ok(())
}

/// Test that listing filters by prefix and suffix, sorted, without recursing
#[test]
fn test_list_files_withMixedEntries_shouldFilterAndSort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    for name in ["eng.B.exp0.lstmf", "eng.A.exp0.lstmf", "eng.A.exp0.tif", "fra.A.exp0.lstmf"] {
        common::create_test_file(temp_dir.path(), name, "x")?;
    }
    common::create_test_file(temp_dir.path(), "nested/eng.C.exp0.lstmf", "x")?;

    let files = FileManager::list_files(temp_dir.path(), "eng.", ".lstmf")?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["eng.A.exp0.lstmf", "eng.B.exp0.lstmf"]);
    Ok(())
}

/// Test that moving removes the source and creates the target directory
#[test]
fn test_move_file_withNewTargetDir_shouldRelocate() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "eng.A.exp0.lstmf", "features")?;
    let target = temp_dir.path().join("out/eng.A.exp0.lstmf");

    FileManager::move_file(&source, &target)?;
    assert!(!source.exists());
    assert_eq!(FileManager::read_to_string(&target)?, "features");
    Ok(())
}

/// Test that append_line accumulates lines
#[test]
fn test_append_line_withExistingFile_shouldAppend() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("run.log");

    FileManager::append_line(&path, "first")?;
    FileManager::append_line(&path, "second")?;
    assert_eq!(FileManager::read_to_string(&path)?, "first\nsecond\n");
    Ok(())
}
