/*!
 * Tests for the language parameter table
 */

use tesstrain::errors::PipelineError;
use tesstrain::language_params::{is_vertical_font, BuiltinLanguageTable, LanguageResolver, NormMode};

/// Test that English falls back to the Latin font set and exposure 0
#[test]
fn test_resolve_withEnglishDefaults_shouldUseLatinFonts() {
    let params = BuiltinLanguageTable.resolve("eng", None, None).unwrap();

    assert!(params.fonts.iter().any(|f| f == "Arial"));
    assert_eq!(params.exposures, vec![0]);
    assert_eq!(params.leading, 32);
    assert_eq!(params.norm_mode, NormMode::Combined);
    assert!(!params.lang_is_rtl);
}

/// Test that requested fonts and exposures take precedence
#[test]
fn test_resolve_withRequestedFonts_shouldOverrideTable() {
    let fonts = vec!["Noto Sans".to_string()];
    let params = BuiltinLanguageTable
        .resolve("rus", Some(fonts.as_slice()), Some(&[-1, 0, 1][..]))
        .unwrap();

    assert_eq!(params.fonts, fonts);
    assert_eq!(params.exposures, vec![-1, 0, 1]);
    assert_eq!(params.mix_lang, "rus");
}

/// Test that right-to-left scripts enable combining-mark handling
#[test]
fn test_resolve_withHebrew_shouldBeRightToLeft() {
    let params = BuiltinLanguageTable.resolve("heb", None, None).unwrap();
    assert!(params.lang_is_rtl);
    assert_eq!(params.norm_mode, NormMode::CombiningMarks);
    assert_eq!(params.norm_mode.as_arg(), "2");
}

/// Test that Indic scripts use combining marks without being RTL
#[test]
fn test_resolve_withHindi_shouldUseCombiningMarks() {
    let params = BuiltinLanguageTable.resolve("hin", None, None).unwrap();
    assert!(!params.lang_is_rtl);
    assert_eq!(params.norm_mode, NormMode::CombiningMarks);
}

/// Test that language-specific rendering arguments are carried
#[test]
fn test_resolve_withTamil_shouldAddCharSpacing() {
    let params = BuiltinLanguageTable.resolve("tam", None, None).unwrap();
    assert!(params.text2image_extra_args.contains(&"--char_spacing=0.5".to_string()));
}

/// Test that unknown language codes are rejected
#[test]
fn test_resolve_withUnknownCode_shouldFail() {
    let err = BuiltinLanguageTable.resolve("klingon", None, None).unwrap_err();
    assert!(matches!(err, PipelineError::UnknownLanguage(code) if code == "klingon"));
}

/// Test vertical font detection
#[test]
fn test_is_vertical_font_withCjkFont_shouldReturnTrue() {
    assert!(is_vertical_font("TakaoExGothic"));
    assert!(!is_vertical_font("Arial"));
}
