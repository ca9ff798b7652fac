/*!
 * Tests for the unicharset and feature extraction phases
 */

use anyhow::Result;
use tesstrain::context::RunContext;
use tesstrain::errors::PipelineError;
use tesstrain::pipeline::features::{extract_features, FeatureMode};
use tesstrain::pipeline::render::generate_images;
use tesstrain::pipeline::unicharset::generate_unicharset;
use crate::common::mock_tools::{value_after, MockToolRunner};
use crate::common::{self, TestWorkspace};

async fn rendered_context(workspace: &TestWorkspace, runner: &MockToolRunner) -> Result<RunContext> {
    let mut ctx = workspace.context(workspace.options(&["Arial", "Courier New"], &[0, 1]))?;
    generate_images(&mut ctx, runner, 2).await?;
    Ok(ctx)
}

/// Test that the unicharset phase feeds every box file to the extractor
#[tokio::test]
async fn test_generate_unicharset_shouldRecordDerivedFiles() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let runner = MockToolRunner::new();
    let mut ctx = rendered_context(&workspace, &runner).await?;

    generate_unicharset(&mut ctx, &runner).await?;

    let extract = &runner.calls_to("unicharset_extractor")[0];
    let args = extract.args_lossy();
    assert_eq!(args.iter().filter(|a| a.ends_with(".box")).count(), 4);
    assert_eq!(value_after(&args, "--norm_mode").as_deref(), Some("1"));

    let unicharset = ctx.unicharset()?.to_path_buf();
    assert_eq!(unicharset, ctx.training_dir.join("eng.unicharset"));
    assert_eq!(ctx.xheights()?, ctx.training_dir.join("eng.xheights"));

    let properties = &runner.calls_to("set_unicharset_properties")[0];
    let args = properties.args_lossy();
    assert_eq!(value_after(&args, "-U"), Some(unicharset.to_string_lossy().into_owned()));
    assert_eq!(value_after(&args, "-O"), Some(unicharset.to_string_lossy().into_owned()));
    Ok(())
}

/// Test that the unicharset phase refuses to run without box files
#[tokio::test]
async fn test_generate_unicharset_withoutBoxFiles_shouldFail() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let mut ctx = workspace.context(workspace.options(&["Arial"], &[0]))?;
    let runner = MockToolRunner::new();

    let err = generate_unicharset(&mut ctx, &runner).await.unwrap_err();
    assert!(matches!(common::pipeline_error(&err), Some(PipelineError::Precondition { .. })));
    assert!(runner.calls().is_empty());
    Ok(())
}

/// Test that one feature file is produced per image with the resource override
#[tokio::test]
async fn test_extract_features_shouldProduceOneFilePerImage() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let runner = MockToolRunner::new();
    let ctx = rendered_context(&workspace, &runner).await?;

    let features = extract_features(&ctx, &runner, FeatureMode::LineData, 2).await?;

    assert_eq!(features.len(), 4);
    for feature in &features {
        assert!(feature.exists());
        assert_eq!(feature.extension().unwrap(), "lstmf");
    }

    let calls = runner.calls_to("tesseract");
    assert_eq!(calls.len(), 4);
    for call in &calls {
        let args = call.args_lossy();
        assert!(args[0].ends_with(".tif"));
        assert_eq!(format!("{}.tif", args[1]), args[0]);
        assert_eq!(&args[2..5], &["--psm", "6", "lstm.train"]);
        assert_eq!(
            call.env,
            vec![("TESSDATA_PREFIX".to_string(), ctx.tessdata_dir.clone().into_os_string())]
        );
    }
    Ok(())
}

/// Test that a language config file is passed when the language ships one
#[tokio::test]
async fn test_extract_features_withLanguageConfig_shouldPassIt() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let config = common::create_test_file(&workspace.langdata_dir, "eng/eng.config", "tessedit_ocr_engine_mode 1\n")?;
    let runner = MockToolRunner::new();
    let ctx = rendered_context(&workspace, &runner).await?;

    extract_features(&ctx, &runner, FeatureMode::LineData, 1).await?;

    for call in runner.calls_to("tesseract") {
        assert_eq!(call.args.last().unwrap(), config.as_os_str());
    }
    Ok(())
}

/// Test that a failing extraction job fails the phase after all jobs ran
#[tokio::test]
async fn test_extract_features_withFailingTool_shouldFail() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let render_runner = MockToolRunner::new();
    let ctx = rendered_context(&workspace, &render_runner).await?;
    let runner = MockToolRunner::failing("tesseract");

    let err = extract_features(&ctx, &runner, FeatureMode::LineData, 2).await.unwrap_err();

    assert!(matches!(common::pipeline_error(&err), Some(PipelineError::ToolFailed { .. })));
    assert_eq!(runner.count("tesseract"), 4);
    assert!(format!("{:#}", err).contains("4 of 4 feature extraction jobs failed"));
    Ok(())
}

/// Test that a recogniser exiting cleanly without a feature file fails the phase
#[tokio::test]
async fn test_extract_features_withMissingFeatureFile_shouldReportMissingOutput() -> Result<()> {
    let workspace = TestWorkspace::new()?;
    let render_runner = MockToolRunner::new();
    let ctx = rendered_context(&workspace, &render_runner).await?;
    let runner = MockToolRunner::skipping_lstmf_for("Courier_New");

    let err = extract_features(&ctx, &runner, FeatureMode::LineData, 2).await.unwrap_err();

    match common::pipeline_error(&err) {
        Some(PipelineError::MissingOutput(path)) => {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("eng.Courier_New.exp"), "unexpected file {}", name);
            assert!(name.ends_with(".lstmf"));
            assert!(!path.exists());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(runner.count("tesseract"), 4);
    assert!(ctx.training_dir.join("eng.Arial.exp0.lstmf").exists());
    assert_eq!(runner.count("combine_lang_model"), 0);
    Ok(())
}
