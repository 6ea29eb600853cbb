//! Resizing one image or a batch of images.
//!
//! Each image goes through two phases:
//!
//! ```text
//! 1. Load      InputFile  →  LoadedImage     (decode, plan, cover crop)
//! 2. Pipeline  LoadedImage →  PipelineResult  (resize, encode, materialize)
//! ```
//!
//! ## Error policy
//!
//! Load failures are real errors: [`resize_image`] returns `Err(LoadError)`,
//! and [`resize_images`] fails as soon as any input fails to load.
//!
//! Pipeline failures are values: the operations return
//! `Ok(Err(PipelineError))` for that image, and a batch keeps going. Check
//! every slot.
//!
//! ## Parallel Processing
//!
//! Batches run each phase across all inputs in parallel using
//! [rayon](https://docs.rs/rayon). Results always come back in input order,
//! whatever order the work finishes in.
//!
//! ## Writing results
//!
//! [`write_outputs`] is the CLI's last step: files and blobs go to the output
//! directory, base64 URIs go to stdout, and each input gets an
//! [`ImageReport`] for the summary and the `--manifest` file.

use crate::config::ConfigError;
use crate::imaging::{
    ImageBackend, LoadError, LoadedImage, MimeType, Output, OutputKind, Plan, PipelineResult,
    ResizeOptions, RustBackend, load, resize, supported_input_extensions,
};
use crate::naming::{NameSource, SystemNames};
use crate::types::{ImageReport, InputFile};
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to load {0}")]
    Load(#[from] LoadError),
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("{failed} of {total} images failed to resize")]
    Incomplete { failed: usize, total: usize },
}

/// Progress events emitted during batch processing.
///
/// Sent through an optional channel so the caller can display progress
/// as images complete, without coupling the batch to output formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// An image was decoded and planned.
    ImageLoaded {
        index: usize,
        name: String,
        plan: Plan,
    },
    /// An image was resized, encoded and materialized.
    ImageResized {
        index: usize,
        name: String,
        kind: OutputKind,
        encoded_bytes: usize,
    },
    /// An image's resize or encode failed; its slot holds the error.
    ImageFailed {
        index: usize,
        name: String,
        error: String,
    },
}

fn emit(progress: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = progress {
        // A dropped receiver only means nobody is watching.
        tx.send(event).ok();
    }
}

/// Run the pipeline for one loaded image and report how it went.
fn finish(
    backend: &impl ImageBackend,
    index: usize,
    image: LoadedImage,
    options: &ResizeOptions,
    names: &impl NameSource,
    progress: &Option<Sender<ProcessEvent>>,
) -> PipelineResult {
    let name = image.name.clone();
    let result = resize(backend, image, &options.output_spec(), names);

    match &result {
        Ok(output) => emit(
            progress,
            ProcessEvent::ImageResized {
                index,
                name,
                kind: output.kind(),
                encoded_bytes: output.encoded_len(),
            },
        ),
        Err(e) => {
            log::warn!("{}", e);
            emit(
                progress,
                ProcessEvent::ImageFailed {
                    index,
                    name,
                    error: e.to_string(),
                },
            );
        }
    }
    result
}

/// Resize a single image.
///
/// The outer `Result` carries load failures; the inner [`PipelineResult`]
/// carries resize/encode failures.
pub fn resize_image(
    backend: &impl ImageBackend,
    file: &InputFile,
    options: &ResizeOptions,
    names: &impl NameSource,
) -> Result<PipelineResult, LoadError> {
    let image = load(backend, file, options.constraints())?;
    Ok(finish(backend, 0, image, options, names, &None))
}

/// Resize a batch of images, preserving input order in the result.
///
/// Every input is loaded in parallel first; the first load failure fails the
/// whole batch. The loaded images are then resized in parallel, each slot
/// holding its own [`PipelineResult`].
pub fn resize_images(
    backend: &impl ImageBackend,
    files: &[InputFile],
    options: &ResizeOptions,
    names: &impl NameSource,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<Vec<PipelineResult>, LoadError> {
    let constraints = options.constraints();

    let loaded: Vec<LoadedImage> = files
        .par_iter()
        .enumerate()
        .map(|(index, file)| -> Result<LoadedImage, LoadError> {
            let image = load(backend, file, constraints)?;
            emit(
                &progress,
                ProcessEvent::ImageLoaded {
                    index,
                    name: image.name.clone(),
                    plan: image.plan,
                },
            );
            Ok(image)
        })
        .collect::<Result<_, _>>()?;

    Ok(loaded
        .into_par_iter()
        .enumerate()
        .map(|(index, image)| finish(backend, index, image, options, names, &progress))
        .collect())
}

/// [`resize_image`] with the pure Rust backend and system-generated names.
pub fn resize_image_default(
    file: &InputFile,
    options: &ResizeOptions,
) -> Result<PipelineResult, LoadError> {
    resize_image(&RustBackend::new(), file, options, &SystemNames)
}

/// [`resize_images`] with the pure Rust backend and system-generated names.
pub fn resize_images_default(
    files: &[InputFile],
    options: &ResizeOptions,
) -> Result<Vec<PipelineResult>, LoadError> {
    resize_images(&RustBackend::new(), files, options, &SystemNames, None)
}

/// Expand CLI inputs into image paths.
///
/// Files are taken as given. Directories are walked recursively for files
/// with a supported image extension, sorted by path.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ProcessError> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in walkdir::WalkDir::new(input) {
            let entry = entry.map_err(|source| ProcessError::Walk {
                path: input.clone(),
                source,
            })?;
            if entry.file_type().is_file() && is_supported_image(entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        paths.extend(found);
    }
    Ok(paths)
}

/// Write each slot's output and report what happened to it.
///
/// `plans` maps slot index to the plan reported by
/// [`ProcessEvent::ImageLoaded`]. Blobs are named `<input stem>.<ext>`;
/// inputs sharing a stem overwrite each other.
pub fn write_outputs(
    files: &[InputFile],
    results: Vec<PipelineResult>,
    plans: &HashMap<usize, Plan>,
    mime_type: &MimeType,
    out_dir: &Path,
    stdout: &mut impl Write,
) -> Result<Vec<ImageReport>, ProcessError> {
    let needs_dir = results
        .iter()
        .any(|r| matches!(r, Ok(Output::File(_) | Output::Blob(_))));
    if needs_dir {
        std::fs::create_dir_all(out_dir)?;
    }

    let mut reports = Vec::with_capacity(results.len());
    for (index, (file, result)) in files.iter().zip(results).enumerate() {
        let mut report = ImageReport {
            input: file.name.clone(),
            plan: plans.get(&index).copied(),
            destination: None,
            encoded_bytes: None,
            error: None,
        };
        match result {
            Ok(output) => {
                report.encoded_bytes = Some(output.encoded_len());
                let destination = match output {
                    Output::File(named) => {
                        let path = out_dir.join(&named.name);
                        std::fs::write(&path, &named.bytes)?;
                        path.display().to_string()
                    }
                    Output::Blob(bytes) => {
                        let path = out_dir.join(format!("{}.{}", file.stem(), mime_type.extension));
                        std::fs::write(&path, &bytes)?;
                        path.display().to_string()
                    }
                    Output::Base64(uri) => {
                        writeln!(stdout, "{}", uri)?;
                        "stdout".to_string()
                    }
                };
                log::debug!("{} -> {}", file.name, destination);
                report.destination = Some(destination);
            }
            Err(e) => report.error = Some(e.to_string()),
        }
        reports.push(report);
    }
    Ok(reports)
}

/// Fail with [`ProcessError::Incomplete`] if any slot holds an error.
pub fn check_complete(reports: &[ImageReport]) -> Result<(), ProcessError> {
    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        return Err(ProcessError::Incomplete {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::imaging::{Dimensions, MimeType, Output, PipelineError};
    use crate::naming::FixedNames;
    use crate::test_helpers::{png_file, write_png};
    use std::time::Duration;
    use tempfile::TempDir;

    fn names() -> FixedNames {
        FixedNames {
            millis: 1,
            suffix: "aaaaaa".into(),
        }
    }

    fn files(names: &[&str]) -> Vec<InputFile> {
        names
            .iter()
            .map(|n| InputFile::new(*n, Vec::new()))
            .collect()
    }

    fn blob_options() -> ResizeOptions {
        ResizeOptions {
            output: OutputKind::Blob,
            ..ResizeOptions::default()
        }
    }

    fn blob(result: &PipelineResult) -> String {
        match result {
            Ok(Output::Blob(bytes)) => String::from_utf8(bytes.clone()).unwrap(),
            other => panic!("expected blob, got {other:?}"),
        }
    }

    // =========================================================================
    // resize_image
    // =========================================================================

    #[test]
    fn resize_image_scenario_width_only() {
        let backend = MockBackend::with_sizes(&[("a.png", 800, 400)]);
        let options = ResizeOptions {
            width: Some(200),
            ..blob_options()
        };

        let result = resize_image(&backend, &files(&["a.png"])[0], &options, &names()).unwrap();
        assert_eq!(blob(&result), "image/webp:200x100");
    }

    #[test]
    fn resize_image_defaults_to_webp_file() {
        let backend = MockBackend::with_sizes(&[("a.png", 800, 400)]);

        let result = resize_image(
            &backend,
            &files(&["a.png"])[0],
            &ResizeOptions::default(),
            &names(),
        )
        .unwrap();

        let Ok(Output::File(file)) = result else {
            panic!("expected file output");
        };
        assert_eq!(file.name, "image-1-aaaaaa.webp");
        assert_eq!(file.content_type, "image/webp");
        assert_eq!(file.bytes, b"image/webp:200x100");
    }

    #[test]
    fn resize_image_load_error_propagates() {
        let backend = MockBackend::new();
        let result = resize_image(
            &backend,
            &files(&["missing.png"])[0],
            &ResizeOptions::default(),
            &names(),
        );
        assert!(matches!(result, Err(LoadError::Decode { .. })));
    }

    #[test]
    fn resize_image_encode_error_is_a_value() {
        let mut backend = MockBackend::with_sizes(&[("a.png", 800, 400)]);
        backend.fail_encode_mime.insert("image/webp".into());

        let result = resize_image(
            &backend,
            &files(&["a.png"])[0],
            &ResizeOptions::default(),
            &names(),
        )
        .unwrap();
        assert!(matches!(result, Err(PipelineError::Encode { .. })));
    }

    // =========================================================================
    // resize_images
    // =========================================================================

    #[test]
    fn batch_preserves_input_order_when_loads_finish_out_of_order() {
        let mut backend =
            MockBackend::with_sizes(&[("a", 800, 400), ("b", 300, 100), ("c", 100, 100)]);
        // `a` finishes loading last.
        backend
            .decode_delays
            .insert("a".into(), Duration::from_millis(50));

        let results =
            resize_images(&backend, &files(&["a", "b", "c"]), &blob_options(), &names(), None)
                .unwrap();

        let outputs: Vec<String> = results.iter().map(blob).collect();
        assert_eq!(
            outputs,
            vec![
                "image/webp:200x100",
                "image/webp:300x100",
                "image/webp:100x100"
            ]
        );
    }

    #[test]
    fn batch_preserves_input_order_when_pipelines_finish_out_of_order() {
        let mut backend =
            MockBackend::with_sizes(&[("a", 800, 400), ("b", 300, 100), ("c", 100, 100)]);
        // `a` finishes resizing last; `b` and `c` are done well before it.
        backend
            .resize_delays
            .insert((200, 100), Duration::from_millis(80));
        let (tx, rx) = std::sync::mpsc::channel();

        let results = resize_images(
            &backend,
            &files(&["a", "b", "c"]),
            &blob_options(),
            &names(),
            Some(tx),
        )
        .unwrap();

        let outputs: Vec<String> = results.iter().map(blob).collect();
        assert_eq!(
            outputs,
            vec![
                "image/webp:200x100",
                "image/webp:300x100",
                "image/webp:100x100"
            ]
        );
        let resized = rx
            .iter()
            .filter(|e| matches!(e, ProcessEvent::ImageResized { .. }))
            .count();
        assert_eq!(resized, 3);
    }

    #[test]
    fn batch_fails_fast_on_load_error() {
        let backend = MockBackend::with_sizes(&[("a", 800, 400), ("c", 100, 100)]);

        let err = resize_images(&backend, &files(&["a", "b", "c"]), &blob_options(), &names(), None)
            .unwrap_err();
        assert_eq!(err.name(), "b");
    }

    #[test]
    fn batch_keeps_going_past_resize_failures() {
        let mut backend =
            MockBackend::with_sizes(&[("a", 800, 400), ("b", 300, 100), ("c", 100, 100)]);
        backend.fail_resize_to.insert((300, 100));

        let results =
            resize_images(&backend, &files(&["a", "b", "c"]), &blob_options(), &names(), None)
                .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(blob(&results[0]), "image/webp:200x100");
        assert!(matches!(&results[1], Err(PipelineError::Resize { name, .. }) if name == "b"));
        assert_eq!(blob(&results[2]), "image/webp:100x100");
    }

    #[test]
    fn batch_cover_mode_outputs_exact_target() {
        let backend = MockBackend::with_sizes(&[("tall", 400, 800), ("wide", 1000, 500)]);
        let options = ResizeOptions {
            width: Some(200),
            height: Some(200),
            cover: true,
            mime_type: MimeType::png(),
            ..blob_options()
        };

        let results =
            resize_images(&backend, &files(&["tall", "wide"]), &options, &names(), None).unwrap();
        for result in &results {
            assert_eq!(blob(result), "image/png:200x200");
        }
    }

    #[test]
    fn batch_of_nothing_is_empty() {
        let backend = MockBackend::new();
        let results = resize_images(&backend, &[], &blob_options(), &names(), None).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn batch_reports_progress() {
        let mut backend = MockBackend::with_sizes(&[("a", 800, 400), ("b", 300, 100)]);
        backend.fail_resize_to.insert((300, 100));
        let (tx, rx) = std::sync::mpsc::channel();

        resize_images(&backend, &files(&["a", "b"]), &blob_options(), &names(), Some(tx))
            .unwrap();

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert_eq!(events.len(), 4);
        assert!(events.contains(&ProcessEvent::ImageLoaded {
            index: 0,
            name: "a".into(),
            plan: Plan {
                natural: Dimensions::new(800, 400),
                target: Dimensions::new(200, 100),
                crop: None,
            },
        }));
        assert!(events.contains(&ProcessEvent::ImageResized {
            index: 0,
            name: "a".into(),
            kind: OutputKind::Blob,
            encoded_bytes: "image/webp:200x100".len(),
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            ProcessEvent::ImageFailed { index: 1, name, .. } if name == "b"
        )));
    }

    // =========================================================================
    // Default backend
    // =========================================================================

    #[test]
    fn default_backend_resizes_real_png() {
        let options = ResizeOptions {
            width: Some(50),
            mime_type: MimeType::png(),
            ..blob_options()
        };

        let result = resize_image_default(&png_file("a.png", 200, 100), &options).unwrap();
        let Ok(Output::Blob(bytes)) = result else {
            panic!("expected blob output");
        };
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (50, 25));
    }

    #[test]
    fn default_backend_batch_rejects_corrupt_input() {
        let inputs = vec![
            png_file("good.png", 20, 20),
            InputFile::new("bad.png", b"nope".to_vec()),
        ];
        let err = resize_images_default(&inputs, &ResizeOptions::default()).unwrap_err();
        assert_eq!(err.name(), "bad.png");
    }

    // =========================================================================
    // collect_inputs
    // =========================================================================

    #[test]
    fn collect_inputs_walks_directories_for_images() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        write_png(tmp.path(), "b.png", 4, 4);
        write_png(&nested, "a.PNG", 4, 4);
        std::fs::write(tmp.path().join("notes.txt"), "skip me").unwrap();

        let paths = collect_inputs(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(paths, vec![tmp.path().join("b.png"), nested.join("a.PNG")]);
    }

    // =========================================================================
    // write_outputs
    // =========================================================================

    fn named(name: &str, bytes: &[u8]) -> PipelineResult {
        Ok(Output::File(crate::imaging::NamedFile {
            name: name.into(),
            content_type: "image/webp".into(),
            bytes: bytes.to_vec(),
        }))
    }

    #[test]
    fn write_outputs_places_files_and_blobs() {
        let tmp = TempDir::new().unwrap();
        let out_dir = tmp.path().join("out");
        let inputs = files(&["in/a.png", "in/b.jpg"]);
        let results = vec![
            named("image-1-aaaaaa.webp", b"first"),
            Ok(Output::Blob(b"second".to_vec())),
        ];
        let mut stdout = Vec::new();

        let reports = write_outputs(
            &inputs,
            results,
            &HashMap::new(),
            &MimeType::webp(),
            &out_dir,
            &mut stdout,
        )
        .unwrap();

        assert_eq!(
            std::fs::read(out_dir.join("image-1-aaaaaa.webp")).unwrap(),
            b"first"
        );
        assert_eq!(std::fs::read(out_dir.join("b.webp")).unwrap(), b"second");
        assert!(stdout.is_empty());
        assert_eq!(reports[1].encoded_bytes, Some(6));
        assert!(check_complete(&reports).is_ok());
    }

    #[test]
    fn write_outputs_prints_base64_and_skips_out_dir() {
        let tmp = TempDir::new().unwrap();
        let out_dir = tmp.path().join("never");
        let results = vec![Ok(Output::Base64("data:image/png;base64,AAAA".into()))];
        let mut stdout = Vec::new();

        let reports = write_outputs(
            &files(&["a.png"]),
            results,
            &HashMap::new(),
            &MimeType::png(),
            &out_dir,
            &mut stdout,
        )
        .unwrap();

        assert_eq!(stdout, b"data:image/png;base64,AAAA\n");
        assert_eq!(reports[0].destination.as_deref(), Some("stdout"));
        assert!(!out_dir.exists());
    }

    #[test]
    fn write_outputs_reports_failed_slots() {
        let tmp = TempDir::new().unwrap();
        let mut backend = MockBackend::with_sizes(&[("a", 800, 400), ("b", 300, 100)]);
        backend.fail_resize_to.insert((300, 100));
        let inputs = files(&["a", "b"]);
        let results = resize_images(&backend, &inputs, &ResizeOptions::default(), &names(), None)
            .unwrap();
        let plans = HashMap::from([(
            0,
            Plan {
                natural: Dimensions::new(800, 400),
                target: Dimensions::new(200, 100),
                crop: None,
            },
        )]);

        let reports = write_outputs(
            &inputs,
            results,
            &plans,
            &MimeType::webp(),
            tmp.path(),
            &mut Vec::new(),
        )
        .unwrap();

        assert!(reports[0].plan.is_some());
        assert!(reports[0].error.is_none());
        assert!(reports[1].error.as_deref().unwrap().contains("b"));
        assert!(matches!(
            check_complete(&reports),
            Err(ProcessError::Incomplete { failed: 1, total: 2 })
        ));
    }

    #[test]
    fn collect_inputs_keeps_explicit_files() {
        let explicit = PathBuf::from("/some/where/photo.tiff");
        let paths = collect_inputs(std::slice::from_ref(&explicit)).unwrap();
        assert_eq!(paths, vec![explicit]);
    }
}
