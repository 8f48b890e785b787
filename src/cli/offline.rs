//! CLI dispatch for the offline `gmcp segment` and `gmcp detect` commands.
//!
//! Both read a local image plus a saved model response, so the pipeline can
//! be rerun without network access or an API key.

use std::path::Path;
use std::process::ExitCode;

use image::DynamicImage;

use crate::segment::{detect_from_response, parse_items, run_pipeline, ItemOutcome};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

fn load_inputs(image: &Path, response: &Path) -> Result<(DynamicImage, String), ExitCode> {
    for path in [image, response] {
        if !path.exists() {
            eprintln!("Error: '{}' does not exist", path.display());
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    }

    let source = image::open(image).map_err(|e| {
        eprintln!("Error: cannot read image '{}': {}", image.display(), e);
        ExitCode::from(EXIT_ERROR)
    })?;
    let text = std::fs::read_to_string(response).map_err(|e| {
        eprintln!("Error: cannot read '{}': {}", response.display(), e);
        ExitCode::from(EXIT_ERROR)
    })?;
    Ok((source, text))
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the segment command.
pub fn run_segment(image: &Path, response: &Path, out: &Path, json: bool) -> ExitCode {
    let (source, text) = match load_inputs(image, response) {
        Ok(inputs) => inputs,
        Err(code) => return code,
    };

    let items = match parse_items(&text) {
        Ok(items) => items,
        Err(e) => {
            eprintln!("Error: invalid segmentation response: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let run = match run_pipeline(&source, &items, out) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if json {
        return print_json(&run.into_result());
    }

    for outcome in &run.outcomes {
        match outcome {
            ItemOutcome::Rendered(item) => {
                let b = item.pixel_box;
                println!(
                    "{}: [{}, {}, {}, {}] -> {}, {}",
                    item.label,
                    b.x0,
                    b.y0,
                    b.x1,
                    b.y1,
                    item.mask_file.display(),
                    item.overlay_file.display()
                );
            }
            ItemOutcome::SkippedInvalidBox { index, label, pixel_box: b } => {
                println!("skipped {} ({}): empty box [{}, {}, {}, {}]", index, label, b.x0, b.y0, b.x1, b.y1);
            }
            ItemOutcome::SkippedBadMask { index, label, reason } => {
                println!("skipped {} ({}): {}", index, label, reason);
            }
        }
    }

    let rendered = run.rendered().count();
    println!(
        "{} rendered, {} skipped in {}",
        rendered,
        run.outcomes.len() - rendered,
        run.output_dir.display()
    );
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the detect command.
pub fn run_detect(image: &Path, response: &Path) -> ExitCode {
    let (source, text) = match load_inputs(image, response) {
        Ok(inputs) => inputs,
        Err(code) => return code,
    };

    match detect_from_response(&text, source.width(), source.height()) {
        Ok(result) => print_json(&result),
        Err(e) => {
            eprintln!("Error: invalid detection response: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
