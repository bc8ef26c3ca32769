use std::path::{Path, PathBuf};

use glob::glob;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

use crate::error::Result;
use crate::io::object_from_json;
use crate::types::Frame;

/// Parses the timestamp from a file path.
///
/// Assumes the filename (without extension) is a timestamp in nanoseconds.
fn path_to_timestamp(path: &Path) -> Option<i64> {
    path.file_stem()?.to_str()?.parse().ok()
}

fn frame_filter(rp: glob::GlobResult) -> Option<PathBuf> {
    match rp {
        Ok(p) if p.extension().is_some_and(|ext| ext == "json") => Some(p),
        Ok(_) => None,
        Err(e) => {
            log::warn!("skipping unreadable path: {}", e);
            None
        }
    }
}

/// Loads every `*.json` frame in `root_folder`, sorted by timestamp.
///
/// Frames that carry no timestamp take it from their file name when that
/// parses as nanoseconds, or from their position in the sorted listing.
///
/// # Arguments
/// * `root_folder` - Directory holding one JSON file per frame.
/// * `start_idx` - Index of the first file to load.
/// * `step` - Load every `step`-th file.
pub fn load_frames(root_folder: &str, start_idx: usize, step: usize) -> Result<Vec<Frame>> {
    let pattern = format!("{}/*.json", root_folder);
    let mut sorted_path: Vec<PathBuf> = glob(&pattern)?.filter_map(frame_filter).collect();
    sorted_path.sort();
    log::trace!("found {} frame files in {}", sorted_path.len(), root_folder);

    let new_paths: Vec<_> = sorted_path
        .iter()
        .skip(start_idx)
        .step_by(step.max(1))
        .enumerate()
        .collect();
    let mut frames = new_paths
        .par_iter()
        .progress_count(new_paths.len() as u64)
        .map(|(idx, path)| {
            let mut frame: Frame = object_from_json(path)?;
            if frame.timestamp_ns == 0 {
                frame.timestamp_ns =
                    path_to_timestamp(path).unwrap_or(*idx as i64 * 100_000_000);
            }
            Ok(frame)
        })
        .collect::<Result<Vec<Frame>>>()?;
    frames.sort_by_key(|f| f.timestamp_ns);
    Ok(frames)
}
