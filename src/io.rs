use std::io::Write;
use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::pipeline::StepReport;

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(output_path: impl AsRef<Path>, object: &T) -> Result<()> {
    let j = serde_json::to_string_pretty(object)?;
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(j.as_bytes())?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[derive(Serialize)]
struct TtcReport<'a> {
    frames: usize,
    tracked_objects: usize,
    range_estimates: usize,
    vision_estimates: usize,
    steps: &'a [StepReport],
}

/// Writes every step's TTC estimates, plus counts of defined estimates, as JSON.
pub fn write_report(output_path: impl AsRef<Path>, steps: &[StepReport]) -> Result<()> {
    let objects = || steps.iter().flat_map(|s| s.objects.iter());
    let report = TtcReport {
        frames: steps.len(),
        tracked_objects: objects().count(),
        range_estimates: objects().filter(|o| o.ttc.range.is_some()).count(),
        vision_estimates: objects().filter(|o| o.ttc.vision.is_some()).count(),
        steps,
    };
    object_to_json(output_path, &report)
}

/// One line per tracked object, for terminal output.
pub fn format_step(step: &StepReport) -> String {
    let fmt_ttc = |ttc: Option<f64>| match ttc {
        Some(t) => format!("{:8.3} s", t),
        None => "   undef  ".to_string(),
    };
    let mut s = String::new();
    for o in &step.objects {
        s += format!(
            "t={} box {:>3} <- {:>3}  range {}  vision {}  ({} pts, {} matches)\n",
            step.timestamp_ns,
            o.curr_box_id,
            o.prev_box_id,
            fmt_ttc(o.ttc.range),
            fmt_ttc(o.ttc.vision),
            o.curr_range_points,
            o.matches
        )
        .as_str();
    }
    s
}
