use camera_lidar_ttc::calibration::{Calibration, CalibrationConfig};
use camera_lidar_ttc::data_loader::load_frames;
use camera_lidar_ttc::features::{DescriptorType, DetectorType};
use camera_lidar_ttc::io::{format_step, object_from_json, object_to_json, write_report};
use camera_lidar_ttc::pipeline::{PipelineConfig, TtcPipeline};
use clap::Parser;
use log::info;
use std::time::Instant;

#[derive(Parser)]
#[command(version, about, author)]
struct TtcCli {
    /// path to folder of per-frame json files
    path: String,

    /// pipeline config json, defaults are used when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// calibration json, KITTI calibration is used when omitted
    #[arg(long)]
    calibration: Option<String>,

    /// index of the first frame to process
    #[arg(long, default_value = "0")]
    start_idx: usize,

    /// process every n-th frame
    #[arg(long, default_value = "1")]
    step: usize,

    /// overrides the keypoint detector recorded in the config
    #[arg(long, value_enum)]
    detector: Option<DetectorType>,

    /// overrides the descriptor recorded in the config
    #[arg(long, value_enum)]
    descriptor: Option<DescriptorType>,

    #[arg(short, long, default_value = "output")]
    output_folder: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = TtcCli::parse();

    let mut config: PipelineConfig = match &cli.config {
        Some(p) => object_from_json(p)?,
        None => PipelineConfig::default(),
    };
    if let Some(detector) = cli.detector {
        config.frontend.detector = detector;
    }
    if let Some(descriptor) = cli.descriptor {
        config.frontend.descriptor = descriptor;
    }
    info!(
        "frontend {}/{}",
        config.frontend.detector, config.frontend.descriptor
    );
    let calibration_config: CalibrationConfig = match &cli.calibration {
        Some(p) => object_from_json(p)?,
        None => CalibrationConfig::default(),
    };
    let calibration = Calibration::from_config(&calibration_config)?;

    let now = Instant::now();
    let frames = load_frames(&cli.path, cli.start_idx, cli.step)?;
    let duration_sec = now.elapsed().as_secs_f64();
    info!("loading {} frames took {:.6} sec", frames.len(), duration_sec);

    std::fs::create_dir_all(&cli.output_folder)?;
    object_to_json(format!("{}/config.json", cli.output_folder), &config)?;

    let mut pipeline = TtcPipeline::new(config, calibration)?;
    let now = Instant::now();
    let mut steps = Vec::with_capacity(frames.len());
    for frame in frames {
        let step = pipeline.process(frame)?;
        print!("{}", format_step(&step));
        steps.push(step);
    }
    let duration_sec = now.elapsed().as_secs_f64();
    info!(
        "processing took {:.6} sec, avg {:.6} sec per frame",
        duration_sec,
        duration_sec / steps.len().max(1) as f64
    );

    let report_path = format!("{}/ttc_report.json", cli.output_folder);
    write_report(&report_path, &steps)?;
    info!("report written to {}", report_path);
    Ok(())
}
