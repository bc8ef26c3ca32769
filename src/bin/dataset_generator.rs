use camera_lidar_ttc::calibration::{Calibration, CalibrationConfig};
use camera_lidar_ttc::detected_points::{Correspondence, ImageKeypoint};
use camera_lidar_ttc::io::object_to_json;
use camera_lidar_ttc::pipeline::PipelineConfig;
use camera_lidar_ttc::projection::project_one;
use camera_lidar_ttc::types::{BoundingBox, Frame, RangePoint, Roi};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic sequence of a vehicle approaching at constant speed
    Generate {
        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Number of frames to generate
        #[arg(short, long, default_value = "15")]
        num_frames: usize,

        /// Initial distance to the rear of the lead vehicle in metres
        #[arg(long, default_value = "8.0")]
        start_distance: f64,

        /// Closing speed in metres per second
        #[arg(long, default_value = "3.0")]
        speed: f64,

        #[arg(long, default_value = "10.0")]
        frame_rate: f64,

        /// Range points on the rear of the vehicle per frame
        #[arg(long, default_value = "200")]
        num_range_points: usize,

        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

/// Rear of the lead vehicle in sensor coordinates, relative to its rear plane.
const VEHICLE_HALF_WIDTH: f64 = 0.9;
const VEHICLE_BOTTOM: f64 = -1.6;
const VEHICLE_TOP: f64 = -0.4;
const NUM_VEHICLE_FEATURES: usize = 40;
const NUM_BACKGROUND_FEATURES: usize = 30;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            output,
            num_frames,
            start_distance,
            speed,
            frame_rate,
            num_range_points,
            seed,
        } => {
            let scene = Scene {
                num_frames,
                start_distance,
                speed,
                frame_rate,
                num_range_points,
            };
            generate_dataset(&output, &scene, seed)?;
        }
    }

    Ok(())
}

struct Scene {
    num_frames: usize,
    start_distance: f64,
    speed: f64,
    frame_rate: f64,
    num_range_points: usize,
}

fn generate_dataset(
    output_dir: &str,
    scene: &Scene,
    seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let calibration_config = CalibrationConfig::default();
    let calibration = Calibration::from_config(&calibration_config)?;
    let (width, height) = calibration.image_size;
    let in_image = |u: f64, v: f64| u >= 0.0 && u < width as f64 && v >= 0.0 && v < height as f64;

    std::fs::create_dir_all(output_dir)?;
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);

    // (y, z) offsets on the rear plane
    let vehicle_features: Vec<(f64, f64)> = (0..NUM_VEHICLE_FEATURES)
        .map(|_| {
            (
                rng.random_range(-VEHICLE_HALF_WIDTH..VEHICLE_HALF_WIDTH),
                rng.random_range(VEHICLE_BOTTOM..VEHICLE_TOP),
            )
        })
        .collect();
    // static scenery far away, (x, y, z)
    let background_features: Vec<(f64, f64, f64)> = (0..NUM_BACKGROUND_FEATURES)
        .map(|_| {
            (
                rng.random_range(40.0..60.0),
                rng.random_range(-15.0..15.0),
                rng.random_range(-1.0..4.0),
            )
        })
        .collect();

    let dt = 1.0 / scene.frame_rate;
    let mut prev_indices: Vec<Option<usize>> = Vec::new();
    let mut written = 0;
    for frame_idx in 0..scene.num_frames {
        let distance = scene.start_distance - scene.speed * dt * frame_idx as f64;
        if distance <= 0.5 {
            println!("lead vehicle reached at frame {}, stopping", frame_idx);
            break;
        }

        let mut range_points: Vec<RangePoint> = (0..scene.num_range_points)
            .map(|_| {
                let mut p = RangePoint::new(
                    distance + rng.random_range(0.0..0.05),
                    rng.random_range(-VEHICLE_HALF_WIDTH..VEHICLE_HALF_WIDTH),
                    rng.random_range(VEHICLE_BOTTOM..VEHICLE_TOP),
                );
                p.reflectivity = Some(rng.random_range(0.2..0.9));
                p
            })
            .collect();
        // road returns, removed by the default crop
        range_points.extend((0..scene.num_range_points / 4).map(|_| {
            let mut p = RangePoint::new(
                rng.random_range(0.5..distance),
                rng.random_range(-2.0..2.0),
                rng.random_range(-1.8..-1.7),
            );
            p.reflectivity = Some(rng.random_range(0.0..0.3));
            p
        }));

        let mut keypoints = Vec::new();
        let mut curr_indices = Vec::new();
        let world_features = vehicle_features
            .iter()
            .map(|&(y, z)| (distance, y, z))
            .chain(background_features.iter().copied());
        for (x, y, z) in world_features {
            let idx = project_one(&calibration, &RangePoint::new(x, y, z))
                .map(|p| (p.x + rng.random_range(-0.5..0.5), p.y + rng.random_range(-0.5..0.5)))
                .filter(|&(u, v)| in_image(u, v))
                .map(|(u, v)| {
                    keypoints.push(ImageKeypoint::new(u as f32, v as f32).with_size(7.0));
                    keypoints.len() - 1
                });
            curr_indices.push(idx);
        }

        let correspondences: Vec<Correspondence> = prev_indices
            .iter()
            .zip(&curr_indices)
            .filter_map(|(p, c)| Some(Correspondence::new((*p)?, (*c)?)))
            .collect();

        let corners = [
            (-VEHICLE_HALF_WIDTH, VEHICLE_BOTTOM),
            (-VEHICLE_HALF_WIDTH, VEHICLE_TOP),
            (VEHICLE_HALF_WIDTH, VEHICLE_BOTTOM),
            (VEHICLE_HALF_WIDTH, VEHICLE_TOP),
        ];
        let projected: Vec<_> = corners
            .iter()
            .filter_map(|&(y, z)| project_one(&calibration, &RangePoint::new(distance, y, z)))
            .collect();
        let mut bounding_boxes = Vec::new();
        if !projected.is_empty() {
            let margin = 10.0;
            let min_u = projected.iter().map(|p| p.x).fold(f64::INFINITY, f64::min) - margin;
            let max_u = projected.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max) + margin;
            let min_v = projected.iter().map(|p| p.y).fold(f64::INFINITY, f64::min) - margin;
            let max_v = projected.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max) + margin;
            let mut bbox = BoundingBox::new(
                frame_idx as u32,
                Roi::new(min_u, min_v, max_u - min_u, max_v - min_v),
            );
            bbox.class_id = 2;
            bbox.confidence = rng.random_range(0.7..0.99);
            bounding_boxes.push(bbox);
        }

        let frame = Frame {
            timestamp_ns: (frame_idx as f64 * dt * 1e9) as i64,
            keypoints,
            range_points,
            bounding_boxes,
            correspondences,
        };
        object_to_json(
            Path::new(output_dir).join(format!("{:06}.json", frame_idx)),
            &frame,
        )?;
        log::debug!(
            "frame {}: distance {:.2} m, expected ttc {:.3} s",
            frame_idx,
            distance,
            distance / scene.speed
        );
        prev_indices = curr_indices;
        written += 1;
    }

    let config = PipelineConfig {
        frame_rate: scene.frame_rate,
        ..Default::default()
    };
    let meta_dir = Path::new(output_dir).join("meta");
    std::fs::create_dir_all(&meta_dir)?;
    object_to_json(meta_dir.join("config.json"), &config)?;
    object_to_json(meta_dir.join("calibration.json"), &calibration_config)?;

    println!("Generated {} frames in {}", written, output_dir);
    Ok(())
}
