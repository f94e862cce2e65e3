use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use genesis_common::{DomainBounds, SimulationConfig, Snapshot, Trajectory, Vec2};
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn, LevelFilter};
use palette::{FromColor, Hsv, Srgb};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Command-line arguments for the visualizer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input trajectory JSON file ("-" reads from stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output image file path (.png)
    #[arg(short, long, default_value = "trajectories.png")]
    output: PathBuf,

    /// Width of the output image in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Height of the output image in pixels (calculated from aspect ratio if not provided)
    #[arg(long)]
    height: Option<u32>,

    /// Optional path to the config.toml file to get the exact domain bounds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Domain bounds (used if config is not provided)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    x_min: f64,
    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    x_max: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    y_min: f64,
    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    y_max: f64,

    /// Particle color - use "palette" for a distinct color per particle, or a specific color name
    /// (black, white, red, green, blue, yellow, cyan, magenta)
    #[arg(long, default_value = "palette")]
    color: String,

    /// Background color - name of the color for the background
    #[arg(long, default_value = "white")]
    bg_color: String,

    /// Radius in pixels of the particle markers
    #[arg(long, default_value_t = 4)]
    marker_radius: i32,

    /// Also render one PNG per snapshot into this directory
    #[arg(long)]
    frames: Option<PathBuf>,
}

// Color definitions for named colors (RGBA format)
const COLOR_MAP: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
];

/// Blank border around the domain rectangle, in pixels.
const MARGIN_PX: f32 = 10.0;

/// Parse a color name to RGBA values
fn parse_color(color_name: &str) -> [u8; 4] {
    for &(name, color) in COLOR_MAP {
        if name.eq_ignore_ascii_case(color_name) {
            return color;
        }
    }
    // Default to black if color not found
    warn!("Color '{}' not recognized, using black.", color_name);
    [0, 0, 0, 255]
}

/// Generate `count` colors with evenly spaced hues.
fn generate_color_palette(count: usize) -> Vec<[u8; 4]> {
    let count = count.max(1);
    (0..count)
        .map(|i| {
            let hue = (i as f32) / (count as f32);
            let hsv: Hsv = Hsv::new(hue * 360.0, 0.75, 0.85);
            let rgb: Srgb = Srgb::from_color(hsv);
            [
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
                255,
            ]
        })
        .collect()
}

/// Black on light backgrounds, white on dark ones.
fn contrast_color(bg_color: [u8; 4]) -> Rgba<u8> {
    let bg_luminance = 0.299 * bg_color[0] as f32 + 0.587 * bg_color[1] as f32 + 0.114 * bg_color[2] as f32;
    if bg_luminance > 128.0 {
        Rgba([0, 0, 0, 255])
    } else {
        Rgba([255, 255, 255, 255])
    }
}

/// Maps simulation coordinates onto the image (origin bottom-left, y flipped).
#[derive(Debug, Clone, Copy)]
struct Viewport {
    bounds: DomainBounds,
    width: u32,
    height: u32,
    pixels_per_unit: f32,
}

impl Viewport {
    fn new(bounds: DomainBounds, width: u32, height: u32) -> Self {
        let usable_w = (width as f32 - 2.0 * MARGIN_PX).max(1.0);
        let usable_h = (height as f32 - 2.0 * MARGIN_PX).max(1.0);
        let scale_x = usable_w / bounds.width() as f32;
        let scale_y = usable_h / bounds.height() as f32;
        Self {
            bounds,
            width,
            height,
            pixels_per_unit: scale_x.min(scale_y), // Use smaller scale to ensure everything fits
        }
    }

    fn to_pixel(&self, (x, y): (f64, f64)) -> (f32, f32) {
        let px = MARGIN_PX + (x - self.bounds.min.x) as f32 * self.pixels_per_unit;
        let py = self.height as f32 - MARGIN_PX - (y - self.bounds.min.y) as f32 * self.pixels_per_unit;
        (px, py)
    }

    fn domain_rect(&self) -> Rect {
        let (left, bottom) = self.to_pixel((self.bounds.min.x, self.bounds.min.y));
        let (right, top) = self.to_pixel((self.bounds.max.x, self.bounds.max.y));
        let w = (right - left).round().max(1.0) as u32;
        let h = (bottom - top).round().max(1.0) as u32;
        Rect::at(left.round() as i32, top.round() as i32).of_size(w, h)
    }
}

fn blank_canvas(viewport: &Viewport, bg_color: [u8; 4]) -> RgbaImage {
    let mut image = ImageBuffer::from_pixel(viewport.width, viewport.height, Rgba(bg_color));
    draw_hollow_rect_mut(&mut image, viewport.domain_rect(), contrast_color(bg_color));
    image
}

fn particle_color(color_palette: &[[u8; 4]], index: usize) -> Rgba<u8> {
    Rgba(color_palette[index % color_palette.len()])
}

/// Draw every particle's path over the whole run, with its final position marked.
fn draw_trajectory_plot(
    trajectory: &Trajectory,
    viewport: &Viewport,
    bg_color: [u8; 4],
    color_palette: &[[u8; 4]],
    marker_radius: i32,
) -> RgbaImage {
    let mut image = blank_canvas(viewport, bg_color);

    for i in 0..trajectory.particle_count() {
        let Some(path) = trajectory.particle_path(i) else { continue };
        let color = particle_color(color_palette, i);
        let pixels: Vec<(f32, f32)> = path.iter().map(|&p| viewport.to_pixel(p)).collect();
        for segment in pixels.windows(2) {
            draw_line_segment_mut(&mut image, segment[0], segment[1], color);
        }
        if let Some(&(px, py)) = pixels.last() {
            draw_filled_circle_mut(&mut image, (px.round() as i32, py.round() as i32), marker_radius, color);
        }
    }
    image
}

/// Draw a single snapshot frame
fn draw_frame(
    snapshot: &Snapshot,
    viewport: &Viewport,
    bg_color: [u8; 4],
    color_palette: &[[u8; 4]],
    marker_radius: i32,
) -> RgbaImage {
    let mut image = blank_canvas(viewport, bg_color);
    for (i, &position) in snapshot.positions.iter().enumerate() {
        let (px, py) = viewport.to_pixel(position);
        draw_filled_circle_mut(
            &mut image,
            (px.round() as i32, py.round() as i32),
            marker_radius,
            particle_color(color_palette, i),
        );
    }
    image
}

fn read_trajectory(input: &Path) -> Result<Trajectory> {
    let json = if input == Path::new("-") {
        io::read_to_string(io::stdin()).context("Failed to read trajectory from stdin")?
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to open input file: {}", input.display()))?
    };
    serde_json::from_str(&json).with_context(|| format!("Failed to parse trajectory JSON from {}", input.display()))
}

fn resolve_bounds(args: &Args) -> DomainBounds {
    let from_args = DomainBounds::new(Vec2::new(args.x_min, args.y_min), Vec2::new(args.x_max, args.y_max));
    match &args.config {
        Some(config_path) => match SimulationConfig::load(config_path) {
            Ok(config) => {
                info!("Loaded domain bounds from {}", config_path.display());
                config.get_sim_params().bounds
            }
            Err(e) => {
                warn!(
                    "Failed to load config file '{}': {}. Using provided bounds.",
                    config_path.display(),
                    e
                );
                from_args
            }
        },
        None => from_args,
    }
}

fn render_frames(
    trajectory: &Trajectory,
    dir: &Path,
    viewport: &Viewport,
    bg_color: [u8; 4],
    color_palette: &[[u8; 4]],
    marker_radius: i32,
) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create frame directory {}", dir.display()))?;

    let progress_bar = ProgressBar::new(trajectory.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) [{eta}]")?
            .progress_chars("#>-"),
    );

    trajectory
        .snapshots()
        .par_iter()
        .try_for_each(|snapshot| -> Result<()> {
            let frame = draw_frame(snapshot, viewport, bg_color, color_palette, marker_radius);
            let path = dir.join(format!("frame_{:05}.png", snapshot.step));
            frame
                .save(&path)
                .with_context(|| format!("Failed to write frame {}", path.display()))?;
            progress_bar.inc(1);
            Ok(())
        })?;

    progress_bar.finish();
    info!("Wrote {} frames to {}", trajectory.len(), dir.display());
    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    run_with_args(args)
}

fn run_with_args(args: Args) -> Result<()> {
    // Initialize logger
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Starting Genesis Visualizer...");
    info!("Input: {}", args.input.display());
    info!("Output image: {}", args.output.display());

    let bounds = resolve_bounds(&args);
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        anyhow::bail!("Domain bounds must have min < max on both axes.");
    }

    // --- Calculate Output Dimensions and Scale ---
    let aspect_ratio = bounds.width() / bounds.height();
    let output_height_px = args
        .height
        .unwrap_or_else(|| (args.width as f64 / aspect_ratio).round() as u32)
        .max(1);
    let viewport = Viewport::new(bounds, args.width, output_height_px);
    info!("Output dimensions: {}x{} px", args.width, output_height_px);
    debug!("Scale: {:.4} pixels per unit", viewport.pixels_per_unit);

    // --- Load Trajectory ---
    let start_time = Instant::now();
    let trajectory = read_trajectory(&args.input)?;
    if trajectory.is_empty() {
        warn!("Input contains no snapshots. Exiting.");
        return Ok(());
    }
    info!(
        "Loaded {} snapshots of {} particles.",
        trajectory.len(),
        trajectory.particle_count()
    );

    // --- Set up Colors ---
    let bg_color = parse_color(&args.bg_color);
    let color_palette: Vec<[u8; 4]> = if args.color.eq_ignore_ascii_case("palette") {
        generate_color_palette(trajectory.particle_count())
    } else {
        vec![parse_color(&args.color)]
    };

    // --- Render ---
    let plot = draw_trajectory_plot(&trajectory, &viewport, bg_color, &color_palette, args.marker_radius);
    plot.save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Trajectory plot saved to {}", args.output.display());

    if let Some(dir) = &args.frames {
        render_frames(&trajectory, dir, &viewport, bg_color, &color_palette, args.marker_radius)?;
    }

    info!("Rendering took {:.2} s", start_time.elapsed().as_secs_f64());
    Ok(())
}

// Unit tests
#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(DomainBounds::default(), 200, 200)
    }

    fn snapshot(step: u32, positions: Vec<(f64, f64)>) -> Snapshot {
        Snapshot {
            step,
            time: step as f64,
            positions,
            kinetic_energy: 0.0,
            wall_collisions: 0,
        }
    }

    #[test]
    fn named_colors_parse_case_insensitively() {
        assert_eq!(parse_color("Red"), [255, 0, 0, 255]);
        assert_eq!(parse_color("WHITE"), [255, 255, 255, 255]);
        assert_eq!(parse_color("chartreuse"), [0, 0, 0, 255]);
    }

    #[test]
    fn palette_is_deterministic_and_distinct() {
        let a = generate_color_palette(6);
        let b = generate_color_palette(6);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert_ne!(a[0], a[3]);
        assert_eq!(generate_color_palette(0).len(), 1);
    }

    #[test]
    fn contrast_follows_background_luminance() {
        assert_eq!(contrast_color([255, 255, 255, 255]), Rgba([0, 0, 0, 255]));
        assert_eq!(contrast_color([0, 0, 0, 255]), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn viewport_flips_y_and_keeps_margin() {
        let vp = viewport();
        assert_eq!(vp.to_pixel((0.0, 0.0)), (10.0, 190.0));
        assert_eq!(vp.to_pixel((10.0, 10.0)), (190.0, 10.0));
        assert_eq!(vp.to_pixel((5.0, 5.0)), (100.0, 100.0));
    }

    #[test]
    fn trajectory_plot_draws_paths_in_particle_color() {
        let trajectory = Trajectory::from(vec![
            snapshot(0, vec![(1.0, 5.0)]),
            snapshot(1, vec![(9.0, 5.0)]),
        ]);
        let colors = vec![[255, 0, 0, 255]];
        let image = draw_trajectory_plot(&trajectory, &viewport(), [255, 255, 255, 255], &colors, 3);
        assert_eq!(image.dimensions(), (200, 200));
        assert_eq!(*image.get_pixel(100, 100), Rgba([255, 0, 0, 255]));
        assert_eq!(*image.get_pixel(100, 150), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn frame_marks_each_particle() {
        let frame = draw_frame(
            &snapshot(3, vec![(5.0, 5.0), (2.5, 7.5)]),
            &viewport(),
            [0, 0, 0, 255],
            &[[0, 255, 0, 255], [0, 0, 255, 255]],
            2,
        );
        assert_eq!(*frame.get_pixel(100, 100), Rgba([0, 255, 0, 255]));
        assert_eq!(*frame.get_pixel(55, 55), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn trajectory_json_reads_from_file() -> Result<()> {
        let dir = std::env::temp_dir().join("genesis-visualizer-test");
        fs::create_dir_all(&dir)?;
        let path = dir.join("trajectory.json");
        fs::write(&path, r#"[{"step":0,"time":0.0,"positions":[[1.0,2.0]],"kinetic_energy":0.0,"wall_collisions":0}]"#)?;
        let trajectory = read_trajectory(&path)?;
        assert_eq!(trajectory.len(), 1);
        assert_eq!(trajectory.final_positions(), &[(1.0, 2.0)]);
        Ok(())
    }
}
