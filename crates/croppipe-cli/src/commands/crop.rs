use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use croppipe_core::aspect::AspectRatio;
use croppipe_core::display::{DisplayRouter, Mode};
use croppipe_core::geometry::Point;
use croppipe_core::pipeline::{Interpolation, ResizeSpec};
use croppipe_core::workspace::Workspace;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::summary::{print_crop_summary, print_failures, print_workspace_summary};

#[derive(Args)]
pub struct CropArgs {
    /// Image files or folders to import
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Crop aspect ratio as W:H, e.g. 4:3
    #[arg(short, long)]
    pub ratio: String,

    /// Long edge of the crop rectangle in viewport pixels
    #[arg(long)]
    pub rect_size: Option<u32>,

    /// Virtual viewport size as WxH (overrides config)
    #[arg(long)]
    pub viewport: Option<String>,

    /// Center the rectangle on this image pixel, as X,Y
    #[arg(long, allow_hyphen_values = true)]
    pub at: Option<String>,

    /// Scroll steps applied to the rectangle (positive grows, negative shrinks)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub zoom: i32,

    /// Resize the crop to WxH after confirming it
    #[arg(long)]
    pub resize: Option<String>,

    /// Use nearest-neighbour resampling instead of bilinear
    #[arg(long)]
    pub nearest: bool,

    /// Output directory (defaults to each image's own folder)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Session config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &CropArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;

    let ratio: AspectRatio = args
        .ratio
        .parse()
        .with_context(|| format!("Invalid aspect ratio {:?}", args.ratio))?;
    let resize = args
        .resize
        .as_deref()
        .map(str::parse::<ResizeSpec>)
        .transpose()
        .context("Invalid --resize value")?;
    let at = args
        .at
        .as_deref()
        .map(parse_point)
        .transpose()
        .context("Invalid --at value")?;
    if let Some(ref viewport) = args.viewport {
        let (w, h) = parse_dims(viewport).context("Invalid --viewport value")?;
        config.viewport.width = w as f64;
        config.viewport.height = h as f64;
        config.viewport.validate()?;
    }
    let rect_size = args
        .rect_size
        .unwrap_or(config.selector.rect_size.round() as u32);
    let interpolation = if args.nearest {
        Interpolation::Nearest
    } else {
        config.resize.interpolation
    };

    if let Some(ref dir) = args.output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output folder {}", dir.display()))?;
    }

    let mut workspace = Workspace::new(&config.import);
    let report = super::import_inputs(&mut workspace, &args.inputs)?;
    if workspace.is_empty() {
        print_failures(&report.failures);
        bail!("No images could be loaded");
    }

    let mut router = DisplayRouter::new(config.selector.clone(), config.viewport.size());
    router.set_mode(Some(Mode::Crop), None);
    router
        .roi_selector_mut()
        .context("Crop mode has no selector")?
        .set_aspect_ratio(&ratio.to_string(), None);

    println!(
        "Cropping {} image(s) at {} in a {}x{} viewport",
        workspace.len(),
        ratio,
        config.viewport.width,
        config.viewport.height
    );

    let ids: Vec<_> = workspace.iter().map(|r| r.id()).collect();
    let pb = ProgressBar::new(ids.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Cropping [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );

    let mut saved = Vec::new();
    let mut claimed = HashSet::new();
    for id in ids {
        let record = workspace
            .get_mut(id)
            .with_context(|| format!("Image {id} disappeared from the workspace"))?;
        router.set_image(Some(&*record));
        let selector = router
            .roi_selector_mut()
            .context("Crop mode has no selector")?;
        selector.set_rect_size(rect_size);

        if let Some(target) = at {
            if let Some(p) = selector.mapping().map(|m| m.image_to_viewport_point(target)) {
                selector.pointer_move(p.x, p.y);
            }
        }
        let step = f64::from(args.zoom.signum());
        for _ in 0..args.zoom.unsigned_abs() {
            selector.scroll(step);
        }

        if selector.confirm(record).is_none() {
            warn!(image = %record.file_name(), "No crop could be confirmed");
            pb.inc(1);
            continue;
        }
        if let Some(spec) = resize {
            record.pipeline_mut().set_resize(spec)?;
        }

        let output = record.resized_view(interpolation);
        let path = output_path(record.path(), args.output.as_deref(), output.width(), output.height());
        let path = claim_output(path, &mut claimed);
        output
            .save(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
        saved.push(path);
        pb.inc(1);
    }
    pb.finish();

    print_workspace_summary(&workspace, report.duplicates);
    print_failures(&report.failures);
    print_crop_summary(&saved);
    Ok(())
}

fn output_path(source: &Path, dir: Option<&Path>, w: u32, h: u32) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let parent = dir.unwrap_or_else(|| source.parent().unwrap_or(Path::new(".")));
    parent.join(format!("{stem}_crop{w}x{h}.png"))
}

/// Reserve `path` for this run, numbering it when an earlier image already took it.
fn claim_output(path: PathBuf, claimed: &mut HashSet<PathBuf>) -> PathBuf {
    if claimed.insert(path.clone()) {
        return path;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let parent = path.parent().unwrap_or(Path::new(".")).to_path_buf();
    let mut n = 2;
    loop {
        let candidate = parent.join(format!("{stem}_{n}.png"));
        if claimed.insert(candidate.clone()) {
            warn!(
                wanted = %path.display(),
                saved = %candidate.display(),
                "Output name already used in this run"
            );
            return candidate;
        }
        n += 1;
    }
}

fn parse_dims(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .trim()
        .split_once(|c| c == 'x' || c == 'X')
        .with_context(|| format!("expected WxH, got {s:?}"))?;
    let (w, h): (u32, u32) = (w.trim().parse()?, h.trim().parse()?);
    if w == 0 || h == 0 {
        bail!("dimensions must be non-zero, got {s:?}");
    }
    Ok((w, h))
}

fn parse_point(s: &str) -> Result<Point> {
    let (x, y) = s
        .trim()
        .split_once(',')
        .with_context(|| format!("expected X,Y, got {s:?}"))?;
    Ok(Point::new(x.trim().parse()?, y.trim().parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_next_to_source() {
        let path = output_path(Path::new("/shots/a.jpg"), None, 300, 200);
        assert_eq!(path, PathBuf::from("/shots/a_crop300x200.png"));
    }

    #[test]
    fn test_output_path_in_dir() {
        let path = output_path(Path::new("/shots/a.jpg"), Some(Path::new("/out")), 64, 64);
        assert_eq!(path, PathBuf::from("/out/a_crop64x64.png"));
    }

    #[test]
    fn test_claim_output_numbers_clashes() {
        let mut claimed = HashSet::new();
        let first = output_path(Path::new("/day1/a.jpg"), Some(Path::new("/out")), 64, 64);
        let second = output_path(Path::new("/day2/a.jpg"), Some(Path::new("/out")), 64, 64);
        let third = output_path(Path::new("/day3/a.png"), Some(Path::new("/out")), 64, 64);

        assert_eq!(claim_output(first, &mut claimed), PathBuf::from("/out/a_crop64x64.png"));
        assert_eq!(claim_output(second, &mut claimed), PathBuf::from("/out/a_crop64x64_2.png"));
        assert_eq!(claim_output(third, &mut claimed), PathBuf::from("/out/a_crop64x64_3.png"));

        let other = output_path(Path::new("/day1/b.jpg"), Some(Path::new("/out")), 64, 64);
        assert_eq!(claim_output(other, &mut claimed), PathBuf::from("/out/b_crop64x64.png"));
    }

    #[test]
    fn test_parse_dims() {
        assert_eq!(parse_dims("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_dims(" 64 X 32 ").unwrap(), (64, 32));
        assert!(parse_dims("0x10").is_err());
        assert!(parse_dims("1280").is_err());
    }

    #[test]
    fn test_parse_point() {
        let p = parse_point("10.5, -3").unwrap();
        assert_eq!(p, Point::new(10.5, -3.0));
        assert!(parse_point("10").is_err());
    }
}
