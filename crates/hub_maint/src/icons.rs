use std::path::{Path, PathBuf};

use clap::Args;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use tracing::{info, warn};

use crate::error::Result;
use crate::summary::RunSummary;
use crate::util::{OutputIntegration, display_path, ensure_dir, output_for};

pub const DEFAULT_PWA_SIZES: [u32; 8] = [72, 96, 128, 144, 152, 192, 384, 512];

/// Android density buckets: (name, launcher px, adaptive foreground px).
pub const ANDROID_DENSITIES: [(&str, u32, u32); 5] = [
    ("mdpi", 48, 108),
    ("hdpi", 72, 162),
    ("xhdpi", 96, 216),
    ("xxhdpi", 144, 324),
    ("xxxhdpi", 192, 432),
];

const FAVICONS: [(&str, u32); 3] = [
    ("favicon-16x16.png", 16),
    ("favicon-32x32.png", 32),
    ("apple-touch-icon.png", 180),
];

#[derive(Debug, Clone, Args)]
pub struct IconArgs {
    /// Source logo; any format the PNG/JPEG decoders accept.
    #[arg(long, default_value = "public/logo.png")]
    pub source: PathBuf,

    /// Web root; PWA icons go to `<output-dir>/icons`.
    #[arg(long = "output-dir", default_value = "public")]
    pub output_dir: PathBuf,

    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_PWA_SIZES,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub sizes: Vec<u32>,

    /// Android resource directory; used only when it already exists.
    #[arg(long = "android-res", default_value = "android/app/src/main/res")]
    pub android_res: PathBuf,

    #[arg(long = "no-favicons")]
    pub no_favicons: bool,

    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct IconPlan {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub pwa_sizes: Vec<u32>,
    pub android_res: PathBuf,
    pub favicons: bool,
}

impl From<IconArgs> for IconPlan {
    fn from(args: IconArgs) -> Self {
        Self {
            source: args.source,
            output_dir: args.output_dir,
            pwa_sizes: args.sizes,
            android_res: args.android_res,
            favicons: !args.no_favicons,
        }
    }
}

impl IconPlan {
    #[must_use]
    pub fn pwa_dir(&self) -> PathBuf {
        self.output_dir.join("icons")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconGroup {
    Pwa,
    Favicon,
    Android,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconTarget {
    pub group: IconGroup,
    pub path: PathBuf,
    pub size: u32,
}

/// Every output file for the plan. Android targets are included only when
/// `android_available` is set.
#[must_use]
pub fn plan_targets(plan: &IconPlan, android_available: bool) -> Vec<IconTarget> {
    let pwa_dir = plan.pwa_dir();
    let mut targets = plan
        .pwa_sizes
        .iter()
        .map(|&size| IconTarget {
            group: IconGroup::Pwa,
            path: pwa_dir.join(format!("icon-{size}x{size}.png")),
            size,
        })
        .collect::<Vec<_>>();

    if plan.favicons {
        targets.extend(FAVICONS.iter().map(|&(name, size)| IconTarget {
            group: IconGroup::Favicon,
            path: plan.output_dir.join(name),
            size,
        }));
    }

    if android_available {
        for (density, launcher, foreground) in ANDROID_DENSITIES {
            let dir = plan.android_res.join(format!("mipmap-{density}"));
            for (name, size) in [
                ("ic_launcher.png", launcher),
                ("ic_launcher_round.png", launcher),
                ("ic_launcher_foreground.png", foreground),
            ] {
                targets.push(IconTarget {
                    group: IconGroup::Android,
                    path: dir.join(name),
                    size,
                });
            }
        }
    }

    targets
}

/// Images with alpha are composed onto a fully transparent canvas of the
/// same size first. The blend is a visual no-op.
#[must_use]
pub fn prepare_source(image: DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image;
    }
    let (width, height) = image.dimensions();
    let mut canvas = RgbaImage::new(width, height);
    imageops::overlay(&mut canvas, &image.to_rgba8(), 0, 0);
    DynamicImage::ImageRgba8(canvas)
}

#[must_use]
pub fn render_icon(image: &DynamicImage, size: u32) -> DynamicImage {
    image.resize_exact(size, size, FilterType::Lanczos3)
}

fn write_target(image: &DynamicImage, target: &IconTarget) -> Result<()> {
    if let Some(parent) = target.path.parent() {
        ensure_dir(parent)?;
    }
    render_icon(image, target.size).save_with_format(&target.path, ImageFormat::Png)?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct IconReport {
    pub written: Vec<IconTarget>,
    pub failures: Vec<(PathBuf, String)>,
    pub source_missing: bool,
    pub android_skipped: bool,
}

/// Load the source once and write every target, overwriting existing files.
/// A failing target is logged and recorded; the rest still run.
pub fn generate_icons(plan: &IconPlan) -> Result<IconReport> {
    let mut report = IconReport::default();
    if !plan.source.is_file() {
        warn!(source = %plan.source.display(), "source image not found; skipping");
        report.source_missing = true;
        return Ok(report);
    }

    let source = prepare_source(image::open(&plan.source)?);

    let pwa_dir = plan.pwa_dir();
    if let Err(error) = ensure_dir(&pwa_dir) {
        warn!(dir = %pwa_dir.display(), %error, "unable to create PWA icon directory");
    }

    let android_available = plan.android_res.is_dir();
    if !android_available {
        warn!(
            dir = %plan.android_res.display(),
            "android resource directory not found; skipping android icons"
        );
        report.android_skipped = true;
    }

    for target in plan_targets(plan, android_available) {
        match write_target(&source, &target) {
            Ok(()) => {
                info!(path = %target.path.display(), size = target.size, "wrote icon");
                report.written.push(target);
            }
            Err(error) => {
                warn!(path = %target.path.display(), %error, "failed to write icon");
                report.failures.push((target.path, error.to_string()));
            }
        }
    }

    Ok(report)
}

fn count_group(report: &IconReport, group: IconGroup) -> u64 {
    report
        .written
        .iter()
        .filter(|target| target.group == group)
        .count() as u64
}

pub fn run_icons(args: IconArgs) -> Result<()> {
    let integration = OutputIntegration::detect();
    let ui = output_for(&integration);
    let summary_path = args.summary.clone();
    let plan = IconPlan::from(args);

    ui.rule(Some("hub_maint icons"));
    ui.info(&format!(
        "source={} output_dir={} android_res={}",
        plan.source.display(),
        plan.output_dir.display(),
        plan.android_res.display()
    ));

    let report = generate_icons(&plan)?;
    let mut summary = RunSummary::new("icons");

    if report.source_missing {
        ui.warning(&format!("source image not found: {}", plan.source.display()));
        summary.mark_skipped();
    }
    if report.android_skipped {
        ui.warning(&format!(
            "android res dir not found, skipped: {}",
            plan.android_res.display()
        ));
        summary.note("android=skipped");
    }

    let base = Path::new(".");
    for (path, error) in &report.failures {
        let shown = display_path(base, path);
        ui.error(&format!("{shown}: {error}"));
        summary.fail(shown, error);
    }

    summary.count("written", report.written.len() as u64);
    summary.count("pwa", count_group(&report, IconGroup::Pwa));
    summary.count("favicon", count_group(&report, IconGroup::Favicon));
    summary.count("android", count_group(&report, IconGroup::Android));
    summary.count("failed", report.failures.len() as u64);

    ui.success(&format!(
        "{} icons written, {} failed",
        report.written.len(),
        report.failures.len()
    ));

    summary.emit(summary_path.as_deref(), &integration)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
    use tempfile::tempdir;

    use super::{
        ANDROID_DENSITIES, DEFAULT_PWA_SIZES, IconGroup, IconPlan, generate_icons, plan_targets,
        prepare_source,
    };

    fn write_logo(path: &Path) {
        let mut logo = RgbaImage::new(40, 30);
        for (x, y, pixel) in logo.enumerate_pixels_mut() {
            *pixel = Rgba([(x * 6) as u8, (y * 8) as u8, 120, 200]);
        }
        logo.save(path).expect("write logo");
    }

    fn plan_in(root: &Path) -> IconPlan {
        IconPlan {
            source: root.join("logo.png"),
            output_dir: root.join("public"),
            pwa_sizes: vec![16, 72, 192],
            android_res: root.join("android/res"),
            favicons: true,
        }
    }

    #[test]
    fn plan_lists_pwa_favicon_and_android_targets() {
        let plan = IconPlan {
            pwa_sizes: DEFAULT_PWA_SIZES.to_vec(),
            ..plan_in(Path::new("/tmp/site"))
        };

        let without_android = plan_targets(&plan, false);
        assert_eq!(without_android.len(), DEFAULT_PWA_SIZES.len() + 3);
        assert_eq!(
            without_android[0].path,
            Path::new("/tmp/site/public/icons/icon-72x72.png")
        );

        let with_android = plan_targets(&plan, true);
        let android = with_android
            .iter()
            .filter(|target| target.group == IconGroup::Android)
            .collect::<Vec<_>>();
        assert_eq!(android.len(), ANDROID_DENSITIES.len() * 3);
        assert!(android.iter().any(|target| {
            target.path == Path::new("/tmp/site/android/res/mipmap-xxxhdpi/ic_launcher_foreground.png")
                && target.size == 432
        }));
    }

    #[test]
    fn transparent_composite_keeps_pixels() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
        image.put_pixel(1, 0, Rgba([200, 100, 50, 0]));
        let prepared = prepare_source(DynamicImage::ImageRgba8(image.clone()));
        assert_eq!(prepared.to_rgba8().get_pixel(0, 0), image.get_pixel(0, 0));
        assert_eq!(prepared.dimensions(), (2, 1));
    }

    #[test]
    fn every_written_icon_has_exact_square_size() {
        let temp = tempdir().expect("tempdir");
        let plan = plan_in(temp.path());
        write_logo(&plan.source);
        fs::create_dir_all(&plan.android_res).expect("android res");

        let report = generate_icons(&plan).expect("generate icons");

        assert!(report.failures.is_empty(), "{:?}", report.failures);
        assert!(!report.android_skipped);
        assert_eq!(report.written.len(), 3 + 3 + ANDROID_DENSITIES.len() * 3);
        for target in &report.written {
            let (width, height) = image::image_dimensions(&target.path).expect("decode icon");
            assert_eq!((width, height), (target.size, target.size), "{:?}", target.path);
        }
    }

    #[test]
    fn missing_android_dir_is_skipped_not_created() {
        let temp = tempdir().expect("tempdir");
        let plan = plan_in(temp.path());
        write_logo(&plan.source);

        let report = generate_icons(&plan).expect("generate icons");

        assert!(report.android_skipped);
        assert!(!plan.android_res.exists());
        assert!(plan.pwa_dir().join("icon-72x72.png").is_file());
    }

    #[test]
    fn failing_target_does_not_stop_the_rest() {
        let temp = tempdir().expect("tempdir");
        let plan = plan_in(temp.path());
        write_logo(&plan.source);
        fs::create_dir_all(&plan.output_dir).expect("output dir");
        fs::write(plan.pwa_dir(), "not a directory").expect("block icons dir");

        let report = generate_icons(&plan).expect("generate icons");

        assert_eq!(report.failures.len(), 3);
        assert_eq!(report.written.len(), 3);
        assert!(plan.output_dir.join("apple-touch-icon.png").is_file());
    }

    #[test]
    fn missing_source_is_skipped() {
        let temp = tempdir().expect("tempdir");
        let report = generate_icons(&plan_in(temp.path())).expect("missing source is not fatal");
        assert!(report.source_missing);
        assert!(report.written.is_empty());
    }
}
