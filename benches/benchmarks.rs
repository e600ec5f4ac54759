// benches/benchmarks.rs -- Per-stage and full-path benchmarks.
//
// Synthetic benchmarks (always run):
//   cargo bench
//
// With recorded VLC frames (a directory of grayscale PNGs):
//   RM_FRAMES_DIR=/path/to/frames cargo bench
//
// The recorded benchmark loads the first 50 frames (sorted by file name)
// and runs the optical-flow path over them.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use rm_vision::canny::{detect_edges, EdgeConfig};
use rm_vision::convert::load_gray;
use rm_vision::corners::GoodFeatures;
use rm_vision::image::Image;
use rm_vision::klt::{PyrLkTracker, TermCriteria};
use rm_vision::point::Point2f;
use rm_vision::pyramid::Pyramid;
use rm_vision::tracking::{FrameTrackingCache, TrackerConfig};

use std::env;
use std::fs;
use std::path::PathBuf;

// ============================================================
// Helpers
// ============================================================

/// Synthetic VLC-sized frame: a gentle ramp plus bright rectangles.
fn make_scene(w: usize, h: usize, dx: usize, dy: usize) -> Image<u8> {
    let mut img = Image::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let base = (((x + dx) * 120 / w) + ((y + dy) * 40 / h)) as u8;
            img.set(x, y, base);
        }
    }
    for rect in 0..6 {
        let rx = (50 + rect * 95 + dx) % w;
        let ry = (40 + (rect % 3) * 130 + dy) % h;
        let bright = 180 + rect as u8 * 10;
        for y in ry..(ry + 60).min(h) {
            for x in rx..(rx + 80).min(w) {
                img.set(x, y, bright);
            }
        }
    }
    img
}

// ============================================================
// Per-stage benchmarks (synthetic, always runnable)
// ============================================================

fn bench_pyramid(c: &mut Criterion) {
    let img = make_scene(640, 480, 0, 0);

    let mut group = c.benchmark_group("pyramid");
    group.bench_function("build_3level_640x480", |b| b.iter(|| Pyramid::build(&img, 3, 1.0)));
    group.finish();
}

fn bench_corners(c: &mut Criterion) {
    let img = make_scene(640, 480, 0, 0);

    let mut group = c.benchmark_group("corners");
    group.bench_function("min_eig_640x480", |b| {
        let det = GoodFeatures::new(100, 0.3, 7.0, 7);
        b.iter(|| det.detect(&img))
    });
    group.bench_function("harris_640x480", |b| {
        let det = GoodFeatures::new(100, 0.3, 7.0, 7).with_harris(0.04);
        b.iter(|| det.detect(&img))
    });
    group.finish();
}

fn bench_klt(c: &mut Criterion) {
    let img1 = make_scene(640, 480, 0, 0);
    let img2 = make_scene(640, 480, 3, 2);

    let tracker = PyrLkTracker::new(15, 2, TermCriteria::new(10, 0.03));
    let pyr1 = tracker.build_pyramid(&img1);
    let pyr2 = tracker.build_pyramid(&img2);

    let points: Vec<Point2f> = GoodFeatures::new(100, 0.3, 7.0, 7)
        .detect(&img1)
        .into_iter()
        .map(|c| c.position)
        .collect();

    let mut group = c.benchmark_group("klt");
    group.bench_function(BenchmarkId::new("track", format!("{}pts_3pyr", points.len())), |b| {
        b.iter(|| tracker.track(&pyr1, &pyr2, &points))
    });
    group.finish();
}

fn bench_canny(c: &mut Criterion) {
    let img = make_scene(640, 480, 0, 0);

    let mut group = c.benchmark_group("canny");
    group.bench_function("aperture5_640x480", |b| {
        let config = EdgeConfig::default();
        b.iter(|| detect_edges(&img, &config))
    });
    group.finish();
}

fn bench_tracking_synthetic(c: &mut Criterion) {
    let frames: Vec<Image<u8>> = (0..10).map(|i| make_scene(640, 480, i * 3, i * 2)).collect();

    let mut group = c.benchmark_group("tracking");
    group.bench_function("synthetic_640x480_10frames", |b| {
        b.iter(|| {
            let mut cache = FrameTrackingCache::from_config(TrackerConfig::default()).unwrap();
            for frame in &frames {
                cache.process_frame(frame).unwrap();
            }
        })
    });
    group.finish();
}

// ============================================================
// Recorded frames (optional, needs RM_FRAMES_DIR env var)
// ============================================================

fn bench_recorded(c: &mut Criterion) {
    let dir = match env::var("RM_FRAMES_DIR") {
        Ok(p) => PathBuf::from(p),
        Err(_) => {
            eprintln!("RM_FRAMES_DIR not set, skipping recorded-frame benchmark.");
            return;
        }
    };

    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", dir.display()))
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
        .collect();
    files.sort();
    files.truncate(50);
    if files.is_empty() {
        eprintln!("no PNG frames in {}", dir.display());
        return;
    }

    // Preload frames to bench processing only, not I/O.
    let frames: Vec<Image<u8>> = files
        .iter()
        .map(|p| load_gray(p).unwrap_or_else(|e| panic!("failed to load {}: {e}", p.display())))
        .collect();
    eprintln!(
        "recorded benchmark ready: {}x{}, {} frames",
        frames[0].width(),
        frames[0].height(),
        frames.len()
    );

    let mut group = c.benchmark_group("recorded");
    group.sample_size(10);

    group.bench_function(format!("optical_flow_{}frames", frames.len()), |b| {
        b.iter(|| {
            let mut cache = FrameTrackingCache::from_config(TrackerConfig::default()).unwrap();
            for frame in &frames {
                cache.process_frame(frame).unwrap();
            }
        })
    });
    group.bench_function("canny_single_frame", |b| {
        let config = EdgeConfig::default();
        b.iter(|| detect_edges(&frames[0], &config))
    });

    group.finish();
}

// ============================================================
// Register
// ============================================================

criterion_group!(
    benches,
    bench_pyramid,
    bench_corners,
    bench_klt,
    bench_canny,
    bench_tracking_synthetic,
    bench_recorded,
);
criterion_main!(benches);
