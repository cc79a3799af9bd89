use cornell_grasp_core::{BorderMode, DepthImage, GraspPose, GraspRectangles, Image};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::Point2;

fn grasp_set(n: usize) -> GraspRectangles {
    (0..n)
        .map(|i| {
            GraspPose {
                center: Point2::new(120.0 + 8.0 * i as f64, 150.0 + 5.0 * i as f64),
                angle: -1.2 + 0.25 * i as f64,
                length: 60.0,
                width: 25.0,
            }
            .to_rectangle()
        })
        .collect()
}

fn bench_draw(c: &mut Criterion) {
    let grs = grasp_set(12);
    c.bench_function("draw_12_grasps_400", |b| {
        b.iter(|| black_box(&grs).draw(400, 400))
    });
}

fn bench_rotate(c: &mut Criterion) {
    let base = Image::zeros(640, 480, 3);
    c.bench_function("rotate_rgb_640x480", |b| {
        b.iter(|| {
            let mut img = base.clone();
            img.rotate(0.7, Point2::new(320.0, 240.0), BorderMode::Symmetric);
            img
        })
    });
}

fn bench_inpaint(c: &mut Criterion) {
    let mut base = Image::zeros(640, 480, 1);
    for (i, v) in base.data.iter_mut().enumerate() {
        if i % 7 != 0 {
            *v = 0.8 + (i % 640) as f32 * 1e-4;
        }
    }
    c.bench_function("inpaint_sparse_640x480", |b| {
        b.iter(|| {
            let mut depth = DepthImage::new(base.clone());
            depth.inpaint()
        })
    });
}

criterion_group!(benches, bench_draw, bench_rotate, bench_inpaint);
criterion_main!(benches);
