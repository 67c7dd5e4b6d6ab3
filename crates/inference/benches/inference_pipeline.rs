use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};
use inference::InferenceOutput;
use inference::processing::{post::PostProcessor, pre::PreProcessor};
use ndarray::{Array, IxDyn};

/// Create mock detector output with N candidates, `hits` of them above threshold
fn create_mock_output(num_candidates: usize, hits: usize) -> InferenceOutput {
    let mut label_data = vec![1i64; num_candidates];
    let mut box_data = vec![0.0f32; num_candidates * 4];
    let mut score_data = vec![0.05f32; num_candidates];

    for i in 0..hits.min(num_candidates) {
        label_data[i] = (i % 90 + 1) as i64;
        box_data[i * 4] = 100.0;
        box_data[i * 4 + 1] = 100.0;
        box_data[i * 4 + 2] = 200.0;
        box_data[i * 4 + 3] = 200.0;
        score_data[i] = 0.9;
    }

    InferenceOutput {
        boxes: Array::from_shape_vec(IxDyn(&[num_candidates, 4]), box_data).unwrap(),
        labels: Array::from_shape_vec(IxDyn(&[num_candidates]), label_data).unwrap(),
        scores: Array::from_shape_vec(IxDyn(&[num_candidates]), score_data).unwrap(),
    }
}

fn bench_parse_detections(c: &mut Criterion) {
    let postprocessor = PostProcessor::new(0.5);
    let mut group = c.benchmark_group("parse_detections");

    for hits in [0usize, 10, 100] {
        let output = create_mock_output(100, hits);
        group.bench_with_input(BenchmarkId::from_parameter(hits), &output, |b, output| {
            b.iter(|| postprocessor.parse_detections(black_box(output)).unwrap())
        });
    }

    group.finish();
}

fn bench_to_tensor(c: &mut Criterion) {
    let preprocessor = PreProcessor::default();
    let mut group = c.benchmark_group("to_tensor");

    for (width, height) in [(320u32, 240u32), (640, 480), (1920, 1080)] {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([128, 64, 32])));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", width, height)),
            &image,
            |b, image| b.iter(|| preprocessor.to_tensor(black_box(image)).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse_detections, bench_to_tensor);
criterion_main!(benches);
