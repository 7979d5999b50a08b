use criterion::{Criterion, black_box, criterion_group, criterion_main};
use puck_scan::config::LocatorConfig;
use puck_scan::detector::SymbolLocator;
use puck_scan::fixtures::{encode_symbol, paint_symbol};
use puck_scan::{GrayscaleImage, Point, SymbolDecoder};

/// 640x480 frame with a 4x4 rack of 14x14 symbols, slightly rotated
fn rack_frame() -> GrayscaleImage {
    let mut frame = GrayscaleImage::filled(640, 480, 230);
    for row in 0..4 {
        for col in 0..4 {
            let payload = format!("PIN{row}{col}");
            let Ok(grid) = encode_symbol(payload.as_bytes()) else {
                continue;
            };
            let center = Point::new(110.0 + col as f32 * 140.0, 75.0 + row as f32 * 110.0);
            paint_symbol(&mut frame, &grid, center, 5.0, 0.1 * (row + col) as f32);
        }
    }
    frame
}

fn bench_locate_640x480(c: &mut Criterion) {
    let frame = rack_frame();
    let config = LocatorConfig::default();
    c.bench_function("locate_640x480_16_symbols", |b| {
        b.iter(|| SymbolLocator::locate(black_box(&frame), black_box(&config)))
    });
}

fn bench_decode_frame_640x480(c: &mut Criterion) {
    let frame = rack_frame();
    let decoder = SymbolDecoder::default();
    c.bench_function("decode_frame_640x480_16_symbols", |b| {
        b.iter(|| decoder.decode_frame(black_box(&frame)))
    });
}

fn bench_decode_blank_frame(c: &mut Criterion) {
    let frame = GrayscaleImage::filled(640, 480, 128);
    let decoder = SymbolDecoder::default();
    c.bench_function("decode_frame_640x480_blank", |b| {
        b.iter(|| decoder.decode_frame(black_box(&frame)))
    });
}

criterion_group!(
    benches,
    bench_locate_640x480,
    bench_decode_frame_640x480,
    bench_decode_blank_frame
);
criterion_main!(benches);
