use criterion::{Criterion, black_box, criterion_group, criterion_main};
use puck_scan::decoder::reed_solomon::{ReedSolomonDecoder, ReedSolomonEncoder};

/// 26x26 symbol: 44 data codewords, 28 check codewords
fn codeword_block() -> Vec<u8> {
    let data: Vec<u8> = (0..44u32).map(|i| (i * 37 + 11) as u8).collect();
    ReedSolomonEncoder::new(28).encode(&data)
}

fn bench_rs_clean(c: &mut Criterion) {
    let block = codeword_block();
    let decoder = ReedSolomonDecoder::new(28);
    c.bench_function("rs_decode_72_clean", |b| {
        b.iter(|| {
            let mut received = block.clone();
            decoder.decode(black_box(&mut received))
        })
    });
}

fn bench_rs_max_errors(c: &mut Criterion) {
    let mut block = codeword_block();
    for i in 0..14 {
        block[i * 5] ^= 0x5A;
    }
    let decoder = ReedSolomonDecoder::new(28);
    c.bench_function("rs_decode_72_14_errors", |b| {
        b.iter(|| {
            let mut received = block.clone();
            decoder.decode(black_box(&mut received))
        })
    });
}

fn bench_rs_encode(c: &mut Criterion) {
    let data: Vec<u8> = (0..44u8).collect();
    let encoder = ReedSolomonEncoder::new(28);
    c.bench_function("rs_encode_44_28", |b| b.iter(|| encoder.ecc(black_box(&data))));
}

criterion_group!(benches, bench_rs_clean, bench_rs_max_errors, bench_rs_encode);
criterion_main!(benches);
