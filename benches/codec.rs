use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use itemid::transforms::rle;
use itemid::{encode_identifier, verify_round_trip, DEFAULT_MAX_LENGTH};

fn sample_payload() -> Vec<u8> {
	let mut payload = vec![0u8];
	payload.extend_from_slice(b"user1@contoso.com");
	payload.extend(std::iter::repeat(0u8).take(120));
	payload.extend((0..150u32).map(|x| (x * 31 % 7) as u8));
	payload
}

fn bench_codec(c: &mut Criterion) {
	let slot = sample_payload();
	let compressed = rle::compress(&slot, 1);
	let mut group = c.benchmark_group("codec");
	group.throughput(Throughput::Bytes(slot.len() as u64));
	group.bench_function("compress", |b| {
		b.iter(|| rle::compress(&slot, 1));
	});
	group.bench_function("decompress", |b| {
		b.iter(|| rle::decompress(&compressed, DEFAULT_MAX_LENGTH).unwrap());
	});
	group.bench_function("encode_identifier", |b| {
		b.iter(|| encode_identifier(&slot[1..]));
	});
	group.bench_function("verify_round_trip", |b| {
		b.iter(|| verify_round_trip(&compressed, DEFAULT_MAX_LENGTH).unwrap());
	});
	group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
