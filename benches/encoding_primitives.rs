use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::StdRng;
use rand::{distributions::Uniform, Rng, SeedableRng};

use ion_binary_1_1::{FlexInt, FlexUInt, IonResult};

// Rather than store a set of test values, we hardcode a seed value and generate the same set
// on each run.
const RNG_SEED: u64 = 1024;

// The number of values (signed or unsigned) that will be read or written in each benchmark.
const NUM_VALUES: usize = 10_000;

fn generate_unsigned_values(min: u64, max: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    let range = Uniform::new(min, max);

    (0..NUM_VALUES).map(|_| rng.sample(range)).collect()
}

fn generate_signed_values(min: i64, max: i64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(RNG_SEED);
    let range = Uniform::new(min, max);

    (0..NUM_VALUES).map(|_| rng.sample(range)).collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    println!("# Values: {NUM_VALUES}");

    let unsigned_values = generate_unsigned_values(u64::MIN, (2 << 49) - 1);
    let signed_values = generate_signed_values(-2 << 49, (2 << 49) - 1);

    // Roundtrip all of the values as a correctness check. Save the encoded bytes of each value
    // sequence; we'll check its length at the end of each benchmark as another sanity check.
    let encoded_flex_uints = roundtrip_flex_uint_test(&unsigned_values).unwrap();
    let encoded_flex_ints = roundtrip_flex_int_test(&signed_values).unwrap();

    let mut group = c.benchmark_group("binary 1.1");
    group.bench_function("write FlexUInt", |b| {
        let mut output = Vec::with_capacity(encoded_flex_uints.len());
        b.iter(|| {
            output.clear();
            let mut encoded_length: usize = 0;
            for value in &unsigned_values {
                encoded_length += black_box(FlexUInt::write(&mut output, *value).unwrap());
            }
            assert_eq!(encoded_length, encoded_flex_uints.len());
        })
    });
    group.bench_function("read FlexUInt", |b| {
        b.iter(|| {
            let mut position: usize = 0;
            for _ in 0..unsigned_values.len() {
                let flex_uint = FlexUInt::read_at(&encoded_flex_uints, position).unwrap();
                position += black_box(flex_uint).size_in_bytes();
            }
            assert_eq!(position, encoded_flex_uints.len());
        })
    });
    group.bench_function("write FlexInt", |b| {
        let mut output = Vec::with_capacity(encoded_flex_ints.len());
        b.iter(|| {
            output.clear();
            let mut encoded_length: usize = 0;
            for value in &signed_values {
                encoded_length += black_box(FlexInt::write_i64(&mut output, *value).unwrap());
            }
            assert_eq!(encoded_length, encoded_flex_ints.len());
        })
    });
    group.bench_function("read FlexInt", |b| {
        b.iter(|| {
            let mut position: usize = 0;
            for _ in 0..signed_values.len() {
                let flex_int = FlexInt::read_at(&encoded_flex_ints, position).unwrap();
                position += black_box(flex_int).size_in_bytes();
            }
            assert_eq!(position, encoded_flex_ints.len());
        })
    });
    group.finish();
}

fn roundtrip_flex_uint_test(unsigned_values: &[u64]) -> IonResult<Vec<u8>> {
    println!("Roundtripping unsigned values as FlexUInts to check for correctness.");
    let mut encoded_values_buffer = Vec::new();
    for value in unsigned_values {
        FlexUInt::write(&mut encoded_values_buffer, *value)?;
    }
    let mut decoded_values = Vec::new();
    let mut position = 0;
    for _ in 0..unsigned_values.len() {
        let flex_uint = FlexUInt::read_at(&encoded_values_buffer, position)?;
        position += flex_uint.size_in_bytes();
        decoded_values.push(flex_uint.value());
    }
    assert_eq!(decoded_values.as_slice(), unsigned_values);
    Ok(encoded_values_buffer)
}

fn roundtrip_flex_int_test(signed_values: &[i64]) -> IonResult<Vec<u8>> {
    println!("Roundtripping signed values as FlexInts to check for correctness.");
    let mut encoded_values_buffer = Vec::new();
    for value in signed_values {
        FlexInt::write_i64(&mut encoded_values_buffer, *value)?;
    }
    let mut decoded_values = Vec::new();
    let mut position = 0;
    for _ in 0..signed_values.len() {
        let flex_int = FlexInt::read_at(&encoded_values_buffer, position)?;
        position += flex_int.size_in_bytes();
        decoded_values.push(flex_int.value());
    }
    assert_eq!(decoded_values.as_slice(), signed_values);
    Ok(encoded_values_buffer)
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
