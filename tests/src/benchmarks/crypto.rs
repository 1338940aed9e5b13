//! # Signing Benchmarks
//!
//! - keccak256 across payload sizes
//! - digest + sign for a request
//! - header check + payload verification, both framings
//! - public key recovery inside `sign`

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use http::HeaderMap;
use rand::Rng;
use t0_crypto::{keccak256, verify, Signer};
use t0_request_signing::{
    frame_payload, request_digest, FixedClock, SignatureVerificationInterceptor,
    SigningInterceptor, VerifierConfig,
};

const NOW: i64 = 1_706_000_000_000;

/// Random payload of `size` bytes.
fn generate_payload(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

fn fixed_signer(signer: Arc<Signer>) -> SigningInterceptor {
    SigningInterceptor::with_clock(signer, Arc::new(FixedClock::new(NOW)))
}

pub fn bench_keccak(c: &mut Criterion) {
    let mut group = c.benchmark_group("t0/keccak256");

    for size in [32, 256, 1024, 16 * 1024] {
        let payload = generate_payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("digest", size), &payload, |b, payload| {
            b.iter(|| black_box(keccak256(payload)))
        });
    }

    group.finish();
}

pub fn bench_sign(c: &mut Criterion) {
    let mut group = c.benchmark_group("t0/sign");
    group.measurement_time(Duration::from_secs(10));

    let signer = Arc::new(Signer::generate().expect("signer"));
    let digest = request_digest(b"{\"quote\":1}", NOW);

    // Includes recovery-id search
    group.bench_function("sign_digest", |b| {
        b.iter(|| black_box(signer.sign(&digest).expect("sign")))
    });

    let interceptor = fixed_signer(signer);
    for size in [64, 1024, 64 * 1024] {
        let payload = generate_payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("sign_request", size), &payload, |b, payload| {
            b.iter(|| black_box(interceptor.sign_at(payload, NOW).expect("sign")))
        });
    }

    group.finish();
}

pub fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("t0/verify");
    group.measurement_time(Duration::from_secs(10));

    let signer = Arc::new(Signer::generate().expect("signer"));
    let digest = request_digest(b"{\"quote\":1}", NOW);
    let result = signer.sign(&digest).expect("sign");

    group.bench_function("verify_digest", |b| {
        b.iter(|| {
            black_box(verify(
                result.public_key().as_bytes(),
                &digest,
                result.signature(),
            ))
        })
    });

    let config = VerifierConfig::new(signer.public_key_hex_prefixed());
    let server = SignatureVerificationInterceptor::with_clock(&config, Arc::new(FixedClock::new(NOW)))
        .expect("verifier");
    let client = fixed_signer(signer);
    let payload = generate_payload(1024);

    let mut bare = HeaderMap::new();
    client
        .sign_at(&payload, NOW)
        .and_then(|h| h.apply(&mut bare))
        .expect("bare headers");

    let mut framed = HeaderMap::new();
    client
        .sign_at(&frame_payload(&payload).expect("frame"), NOW)
        .and_then(|h| h.apply(&mut framed))
        .expect("framed headers");

    group.bench_function("verify_request_bare", |b| {
        b.iter(|| black_box(server.verify_request(&bare, &payload).is_ok()))
    });

    // Bare hypothesis fails first
    group.bench_function("verify_request_length_prefixed", |b| {
        b.iter(|| black_box(server.verify_request(&framed, &payload).is_ok()))
    });

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_keccak(c);
    bench_sign(c);
    bench_verify(c);
}
