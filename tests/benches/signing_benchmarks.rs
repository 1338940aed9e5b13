//! # T-0 Request Signing Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | keccak256, 1 KiB | < 10μs |
//! | sign request | < 1ms |
//! | verify request, bare framing | < 1ms |
//! | verify request, length-prefixed fallback | < 2ms |

use criterion::{criterion_group, criterion_main, Criterion};

fn benches(c: &mut Criterion) {
    t0_tests::benchmarks::crypto::register_benchmarks(c);
}

criterion_group!(signing_benches, benches);
criterion_main!(signing_benches);
