//! Formatting throughput: the classic mixed-argument line and a float-heavy
//! one, measured end to end through sprint.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use core_fmt::sprint;

fn bench_mixed_line(c: &mut Criterion) {
    c.bench_function("sprint_mixed_args", |b| {
        b.iter(|| {
            let out = sprint!(
                "{0:0.10f}:{1:04}:{2:+g}:{3}:{4}:{5:c}:%",
                black_box(0.125),
                black_box(42),
                black_box(0.25),
                black_box("str"),
                black_box(1000 as *const ()),
                black_box('X')
            );
            black_box(out);
        })
    });
}

fn bench_float_shortest(c: &mut Criterion) {
    c.bench_function("sprint_float_shortest", |b| {
        b.iter(|| {
            let out = sprint!("{} {} {}", black_box(0.1), black_box(1e16), black_box(392.65));
            black_box(out);
        })
    });
}

fn bench_int_padding(c: &mut Criterion) {
    c.bench_function("sprint_padded_ints", |b| {
        b.iter(|| {
            let out = sprint!("{:08} {:>12} {:#x}", black_box(42), black_box(-7), black_box(0xdead));
            black_box(out);
        })
    });
}

criterion_group!(benches, bench_mixed_line, bench_float_shortest, bench_int_padding);
criterion_main!(benches);
