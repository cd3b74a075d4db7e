use bencher::{PayloadCase, TestGroup};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::io::{self, Read, Write};
use switchyard_http::protocol::Body;

const CHUNK: [u8; 1024] = [b'x'; 1024];

fn create_test_cases() -> Vec<PayloadCase> {
    vec![
        PayloadCase::new("4k", TestGroup::Small, 4 * 1024),
        PayloadCase::new("256k", TestGroup::Normal, 256 * 1024),
        PayloadCase::new("8m", TestGroup::Large, 8 * 1024 * 1024),
    ]
}

fn producer(len: usize) -> Body {
    Body::producer(Some(len as u64), move |sink| {
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(CHUNK.len());
            sink.write_all(&CHUNK[..n])?;
            remaining -= n;
        }
        Ok(())
    })
}

fn pull(len: usize) -> io::Result<usize> {
    let mut reader = producer(len).into_reader()?;
    let mut buf = [0u8; 8192];
    let mut total = 0;
    loop {
        match reader.read(&mut buf)? {
            0 => break,
            n => total += n,
        }
    }
    reader.close()?;
    Ok(total)
}

fn benchmark_pipe(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("pipe");

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.len() as u64));
        group.bench_with_input(BenchmarkId::new("pull", case.name()), &case, |b, case| {
            b.iter(|| black_box(pull(case.len()).expect("producer never fails")));
        });
        group.bench_with_input(BenchmarkId::new("push", case.name()), &case, |b, case| {
            b.iter(|| black_box(producer(case.len()).write_to(&mut io::sink()).expect("sink never fails")));
        });
    }

    group.finish();
}

criterion_group!(pipe, benchmark_pipe);
criterion_main!(pipe);
