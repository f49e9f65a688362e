use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use database::{
    database::options::DatabaseOptions,
    model::person::PersonData,
    store::{embedded::EmbeddedPeopleStore, PeopleStore},
};
use std::sync::Arc;

const SAMPLE_SIZE: u64 = 1_000;

const CONCURRENT_CLIENTS: [u64; 4] = [1, 2, 4, 8];

/*
    How this bench is configured:
    1. The store is in memory, the file system's fsync would otherwise dominate the numbers
    2. Each client inserts SAMPLE_SIZE / clients people, all clients share one store and
        therefore one database thread
*/
pub fn store_insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_insert");

    let runtime = tokio::runtime::Runtime::new().expect("should build runtime");

    for clients in CONCURRENT_CLIENTS.iter() {
        let store = Arc::new(
            EmbeddedPeopleStore::start(DatabaseOptions::new_in_memory())
                .expect("should start store"),
        );

        group.throughput(Throughput::Elements(SAMPLE_SIZE));

        group.bench_with_input(BenchmarkId::from_parameter(clients), clients, |b, &clients| {
            b.to_async(&runtime).iter(|| {
                let store = store.clone();

                async move {
                    let handles: Vec<_> = (0..clients)
                        .map(|_| {
                            let store = store.clone();

                            tokio::spawn(async move {
                                for _ in 0..SAMPLE_SIZE / clients {
                                    let _ = store
                                        .insert(PersonData::new(Some("Test"), None, None))
                                        .await;
                                }
                            })
                        })
                        .collect();

                    for handle in handles {
                        let _ = handle.await;
                    }
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, store_insert_benchmark);
criterion_main!(benches);
