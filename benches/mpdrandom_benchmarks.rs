//! # mpdrandom Performance Benchmarks
//!
//! Measures the album bookkeeping that runs on every invocation and every
//! daemon reaction, against playlists of realistic size.
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench grouping
//! ```

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use mpdrandom::album::{group_albums, pick_random_album};
use mpdrandom::queue::shuffle_albums;
use mpdrandom::session::memory::{track, MemoryServer};
use mpdrandom::session::Song;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

/// Songs spread over albums of twelve tracks, numbered like a real queue
fn create_test_songs(count: usize) -> Vec<Song> {
    (0..count)
        .map(|i| {
            let album = format!("Album {}", i / 12);
            let mut song = track(&format!("artist/{album}/{i:02}.flac"), Some(&album), Some("Artist"));
            song.id = i as u32 + 1;
            song.pos = i as u32;
            song
        })
        .collect()
}

fn create_test_server(count: usize) -> MemoryServer {
    let server = MemoryServer::new();
    for song in create_test_songs(count) {
        server.enqueue(song);
    }
    server
}

fn benchmark_album_grouping(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouping");

    for size in [120, 1200, 12000].iter() {
        let songs = create_test_songs(*size);
        group.bench_with_input(BenchmarkId::new("group_albums", size), &songs, |b, songs| {
            b.iter_batched(
                || songs.clone(),
                |songs| black_box(group_albums(songs)),
                BatchSize::SmallInput,
            )
        });
    }

    let albums = group_albums(create_test_songs(12000));
    let mut rng = StdRng::seed_from_u64(7);
    group.bench_function("pick_random_album", |b| {
        b.iter(|| pick_random_album(black_box(&albums), Some("Album 3"), &mut rng))
    });

    group.finish();
}

fn benchmark_queue_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue");
    group.sample_size(20);

    for size in [120, 1200].iter() {
        group.bench_with_input(BenchmarkId::new("shuffle_albums", size), size, |b, &size| {
            b.iter_batched(
                || (create_test_server(size), StdRng::seed_from_u64(11)),
                |(server, mut rng)| shuffle_albums(&mut server.connect(), &mut rng),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_album_grouping, benchmark_queue_operations);

criterion_main!(benches);
