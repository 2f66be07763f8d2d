// Integration tests for the Chunker streaming API
// Tests cover: push/finish semantics, determinism, shift resistance, readers

use std::collections::HashSet;
use std::io::Cursor;

use bytes::Bytes;
use contenthash::{Chunk, ChunkHash, Chunker, ChunkerConfig, HashError, WINDOW_SIZE};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

fn small_config() -> ChunkerConfig {
    ChunkerConfig::new(64, 256, 1024).unwrap()
}

fn random_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill_bytes(&mut data);
    data
}

fn chunk_all(config: ChunkerConfig, data: &[u8]) -> Vec<Chunk> {
    let mut chunker = Chunker::new(config);
    let mut chunks = chunker.push(data);
    chunks.extend(chunker.finish());
    chunks
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_input() {
    let mut chunker = Chunker::default();
    let chunks = chunker.push(&[]);

    assert!(chunks.is_empty(), "Empty input should complete no chunks");
    assert_eq!(chunker.pending_len(), 0);

    let last = chunker
        .finish()
        .expect("finish() on an empty stream should emit the empty chunk");
    assert_eq!(last.offset, 0);
    assert_eq!(last.len, 0);
    assert_eq!(last.hash, ChunkHash::of(b""), "Empty chunk hashes the empty string");
}

#[test]
fn test_small_data_below_min_size() {
    let mut chunker = Chunker::new(small_config());

    let chunks = chunker.push(&[0xAA; 3]);
    assert!(chunks.is_empty(), "Data below min_size should not produce chunks");
    assert_eq!(chunker.pending_len(), 3, "All data should be pending");

    let last = chunker.finish().expect("finish() should emit pending data");
    assert_eq!(last.len, 3, "Final chunk should contain all pending data");
    assert_eq!(last.hash, ChunkHash::of(&[0xAA; 3]));
}

#[test]
fn test_chunks_tile_the_stream() {
    let data = random_bytes(1, 300_000);
    let chunks = chunk_all(small_config(), &data);

    assert!(chunks.len() > 100, "300 KB at 256 B average should give many chunks");

    let mut offset = 0u64;
    for chunk in &chunks {
        assert_eq!(chunk.offset, offset, "Chunks must be contiguous");
        assert_eq!(
            chunk.hash,
            ChunkHash::of(&data[chunk.range().start as usize..chunk.range().end as usize]),
            "Chunk hash must be BLAKE3 of its bytes"
        );
        offset = chunk.end();
    }
    assert_eq!(offset, data.len() as u64, "Chunks must cover the whole stream");
}

#[test]
fn test_chunk_sizes_respect_bounds() {
    let config = small_config();
    let data = random_bytes(2, 500_000);
    let chunks = chunk_all(config, &data);

    let (last, body) = chunks.split_last().unwrap();
    for chunk in body {
        assert!(
            chunk.len >= config.min_size() as u64 && chunk.len <= config.max_size() as u64,
            "Chunk of {} bytes outside [{}, {}]",
            chunk.len,
            config.min_size(),
            config.max_size()
        );
    }
    assert!(last.len <= config.max_size() as u64);

    let avg = data.len() / chunks.len();
    assert!(
        avg > config.min_size() && avg < config.max_size(),
        "Average chunk size {} should sit between min and max",
        avg
    );
}

#[test]
fn test_invalid_configs_rejected() {
    assert!(ChunkerConfig::new(0, 256, 1024).is_err());
    assert!(ChunkerConfig::new(512, 256, 1024).is_err());
    assert!(ChunkerConfig::new(64, 256, 128).is_err());
    assert!(ChunkerConfig::new(64, 300, 1024).is_err());
    assert!(
        matches!(
            ChunkerConfig::new(WINDOW_SIZE / 2, 256, 1024),
            Err(HashError::InvalidConfig { .. })
        ),
        "min_size below the rolling window must be rejected"
    );
}

#[test]
fn test_mean_chunk_size_matches_target() {
    // avg - min = 192 is not a power of two
    let config = ChunkerConfig::new(64, 256, 4096).unwrap();
    let data = random_bytes(11, 2 * 1024 * 1024);
    let chunks = chunk_all(config, &data);

    let mean = data.len() as f64 / chunks.len() as f64;
    let target = config.avg_size() as f64;
    assert!(
        (mean - target).abs() < target * 0.1,
        "Mean chunk size {:.1} should be within 10% of {}",
        mean,
        target
    );
}

#[test]
fn test_ten_megabytes_with_one_megabyte_target() {
    let config = ChunkerConfig::new(256 * 1024, 1024 * 1024, 4 * 1024 * 1024).unwrap();
    let data = random_bytes(12, 10 * 1024 * 1024);
    let chunks = chunk_all(config, &data);

    assert!(chunks.len() > 1, "10 MB must not fit in one chunk");

    let (last, body) = chunks.split_last().unwrap();
    for chunk in body {
        assert!(
            chunk.len >= 256 * 1024,
            "Chunk at {} is only {} bytes",
            chunk.offset,
            chunk.len
        );
        assert!(chunk.len <= config.max_size() as u64);
    }
    assert!(last.len > 0 && last.len <= config.max_size() as u64);

    let mut offset = 0u64;
    for chunk in &chunks {
        assert_eq!(chunk.offset, offset, "Gap or overlap before chunk at {}", chunk.offset);
        offset = chunk.end();
    }
    assert_eq!(offset, data.len() as u64, "Chunks must cover the whole stream");
}

// ============================================================================
// Determinism Tests
// ============================================================================

#[test]
fn test_push_granularity_does_not_matter() {
    let data = random_bytes(3, 100_000);
    let expected = chunk_all(small_config(), &data);

    for piece in [1usize, 13, 255, 256, 4096, 65_536] {
        let mut chunker = Chunker::new(small_config());
        let mut chunks = Vec::new();
        for part in data.chunks(piece) {
            chunks.extend(chunker.push(part));
        }
        chunks.extend(chunker.finish());
        assert_eq!(chunks, expected, "Pushing {}-byte pieces changed the chunks", piece);
    }
}

#[test]
fn test_reused_chunker_matches_fresh() {
    let first = random_bytes(4, 20_000);
    let second = random_bytes(5, 20_000);

    let mut chunker = Chunker::new(small_config());
    chunker.push(&first);
    chunker.finish();

    let mut chunks = chunker.push(&second);
    chunks.extend(chunker.finish());
    assert_eq!(chunks, chunk_all(small_config(), &second));
}

// ============================================================================
// Shift Resistance Tests
// ============================================================================

#[test]
fn test_insertion_only_disturbs_nearby_chunks() {
    let config = ChunkerConfig::new(256 * 1024, 1024 * 1024, 4 * 1024 * 1024).unwrap();
    let original = random_bytes(6, 10 * 1024 * 1024);

    let mut shifted = random_bytes(7, 100);
    shifted.extend_from_slice(&original);

    let before = chunk_all(config, &original);
    let after = chunk_all(config, &shifted);

    let before_hashes: HashSet<_> = before.iter().map(|c| c.hash).collect();
    let changed = after
        .iter()
        .filter(|c| !before_hashes.contains(&c.hash))
        .count();

    assert!(before.len() >= 4, "10 MB should give several chunks, got {}", before.len());
    assert!(
        changed <= 2,
        "A 100-byte prefix changed {} of {} chunks",
        changed,
        after.len()
    );
    assert_eq!(
        before.last().map(|c| c.hash),
        after.last().map(|c| c.hash),
        "Tail chunk should be unaffected"
    );
}

#[test]
fn test_local_edit_only_disturbs_nearby_chunks() {
    let config = small_config();
    let original = random_bytes(8, 200_000);
    let mut edited = original.clone();
    edited[100_000] ^= 0xFF;

    let before = chunk_all(config, &original);
    let after = chunk_all(config, &edited);

    let before_hashes: HashSet<_> = before.iter().map(|c| c.hash).collect();
    let changed = after
        .iter()
        .filter(|c| !before_hashes.contains(&c.hash))
        .count();
    assert!(changed <= 3, "A one-byte edit changed {} chunks", changed);
}

// ============================================================================
// Reader and Buffer Tests
// ============================================================================

#[test]
fn test_reader_iterator_matches_push() {
    let data = random_bytes(9, 150_000);
    let expected = chunk_all(small_config(), &data);

    let chunks: Vec<_> = Chunker::new(small_config())
        .chunk(Cursor::new(&data))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(chunks.len(), expected.len());
    for (got, want) in chunks.iter().zip(&expected) {
        assert_eq!(got.chunk, *want);
        assert!(got.verify(), "Chunk bytes must match the chunk hash");
    }
}

#[test]
fn test_chunk_bytes_slices_input() {
    let data = Bytes::from(random_bytes(10, 50_000));
    let chunks = Chunker::new(small_config()).chunk_bytes(data.clone());

    let rebuilt: Vec<u8> = chunks.iter().flat_map(|c| c.data.iter().copied()).collect();
    assert_eq!(rebuilt, data.as_ref(), "Concatenated chunks must equal the input");
}
