//! bytefifo - Throughput Benchmark
//!
//! Producer thread memompa byte ke fifo, consumer thread menguras dan
//! memverifikasi urutan. Mengukur throughput untuk kombinasi capacity,
//! ukuran chunk, dan strategi menunggu.
//!
//! Usage:
//!   cargo run --release -- --capacity 4096 --chunk 100 --total-mb 256 --wait yield

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use bytefifo::{FifoConfig, MmapRegion, WaitStrategy};
use clap::{Parser, ValueEnum};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bytefifo")]
#[command(about = "Measure byte throughput through a single-producer single-consumer fifo")]
struct Args {
    /// Fifo capacity in bytes
    #[arg(long, default_value_t = 4096)]
    capacity: usize,

    /// Bytes per write/read call (larger than capacity = fragmented writes)
    #[arg(long, default_value_t = 64)]
    chunk: usize,

    /// Total traffic in MiB
    #[arg(long, default_value_t = 64)]
    total_mb: usize,

    /// What a blocked call does while waiting
    #[arg(long, value_enum, default_value_t = WaitMode::Spin)]
    wait: WaitMode,

    /// Back the fifo with a memory-mapped file instead of an anonymous region
    #[arg(long)]
    mmap_path: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum WaitMode {
    Spin,
    Yield,
}

/// Statistik yang diisi hook
struct PumpStats {
    post_writes: AtomicU64,
    wait_polls: AtomicU64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    if args.chunk == 0 {
        bail!("--chunk must be greater than zero");
    }

    println!("🚀 bytefifo Throughput Benchmark");
    println!("================================\n");

    let mut region = match &args.mmap_path {
        Some(path) => MmapRegion::open(path, args.capacity)
            .with_context(|| format!("failed to map fifo region at {}", path))?,
        None => MmapRegion::anonymous(args.capacity).context("failed to map anonymous region")?,
    };

    run_pump(&args, region.as_mut_slice())?;

    if let Some(path) = &args.mmap_path {
        region.sync().context("failed to sync fifo region")?;
        std::fs::remove_file(path).ok();
    }

    println!("\n✅ Benchmark complete!");
    Ok(())
}

fn run_pump(args: &Args, memory: &mut [u8]) -> Result<()> {
    let stats = PumpStats {
        post_writes: AtomicU64::new(0),
        wait_polls: AtomicU64::new(0),
    };
    let post = || {
        stats.post_writes.fetch_add(1, Ordering::Relaxed);
    };
    let poll = || {
        stats.wait_polls.fetch_add(1, Ordering::Relaxed);
        thread::yield_now();
    };

    let wait = match args.wait {
        WaitMode::Spin => WaitStrategy::Spin,
        WaitMode::Yield => WaitStrategy::Poll(&poll),
    };

    let fifo = FifoConfig::new()
        .capacity(args.capacity)
        .post_write(&post)
        .wait(wait)
        .max_transfer(args.chunk)
        .build(memory)?;

    let total = args.total_mb * 1024 * 1024;
    let chunks = total / args.chunk;
    // Writer menunggu `chunk` free, reader menunggu `read_chunk` used:
    // keduanya tidak boleh bisa terblokir bersamaan
    let read_chunk = if args.chunk > args.capacity {
        (args.capacity / 2).max(1)
    } else {
        args.chunk.min(args.capacity - args.chunk + 1)
    };

    info!(capacity = args.capacity, chunk = args.chunk, read_chunk, total, "starting pump");

    let start = Instant::now();
    let mismatches = thread::scope(|s| {
        let consumer = s.spawn(|| {
            let mut buf = vec![0u8; read_chunk];
            let mut expected = 0u8;
            let mut remaining = chunks * args.chunk;
            let mut mismatches = 0u64;

            while remaining > 0 {
                let n = remaining.min(read_chunk);
                for &b in fifo.read(&mut buf[..n]) {
                    if b != expected {
                        mismatches += 1;
                    }
                    expected = expected.wrapping_add(1);
                }
                remaining -= n;
            }
            mismatches
        });

        let mut chunk = vec![0u8; args.chunk];
        let mut next = 0u8;
        for _ in 0..chunks {
            for b in chunk.iter_mut() {
                *b = next;
                next = next.wrapping_add(1);
            }
            fifo.write(&chunk);
        }

        consumer.join()
    });
    let duration = start.elapsed();

    let mismatches = match mismatches {
        Ok(n) => n,
        Err(_) => bail!("consumer thread panicked"),
    };

    let moved = chunks * args.chunk;
    println!("📊 Pump Results");
    println!("---------------");
    println!("  Capacity:      {} bytes", args.capacity);
    println!("  Write chunk:   {} bytes", args.chunk);
    println!("  Read chunk:    {} bytes", read_chunk);
    println!("  Wait mode:     {:?}", args.wait);
    println!("  Moved:         {} bytes", moved);
    println!("  Duration:      {:.3}s", duration.as_secs_f64());
    println!(
        "  Throughput:    {:.2} MB/sec",
        moved as f64 / duration.as_secs_f64() / 1_000_000.0
    );
    println!(
        "  Post writes:   {}",
        stats.post_writes.load(Ordering::Relaxed)
    );
    println!("  Wait polls:    {}", stats.wait_polls.load(Ordering::Relaxed));

    if mismatches > 0 {
        bail!("{} bytes arrived out of order", mismatches);
    }

    Ok(())
}
