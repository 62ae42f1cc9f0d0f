//! Frame recorder demo
//!
//! A capture thread produces frames at a fixed interval and never blocks: when
//! the queue is full the frame is dropped and counted. A writer thread drains
//! the queue to disk (or discards frames when no output directory is given)
//! and keeps going after capture stops until the queue is empty.
//!
//! ```text
//! cargo run --example frame_recorder -- --frames 500 --writer-delay-us 200
//! RUST_LOG=lf_queue=trace cargo run --example frame_recorder -- --capacity 4
//! ```

use clap::Parser;
use lf_queue::BoundedQueue;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Capture simulated frames into a bounded lock-free queue and write them out")]
struct Args {
    /// Number of frames the queue can buffer
    #[arg(long, default_value_t = 1000)]
    capacity: usize,

    /// Number of frames to capture
    #[arg(long, default_value_t = 300)]
    frames: u64,

    /// Bytes per simulated frame
    #[arg(long, default_value_t = 640 * 480)]
    frame_size: usize,

    /// Delay between captured frames, in microseconds
    #[arg(long, default_value_t = 1_000)]
    capture_interval_us: u64,

    /// Extra delay per written frame, in microseconds, to simulate slow I/O
    #[arg(long, default_value_t = 0)]
    writer_delay_us: u64,

    /// Directory to write `<id>.raw` files into; frames are discarded if unset
    #[arg(long)]
    out: Option<PathBuf>,
}

struct Frame {
    id: u64,
    captured_at: Instant,
    pixels: Vec<u8>,
}

impl Frame {
    fn capture(id: u64, size: usize) -> Self {
        Self {
            id,
            captured_at: Instant::now(),
            pixels: vec![(id % 251) as u8; size],
        }
    }

    fn file_name(&self) -> String {
        format!("{:08}.raw", self.id)
    }
}

struct WriterReport {
    written: u64,
    max_latency: Duration,
}

fn run_writer(
    frames: &BoundedQueue<Frame>,
    running: &AtomicBool,
    out: Option<&PathBuf>,
    delay: Duration,
) -> io::Result<WriterReport> {
    let mut report = WriterReport {
        written: 0,
        max_latency: Duration::ZERO,
    };

    while running.load(Ordering::Acquire) || !frames.is_empty() {
        let Some(frame) = frames.pop() else {
            thread::yield_now();
            continue;
        };

        if let Some(dir) = out {
            fs::write(dir.join(frame.file_name()), &frame.pixels)?;
        }
        report.written += 1;
        report.max_latency = report.max_latency.max(frame.captured_at.elapsed());

        if report.written % 100 == 0 {
            debug!(queued = frames.len(), written = report.written, "writer progress");
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    Ok(report)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Some(dir) = &args.out {
        fs::create_dir_all(dir)?;
    }

    let frames = Arc::new(BoundedQueue::try_new(args.capacity)?);
    let running = Arc::new(AtomicBool::new(true));
    info!(capacity = frames.capacity(), frames = args.frames, "recording");

    let writer = {
        let frames = Arc::clone(&frames);
        let running = Arc::clone(&running);
        let out = args.out.clone();
        let delay = Duration::from_micros(args.writer_delay_us);
        thread::spawn(move || run_writer(&frames, &running, out.as_ref(), delay))
    };

    let interval = Duration::from_micros(args.capture_interval_us);
    let mut dropped = 0u64;
    let start = Instant::now();
    for id in 1..=args.frames {
        if frames.push(Frame::capture(id, args.frame_size)).is_err() {
            dropped += 1;
        }
        thread::sleep(interval);
    }
    let elapsed = start.elapsed();
    running.store(false, Ordering::Release);

    info!("capture finished, draining");
    let report = writer
        .join()
        .map_err(|_| io::Error::other("writer thread panicked"))??;

    if dropped > 0 {
        warn!(dropped, "frames dropped because the queue was full");
    }

    let metrics = frames.metrics();
    let fps = report.written as f64 / elapsed.as_secs_f64();
    info!(
        written = report.written,
        dropped,
        elapsed_ms = elapsed.as_millis() as u64,
        fps,
        max_latency_us = report.max_latency.as_micros() as u64,
        push_retries = metrics.push_retries,
        pop_retries = metrics.pop_retries,
        "recording complete"
    );

    Ok(())
}
