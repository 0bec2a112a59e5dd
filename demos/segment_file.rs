//! Segmentation walkthrough on a synthetic "file".
//!
//! Run with: cargo run --example segment_file

use shannonigans::changepoint::{segment, PeltConfig, SegmentationConfig};
use shannonigans::summary::summarize;

fn main() {
    println!("=== Entropy Segmentation Example ===\n");

    // Header padding, ASCII text, then a high-entropy blob
    let mut buffer = vec![0u8; 256];
    buffer.extend(b"The quick brown fox jumps over the lazy dog. ".repeat(8));
    buffer.extend((0..512u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8));

    println!("Data: [0x00 x 256] + [text x 360] + [noise x 512]");
    println!("Expected change points near 256 and 616\n");

    // 1. Exact search
    println!("--- Exact search, 2 breakpoints ---");
    let exact = segment(&buffer, &SegmentationConfig::exact(2).jump(8))
        .expect("valid configuration");
    println!("Breakpoints: {:?}", exact.breakpoints.as_slice());
    println!("Total cost: {:.3}\n", exact.cost);

    // 2. Effect of the penalty
    println!("--- Penalized search ---");
    println!("{:<15} {:>25} {:>10}", "Penalty", "Breakpoints", "Count");
    println!("{:-<52}", "");
    for penalty in [5.0, 20.0, 50.0, 200.0, 1000.0] {
        let config = SegmentationConfig::Penalized(PeltConfig::new(penalty).jump(8));
        let result = segment(&buffer, &config).expect("valid configuration");
        println!(
            "{:<15.1} {:>25?} {:>10}",
            penalty,
            result.changepoints(),
            result.n_changepoints()
        );
    }

    // 3. Per-segment summary
    println!("\n--- Segment summary ---");
    let summary = summarize(&buffer, exact.breakpoints.as_slice()).expect("valid breakpoints");
    for segment in &summary {
        println!("{segment}");
    }

    println!("\n=== Example Complete ===");
}
