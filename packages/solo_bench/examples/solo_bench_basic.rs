//! Benchmarks a few small operations and prints their per-operation metrics.
//!
//! Run with: `cargo run --example solo_bench_basic`

use std::alloc::Layout;
use std::convert::Infallible;
use std::hint::black_box;
use std::time::Duration;

use new_zealand::nz;
use solo_bench::{AllocError, Allocate, RunSummary, run_n, run_ns};

const TARGET: Duration = Duration::from_millis(200);

fn main() {
    let summing = run_ns(
        |state| {
            let input = (0..1024_u64).collect::<Vec<_>>();
            state.reset_timer();

            for _ in 0..state.iterations() {
                black_box(black_box(&input).iter().sum::<u64>());
            }
            Ok::<(), Infallible>(())
        },
        TARGET,
    )
    .expect("summing cannot fail");

    print_summary("sum 1024 integers", &summing);

    let boxing = run_ns(
        |state| {
            let allocator = state.allocator();

            for _ in 0..state.iterations() {
                let block = allocator.allocate(Layout::new::<[u64; 8]>())?;
                black_box(block.as_ptr());

                // SAFETY: The block was allocated by this allocator.
                unsafe { allocator.free(black_box(block)) };
            }
            Ok::<(), AllocError>(())
        },
        TARGET,
    )
    .expect("the system allocator has memory for 64 bytes");

    print_summary("allocate and free 64 bytes", &boxing);

    let leaking = run_n(
        |state| {
            let allocator = state.allocator();

            for _ in 0..state.iterations() {
                std::mem::forget(allocator.allocate(Layout::new::<u32>())?);
            }
            Ok::<(), AllocError>(())
        },
        nz!(1_000),
    )
    .expect("the system allocator has memory for 4 KB");

    print_summary("leak 4 bytes", &leaking);
}

fn print_summary(name: &str, summary: &RunSummary) {
    println!("{name}:");
    println!(
        "    {} iterations in {:?} ({} trials)",
        summary.iterations(),
        summary.elapsed(),
        summary.trials()
    );
    println!("    {:.2} ns/op", summary.nanos_per_op());
    println!(
        "    {:.2} allocs/op, {:.2} B/op, {:.2} live B/op",
        summary.allocs_per_op(),
        summary.alloc_bytes_per_op(),
        summary.live_bytes_per_op()
    );

    if summary.has_leaks() {
        println!("    leaked {} bytes", summary.live_bytes());
    }

    println!();
}
