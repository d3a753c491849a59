//! Lightweight tick profiling using thread-local storage
//!
//! Wraps the driver-facing operations without changing their signatures.
//! Enable with environment variable: ARENA_PROFILE=1

use std::cell::RefCell;
use std::time::Instant;

thread_local! {
    static TICK_TIME: RefCell<u64> = RefCell::new(0);
    static TICK_COUNT: RefCell<usize> = RefCell::new(0);

    static SNAPSHOT_TIME: RefCell<u64> = RefCell::new(0);
    static SNAPSHOT_COUNT: RefCell<usize> = RefCell::new(0);

    static LEVEL_IO_TIME: RefCell<u64> = RefCell::new(0);
    static LEVEL_IO_COUNT: RefCell<usize> = RefCell::new(0);
}

#[inline]
pub fn is_profiling_enabled() -> bool {
    std::env::var("ARENA_PROFILE").is_ok()
}

pub struct ProfileGuard {
    start: Instant,
    category: &'static str,
}

impl ProfileGuard {
    pub fn new(category: &'static str) -> Option<Self> {
        if is_profiling_enabled() {
            Some(ProfileGuard {
                start: Instant::now(),
                category,
            })
        } else {
            None
        }
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;

        match self.category {
            "tick" => {
                TICK_TIME.with(|t| *t.borrow_mut() += elapsed_ns);
                TICK_COUNT.with(|c| *c.borrow_mut() += 1);
            }
            "snapshot" => {
                SNAPSHOT_TIME.with(|t| *t.borrow_mut() += elapsed_ns);
                SNAPSHOT_COUNT.with(|c| *c.borrow_mut() += 1);
            }
            "level_io" => {
                LEVEL_IO_TIME.with(|t| *t.borrow_mut() += elapsed_ns);
                LEVEL_IO_COUNT.with(|c| *c.borrow_mut() += 1);
            }
            _ => {}
        }
    }
}

/// Prints accumulated timings for this thread to stderr and resets them
pub fn report_and_reset() {
    if !is_profiling_enabled() {
        return;
    }

    let print_line = |name: &str, time_ns: u64, count: usize| {
        if count > 0 {
            eprintln!(
                "  {:<10} {:>8} calls  {:>10.2}ms total  {:>8.1}us avg",
                name,
                count,
                time_ns as f64 / 1_000_000.0,
                time_ns as f64 / count as f64 / 1000.0
            );
        }
    };

    eprintln!("── arena profile ──");
    TICK_TIME.with(|t| {
        TICK_COUNT.with(|c| print_line("tick", *t.borrow(), *c.borrow()));
    });
    SNAPSHOT_TIME.with(|t| {
        SNAPSHOT_COUNT.with(|c| print_line("snapshot", *t.borrow(), *c.borrow()));
    });
    LEVEL_IO_TIME.with(|t| {
        LEVEL_IO_COUNT.with(|c| print_line("level_io", *t.borrow(), *c.borrow()));
    });

    TICK_TIME.with(|t| *t.borrow_mut() = 0);
    TICK_COUNT.with(|c| *c.borrow_mut() = 0);
    SNAPSHOT_TIME.with(|t| *t.borrow_mut() = 0);
    SNAPSHOT_COUNT.with(|c| *c.borrow_mut() = 0);
    LEVEL_IO_TIME.with(|t| *t.borrow_mut() = 0);
    LEVEL_IO_COUNT.with(|c| *c.borrow_mut() = 0);
}
