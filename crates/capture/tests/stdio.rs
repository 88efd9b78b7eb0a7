// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Descriptor-level capture behavior.
//!
//! Every scenario swaps the real descriptors 0, 1 and 2, and libtest writes
//! its own progress to descriptor 1 between tests. So the scenarios run one
//! after another from a single test instead of as separate tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use ag_capture::{capture_active_on_this_thread, CaptureConfig, CaptureError, StreamCapture};
use nix::libc::{dev_t, ino_t};
use nix::sys::stat::fstat;
use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc, Barrier};
use std::time::Duration;

fn start() -> StreamCapture {
    StreamCapture::start(CaptureConfig::new()).expect("capture should start")
}

fn identity(fd: i32) -> (dev_t, ino_t) {
    let stat = fstat(fd).expect("fstat");
    (stat.st_dev, stat.st_ino)
}

fn output_is_split_into_lines() {
    let capture = start();
    let mut out = io::stdout();
    write!(out, "alpha\n\nbeta\ngamma").unwrap();
    let captured = capture.stop();
    assert_eq!(captured.out_lines, ["alpha", "beta", "gamma"]);
    assert!(captured.err_lines.is_empty());
}

fn custom_delimiters_split_output() {
    let capture =
        StreamCapture::start(CaptureConfig::new().delimiters([',', '\n'])).expect("start");
    write!(io::stdout(), "1,2,,3\n4\n").unwrap();
    assert_eq!(capture.stop().out_lines, ["1", "2", "3", "4"]);
}

fn error_lines_keep_blank_interior_lines() {
    let capture = start();
    let mut err = io::stderr();
    write!(err, "oops\n\nagain\n").unwrap();
    let captured = capture.stop();
    assert_eq!(captured.err_lines, ["oops", "", "again"]);
    assert!(captured.out_lines.is_empty());
}

fn input_is_read_back_in_order() {
    let mut capture = start();
    capture.write_input("1\n").unwrap();
    capture.write_input("2\n3\n").unwrap();
    capture.close_input();

    let stdin = io::stdin();
    let mut out = io::stdout();
    for line in stdin.lock().lines() {
        writeln!(out, "got {}", line.unwrap()).unwrap();
    }
    let captured = capture.stop();
    assert_eq!(captured.out_lines, ["got 1", "got 2", "got 3"]);
}

fn unread_input_does_not_leak_into_next_capture() {
    let mut capture = start();
    capture.write_input("first\nleftover\n").unwrap();
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).unwrap();
    assert_eq!(line, "first\n");
    capture.stop();

    let mut capture = start();
    capture.write_input("fresh\n").unwrap();
    capture.close_input();
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).unwrap();
    assert_eq!(line, "fresh\n");
    capture.stop();
}

fn input_after_close_is_rejected() {
    let mut capture = start();
    capture.close_input();
    assert!(matches!(
        capture.write_input("late\n"),
        Err(CaptureError::InputClosed)
    ));
    capture.stop();
}

fn input_beyond_pipe_capacity_arrives_in_full() {
    let mut capture = start();
    let line = format!("{}\n", "x".repeat(99));
    for _ in 0..2000 {
        capture.write_input(&line).unwrap();
    }
    capture.close_input();

    let received = io::stdin()
        .lock()
        .lines()
        .map(|line| line.unwrap())
        .filter(|line| line.len() == 99)
        .count();
    capture.stop();
    assert_eq!(received, 2000);
}

fn stop_without_std_locks_while_another_thread_holds_them() {
    let (locked, holding) = mpsc::channel();
    let (release, released) = mpsc::channel::<()>();
    let holder = std::thread::spawn(move || {
        let _stdin = io::stdin().lock();
        let _stdout = io::stdout().lock();
        locked.send(()).unwrap();
        let _ = released.recv();
    });
    holding.recv().unwrap();

    let (done, finished) = mpsc::channel();
    let worker = std::thread::spawn(move || {
        let mut capture =
            StreamCapture::start(CaptureConfig::new().leave_std_buffers()).expect("start");
        capture.write_input("nobody reads this\n").unwrap();
        write!(io::stderr(), "still heard\n").unwrap();
        done.send(capture.stop()).unwrap();
    });
    let captured = finished
        .recv_timeout(Duration::from_secs(5))
        .expect("stop waited on a std lock held by another thread");
    assert_eq!(captured.err_lines, ["still heard"]);

    release.send(()).unwrap();
    holder.join().unwrap();
    worker.join().unwrap();

    // The unread line was dropped from the pipe, not left for the next capture.
    let mut capture = start();
    capture.write_input("fresh\n").unwrap();
    capture.close_input();
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).unwrap();
    assert_eq!(line, "fresh\n");
    capture.stop();
}

fn original_streams_are_restored() {
    let before = [0, 1, 2].map(identity);
    let capture = start();
    let during = [0, 1, 2].map(identity);
    assert_ne!(before[1], during[1]);
    capture.stop();
    assert_eq!([0, 1, 2].map(identity), before);

    // Dropping without stopping restores too.
    let capture = start();
    drop(capture);
    assert_eq!([0, 1, 2].map(identity), before);
}

fn lease_follows_capture_lifetime() {
    assert!(!capture_active_on_this_thread());
    let capture = start();
    assert!(capture_active_on_this_thread());
    assert!(matches!(
        StreamCapture::start(CaptureConfig::new()),
        Err(CaptureError::Reentrant)
    ));
    capture.stop();
    assert!(!capture_active_on_this_thread());
}

fn concurrent_captures_are_isolated() {
    let barrier = Arc::new(Barrier::new(2));
    let workers: Vec<_> = ["left", "right"]
        .into_iter()
        .map(|tag| {
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                let capture = start();
                for i in 0..3 {
                    writeln!(io::stdout(), "{tag} {i}").unwrap();
                    std::thread::sleep(Duration::from_millis(5));
                }
                capture.stop()
            })
        })
        .collect();

    let results: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    assert_eq!(results[0].out_lines, ["left 0", "left 1", "left 2"]);
    assert_eq!(results[1].out_lines, ["right 0", "right 1", "right 2"]);
}

fn short_drain_timeout_still_returns() {
    let capture = StreamCapture::start(
        CaptureConfig::new().drain_timeout(Duration::from_millis(1)),
    )
    .expect("start");
    writeln!(io::stdout(), "quick").unwrap();
    // Whatever the drain managed to copy, stop must come back promptly.
    let captured = capture.stop();
    assert!(captured.out_lines.len() <= 1);
}

#[test]
fn capture_scenarios() {
    output_is_split_into_lines();
    custom_delimiters_split_output();
    error_lines_keep_blank_interior_lines();
    input_is_read_back_in_order();
    unread_input_does_not_leak_into_next_capture();
    input_after_close_is_rejected();
    input_beyond_pipe_capacity_arrives_in_full();
    stop_without_std_locks_while_another_thread_holds_them();
    original_streams_are_restored();
    lease_follows_capture_lifetime();
    concurrent_captures_are_isolated();
    short_drain_timeout_still_returns();
}
