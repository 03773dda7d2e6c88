use std::io;
use std::thread;
use std::time::Instant;

use pretty_log_sink::{attrs, Handler, HandlerOptions, Level, Record};

fn main() {
    let handler = Handler::new(io::sink(), HandlerOptions::default())
        .with_attrs(attrs!["service" => "load"])
        .with_group("worker");

    let threads: u64 = 8;
    let per_thread: u64 = 100_000;
    let start = Instant::now();

    let workers: Vec<_> = (0..threads)
        .map(|id| {
            let handler = handler.with_attrs(attrs!["id" => id]);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let record = Record::now(Level::Info, "load test record")
                        .with_attrs(attrs!["iteration" => i, "payload" => "some text"]);
                    if let Err(e) = handler.handle(&record) {
                        eprintln!("write failed: {}", e);
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        let _ = worker.join();
    }

    let n = threads * per_thread;
    let elapsed = start.elapsed();
    println!("rendered {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
