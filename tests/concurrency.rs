//! Many threads writing through handlers derived from one root.

use std::thread;

use pretty_log_sink::sink::MemoryWriter;
use pretty_log_sink::{attrs, Handler, HandlerOptions, Level, Record};

const WORKERS: usize = 8;
const RECORDS: usize = 200;

#[test]
fn records_never_interleave() {
    let out = MemoryWriter::new();
    let root = Handler::new(out.clone(), HandlerOptions::default().with_no_color(true));

    let threads: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let handler = root.with_group("worker").with_attrs(attrs!["id" => worker]);
            thread::spawn(move || {
                for seq in 0..RECORDS {
                    let record = Record::new(Level::Info, format!("tick {worker}"))
                        .with_attrs(attrs!["seq" => seq]);
                    handler.handle(&record).unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    let text = out.contents();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), WORKERS * RECORDS * 4);

    let mut seen = vec![0usize; WORKERS];
    for record in lines.chunks(4) {
        let worker: usize = record[0]
            .strip_prefix("INFO: tick ")
            .and_then(|w| w.parse().ok())
            .unwrap_or_else(|| panic!("torn record: {record:?}"));
        assert_eq!(record[1], "  worker:");
        assert_eq!(record[2], format!("    seq: {}", seen[worker]));
        assert_eq!(record[3], format!("    id: {worker}"));
        seen[worker] += 1;
    }
    assert!(seen.iter().all(|&n| n == RECORDS));
}

#[test]
fn derived_handlers_are_independent_across_threads() {
    let out = MemoryWriter::new();
    let root = Handler::new(out.clone(), HandlerOptions::default().with_no_color(true))
        .with_attrs(attrs!["app" => "demo"]);

    let children: Vec<Handler> = thread::scope(|s| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|i| {
                let root = &root;
                s.spawn(move || root.with_group("child").with_attrs(attrs!["n" => i]))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    root.handle(&Record::new(Level::Info, "root")).unwrap();
    assert_eq!(out.take(), b"INFO: root\n  app: demo\n".to_vec());

    children[3].handle(&Record::new(Level::Info, "child")).unwrap();
    assert_eq!(
        out.contents(),
        "INFO: child\n  child:\n    n: 3\n  app: demo\n"
    );
}
