//! Integration tests for the progress module public API.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;

use compose_core::progress::{
    new_writer, run, run_with_writer, CancellationToken, Event, EventStatus, JsonMessage, Mode,
    RenderConfig, TtyWriter, Writer,
};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn working_then_done_freezes_timer() {
    let writer = TtyWriter::new(
        Box::new(io::sink()),
        RenderConfig::new(Mode::Tty).with_color(false),
    );
    writer.event(Event::new("svc", EventStatus::Working, ""));
    writer.event(Event::new("svc", EventStatus::Done, ""));

    let svc = writer.snapshot("svc").unwrap();
    assert!(svc.end_time().is_some());
    assert!(svc.spinner().is_stopped());
}

#[test]
fn progress_counters_keep_maximum() {
    let writer = TtyWriter::new(
        Box::new(io::sink()),
        RenderConfig::new(Mode::Tty).with_color(false),
    );
    let steps = [(10, 100), (60, 100), (30, 90), (80, 100)];
    let mut max_current = 0;
    for (current, total) in steps {
        writer.event(
            Event::new("layer", EventStatus::Working, "Downloading").with_progress(current, total),
        );
        max_current = max_current.max(current);
        let layer = writer.snapshot("layer").unwrap();
        assert_eq!(layer.current, max_current);
        assert_eq!(layer.total, 100);
    }
    assert_eq!(writer.snapshot("layer").unwrap().percent, 80);
}

#[test]
fn concurrent_producers_render_every_task_once() {
    let buffer = SharedBuffer::default();
    let writer = TtyWriter::new(
        Box::new(buffer.clone()),
        RenderConfig::new(Mode::Tty).with_color(false),
    )
    .with_size(64, 100);

    thread::scope(|s| {
        for i in 0..32 {
            let writer = &writer;
            s.spawn(move || {
                writer.event(Event::creating(format!("svc-{i:02}")));
                writer.event(Event::created(format!("svc-{i:02}")));
            });
        }
    });
    writer.render();

    let out = buffer.contents();
    for i in 0..32 {
        assert_eq!(out.matches(&format!("svc-{i:02} ")).count(), 1, "svc-{i:02}");
    }
    assert!(out.contains("[+] Running 32/32"));
}

#[test]
fn json_stream_is_line_delimited() {
    let buffer = SharedBuffer::default();
    let config = RenderConfig::new(Mode::Json);
    run(&config, Box::new(buffer.clone()), false, |w| {
        w.events(vec![Event::waiting("db"), Event::healthy("db")]);
        w.tail_msgf(format_args!("{} service(s) ready", 1));
        Ok(())
    })
    .unwrap();

    let lines: Vec<JsonMessage> = buffer
        .contents()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1].id, "db");
    assert_eq!(lines[1].status, "Healthy");
    assert!(lines[2].tail);
    assert_eq!(lines[2].text, "1 service(s) ready");
}

#[test]
fn plain_mode_on_non_terminal() {
    let buffer = SharedBuffer::default();
    let writer = new_writer(&RenderConfig::new(Mode::Auto), Box::new(buffer.clone()), false);
    writer.event(Event::stopped("web"));
    assert_eq!(buffer.contents(), "web Stopped\n");
}

#[test]
fn operation_error_is_returned_unchanged() {
    let config = RenderConfig::new(Mode::Plain);
    let result: compose_core::Result<()> = run(&config, Box::new(io::sink()), false, |w| {
        w.event(Event::error_message("web", "exited with code 1"));
        Err(compose_core::ComposeError::Cancelled)
    });
    assert!(matches!(result, Err(compose_core::ComposeError::Cancelled)));
}

#[test]
fn external_cancellation_stops_renderer() {
    let buffer = SharedBuffer::default();
    let writer = TtyWriter::new(
        Box::new(buffer.clone()),
        RenderConfig::new(Mode::Tty).with_color(false),
    )
    .with_size(24, 80);
    let token = CancellationToken::new();

    let value = run_with_writer(&writer, &token, |w| {
        w.event(Event::killing("web"));
        token.cancel();
        Ok("done")
    })
    .unwrap();

    assert_eq!(value, "done");
    assert!(token.is_cancelled());
    assert!(buffer.contents().contains("Killing"));
}
