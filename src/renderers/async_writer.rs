//! Queued line writer backed by a worker thread
//!
//! Callers only pay for a channel send; the worker batches lines and writes
//! them to the inner writer. A full queue is reported as an error so the
//! handler's side channel sees every dropped line. Write and flush failures
//! on the worker go to the writer's own [`ErrorLog`].

use super::sync_writer::LineSink;
use crate::core::{stderr_error_log, ErrorLog, LoggerError, Result};
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::Mutex;
use std::io::Write;
use std::thread;
use std::time::Duration;

const BATCH_SIZE: usize = 50;
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

enum Command {
    Line(Vec<u8>),
    Flush(Sender<()>),
}

pub struct AsyncWriter {
    sender: Option<Sender<Command>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    capacity: usize,
}

impl AsyncWriter {
    /// Spawn a worker writing to `inner` with room for `capacity` queued lines
    pub fn new<W>(inner: W, capacity: usize) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::with_error_log(inner, capacity, stderr_error_log())
    }

    /// Like [`AsyncWriter::new`], reporting worker-side IO failures to `error_log`
    pub fn with_error_log<W>(inner: W, capacity: usize, error_log: ErrorLog) -> Self
    where
        W: Write + Send + 'static,
    {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded::<Command>(capacity);

        let handle = thread::spawn(move || {
            let mut writer = inner;
            let mut batch: Vec<u8> = Vec::with_capacity(BATCH_SIZE * 128);
            let mut pending_flushes: Vec<Sender<()>> = Vec::new();

            // Block for the first command, then drain without blocking up to
            // BATCH_SIZE before touching the writer.
            while let Ok(first) = receiver.recv() {
                let mut commands = vec![first];
                while commands.len() < BATCH_SIZE {
                    match receiver.try_recv() {
                        Ok(command) => commands.push(command),
                        Err(_) => break,
                    }
                }

                for command in commands {
                    match command {
                        Command::Line(line) => batch.extend_from_slice(&line),
                        Command::Flush(ack) => pending_flushes.push(ack),
                    }
                }

                if !batch.is_empty() {
                    if let Err(e) = writer.write_all(&batch) {
                        error_log(&LoggerError::from(e));
                    }
                    batch.clear();
                }
                if !pending_flushes.is_empty() {
                    if let Err(e) = writer.flush() {
                        error_log(&LoggerError::from(e));
                    }
                    for ack in pending_flushes.drain(..) {
                        let _ = ack.send(());
                    }
                }
            }

            if let Err(e) = writer.flush() {
                error_log(&LoggerError::from(e));
            }
        });

        Self {
            sender: Some(sender),
            handle: Mutex::new(Some(handle)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn sender(&self) -> Result<&Sender<Command>> {
        self.sender.as_ref().ok_or(LoggerError::WriterClosed)
    }
}

impl LineSink for AsyncWriter {
    fn write_line(&self, line: &[u8]) -> Result<()> {
        match self.sender()?.try_send(Command::Line(line.to_vec())) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(LoggerError::queue_full(self.capacity)),
            Err(TrySendError::Disconnected(_)) => Err(LoggerError::WriterClosed),
        }
    }

    /// Wait until every line queued before this call has been written
    fn flush(&self) -> Result<()> {
        let (ack, done) = bounded(1);
        self.sender()?
            .send(Command::Flush(ack))
            .map_err(|_| LoggerError::WriterClosed)?;
        done.recv_timeout(FLUSH_TIMEOUT)
            .map_err(|_| LoggerError::other("Timed out waiting for async writer flush"))
    }
}

impl Drop for AsyncWriter {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit
        self.sender.take();
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}
