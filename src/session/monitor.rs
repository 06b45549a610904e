// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Progress monitor.
//!
//! A background thread that, while the session is playing, periodically
//! reconciles the device position into the session and triggers auto-advance
//! when the track ends. The tick logic itself lives on the session, this
//! module only owns the thread and its cancellation.

use std::{
    io,
    sync::{
        Arc, Weak,
        atomic::{AtomicUsize, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::debug;

use super::Shared;

/// The owner's side of a running monitor.
pub(super) struct MonitorHandle {
    /// Never sent on, dropping it wakes and stops the monitor.
    cancel_tx: Sender<()>,
    thread: JoinHandle<()>,
}

impl MonitorHandle {
    /// Cancels the monitor and returns its thread for joining.
    pub(super) fn cancel(self) -> JoinHandle<()> {
        drop(self.cancel_tx);
        self.thread
    }
}

/// Keeps the active monitor count while a monitor thread is alive.
struct ActiveMonitor(Arc<AtomicUsize>);

impl ActiveMonitor {
    fn enter(count: &Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(count))
    }
}

impl Drop for ActiveMonitor {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Spawns a monitor bound to session `generation`.
///
/// The monitor only holds a weak reference to the session, so it never keeps
/// a dropped session alive.
pub(super) fn spawn(shared: &Arc<Shared>, generation: u64) -> io::Result<MonitorHandle> {
    let (cancel_tx, cancel_rx) = mpsc::channel();
    let session = Arc::downgrade(shared);
    let interval = shared.poll_interval;
    let active = ActiveMonitor::enter(&shared.active_monitors);

    let thread = thread::Builder::new()
        .name(format!("progress-monitor-{}", generation))
        .spawn(move || {
            let _active = active;
            run(session, generation, interval, cancel_rx);
        })?;

    Ok(MonitorHandle { cancel_tx, thread })
}

fn run(session: Weak<Shared>, generation: u64, interval: Duration, cancel_rx: Receiver<()>) {
    debug!("Progress monitor {} started", generation);

    loop {
        match cancel_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        let Some(shared) = session.upgrade() else {
            break;
        };

        let mut inner = shared.lock();
        if !inner.tick(&shared, generation) {
            break;
        }
    }

    debug!("Progress monitor {} stopped", generation);
}
