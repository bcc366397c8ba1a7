//! Background loading of point clouds
//!
//! A load reads and builds on a worker thread, then posts the finished cloud
//! over a channel. The render thread drains the channel between frames.
//!
//! Every request is stamped with an increasing id. Loads finish in any order,
//! but a result older than one already handed out is discarded, so the most
//! recent request always wins.

use binviz_core::{ByteCloud, Result};
use binviz_io::{load_point_cloud, ReadMode};
use flume::{Receiver, Sender};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread;

/// Outcome of one background load
#[derive(Debug)]
pub struct LoadResult {
    /// Id of the request that produced this result
    pub id: u64,
    pub path: PathBuf,
    pub cloud: Result<ByteCloud>,
}

/// Spawns load jobs and collects their results
pub struct BackgroundLoader {
    read_mode: ReadMode,
    tx: Sender<LoadResult>,
    rx: Receiver<LoadResult>,
    next_id: u64,
    in_flight: HashSet<u64>,
    last_request: Option<(u64, PathBuf)>,
    newest_delivered: Option<u64>,
}

impl BackgroundLoader {
    pub fn new(read_mode: ReadMode) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            read_mode,
            tx,
            rx,
            next_id: 0,
            in_flight: HashSet::new(),
            last_request: None,
            newest_delivered: None,
        }
    }

    /// Number of loads started but not yet collected
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Start loading `path` on a worker thread and return the request id.
    ///
    /// If the latest request is for the same path and still running, no new
    /// load is started and its id is returned.
    pub fn request(&mut self, path: impl AsRef<Path>) -> u64 {
        let path = path.as_ref().to_path_buf();

        if let Some((id, last_path)) = &self.last_request {
            if *last_path == path && self.in_flight.contains(id) {
                log::debug!("{} is already loading", path.display());
                return *id;
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        let read_mode = self.read_mode;
        let tx = self.tx.clone();
        let job_path = path.clone();

        log::info!("Loading {}", path.display());

        let spawned = thread::Builder::new()
            .name("binviz-loader".to_string())
            .spawn(move || {
                let cloud = load_point_cloud(&job_path, read_mode);
                // The receiver only goes away when the viewer is shutting down.
                let _ = tx.send(LoadResult {
                    id,
                    path: job_path,
                    cloud,
                });
            });

        match spawned {
            Ok(_) => {
                self.in_flight.insert(id);
                self.last_request = Some((id, path));
            }
            Err(e) => log::error!("Failed to start loader thread: {}", e),
        }
        id
    }

    /// Next finished load, if any, without blocking
    pub fn try_next(&mut self) -> Option<LoadResult> {
        while let Ok(result) = self.rx.try_recv() {
            if let Some(result) = self.accept(result) {
                return Some(result);
            }
        }
        None
    }

    /// Block until the next load finishes. Returns `None` when nothing is
    /// pending.
    pub fn wait_next(&mut self) -> Option<LoadResult> {
        while !self.in_flight.is_empty() {
            let result = self.rx.recv().ok()?;
            if let Some(result) = self.accept(result) {
                return Some(result);
            }
        }
        None
    }

    /// Retire `result`, keeping it only if nothing newer was delivered
    fn accept(&mut self, result: LoadResult) -> Option<LoadResult> {
        self.in_flight.remove(&result.id);

        if matches!(self.newest_delivered, Some(newest) if result.id < newest) {
            log::debug!("Discarding superseded load of {}", result.path.display());
            return None;
        }
        self.newest_delivered = Some(result.id);
        Some(result)
    }
}
