use std::thread;

use crossbeam_channel::Receiver;

use crate::pipeline::Transcoder;
use crate::task::FileTask;

/// How the sorted file set is split across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// Worker `i` takes indices `i, i+k, i+2k, …`, fixed before any worker
    /// starts. Skewed file sizes leave some workers idle early.
    #[default]
    Strided,
    /// Workers pull from one queue filled in sorted order.
    Queue,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub workers: usize,
    pub schedule: Schedule,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            schedule: Schedule::default(),
        }
    }
}

/// What one worker did before it terminated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    /// Files attempted.
    pub files: usize,
    /// Files whose transcode returned an error.
    pub failures: usize,
    /// Decoded bytes across successful files.
    pub bytes: u64,
}

/// Collected worker reports for one dispatch.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub workers: Vec<WorkerReport>,
    /// Workers whose thread could not be spawned.
    pub spawn_failures: usize,
    /// Workers that panicked; their files count as neither done nor failed.
    pub panicked: usize,
    /// Files never attempted because their worker was not running.
    pub skipped_files: usize,
}

impl DispatchReport {
    pub fn files(&self) -> usize {
        self.workers.iter().map(|w| w.files).sum()
    }

    pub fn failures(&self) -> usize {
        self.workers.iter().map(|w| w.failures).sum()
    }

    pub fn bytes(&self) -> u64 {
        self.workers.iter().map(|w| w.bytes).sum()
    }

    /// True when every file was attempted and none failed.
    pub fn is_clean(&self) -> bool {
        self.failures() == 0 && self.panicked == 0 && self.skipped_files == 0 && self.spawn_failures == 0
    }
}

/// Split `items` into `workers` strided partitions: partition `i` holds the
/// items at indices `i, i+workers, i+2*workers, …`, in their original order.
///
/// Always returns exactly `workers` partitions; trailing ones may be empty.
pub fn partition<T>(items: Vec<T>, workers: usize) -> Vec<Vec<T>> {
    let workers = workers.max(1);
    let mut parts: Vec<Vec<T>> = (0..workers)
        .map(|_| Vec::with_capacity(items.len() / workers + 1))
        .collect();
    for (idx, item) in items.into_iter().enumerate() {
        parts[idx % workers].push(item);
    }
    parts
}

/// Run every task through `transcoder` on a bounded pool of worker threads and
/// return once all of them have terminated.
///
/// Per-file failures are logged by the worker that hit them and counted in
/// its report; they never stop other files or other workers.
pub fn dispatch(
    tasks: Vec<FileTask>,
    transcoder: &Transcoder,
    config: &DispatchConfig,
) -> anyhow::Result<DispatchReport> {
    if config.workers == 0 {
        anyhow::bail!("worker count must be at least 1");
    }
    tracing::info!(
        "dispatching {} files across {} workers ({:?} schedule)",
        tasks.len(),
        config.workers,
        config.schedule
    );

    let report = match config.schedule {
        Schedule::Strided => dispatch_strided(tasks, transcoder, config.workers),
        Schedule::Queue => dispatch_queue(tasks, transcoder, config.workers),
    };

    tracing::info!(
        "dispatch done: {} files, {} failed, {} bytes",
        report.files(),
        report.failures(),
        report.bytes()
    );
    Ok(report)
}

fn dispatch_strided(tasks: Vec<FileTask>, transcoder: &Transcoder, workers: usize) -> DispatchReport {
    let partitions = partition(tasks, workers);
    let mut report = DispatchReport::default();

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(partitions.len());
        for (worker, part) in partitions.into_iter().enumerate() {
            if part.is_empty() {
                continue;
            }
            let assigned = part.len();
            let spawned = thread::Builder::new()
                .name(format!("transpress-worker-{worker}"))
                .spawn_scoped(scope, move || run_worker(worker, part, transcoder));
            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(e) => {
                    tracing::error!("failed to spawn worker {}: {}; {} files skipped", worker, e, assigned);
                    report.spawn_failures += 1;
                    report.skipped_files += assigned;
                }
            }
        }

        for (worker, handle) in handles {
            match handle.join() {
                Ok(worker_report) => report.workers.push(worker_report),
                Err(_) => {
                    tracing::error!("worker {} panicked", worker);
                    report.panicked += 1;
                }
            }
        }
    });

    report
}

fn dispatch_queue(tasks: Vec<FileTask>, transcoder: &Transcoder, workers: usize) -> DispatchReport {
    let workers = workers.min(tasks.len());
    let (tx, rx) = crossbeam_channel::unbounded::<FileTask>();
    for task in tasks {
        // The receiver is held below, so the channel cannot be disconnected.
        let _ = tx.send(task);
    }
    drop(tx);

    let mut report = DispatchReport::default();

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let queue = rx.clone();
            let spawned = thread::Builder::new()
                .name(format!("transpress-worker-{worker}"))
                .spawn_scoped(scope, move || run_queue_worker(worker, queue, transcoder));
            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(e) => {
                    tracing::error!("failed to spawn worker {}: {}", worker, e);
                    report.spawn_failures += 1;
                }
            }
        }

        for (worker, handle) in handles {
            match handle.join() {
                Ok(worker_report) => report.workers.push(worker_report),
                Err(_) => {
                    tracing::error!("worker {} panicked", worker);
                    report.panicked += 1;
                }
            }
        }
    });

    report.skipped_files = rx.len();
    if report.skipped_files > 0 {
        tracing::error!("{} files left in the queue with no running worker", report.skipped_files);
    }
    report
}

fn run_worker(worker: usize, tasks: Vec<FileTask>, transcoder: &Transcoder) -> WorkerReport {
    let mut report = WorkerReport {
        worker,
        ..WorkerReport::default()
    };
    for task in &tasks {
        process(task, transcoder, &mut report);
    }
    report
}

fn run_queue_worker(worker: usize, queue: Receiver<FileTask>, transcoder: &Transcoder) -> WorkerReport {
    let mut report = WorkerReport {
        worker,
        ..WorkerReport::default()
    };
    for task in queue.iter() {
        process(&task, transcoder, &mut report);
    }
    report
}

fn process(task: &FileTask, transcoder: &Transcoder, report: &mut WorkerReport) {
    tracing::debug!(worker = report.worker, "transcoding {:?}", task.input);
    report.files += 1;
    match transcoder.transcode(task) {
        Ok(result) => report.bytes += result.bytes,
        Err(e) => {
            report.failures += 1;
            tracing::warn!(worker = report.worker, "{:?} failed: {:#}", task.input, e);
        }
    }
}
