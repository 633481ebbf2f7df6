use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use ephid_logging::ephid_warn;

use crate::{GenerateOptions, GenerationEvent, GenerationProgress, Generator, JobId, ProgressSink};

enum GenerationCommand {
    Generate {
        job_id: JobId,
        model_id: String,
        options: GenerateOptions,
    },
}

/// Runs generations on a background tokio runtime for synchronous callers.
///
/// Dropping the handle stops the worker and cancels unfinished jobs.
pub struct GenerationHandle {
    cmd_tx: mpsc::Sender<GenerationCommand>,
    event_rx: mpsc::Receiver<GenerationEvent>,
}

impl GenerationHandle {
    pub fn new(generator: Generator) -> io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let generator = Arc::new(generator);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let generator = generator.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(generator.as_ref(), command, event_tx).await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn enqueue(&self, job_id: JobId, model_id: impl Into<String>, options: GenerateOptions) {
        let sent = self.cmd_tx.send(GenerationCommand::Generate {
            job_id,
            model_id: model_id.into(),
            options,
        });
        if sent.is_err() {
            ephid_warn!("Generation worker is gone; dropping job {}", job_id);
        }
    }

    pub fn try_recv(&self) -> Option<GenerationEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<GenerationEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

struct ChannelProgressSink {
    job_id: JobId,
    tx: mpsc::Sender<GenerationEvent>,
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, progress: GenerationProgress) {
        let _ = self.tx.send(GenerationEvent::Progress {
            job_id: self.job_id,
            progress,
        });
    }
}

async fn handle_command(
    generator: &Generator,
    command: GenerationCommand,
    event_tx: mpsc::Sender<GenerationEvent>,
) {
    match command {
        GenerationCommand::Generate {
            job_id,
            model_id,
            options,
        } => {
            let sink = ChannelProgressSink {
                job_id,
                tx: event_tx.clone(),
            };
            let result = generator
                .generate_with_progress(&model_id, &options, &sink)
                .await;
            let _ = event_tx.send(GenerationEvent::Completed { job_id, result });
        }
    }
}
