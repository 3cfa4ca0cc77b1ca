// Orchestrator
//
// Normalize once, diarize once, then fan the turns out to a bounded worker
// pool. Each worker transcribes a turn and classifies the transcript when it
// is non-empty. Results are index-tagged so the output order always matches
// the diarizer's turn order, whatever the worker count. The first stage error
// aborts the run with no partial results.

pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::mpsc;
use tokio::sync::Mutex;

pub use types::AnalysisRecord;

use crate::audio;
use crate::config::{EmptyTranscriptPolicy, PipelineConfig};
use crate::diarization::{Diarize, PyannoteDiarizer, Turn};
use crate::error::{PipelineError, PipelineResult};
use crate::sentiment::{self, Classify};
use crate::transcription::{RemoteRecognizer, TimeWindow, Transcribe};

pub struct Pipeline {
    config: PipelineConfig,
    diarizer: Arc<dyn Diarize>,
    transcriber: Arc<dyn Transcribe>,
    classifier: Arc<dyn Classify>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        diarizer: Arc<dyn Diarize>,
        transcriber: Arc<dyn Transcribe>,
        classifier: Arc<dyn Classify>,
    ) -> Self {
        Self {
            config,
            diarizer,
            transcriber,
            classifier,
        }
    }

    /// Wire up the production stages: pyannote diarizer, remote recognizer and
    /// the shared ONNX sentiment classifier (models are fetched/loaded here,
    /// once per process).
    pub async fn from_config(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;

        let diarizer = Arc::new(PyannoteDiarizer::new(config.diarization.clone()));
        let transcriber = Arc::new(RemoteRecognizer::new(&config.recognition)?);
        let classifier = sentiment::get_or_init_classifier(&config.sentiment).await?;

        Ok(Self::new(config, diarizer, transcriber, classifier))
    }

    /// Full pipeline: raw audio file in, ordered analysis records out.
    pub async fn run(&self, input: &Path) -> PipelineResult<Vec<AnalysisRecord>> {
        let canonical = audio::normalize_audio(input, &self.config.audio)?;
        self.run_normalized(&canonical).await
    }

    /// Diarize an already-normalized file and analyze its turns.
    pub async fn run_normalized(&self, canonical: &Path) -> PipelineResult<Vec<AnalysisRecord>> {
        let turns = self.diarizer.diarize(canonical).await?;
        info!("Diarizer produced {} turns", turns.len());
        self.analyze_turns(canonical, turns).await
    }

    /// Analyze diarized turns with the bounded worker pool.
    pub async fn analyze_turns(
        &self,
        canonical: &Path,
        turns: Vec<Turn>,
    ) -> PipelineResult<Vec<AnalysisRecord>> {
        if turns.is_empty() {
            return Ok(Vec::new());
        }

        let total = turns.len();
        let worker_count = self.config.orchestrator.worker_count.max(1).min(total);
        let policy = self.config.orchestrator.empty_transcript_policy;
        info!(
            "Analyzing {} turns with {} worker{}",
            total,
            worker_count,
            if worker_count == 1 { "" } else { "s" }
        );

        let (work_tx, work_rx) = mpsc::unbounded_channel::<(usize, Turn)>();
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (result_tx, mut result_rx) =
            mpsc::unbounded_channel::<(usize, PipelineResult<Option<AnalysisRecord>>)>();

        for job in turns.into_iter().enumerate() {
            // receiver lives until the workers finish, send cannot fail here
            let _ = work_tx.send(job);
        }
        drop(work_tx);

        let mut worker_handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let canonical = canonical.to_path_buf();
            let transcriber = self.transcriber.clone();
            let classifier = self.classifier.clone();
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();

            worker_handles.push(tokio::spawn(async move {
                worker_loop(
                    worker_id,
                    canonical,
                    transcriber,
                    classifier,
                    policy,
                    work_rx,
                    result_tx,
                )
                .await;
            }));
        }
        drop(result_tx);

        let mut slots: Vec<Option<PipelineResult<Option<AnalysisRecord>>>> =
            (0..total).map(|_| None).collect();
        while let Some((idx, outcome)) = result_rx.recv().await {
            slots[idx] = Some(outcome);
        }

        for (worker_id, handle) in worker_handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                return Err(PipelineError::Io(std::io::Error::other(format!(
                    "worker {} failed: {}",
                    worker_id, e
                ))));
            }
        }

        // first error in turn order wins; success collects in turn order
        let mut records = Vec::new();
        for (idx, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(Some(record))) => records.push(record),
                Some(Ok(None)) => {}
                Some(Err(e)) => return Err(e),
                None => {
                    return Err(PipelineError::Io(std::io::Error::other(format!(
                        "missing result for turn {}",
                        idx
                    ))))
                }
            }
        }

        info!("Analysis complete: {} records from {} turns", records.len(), total);
        Ok(records)
    }
}

async fn worker_loop(
    worker_id: usize,
    canonical: PathBuf,
    transcriber: Arc<dyn Transcribe>,
    classifier: Arc<dyn Classify>,
    policy: EmptyTranscriptPolicy,
    work_rx: Arc<Mutex<mpsc::UnboundedReceiver<(usize, Turn)>>>,
    result_tx: mpsc::UnboundedSender<(usize, PipelineResult<Option<AnalysisRecord>>)>,
) {
    loop {
        let job = {
            let mut rx = work_rx.lock().await;
            rx.recv().await
        };
        let Some((idx, turn)) = job else {
            debug!("Worker {} finished", worker_id);
            break;
        };

        debug!(
            "Worker {} processing turn {} ({:.2}s-{:.2}s, {})",
            worker_id, idx, turn.start_time, turn.end_time, turn.speaker_label
        );
        let outcome =
            analyze_turn(&canonical, &transcriber, &classifier, policy, &turn).await;

        if result_tx.send((idx, outcome)).is_err() {
            break;
        }
    }
}

async fn analyze_turn(
    canonical: &Path,
    transcriber: &Arc<dyn Transcribe>,
    classifier: &Arc<dyn Classify>,
    policy: EmptyTranscriptPolicy,
    turn: &Turn,
) -> PipelineResult<Option<AnalysisRecord>> {
    let window = TimeWindow::new(turn.start_time, turn.end_time);
    let text = transcriber.transcribe(canonical, window).await?;

    if text.is_empty() {
        return Ok(match policy {
            EmptyTranscriptPolicy::Drop => {
                debug!(
                    "Dropping turn {:.2}s-{:.2}s ({}): empty transcript",
                    turn.start_time, turn.end_time, turn.speaker_label
                );
                None
            }
            EmptyTranscriptPolicy::EmitEmpty => Some(AnalysisRecord {
                start_time: turn.start_time,
                end_time: turn.end_time,
                speaker: turn.speaker_label.clone(),
                transcription: String::new(),
                sentiment: Vec::new(),
            }),
        });
    }

    let sentiment = classifier.classify(&text)?;
    Ok(Some(AnalysisRecord {
        start_time: turn.start_time,
        end_time: turn.end_time,
        speaker: turn.speaker_label.clone(),
        transcription: text,
        sentiment,
    }))
}
