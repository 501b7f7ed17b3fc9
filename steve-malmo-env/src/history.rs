//! Returns of completed episodes, kept across resets.
use chrono::Local;
use log::info;
use std::sync::{Arc, Mutex};
use steve_core::record::{NullRecorder, Record, RecordValue, Recorder};

/// A history shared by the environments of a process.
pub type SharedHistory = Arc<Mutex<EpisodeHistory>>;

/// Append-only log of `(cumulative steps, return)` of completed episodes.
///
/// Every `log_frequency` episodes, once more than `log_frequency + 1` episodes
/// are logged, the whole history is written to the attached recorder as
/// `steps` and `returns` arrays. Without a recorder, records are dropped.
pub struct EpisodeHistory {
    steps: Vec<usize>,
    returns: Vec<f32>,
    log_frequency: usize,
    recorder: Box<dyn Recorder + Send>,
}

impl EpisodeHistory {
    /// Creates an empty history.
    pub fn new(log_frequency: usize) -> Self {
        Self {
            steps: vec![],
            returns: vec![],
            log_frequency,
            recorder: Box::new(NullRecorder::default()),
        }
    }

    /// Attaches the recorder receiving the history.
    pub fn with_recorder(mut self, recorder: impl Recorder + Send + 'static) -> Self {
        self.recorder = Box::new(recorder);
        self
    }

    /// Wraps the history for sharing.
    pub fn shared(self) -> SharedHistory {
        Arc::new(Mutex::new(self))
    }

    /// Appends a completed episode.
    pub fn push(&mut self, episode_steps: usize, episode_return: f32) {
        let total = self.steps.last().copied().unwrap_or(0) + episode_steps;
        self.steps.push(total);
        self.returns.push(episode_return);

        let n = self.returns.len();
        if n > self.log_frequency + 1 && n % self.log_frequency == 0 {
            self.flush();
        }
    }

    /// The number of logged episodes.
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Returns `true` if no episode is logged.
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Cumulative steps at the end of each episode.
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// Return of each episode.
    pub fn returns(&self) -> &[f32] {
        &self.returns
    }

    /// The history as a record, stamped with the current time.
    pub fn to_record(&self) -> Record {
        Record::from_slice(&[
            ("datetime", RecordValue::DateTime(Local::now())),
            (
                "steps",
                RecordValue::Array1(self.steps.iter().map(|&s| s as f32).collect()),
            ),
            ("returns", RecordValue::Array1(self.returns.clone())),
        ])
    }

    fn flush(&mut self) {
        info!("Writing returns of {} episodes", self.returns.len());
        let record = self.to_record();
        self.recorder.write(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{unbounded, Sender};

    struct ChannelRecorder(Sender<Record>);

    impl Recorder for ChannelRecorder {
        fn write(&mut self, record: Record) {
            self.0.send(record).unwrap();
        }
    }

    #[test]
    fn test_cumulative_steps() {
        let mut history = EpisodeHistory::new(10);
        history.push(5, 1.0);
        history.push(7, 2.5);
        assert_eq!(history.steps(), &[5, 12]);
        assert_eq!(history.returns(), &[1.0, 2.5]);
    }

    #[test]
    fn test_flush_schedule() {
        let (s, r) = unbounded();
        let mut history = EpisodeHistory::new(3).with_recorder(ChannelRecorder(s));

        let mut flushed_at = vec![];
        for i in 1..=12 {
            history.push(1, i as f32);
            if let Ok(record) = r.try_recv() {
                assert_eq!(record.get_array1("returns").unwrap().len(), i);
                assert!(matches!(record.get("datetime"), Some(RecordValue::DateTime(_))));
                flushed_at.push(i);
            }
        }
        assert_eq!(flushed_at, vec![6, 9, 12]);
    }
}
