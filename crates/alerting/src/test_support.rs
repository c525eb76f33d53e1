//! Shared fakes for alert state machine tests

use crate::sink::{AlarmSound, AlertHandle, AlertRequest, AlertSink, PlaybackError};

/// Records every show/dismiss call
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub shown: Vec<AlertRequest>,
    pub dismissed: Vec<AlertHandle>,
    next_id: u64,
}

impl AlertSink for RecordingSink {
    fn show(&mut self, request: AlertRequest) -> AlertHandle {
        self.next_id += 1;
        self.shown.push(request);
        AlertHandle(self.next_id)
    }

    fn dismiss(&mut self, handle: AlertHandle) {
        self.dismissed.push(handle);
    }
}

/// Records playback transitions; optionally fails every play call
#[derive(Debug, Default)]
pub struct FakeSound {
    pub playing: bool,
    pub plays: u32,
    pub stops: u32,
    pub fail_playback: bool,
}

impl AlarmSound for FakeSound {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.plays += 1;
        if self.fail_playback {
            return Err(PlaybackError::Device("no audio output".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.playing = false;
    }
}
