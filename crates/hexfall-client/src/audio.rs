use std::time::Duration;

/// Sound effects the game can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Dead,
    Jump,
    TileHit,
}

impl SoundCue {
    /// Asset name, resolved as `/audios/<name>.mp3`.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Dead => "Dead",
            Self::Jump => "Jump",
            Self::TileHit => "TileHit",
        }
    }

    pub fn asset_path(&self) -> String {
        format!("/audios/{}.mp3", self.file_name())
    }
}

pub const BACKGROUND_MUSIC: &str = "/audios/bg.mp3";

/// Minimum spacing between two non-forced cues.
pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// Whatever actually makes noise.
pub trait AudioSink {
    fn play_cue(&mut self, cue: SoundCue);
    fn start_music(&mut self);
    fn pause_music(&mut self);
}

/// Sink for headless runs.
#[derive(Debug, Default)]
pub struct NullAudioSink;

impl AudioSink for NullAudioSink {
    fn play_cue(&mut self, _cue: SoundCue) {}
    fn start_music(&mut self) {}
    fn pause_music(&mut self) {}
}

/// Browser sink using `HTMLAudioElement`s.
#[cfg(target_family = "wasm")]
pub struct HtmlAudioSink {
    music: Option<web_sys::HtmlAudioElement>,
}

#[cfg(target_family = "wasm")]
impl HtmlAudioSink {
    pub fn new() -> Self {
        let music = web_sys::HtmlAudioElement::new_with_src(BACKGROUND_MUSIC).ok();
        if let Some(music) = &music {
            music.set_loop(true);
        }
        Self { music }
    }
}

#[cfg(target_family = "wasm")]
impl Default for HtmlAudioSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_family = "wasm")]
impl AudioSink for HtmlAudioSink {
    fn play_cue(&mut self, cue: SoundCue) {
        match web_sys::HtmlAudioElement::new_with_src(&cue.asset_path()) {
            Ok(audio) => {
                let _ = audio.play();
            },
            Err(e) => tracing::warn!(cue = ?cue, error = ?e, "Failed to create audio element"),
        }
    }

    fn start_music(&mut self) {
        if let Some(music) = &self.music {
            music.set_loop(true);
            let _ = music.play();
        }
    }

    fn pause_music(&mut self) {
        if let Some(music) = &self.music {
            let _ = music.pause();
        }
    }
}

/// Rate-limited front door to an [`AudioSink`]. Starts muted.
pub struct AudioGate<S: AudioSink> {
    sink: S,
    enabled: bool,
    last_played: Option<Duration>,
}

impl<S: AudioSink> AudioGate<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            enabled: false,
            last_played: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Background music follows the toggle.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.sink.start_music();
        } else {
            self.sink.pause_music();
        }
        tracing::debug!(enabled, "Audio toggled");
    }

    pub fn toggle(&mut self) {
        self.set_enabled(!self.enabled);
    }

    /// Request a cue at time `now`. Returns true if it was played.
    ///
    /// Non-forced cues within [`DEBOUNCE`] of the last play are dropped;
    /// forced cues always play and restart the debounce window.
    pub fn play(&mut self, cue: SoundCue, forced: bool, now: Duration) -> bool {
        if !self.enabled {
            return false;
        }
        if !forced
            && let Some(last) = self.last_played
            && now.saturating_sub(last) < DEBOUNCE
        {
            return false;
        }
        self.last_played = Some(now);
        self.sink.play_cue(cue);
        true
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        cues: Vec<SoundCue>,
        music_playing: bool,
    }

    impl AudioSink for RecordingSink {
        fn play_cue(&mut self, cue: SoundCue) {
            self.cues.push(cue);
        }
        fn start_music(&mut self) {
            self.music_playing = true;
        }
        fn pause_music(&mut self) {
            self.music_playing = false;
        }
    }

    fn enabled_gate() -> AudioGate<RecordingSink> {
        let mut gate = AudioGate::new(RecordingSink::default());
        gate.set_enabled(true);
        gate
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn starts_disabled_and_silent() {
        let mut gate = AudioGate::new(RecordingSink::default());
        assert!(!gate.is_enabled());
        assert!(!gate.play(SoundCue::Dead, true, ms(0)));
        assert!(gate.sink().cues.is_empty());
    }

    #[test]
    fn two_requests_50ms_apart_play_once() {
        let mut gate = enabled_gate();
        assert!(gate.play(SoundCue::TileHit, false, ms(1000)));
        assert!(!gate.play(SoundCue::TileHit, false, ms(1050)));
        assert_eq!(gate.sink().cues.len(), 1);
    }

    #[test]
    fn two_requests_150ms_apart_play_twice() {
        let mut gate = enabled_gate();
        gate.play(SoundCue::Jump, false, ms(1000));
        gate.play(SoundCue::Jump, false, ms(1150));
        assert_eq!(gate.sink().cues.len(), 2);
    }

    #[test]
    fn forced_always_plays_and_resets_the_window() {
        let mut gate = enabled_gate();
        gate.play(SoundCue::TileHit, false, ms(1000));
        assert!(gate.play(SoundCue::Dead, true, ms(1010)));
        assert!(!gate.play(SoundCue::TileHit, false, ms(1080)));
        assert!(gate.play(SoundCue::TileHit, false, ms(1111)));
        assert_eq!(
            gate.sink().cues,
            vec![SoundCue::TileHit, SoundCue::Dead, SoundCue::TileHit]
        );
    }

    #[test]
    fn music_follows_toggle() {
        let mut gate = AudioGate::new(RecordingSink::default());
        gate.toggle();
        assert!(gate.sink().music_playing);
        gate.toggle();
        assert!(!gate.sink().music_playing);
    }

    #[test]
    fn cue_asset_paths() {
        assert_eq!(SoundCue::Dead.asset_path(), "/audios/Dead.mp3");
    }
}
