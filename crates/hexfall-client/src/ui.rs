use hexfall_core::player::PlayerProfile;
use hexfall_core::session::{SessionState, Stage};
use hexfall_game::podium::{PodiumView, resolve_podium};

pub const WAITING_FOR_HOST: &str = "Waiting for the host to start the game...";

/// What the lobby overlay offers this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyPanel {
    StartButton,
    WaitingForHost,
}

impl LobbyPanel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StartButton => "Start",
            Self::WaitingForHost => WAITING_FOR_HOST,
        }
    }
}

/// Everything the overlay needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HudView {
    pub timer_label: Option<String>,
    /// The lobby dims the scene behind the overlay.
    pub dim_background: bool,
    pub lobby: Option<LobbyPanel>,
    pub audio_label: &'static str,
    /// Set while the winner stage is showing.
    pub podium: Option<PodiumView>,
}

impl HudView {
    pub fn build(
        state: &SessionState,
        is_host: bool,
        audio_enabled: bool,
        last_dead: Option<&PlayerProfile>,
    ) -> Self {
        let in_lobby = state.stage == Stage::Lobby;
        let lobby = in_lobby.then_some(if is_host {
            LobbyPanel::StartButton
        } else {
            LobbyPanel::WaitingForHost
        });
        let podium =
            (state.stage == Stage::Winner).then(|| resolve_podium(state, last_dead));
        Self {
            timer_label: (state.timer >= 0).then(|| state.timer.to_string()),
            dim_background: in_lobby,
            lobby,
            audio_label: if audio_enabled { "on" } else { "off" },
            podium,
        }
    }
}

#[cfg(test)]
mod tests {
    use hexfall_core::test_helpers::make_profiles;

    use super::*;

    #[test]
    fn lobby_shows_start_to_host_only() {
        let state = SessionState::default();
        let host = HudView::build(&state, true, false, None);
        assert_eq!(host.lobby, Some(LobbyPanel::StartButton));
        assert!(host.dim_background);
        assert_eq!(host.timer_label, None);
        assert_eq!(host.audio_label, "off");

        let guest = HudView::build(&state, false, true, None);
        assert_eq!(
            guest.lobby.map(|p| p.label()),
            Some("Waiting for the host to start the game...")
        );
        assert_eq!(guest.audio_label, "on");
    }

    #[test]
    fn timer_shown_from_zero() {
        let state = SessionState {
            stage: Stage::Game,
            timer: 0,
            ..Default::default()
        };
        let hud = HudView::build(&state, false, false, None);
        assert_eq!(hud.timer_label.as_deref(), Some("0"));
        assert!(hud.lobby.is_none());
        assert!(!hud.dim_background);
    }

    #[test]
    fn winner_stage_shows_podium() {
        let profiles = make_profiles(1);
        let state = SessionState {
            stage: Stage::Winner,
            timer: 5,
            ..Default::default()
        };
        let hud = HudView::build(&state, true, false, Some(&profiles[0]));
        assert_eq!(hud.podium, Some(PodiumView::LastStanding(profiles[0].clone())));
    }
}
