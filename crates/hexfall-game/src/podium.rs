use hexfall_core::player::PlayerProfile;
use hexfall_core::session::SessionState;

/// Who stands on the podium once a round ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodiumView {
    /// The last player standing.
    Champion(PlayerProfile),
    /// Nobody survived; the most recently eliminated player takes the spot.
    LastStanding(PlayerProfile),
    /// No winner and nobody was eliminated.
    Draw,
}

impl PodiumView {
    pub fn profile(&self) -> Option<&PlayerProfile> {
        match self {
            Self::Champion(p) | Self::LastStanding(p) => Some(p),
            Self::Draw => None,
        }
    }
}

pub fn resolve_podium(state: &SessionState, last_dead: Option<&PlayerProfile>) -> PodiumView {
    match (&state.winner, last_dead) {
        (Some(winner), _) => PodiumView::Champion(winner.clone()),
        (None, Some(profile)) => PodiumView::LastStanding(profile.clone()),
        (None, None) => PodiumView::Draw,
    }
}
