//! Browser entry point.
//!
//! The page owns rendering and rigid-body physics. Every animation frame it
//! hands the local body's state to [`WebClient::frame`], writes the returned
//! state back into its physics world, and redraws from the query methods.

use wasm_bindgen::prelude::*;

use hexfall_core::player::{PlayerColor, PlayerId, PlayerProfile};
use hexfall_core::session::Role;
use hexfall_core::tile::TileKey;
use hexfall_game::config::HexfallConfig;
use hexfall_game::movement::Joystick;

use crate::app::ClientApp;
use crate::audio::HtmlAudioSink;
use crate::controller::BodySnapshot;
use crate::invite::{
    BrowserClipboard, InviteShare, current_base_url, room_from_query, share_invite,
};
use crate::net_client::RoomSocket;

#[wasm_bindgen]
pub struct WebClient {
    app: ClientApp<RoomSocket, HtmlAudioSink>,
}

#[wasm_bindgen]
impl WebClient {
    #[wasm_bindgen(constructor)]
    pub fn new(relay_url: &str, local_id: u64, is_host: bool, seed: u64) -> Result<WebClient, JsValue> {
        let socket = RoomSocket::connect(relay_url).map_err(|e| JsValue::from_str(&e))?;
        let role = if is_host { Role::Host } else { Role::Observer };
        tracing::info!(local_id, ?role, relay_url, "Joining room");
        Ok(Self {
            app: ClientApp::new(
                local_id,
                role,
                HexfallConfig::default(),
                socket,
                HtmlAudioSink::new(),
                seed,
            ),
        })
    }

    /// Advance one frame. Returns the body state to write back, see
    /// [`BodySnapshot::to_floats`].
    pub fn frame(&mut self, dt: f32, linvel: &[f32], translation: &[f32], rotation: &[f32]) -> Vec<f32> {
        let mut body = BodySnapshot::from_slices(linvel, translation, rotation);
        let report = self.app.frame(dt, &mut body);
        if report.eliminated {
            tracing::info!("Local player eliminated");
        }
        body.to_floats()
    }

    pub fn player_joined(&mut self, id: PlayerId, name: String, color_index: usize) {
        let profile = PlayerProfile::new(name, PlayerColor::for_index(color_index));
        self.app.on_player_join(id, profile);
    }

    pub fn player_left(&mut self, id: PlayerId) {
        self.app.on_player_quit(id);
    }

    /// The relay elected a new host.
    pub fn set_host(&mut self, is_host: bool) {
        self.app
            .set_role(if is_host { Role::Host } else { Role::Observer });
    }

    pub fn key_down(&mut self, code: String) {
        self.app.input_mut().on_key_down(code);
    }

    pub fn key_up(&mut self, code: String) {
        self.app.input_mut().on_key_up(code);
    }

    pub fn joystick(&mut self, angle: f32, pressed: bool, jump: bool) {
        self.app.input_mut().on_joystick(Joystick {
            angle,
            pressed,
            jump,
        });
    }

    /// Collision-enter between the local body and the tile `"<floor>-<row>-<column>"`.
    pub fn tile_contact(&mut self, key: &str) {
        match key.parse::<TileKey>() {
            Ok(key) => self.app.on_tile_contact(key),
            Err(e) => tracing::debug!(key, error = %e, "Ignoring contact with unknown body"),
        }
    }

    pub fn tile_opacity(&self, key: &str) -> f32 {
        key.parse::<TileKey>()
            .ok()
            .and_then(|key| self.app.tiles().opacity(key))
            .unwrap_or(1.0)
    }

    pub fn tile_disabled(&self, key: &str) -> bool {
        key.parse::<TileKey>()
            .is_ok_and(|key| self.app.tiles().is_disabled(key))
    }

    pub fn start_game(&mut self) -> Result<(), JsValue> {
        self.app
            .start_game()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn toggle_audio(&mut self) {
        self.app.toggle_audio();
    }

    pub fn stage(&self) -> String {
        self.app.session().stage().to_string()
    }

    pub fn timer_label(&self) -> Option<String> {
        self.app.hud().timer_label
    }

    pub fn lobby_label(&self) -> Option<String> {
        self.app.hud().lobby.map(|panel| panel.label().to_string())
    }

    pub fn dim_background(&self) -> bool {
        self.app.hud().dim_background
    }

    pub fn audio_label(&self) -> String {
        self.app.hud().audio_label.to_string()
    }

    /// Name on the podium while the winner stage shows, if anyone stands on it.
    pub fn podium_name(&self) -> Option<String> {
        self.app
            .hud()
            .podium
            .and_then(|podium| podium.profile().map(|p| p.name.clone()))
    }

    /// Position (xyz) followed by rotation (xyzw).
    pub fn player_pose(&self, id: PlayerId) -> Option<Vec<f32>> {
        self.app.render_transform(id).map(|pose| {
            let mut out = pose.position.to_array().to_vec();
            out.extend_from_slice(&pose.rotation.to_array());
            out
        })
    }

    pub fn player_animation(&self, id: PlayerId) -> Option<String> {
        self.app
            .render_transform(id)
            .map(|pose| pose.animation.clip_name().to_string())
    }
}

/// Outcome of [`copy_invite`].
#[wasm_bindgen]
pub struct SharedInvite {
    link: String,
    copied: bool,
}

#[wasm_bindgen]
impl SharedInvite {
    #[wasm_bindgen(getter)]
    pub fn link(&self) -> String {
        self.link.clone()
    }

    /// False when the page must show the link for manual copying.
    #[wasm_bindgen(getter)]
    pub fn copied(&self) -> bool {
        self.copied
    }
}

/// Copy the invite link for `room_code` to the clipboard.
#[wasm_bindgen]
pub async fn copy_invite(room_code: String) -> SharedInvite {
    let base = current_base_url().unwrap_or_default();
    let share = share_invite(&mut BrowserClipboard, &base, &room_code).await;
    SharedInvite {
        link: share.link().to_string(),
        copied: matches!(share, InviteShare::Copied(_)),
    }
}

/// Room code from the page's `?room=` query, if it is well formed.
#[wasm_bindgen]
pub fn room_code_from_page() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    room_from_query(&search)
}
