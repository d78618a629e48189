use hexfall_core::room::is_valid_room_code;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    Unavailable,
    Rejected(String),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "clipboard unavailable"),
            Self::Rejected(reason) => write!(f, "clipboard write rejected: {reason}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Settles once the platform accepted or refused the write.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> impl Future<Output = Result<(), ClipboardError>>;
}

/// The system clipboard in a browser.
#[cfg(target_family = "wasm")]
#[derive(Debug, Default)]
pub struct BrowserClipboard;

#[cfg(target_family = "wasm")]
impl Clipboard for BrowserClipboard {
    async fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let window = web_sys::window().ok_or(ClipboardError::Unavailable)?;
        let promise = window.navigator().clipboard().write_text(text);
        wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|e| ClipboardError::Rejected(format!("{e:?}")))
    }
}

/// How an invite reached the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteShare {
    Copied(String),
    /// Clipboard failed; show the link for manual copy.
    Manual(String),
}

impl InviteShare {
    pub fn link(&self) -> &str {
        match self {
            Self::Copied(link) | Self::Manual(link) => link,
        }
    }
}

pub fn invite_link(base_url: &str, room_code: &str) -> String {
    format!("{base_url}?room={room_code}")
}

/// Extract a well-formed room code from a `?room=` query string.
pub fn room_from_query(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "room")
        .map(|(_, code)| code.to_ascii_uppercase())
        .filter(|code| is_valid_room_code(code))
}

/// Copy an invite link, falling back to manual sharing.
pub async fn share_invite(
    clipboard: &mut impl Clipboard,
    base_url: &str,
    room_code: &str,
) -> InviteShare {
    let link = invite_link(base_url, room_code);
    match clipboard.write_text(&link).await {
        Ok(()) => InviteShare::Copied(link),
        Err(e) => {
            tracing::warn!(error = %e, "Could not copy invite link");
            InviteShare::Manual(link)
        },
    }
}

/// Page URL without query or fragment.
#[cfg(target_family = "wasm")]
pub fn current_base_url() -> Option<String> {
    let location = web_sys::window()?.location();
    let origin = location.origin().ok()?;
    let path = location.pathname().ok()?;
    Some(format!("{origin}{path}"))
}
