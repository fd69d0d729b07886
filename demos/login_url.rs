//! Prints the Google consent URL for one browser session.
//!
//! Reads `REDIRECT_URI` and `GOOGLE_CLIENT_SECRET_JSON` from the environment (or `.env`).

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use dehate::{
	auth::SessionId,
	config::Settings,
	oauth::CODE_CHALLENGE_METHOD,
	platform::ReqwestYouTubeClient,
	store::{CredentialStore, MemoryStore},
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let settings = Settings::from_env()?;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let client = ReqwestYouTubeClient::new(settings, store)?;
	let session = SessionId::new("demo-browser")?;
	let url = client.get_login_url(&session)?;

	println!("Send your user to {url}.");

	if let Some(pending) = client.pending_authorization(&session) {
		println!("Expect state `{}` on the redirect.", pending.state);
		println!("PKCE challenge ({CODE_CHALLENGE_METHOD}): {}.", pending.code_challenge());
	}

	println!("Pass the returned `code` and `state` to handle_callback to finish signing in.");

	Ok(())
}
