mod common;

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use common::*;
use dehate::{
	error::{ConfigError, Error, UpstreamError},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	platform::{DataApi, YouTubeClient},
	reqwest::Client,
	store::{CredentialStore, MemoryStore},
};

const OFFLINE_SECRET: &str = r#"{"installed":{"client_id":"offline-client","client_secret":"offline-secret","auth_uri":"https://accounts.google.com/o/oauth2/auth","token_uri":"https://oauth2.googleapis.com/token","redirect_uris":["http://localhost"]}}"#;

#[derive(Debug)]
enum FakeTransportError {
	Unavailable,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Unavailable => write!(f, "Transport unavailable."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient {
	status: u16,
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, status: self.status }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	status: u16,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let status = self.status;

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);
			slot.store(ResponseMetadata { status: Some(status) });

			Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Unavailable)))
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	metadata: Arc<Mutex<Vec<Option<ResponseMetadata>>>>,
}
impl RecordingTransportErrorMapper {
	fn recorded_metadata(&self) -> Vec<Option<ResponseMetadata>> {
		self.metadata.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		let status = meta.and_then(|value| value.status);

		self.metadata.lock().push(meta.cloned());

		match err {
			HttpClientError::Reqwest(inner) =>
				UpstreamError::TokenEndpoint { message: format!("Fake transport error: {inner}"), status }
					.into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => UpstreamError::Io(inner).into(),
			other => UpstreamError::TokenEndpoint {
				message: format!("Unhandled HTTP client error variant: {other:?}"),
				status,
			}
			.into(),
		}
	}
}

fn build_client(
	status: u16,
	mapper: Arc<RecordingTransportErrorMapper>,
) -> (YouTubeClient<FakeHttpClient, RecordingTransportErrorMapper>, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();
	let api = DataApi::with_default_base(Client::new()).expect("Default API base should parse.");
	let client = YouTubeClient::with_http_client(
		settings(Some(OFFLINE_SECRET.into())),
		store,
		Arc::new(FakeHttpClient { status }),
		mapper,
		api,
	);

	(client, store_backend)
}

#[tokio::test]
async fn fake_token_http_client_surfaces_status() {
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let (client, store) = build_client(503, mapper);
	let browser = session("browser-unavailable");

	client.get_login_url(&browser).expect("Login URL should build without network.");

	let state = client
		.pending_authorization(&browser)
		.map(|pending| pending.state)
		.expect("Sign-in should be pending.");
	let err = client
		.handle_callback(&browser, "code", Some(&state))
		.await
		.expect_err("Exchange should fail when the transport is unavailable.");

	match &err {
		Error::Upstream(UpstreamError::TokenEndpoint { message, status }) => {
			assert_eq!(*status, Some(503));
			assert!(message.contains("Transport unavailable."));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert_eq!(err.http_status(), 500);
	assert!(store.is_empty());
}

#[tokio::test]
async fn fake_mapper_captures_response_metadata() {
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let (client, _) = build_client(502, mapper.clone());
	let browser = session("browser-metadata");
	let _ = client
		.handle_callback(&browser, "code", None)
		.await
		.expect_err("Exchange should fail when the transport is unavailable.");
	let observed = mapper.recorded_metadata();

	assert_eq!(observed.len(), 1, "Mapper must record a single request.");

	let meta = observed
		.first()
		.and_then(|value| value.clone())
		.expect("Response metadata should be recorded exactly once.");

	assert_eq!(meta.status, Some(502));
}
