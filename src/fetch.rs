use crate::config::BrowserConfig;
use crate::error::FetchError;
use crate::source::{parse_manifest, ManifestEntry, NoteSource};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

/// Reads the manifest and notes over HTTP, relative to the page.
#[derive(Clone, Debug)]
pub struct HttpSource {
    config: BrowserConfig,
}

impl HttpSource {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let window = web_sys::window().ok_or(FetchError::NoWindow)?;
        let value = JsFuture::from(window.fetch_with_str(url))
            .await
            .map_err(|e| network_error(url, e))?;
        let resp: Response = value
            .dyn_into()
            .map_err(|e| network_error(url, e))?;
        if !resp.ok() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status(),
            });
        }

        let body = resp.text().map_err(|e| network_error(url, e))?;
        let text = JsFuture::from(body)
            .await
            .map_err(|e| network_error(url, e))?;
        text.as_string().ok_or_else(|| FetchError::NotText {
            url: url.to_string(),
        })
    }
}

fn network_error(url: &str, err: wasm_bindgen::JsValue) -> FetchError {
    FetchError::Network {
        url: url.to_string(),
        reason: format!("{err:?}"),
    }
}

impl NoteSource for HttpSource {
    async fn fetch_manifest(&self) -> Result<Vec<ManifestEntry>, FetchError> {
        let text = self.get_text(&self.config.manifest_path).await?;
        parse_manifest(&text)
    }

    async fn fetch_note(&self, id: &str) -> Result<String, FetchError> {
        let url = self.config.note_url(id);
        log::debug!("fetching {url}");
        self.get_text(&url).await
    }
}
