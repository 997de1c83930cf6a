//! WASM-compatible catalog wrapper

use harmonia_core::{AlbumId, Catalog};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Album catalog loaded from the JSON album document
#[wasm_bindgen]
pub struct WasmCatalog {
    inner: Catalog,
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
impl WasmCatalog {
    /// Parse the album document
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str) -> Result<WasmCatalog, JsValue> {
        Catalog::from_json(json)
            .map(|inner| Self { inner })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// All albums
    pub fn albums(&self) -> JsValue {
        to_js(self.inner.list_albums())
    }

    /// Album by id, or null
    pub fn album(&self, id: i64) -> JsValue {
        to_js(&self.inner.get_album_by_id(AlbumId(id)))
    }

    /// `{ track, album }` for a track id, or null
    pub fn track(&self, id: i64) -> JsValue {
        #[derive(Serialize)]
        struct Found<'a> {
            track: &'a harmonia_core::Track,
            album: &'a harmonia_core::Album,
        }

        let found = self
            .inner
            .get_track_by_id(id.into())
            .map(|(track, album)| Found {
                track: track.as_ref(),
                album,
            });
        to_js(&found)
    }

    pub fn genres(&self) -> JsValue {
        to_js(&self.inner.genres())
    }

    #[wasm_bindgen(js_name = albumsByGenre)]
    pub fn albums_by_genre(&self, genre: &str) -> JsValue {
        to_js(&self.inner.albums_by_genre(genre))
    }

    #[wasm_bindgen(js_name = albumsByArtist)]
    pub fn albums_by_artist(&self, artist: &str) -> JsValue {
        to_js(&self.inner.albums_by_artist(artist))
    }

    /// Albums whose title or artist contains `term`
    pub fn search(&self, term: &str) -> JsValue {
        to_js(&self.inner.search_albums(term))
    }

    #[wasm_bindgen(js_name = randomAlbum)]
    pub fn random_album(&self) -> JsValue {
        to_js(&self.inner.random_album(&mut rand::thread_rng()))
    }

    #[wasm_bindgen(js_name = albumDuration)]
    pub fn album_duration(&self, id: i64) -> String {
        self.inner.album_duration(AlbumId(id))
    }

    #[wasm_bindgen(js_name = totalTrackCount)]
    pub fn total_track_count(&self, id: i64) -> usize {
        self.inner.total_track_count(AlbumId(id))
    }
}

impl WasmCatalog {
    pub fn catalog(&self) -> &Catalog {
        &self.inner
    }
}
