//! Origin response envelope and mapping into the document model.
//!
//! The origin speaks Indonesian field names inside a `{code, message, data}`
//! envelope; everything past this module sees only [`Document`] and
//! [`DocumentSummary`].

use std::collections::BTreeMap;

use mushaf_core::{Document, DocumentSummary, Verse};
use serde::Deserialize;

use super::OriginError;

/// Raw `{code, message, data}` envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, treating any non-200 code or empty data as an error.
    pub fn into_data(self) -> Result<T, OriginError> {
        if self.code != 200 {
            tracing::debug!(code = self.code, message = %self.message, "origin envelope reported failure");
            return Err(OriginError::HttpError { status: self.code });
        }
        self.data.ok_or_else(|| OriginError::Parse("envelope has no data".into()))
    }
}

/// One chapter as the origin lists it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSurah {
    pub nomor: u32,
    pub nama: String,
    pub nama_latin: String,
    pub jumlah_ayat: u32,
    #[serde(default)]
    pub tempat_turun: String,
    #[serde(default)]
    pub arti: String,
    #[serde(default)]
    pub deskripsi: String,
    #[serde(default)]
    pub audio_full: BTreeMap<String, String>,
}

/// One chapter with its verses.
#[derive(Debug, Deserialize)]
pub struct RawSurahDetail {
    #[serde(flatten)]
    pub surah: RawSurah,
    #[serde(default)]
    pub ayat: Vec<RawAyat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAyat {
    pub nomor_ayat: u32,
    #[serde(default)]
    pub teks_arab: String,
    #[serde(default)]
    pub teks_latin: String,
    #[serde(default)]
    pub teks_indonesia: String,
    #[serde(default)]
    pub audio: BTreeMap<String, String>,
}

impl From<RawSurah> for DocumentSummary {
    fn from(raw: RawSurah) -> Self {
        DocumentSummary {
            id: raw.nomor,
            name: raw.nama,
            latin_name: raw.nama_latin,
            verse_count: raw.jumlah_ayat,
            revelation_place: raw.tempat_turun,
            meaning: raw.arti,
            description: raw.deskripsi,
            audio_full: raw.audio_full,
        }
    }
}

impl From<RawAyat> for Verse {
    fn from(raw: RawAyat) -> Self {
        Verse {
            number: raw.nomor_ayat,
            arabic_text: raw.teks_arab,
            latin_text: raw.teks_latin,
            translation_text: raw.teks_indonesia,
            audio_urls: raw.audio,
        }
    }
}

impl From<RawSurahDetail> for Document {
    fn from(raw: RawSurahDetail) -> Self {
        let summary = DocumentSummary::from(raw.surah);
        Document {
            id: summary.id,
            name: summary.name,
            latin_name: summary.latin_name,
            verse_count: summary.verse_count,
            revelation_place: summary.revelation_place,
            meaning: summary.meaning,
            description: summary.description,
            audio_full: summary.audio_full,
            verses: raw.ayat.into_iter().map(Verse::from).collect(),
        }
    }
}

/// Decode an index response body.
pub fn parse_index(bytes: &[u8]) -> Result<Vec<DocumentSummary>, OriginError> {
    let envelope: Envelope<Vec<RawSurah>> =
        serde_json::from_slice(bytes).map_err(|e| OriginError::Parse(e.to_string()))?;
    Ok(envelope.into_data()?.into_iter().map(DocumentSummary::from).collect())
}

/// Decode a chapter response body, checking it is the chapter asked for.
pub fn parse_document(bytes: &[u8], requested: u32) -> Result<Document, OriginError> {
    let envelope: Envelope<RawSurahDetail> =
        serde_json::from_slice(bytes).map_err(|e| OriginError::Parse(e.to_string()))?;
    let document = Document::from(envelope.into_data()?);
    if document.id != requested {
        return Err(OriginError::Mismatch { requested, returned: document.id });
    }
    Ok(document)
}
