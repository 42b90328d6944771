//! Media types and their byte encodings.
//!
//! Every [`MediaType`] maps to exactly one [`Serializer`]. The mapping is an
//! exhaustive `match`, so adding a media type without an encoding does not
//! compile.

use crate::output::OutputData;
use crate::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declared content kind of an output.
///
/// Wire tags are case-sensitive and match the names used in result documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "bokeh")]
    Bokeh,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "PNG")]
    Png,
    #[serde(rename = "JPEG")]
    Jpeg,
    #[serde(rename = "MP3")]
    Mp3,
    #[serde(rename = "MP4")]
    Mp4,
    #[serde(rename = "HDF5")]
    Hdf5,
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "Markdown")]
    Markdown,
    #[serde(rename = "Text")]
    Text,
}

impl MediaType {
    /// All media types, in documentation order.
    pub fn all() -> &'static [MediaType] {
        &[
            MediaType::Bokeh,
            MediaType::Table,
            MediaType::Csv,
            MediaType::Png,
            MediaType::Jpeg,
            MediaType::Mp3,
            MediaType::Mp4,
            MediaType::Hdf5,
            MediaType::Pdf,
            MediaType::Markdown,
            MediaType::Text,
        ]
    }

    /// Wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Bokeh => "bokeh",
            MediaType::Table => "table",
            MediaType::Csv => "CSV",
            MediaType::Png => "PNG",
            MediaType::Jpeg => "JPEG",
            MediaType::Mp3 => "MP3",
            MediaType::Mp4 => "MP4",
            MediaType::Hdf5 => "HDF5",
            MediaType::Pdf => "PDF",
            MediaType::Markdown => "Markdown",
            MediaType::Text => "Text",
        }
    }

    /// Serializer registered for this media type.
    pub fn serializer(self) -> Serializer {
        match self {
            MediaType::Bokeh => Serializer::json("json"),
            MediaType::Table => Serializer::text("html"),
            MediaType::Csv => Serializer::text("csv"),
            MediaType::Png => Serializer::identity("png"),
            MediaType::Jpeg => Serializer::identity("jpeg"),
            MediaType::Mp3 => Serializer::identity("mp3"),
            MediaType::Mp4 => Serializer::identity("mp4"),
            MediaType::Hdf5 => Serializer::identity("h5"),
            MediaType::Pdf => Serializer::identity("pdf"),
            MediaType::Markdown => Serializer::text("md"),
            MediaType::Text => Serializer::text("txt"),
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        self.serializer().extension()
    }

    /// Encoding family of this media type.
    pub fn encoding(self) -> Encoding {
        self.serializer().encoding()
    }
}

impl std::str::FromStr for MediaType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| StorageError::UnknownMediaType(s.to_string()))
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a serializer turns output data into member bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Data is already in its final byte form.
    Identity,
    /// UTF-8 text.
    Text,
    /// JSON document.
    Json,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Identity => write!(f, "identity"),
            Encoding::Text => write!(f, "text"),
            Encoding::Json => write!(f, "json"),
        }
    }
}

/// Errors raised while converting between output data and bytes.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{encoding} serializer does not accept {found} data")]
    Mismatch {
        encoding: Encoding,
        found: &'static str,
    },
}

/// Converts output data to archive member bytes and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serializer {
    encoding: Encoding,
    ext: &'static str,
}

impl Serializer {
    pub const fn identity(ext: &'static str) -> Self {
        Self {
            encoding: Encoding::Identity,
            ext,
        }
    }

    pub const fn text(ext: &'static str) -> Self {
        Self {
            encoding: Encoding::Text,
            ext,
        }
    }

    pub const fn json(ext: &'static str) -> Self {
        Self {
            encoding: Encoding::Json,
            ext,
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        self.ext
    }

    /// Whether `data` is the variant this serializer encodes.
    pub fn accepts(&self, data: &OutputData) -> bool {
        matches!(
            (self.encoding, data),
            (Encoding::Identity, OutputData::Bytes(_))
                | (Encoding::Text, OutputData::Text(_))
                | (Encoding::Json, OutputData::Json(_))
        )
    }

    /// Encode output data to bytes.
    pub fn serialize(&self, data: &OutputData) -> Result<Vec<u8>, CodecError> {
        match (self.encoding, data) {
            (Encoding::Identity, OutputData::Bytes(bytes)) => Ok(bytes.clone()),
            (Encoding::Text, OutputData::Text(text)) => Ok(text.as_bytes().to_vec()),
            (Encoding::Json, OutputData::Json(value)) => Ok(serde_json::to_vec(value)?),
            (encoding, other) => Err(CodecError::Mismatch {
                encoding,
                found: other.kind(),
            }),
        }
    }

    /// Decode member bytes back to output data.
    pub fn deserialize(&self, bytes: Vec<u8>) -> Result<OutputData, CodecError> {
        match self.encoding {
            Encoding::Identity => Ok(OutputData::Bytes(bytes)),
            Encoding::Text => Ok(OutputData::Text(String::from_utf8(bytes)?)),
            Encoding::Json => Ok(OutputData::Json(serde_json::from_slice(&bytes)?)),
        }
    }

    /// Archive member name for a title.
    ///
    /// The extension is appended unless the title already ends with
    /// `.<ext>` (exact, case-sensitive match).
    pub fn filename_for(&self, title: &str) -> String {
        let suffix = format!(".{}", self.ext);
        if title.ends_with(&suffix) {
            title.to_string()
        } else {
            format!("{title}{suffix}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_media_type_has_serializer() {
        for media_type in MediaType::all() {
            let ser = media_type.serializer();
            assert!(!ser.extension().is_empty());
            assert!(!ser.extension().starts_with('.'));
        }
        assert_eq!(MediaType::all().len(), 11);
    }

    #[test]
    fn test_extensions() {
        let expected = [
            (MediaType::Bokeh, "json"),
            (MediaType::Table, "html"),
            (MediaType::Csv, "csv"),
            (MediaType::Png, "png"),
            (MediaType::Jpeg, "jpeg"),
            (MediaType::Mp3, "mp3"),
            (MediaType::Mp4, "mp4"),
            (MediaType::Hdf5, "h5"),
            (MediaType::Pdf, "pdf"),
            (MediaType::Markdown, "md"),
            (MediaType::Text, "txt"),
        ];
        for (media_type, ext) in expected {
            assert_eq!(media_type.extension(), ext, "{media_type}");
        }
    }

    #[test]
    fn test_encodings() {
        assert_eq!(MediaType::Bokeh.encoding(), Encoding::Json);
        for m in [MediaType::Table, MediaType::Csv, MediaType::Markdown, MediaType::Text] {
            assert_eq!(m.encoding(), Encoding::Text);
        }
        for m in [
            MediaType::Png,
            MediaType::Jpeg,
            MediaType::Mp3,
            MediaType::Mp4,
            MediaType::Hdf5,
            MediaType::Pdf,
        ] {
            assert_eq!(m.encoding(), Encoding::Identity);
        }
    }

    #[test]
    fn test_parse_tags() {
        for media_type in MediaType::all() {
            let parsed: MediaType = media_type.as_str().parse().unwrap();
            assert_eq!(parsed, *media_type);
        }
        assert!(matches!(
            "csv".parse::<MediaType>(),
            Err(StorageError::UnknownMediaType(tag)) if tag == "csv"
        ));
        assert!("GIF".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_serde_tags() {
        assert_eq!(serde_json::to_string(&MediaType::Csv).unwrap(), "\"CSV\"");
        assert_eq!(serde_json::to_string(&MediaType::Bokeh).unwrap(), "\"bokeh\"");
        let parsed: MediaType = serde_json::from_str("\"HDF5\"").unwrap();
        assert_eq!(parsed, MediaType::Hdf5);
    }

    #[test]
    fn test_json_serializer() {
        let ser = Serializer::json("json");
        let bytes = ser
            .serialize(&OutputData::Json(json!({"hello": "world"})))
            .unwrap();
        let reparsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reparsed, json!({"hello": "world"}));

        let data = ser.deserialize(br#"{"hello": "world"}"#.to_vec()).unwrap();
        assert_eq!(data, OutputData::Json(json!({"hello": "world"})));
    }

    #[test]
    fn test_json_floats_roundtrip_exactly() {
        let ser = MediaType::Bokeh.serializer();
        for f in [
            -1.603964615428183e143,
            1.0715660391465826e-75,
            0.1,
            f64::MIN_POSITIVE,
            f64::MAX,
            5e-324,
        ] {
            let data = OutputData::Json(json!({"x": [f]}));
            let back = ser.deserialize(ser.serialize(&data).unwrap()).unwrap();
            let got = back.as_json().unwrap()["x"][0].as_f64().unwrap();
            assert_eq!(got.to_bits(), f.to_bits(), "{f:e}");
        }
    }

    #[test]
    fn test_json_keeps_key_order() {
        let ser = MediaType::Bokeh.serializer();
        let data = ser
            .deserialize(br#"{"zeta": 1, "alpha": 2, "mid": 3}"#.to_vec())
            .unwrap();
        let keys: Vec<&str> = data
            .as_json()
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);

        let bytes = ser.serialize(&data).unwrap();
        assert_eq!(bytes, br#"{"zeta":1,"alpha":2,"mid":3}"#);
    }

    #[test]
    fn test_text_serializer() {
        let ser = Serializer::text("txt");
        let bytes = ser.serialize(&OutputData::Text("hello world".into())).unwrap();
        assert_eq!(bytes, b"hello world");

        let data = ser.deserialize(b"hello world".to_vec()).unwrap();
        assert_eq!(data, OutputData::Text("hello world".into()));
    }

    #[test]
    fn test_identity_serializer() {
        let ser = Serializer::identity("png");
        let bytes = ser.serialize(&OutputData::Bytes(b"PNG bytes".to_vec())).unwrap();
        assert_eq!(bytes, b"PNG bytes");

        let data = ser.deserialize(b"PNG bytes".to_vec()).unwrap();
        assert_eq!(data, OutputData::Bytes(b"PNG bytes".to_vec()));
    }

    #[test]
    fn test_serialize_rejects_wrong_variant() {
        let err = Serializer::json("json")
            .serialize(&OutputData::Bytes(vec![1, 2]))
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Mismatch {
                encoding: Encoding::Json,
                found: "bytes"
            }
        ));
        assert!(!Serializer::text("csv").accepts(&OutputData::Json(json!(1))));
        assert!(Serializer::identity("pdf").accepts(&OutputData::Bytes(vec![])));
    }

    #[test]
    fn test_deserialize_invalid_bytes() {
        assert!(matches!(
            Serializer::text("txt").deserialize(vec![0xff, 0xfe]),
            Err(CodecError::Utf8(_))
        ));
        assert!(matches!(
            Serializer::json("json").deserialize(b"{not json".to_vec()),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn test_filename_appends_extension() {
        let ser = MediaType::Csv.serializer();
        assert_eq!(ser.filename_for("report"), "report.csv");
        assert_eq!(ser.filename_for("report.csv"), "report.csv");
        assert_eq!(ser.filename_for("report.CSV"), "report.CSV.csv");
        assert_eq!(ser.filename_for("reportcsv"), "reportcsv.csv");
    }

    #[test]
    fn test_filename_idempotent() {
        for media_type in MediaType::all() {
            let ser = media_type.serializer();
            let once = ser.filename_for("bokeh plot");
            assert_eq!(ser.filename_for(&once), once);
        }
    }
}
