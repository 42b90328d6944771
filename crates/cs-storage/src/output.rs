//! Local and remote result types.
//!
//! A local result carries output data in memory; a remote result (the
//! manifest) records where each output lives inside its category's archive.
//! The remote form is the persisted contract between write and read and must
//! keep its JSON shape stable.

use crate::media::MediaType;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize, Serializer as SerdeSerializer};
use uuid::Uuid;

/// Top-level output grouping. Each category has its own archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Renderable,
    Downloadable,
}

impl Category {
    /// Both categories, in processing order.
    pub fn all() -> &'static [Category] {
        &[Category::Renderable, Category::Downloadable]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Renderable => "renderable",
            Category::Downloadable => "downloadable",
        }
    }

    /// Blob key of this category's archive for a task.
    pub fn archive_key(&self, task_id: &str) -> String {
        format!("{}_{}.zip", task_id, self.as_str())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory output payload. Which variant is valid depends on the media type.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputData {
    /// JSON-compatible structured value (bokeh).
    Json(serde_json::Value),
    /// Text (table, CSV, Markdown, Text); also base64 binary after a
    /// JSON-serializable read.
    Text(String),
    /// Raw bytes (PNG, JPEG, MP3, MP4, HDF5, PDF).
    Bytes(Vec<u8>),
}

impl OutputData {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            OutputData::Json(_) => "json",
            OutputData::Text(_) => "text",
            OutputData::Bytes(_) => "bytes",
        }
    }

    /// Decode a standard base64 string into a bytes payload.
    pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
        Ok(OutputData::Bytes(BASE64.decode(encoded.as_bytes())?))
    }

    /// Replace a bytes payload with its base64 text form. Other variants are
    /// returned unchanged.
    pub fn into_base64(self) -> Self {
        match self {
            OutputData::Bytes(bytes) => OutputData::Text(BASE64.encode(bytes)),
            other => other,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            OutputData::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutputData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            OutputData::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl Serialize for OutputData {
    fn serialize<S: SerdeSerializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OutputData::Json(value) => value.serialize(serializer),
            OutputData::Text(text) => serializer.serialize_str(text),
            OutputData::Bytes(bytes) => serializer.serialize_bytes(bytes),
        }
    }
}

impl From<serde_json::Value> for OutputData {
    fn from(value: serde_json::Value) -> Self {
        OutputData::Json(value)
    }
}

impl From<String> for OutputData {
    fn from(text: String) -> Self {
        OutputData::Text(text)
    }
}

impl From<&str> for OutputData {
    fn from(text: &str) -> Self {
        OutputData::Text(text.to_string())
    }
}

impl From<Vec<u8>> for OutputData {
    fn from(bytes: Vec<u8>) -> Self {
        OutputData::Bytes(bytes)
    }
}

/// Output as produced by a task, with its data in memory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    pub media_type: MediaType,
    pub data: OutputData,
}

impl LocalOutput {
    pub fn new(title: impl Into<String>, media_type: MediaType, data: impl Into<OutputData>) -> Self {
        Self {
            id: None,
            title: title.into(),
            media_type,
            data: data.into(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }
}

/// Output as recorded in the remote manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    pub media_type: MediaType,
    /// Member name inside the category archive.
    pub filename: String,
    /// Public URL of a rendered preview, added by [`RemoteResult::add_screenshot_links`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

/// One category's archive location and member listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOutputCategory {
    /// Blob key of the archive.
    pub ziplocation: String,
    pub outputs: Vec<RemoteOutput>,
}

impl RemoteOutputCategory {
    pub fn new(ziplocation: impl Into<String>) -> Self {
        Self {
            ziplocation: ziplocation.into(),
            outputs: Vec::new(),
        }
    }
}

/// Outputs of a task grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocalResult {
    pub renderable: Vec<LocalOutput>,
    pub downloadable: Vec<LocalOutput>,
}

impl LocalResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, category: Category) -> &[LocalOutput] {
        match category {
            Category::Renderable => &self.renderable,
            Category::Downloadable => &self.downloadable,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut Vec<LocalOutput> {
        match category {
            Category::Renderable => &mut self.renderable,
            Category::Downloadable => &mut self.downloadable,
        }
    }

    /// Append an output to a category.
    pub fn push(&mut self, category: Category, output: LocalOutput) {
        self.category_mut(category).push(output);
    }

    /// Total output count across categories.
    pub fn len(&self) -> usize {
        self.renderable.len() + self.downloadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Remote manifest: where each category's outputs live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderable: Option<RemoteOutputCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloadable: Option<RemoteOutputCategory>,
}

impl RemoteResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, category: Category) -> Option<&RemoteOutputCategory> {
        match category {
            Category::Renderable => self.renderable.as_ref(),
            Category::Downloadable => self.downloadable.as_ref(),
        }
    }

    pub fn set_category(&mut self, category: Category, entry: RemoteOutputCategory) {
        match category {
            Category::Renderable => self.renderable = Some(entry),
            Category::Downloadable => self.downloadable = Some(entry),
        }
    }

    /// Present categories, in processing order.
    pub fn categories(&self) -> impl Iterator<Item = (Category, &RemoteOutputCategory)> {
        Category::all()
            .iter()
            .filter_map(move |c| self.category(*c).map(|entry| (*c, entry)))
    }

    /// Keep only one category (for partial reads).
    pub fn only(&self, category: Category) -> Self {
        let mut result = RemoteResult::new();
        if let Some(entry) = self.category(category) {
            result.set_category(category, entry.clone());
        }
        result
    }

    /// Set `screenshot` on every renderable output that has an id.
    ///
    /// Links have the form `<base_url>/<bucket>/<id>.png`.
    pub fn add_screenshot_links(&mut self, base_url: &str, bucket: &str) {
        let base_url = base_url.trim_end_matches('/');
        if let Some(renderable) = self.renderable.as_mut() {
            for output in &mut renderable.outputs {
                if let Some(id) = output.id {
                    output.screenshot = Some(format!("{base_url}/{bucket}/{id}.png"));
                }
            }
        }
    }

    /// Serialize to JSON with consistent formatting.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(crate::validate::remote_result(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn remote_output(title: &str, id: Option<Uuid>) -> RemoteOutput {
        RemoteOutput {
            id,
            title: title.to_string(),
            media_type: MediaType::Bokeh,
            filename: format!("{title}.json"),
            screenshot: None,
        }
    }

    #[test]
    fn test_archive_key() {
        assert_eq!(Category::Renderable.archive_key("t1"), "t1_renderable.zip");
        assert_eq!(
            Category::Downloadable.archive_key("abc-123"),
            "abc-123_downloadable.zip"
        );
    }

    #[test]
    fn test_category_order() {
        assert_eq!(
            Category::all(),
            &[Category::Renderable, Category::Downloadable]
        );
        assert_eq!(serde_json::to_string(&Category::Renderable).unwrap(), "\"renderable\"");
    }

    #[test]
    fn test_output_data_base64() {
        let data = OutputData::Bytes(b"PNG bytes".to_vec());
        let encoded = data.clone().into_base64();
        assert_eq!(encoded, OutputData::Text("UE5HIGJ5dGVz".to_string()));
        assert_eq!(OutputData::from_base64("UE5HIGJ5dGVz").unwrap(), data);
        assert!(OutputData::from_base64("not base64!").is_err());

        let text = OutputData::Text("plain".into());
        assert_eq!(text.clone().into_base64(), text);
    }

    #[test]
    fn test_output_data_serialize() {
        assert_eq!(
            serde_json::to_value(OutputData::Json(json!({"a": 1}))).unwrap(),
            json!({"a": 1})
        );
        assert_eq!(
            serde_json::to_value(OutputData::Text("x".into())).unwrap(),
            json!("x")
        );
        assert_eq!(
            serde_json::to_value(OutputData::Bytes(vec![1, 2, 255])).unwrap(),
            json!([1, 2, 255])
        );
    }

    #[test]
    fn test_local_output_serialize_skips_missing_id() {
        let output = LocalOutput::new("notes", MediaType::Text, "hi");
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(
            value,
            json!({"title": "notes", "media_type": "Text", "data": "hi"})
        );
    }

    #[test]
    fn test_local_result_push_and_len() {
        let mut result = LocalResult::new();
        assert!(result.is_empty());
        result.push(Category::Renderable, LocalOutput::new("a", MediaType::Text, "a"));
        result.push(Category::Downloadable, LocalOutput::new("b", MediaType::Csv, "b"));
        result.push(Category::Downloadable, LocalOutput::new("c", MediaType::Csv, "c"));
        assert_eq!(result.len(), 3);
        assert_eq!(result.category(Category::Downloadable).len(), 2);
    }

    #[test]
    fn test_remote_result_wire_shape() {
        let mut remote = RemoteResult::new();
        let mut renderable = RemoteOutputCategory::new("t1_renderable.zip");
        renderable.outputs.push(remote_output("plot", None));
        remote.set_category(Category::Renderable, renderable);

        let value = serde_json::to_value(&remote).unwrap();
        assert_eq!(
            value,
            json!({
                "renderable": {
                    "ziplocation": "t1_renderable.zip",
                    "outputs": [
                        {"title": "plot", "media_type": "bokeh", "filename": "plot.json"}
                    ]
                }
            })
        );
    }

    #[test]
    fn test_remote_result_categories_in_order() {
        let mut remote = RemoteResult::new();
        remote.set_category(Category::Downloadable, RemoteOutputCategory::new("d.zip"));
        remote.set_category(Category::Renderable, RemoteOutputCategory::new("r.zip"));
        let order: Vec<Category> = remote.categories().map(|(c, _)| c).collect();
        assert_eq!(order, vec![Category::Renderable, Category::Downloadable]);

        let only = remote.only(Category::Renderable);
        assert!(only.downloadable.is_none());
        assert_eq!(only.renderable.unwrap().ziplocation, "r.zip");
    }

    #[test]
    fn test_screenshot_links() {
        let id = Uuid::new_v4();
        let mut remote = RemoteResult::new();
        let mut renderable = RemoteOutputCategory::new("t_renderable.zip");
        renderable.outputs.push(remote_output("with id", Some(id)));
        renderable.outputs.push(remote_output("no id", None));
        remote.set_category(Category::Renderable, renderable);
        let mut downloadable = RemoteOutputCategory::new("t_downloadable.zip");
        downloadable.outputs.push(remote_output("file", Some(Uuid::new_v4())));
        remote.set_category(Category::Downloadable, downloadable);

        remote.add_screenshot_links("https://storage.example.com/", "results");

        let outputs = &remote.renderable.as_ref().unwrap().outputs;
        assert_eq!(
            outputs[0].screenshot.as_deref(),
            Some(format!("https://storage.example.com/results/{id}.png").as_str())
        );
        assert!(outputs[1].screenshot.is_none());
        assert!(remote.downloadable.unwrap().outputs[0].screenshot.is_none());
    }

    #[test]
    fn test_remote_result_json_roundtrip() {
        let mut remote = RemoteResult::new();
        let mut downloadable = RemoteOutputCategory::new("t_downloadable.zip");
        downloadable.outputs.push(remote_output("data", Some(Uuid::new_v4())));
        remote.set_category(Category::Downloadable, downloadable);

        let json = remote.to_json().unwrap();
        let parsed = RemoteResult::from_json(&json).unwrap();
        assert_eq!(parsed, remote);
    }
}
