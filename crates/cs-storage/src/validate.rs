//! Shape validation for result documents.
//!
//! Untyped JSON input is checked against the local or remote result shape
//! before any archive is built or any blob is touched. Errors carry the path
//! of the offending field, e.g. `renderable[2].media_type` or
//! `downloadable.outputs[0].filename`.

use crate::media::{Encoding, MediaType};
use crate::output::{
    Category, LocalOutput, LocalResult, OutputData, RemoteOutput, RemoteOutputCategory,
    RemoteResult,
};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result document validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{path}: expected {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::WrongType { .. } => 61,
            ValidationError::UnknownField(_) => 62,
            ValidationError::MissingField(_) => 64,
            ValidationError::InvalidValue { .. } => 65,
        }
    }

    /// Path of the field the error refers to.
    pub fn path(&self) -> &str {
        match self {
            ValidationError::WrongType { path, .. } => path,
            ValidationError::UnknownField(path) => path,
            ValidationError::MissingField(path) => path,
            ValidationError::InvalidValue { field, .. } => field,
        }
    }
}

const LOCAL_OUTPUT_FIELDS: &[&str] = &["id", "title", "media_type", "data"];
const REMOTE_OUTPUT_FIELDS: &[&str] = &["id", "title", "media_type", "filename", "screenshot"];
const REMOTE_CATEGORY_FIELDS: &[&str] = &["ziplocation", "outputs"];
const CATEGORY_FIELDS: &[&str] = &["renderable", "downloadable"];

/// Validate a local result document and convert it to typed outputs.
///
/// A missing category is treated as empty. Binary media types take their data
/// as a base64 string or an array of byte values.
pub fn local_result(value: &Value) -> ValidationResult<LocalResult> {
    let obj = as_object(value, "$")?;
    reject_unknown(obj, CATEGORY_FIELDS, "")?;

    let mut result = LocalResult::new();
    for category in Category::all() {
        let Some(outputs) = obj.get(category.as_str()) else {
            continue;
        };
        let path = category.as_str().to_string();
        for (idx, item) in as_array(outputs, &path)?.iter().enumerate() {
            let output = local_output(item, &format!("{path}[{idx}]"))?;
            result.push(*category, output);
        }
    }
    Ok(result)
}

/// Validate a remote result (manifest) document.
///
/// Both categories are optional; whatever is present must be complete.
pub fn remote_result(value: &Value) -> ValidationResult<RemoteResult> {
    let obj = as_object(value, "$")?;
    reject_unknown(obj, CATEGORY_FIELDS, "")?;

    let mut result = RemoteResult::new();
    for category in Category::all() {
        if let Some(entry) = obj.get(category.as_str()) {
            result.set_category(*category, remote_category(entry, category.as_str())?);
        }
    }
    Ok(result)
}

/// Check that every typed output carries the data variant its media type
/// encodes.
pub fn check_local_result(result: &LocalResult) -> ValidationResult<()> {
    for category in Category::all() {
        for (idx, output) in result.category(*category).iter().enumerate() {
            let serializer = output.media_type.serializer();
            if !serializer.accepts(&output.data) {
                return Err(ValidationError::InvalidValue {
                    field: format!("{category}[{idx}].data"),
                    message: format!(
                        "{} requires {} data, got {}",
                        output.media_type,
                        expected_kind(serializer.encoding()),
                        output.data.kind()
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Check a task id before it is used to derive blob keys.
pub fn task_id(id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "task_id".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if id.contains(['/', '\\']) || id == "." || id == ".." {
        return Err(ValidationError::InvalidValue {
            field: "task_id".to_string(),
            message: format!("'{id}' is not a single path component"),
        });
    }
    Ok(())
}

fn local_output(value: &Value, path: &str) -> ValidationResult<LocalOutput> {
    let obj = as_object(value, path)?;
    reject_unknown(obj, LOCAL_OUTPUT_FIELDS, path)?;

    let id = optional_uuid(obj, path)?;
    let title = required_str(obj, "title", path)?.to_string();
    let media_type = required_media_type(obj, path)?;
    let data_path = format!("{path}.data");
    let raw = obj
        .get("data")
        .ok_or_else(|| ValidationError::MissingField(data_path.clone()))?;
    let data = output_data(raw, media_type, &data_path)?;

    Ok(LocalOutput {
        id,
        title,
        media_type,
        data,
    })
}

fn output_data(value: &Value, media_type: MediaType, path: &str) -> ValidationResult<OutputData> {
    match media_type.encoding() {
        Encoding::Json => Ok(OutputData::Json(value.clone())),
        Encoding::Text => value
            .as_str()
            .map(|s| OutputData::Text(s.to_string()))
            .ok_or_else(|| wrong_type(path, "string")),
        Encoding::Identity => match value {
            Value::String(encoded) => {
                OutputData::from_base64(encoded).map_err(|e| ValidationError::InvalidValue {
                    field: path.to_string(),
                    message: format!("invalid base64 for {media_type}: {e}"),
                })
            }
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| wrong_type(path, "array of byte values (0-255)"))
                })
                .collect::<ValidationResult<Vec<u8>>>()
                .map(OutputData::Bytes),
            _ => Err(wrong_type(path, "base64 string or byte array")),
        },
    }
}

fn remote_category(value: &Value, path: &str) -> ValidationResult<RemoteOutputCategory> {
    let obj = as_object(value, path)?;
    reject_unknown(obj, REMOTE_CATEGORY_FIELDS, path)?;

    let ziplocation = required_str(obj, "ziplocation", path)?.to_string();
    let outputs_path = format!("{path}.outputs");
    let items = obj
        .get("outputs")
        .ok_or_else(|| ValidationError::MissingField(outputs_path.clone()))?;

    let outputs = as_array(items, &outputs_path)?
        .iter()
        .enumerate()
        .map(|(idx, item)| remote_output(item, &format!("{outputs_path}[{idx}]")))
        .collect::<ValidationResult<Vec<_>>>()?;

    Ok(RemoteOutputCategory {
        ziplocation,
        outputs,
    })
}

fn remote_output(value: &Value, path: &str) -> ValidationResult<RemoteOutput> {
    let obj = as_object(value, path)?;
    reject_unknown(obj, REMOTE_OUTPUT_FIELDS, path)?;

    let screenshot = match obj.get("screenshot") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_str()
                .ok_or_else(|| wrong_type(&format!("{path}.screenshot"), "string"))?
                .to_string(),
        ),
    };

    Ok(RemoteOutput {
        id: optional_uuid(obj, path)?,
        title: required_str(obj, "title", path)?.to_string(),
        media_type: required_media_type(obj, path)?,
        filename: required_str(obj, "filename", path)?.to_string(),
        screenshot,
    })
}

fn as_object<'a>(value: &'a Value, path: &str) -> ValidationResult<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| wrong_type(path, "object"))
}

fn as_array<'a>(value: &'a Value, path: &str) -> ValidationResult<&'a Vec<Value>> {
    value.as_array().ok_or_else(|| wrong_type(path, "array"))
}

fn reject_unknown(obj: &Map<String, Value>, allowed: &[&str], path: &str) -> ValidationResult<()> {
    match obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(ValidationError::UnknownField(join(path, key))),
        None => Ok(()),
    }
}

fn required_str<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
    path: &str,
) -> ValidationResult<&'a str> {
    let field_path = join(path, field);
    obj.get(field)
        .ok_or_else(|| ValidationError::MissingField(field_path.clone()))?
        .as_str()
        .ok_or_else(|| wrong_type(&field_path, "string"))
}

fn required_media_type(obj: &Map<String, Value>, path: &str) -> ValidationResult<MediaType> {
    let tag = required_str(obj, "media_type", path)?;
    tag.parse().map_err(|_| ValidationError::InvalidValue {
        field: join(path, "media_type"),
        message: format!(
            "'{tag}' must be one of: {}",
            MediaType::all()
                .iter()
                .map(MediaType::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    })
}

fn optional_uuid(obj: &Map<String, Value>, path: &str) -> ValidationResult<Option<Uuid>> {
    match obj.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            Uuid::parse_str(s)
                .map(Some)
                .map_err(|e| ValidationError::InvalidValue {
                    field: join(path, "id"),
                    message: format!("not a UUID: {e}"),
                })
        }
        Some(_) => Err(wrong_type(&join(path, "id"), "UUID string")),
    }
}

fn expected_kind(encoding: Encoding) -> &'static str {
    match encoding {
        Encoding::Identity => "bytes",
        Encoding::Text => "text",
        Encoding::Json => "json",
    }
}

fn wrong_type(path: &str, expected: &'static str) -> ValidationError {
    ValidationError::WrongType {
        path: path.to_string(),
        expected,
    }
}

fn join(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{path}.{field}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_local_result_valid() {
        let result = local_result(&json!({
            "renderable": [
                {"title": "plot", "media_type": "bokeh", "data": {"a": 1}},
                {"title": "img", "media_type": "PNG", "data": "UE5HIGJ5dGVz"}
            ],
            "downloadable": [
                {"title": "csv", "media_type": "CSV", "data": "a,b\n"},
                {"title": "h5", "media_type": "HDF5", "data": [1, 2, 3]}
            ]
        }))
        .unwrap();

        assert_eq!(result.renderable.len(), 2);
        assert_eq!(result.renderable[0].data, OutputData::Json(json!({"a": 1})));
        assert_eq!(result.renderable[1].data, OutputData::Bytes(b"PNG bytes".to_vec()));
        assert_eq!(result.downloadable[0].data, OutputData::Text("a,b\n".into()));
        assert_eq!(result.downloadable[1].data, OutputData::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn test_local_result_missing_category_is_empty() {
        let result = local_result(&json!({"renderable": []})).unwrap();
        assert!(result.is_empty());
        assert!(local_result(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_local_result_rejects_unknown_top_level() {
        let err = local_result(&json!({"bad": "data"})).unwrap_err();
        assert_eq!(err, ValidationError::UnknownField("bad".to_string()));
    }

    #[test]
    fn test_local_result_rejects_non_object() {
        assert!(matches!(
            local_result(&json!([1, 2])),
            Err(ValidationError::WrongType { expected: "object", .. })
        ));
        assert!(matches!(
            local_result(&json!({"renderable": {}})),
            Err(ValidationError::WrongType { expected: "array", .. })
        ));
    }

    #[test]
    fn test_local_result_unknown_media_type() {
        let err = local_result(&json!({
            "renderable": [],
            "downloadable": [{"title": "x", "media_type": "GIF", "data": "x"}]
        }))
        .unwrap_err();
        assert_eq!(err.path(), "downloadable[0].media_type");
        assert_eq!(err.code(), 65);
        assert!(err.to_string().contains("GIF"));
    }

    #[test]
    fn test_local_result_missing_fields() {
        let err = local_result(&json!({"renderable": [{"media_type": "Text", "data": "x"}]}))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("renderable[0].title".into()));

        let err = local_result(&json!({"renderable": [{"title": "t", "media_type": "Text"}]}))
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("renderable[0].data".into()));
    }

    #[test]
    fn test_local_result_data_shape_per_media_type() {
        let err = local_result(&json!({
            "renderable": [{"title": "t", "media_type": "Markdown", "data": {"x": 1}}]
        }))
        .unwrap_err();
        assert_eq!(err.path(), "renderable[0].data");

        let err = local_result(&json!({
            "renderable": [{"title": "t", "media_type": "PDF", "data": "%%% not base64"}]
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));

        let err = local_result(&json!({
            "renderable": [{"title": "t", "media_type": "MP3", "data": [1, 256]}]
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { .. }));
    }

    #[test]
    fn test_local_result_id() {
        let id = Uuid::new_v4();
        let result = local_result(&json!({
            "renderable": [{"id": id.to_string(), "title": "t", "media_type": "Text", "data": ""}]
        }))
        .unwrap();
        assert_eq!(result.renderable[0].id, Some(id));

        let err = local_result(&json!({
            "renderable": [{"id": "nope", "title": "t", "media_type": "Text", "data": ""}]
        }))
        .unwrap_err();
        assert_eq!(err.path(), "renderable[0].id");
    }

    #[test]
    fn test_remote_result_valid_partial() {
        let result = remote_result(&json!({
            "renderable": {
                "ziplocation": "t_renderable.zip",
                "outputs": [{"title": "plot", "media_type": "bokeh", "filename": "plot.json"}]
            }
        }))
        .unwrap();
        assert!(result.downloadable.is_none());
        let renderable = result.renderable.unwrap();
        assert_eq!(renderable.ziplocation, "t_renderable.zip");
        assert_eq!(renderable.outputs[0].filename, "plot.json");
    }

    #[test]
    fn test_remote_result_rejects_bad_data() {
        assert_eq!(
            remote_result(&json!({"bad": "data"})).unwrap_err(),
            ValidationError::UnknownField("bad".into())
        );

        let err = remote_result(&json!({"renderable": {"outputs": []}})).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("renderable.ziplocation".into()));

        let err = remote_result(&json!({
            "downloadable": {
                "ziplocation": "x.zip",
                "outputs": [{"title": "a", "media_type": "CSV"}]
            }
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField("downloadable.outputs[0].filename".into())
        );
    }

    #[test]
    fn test_remote_result_accepts_screenshot() {
        let result = remote_result(&json!({
            "renderable": {
                "ziplocation": "x.zip",
                "outputs": [{
                    "title": "a", "media_type": "PNG", "filename": "a.png",
                    "screenshot": "https://example.com/a.png"
                }]
            }
        }))
        .unwrap();
        assert_eq!(
            result.renderable.unwrap().outputs[0].screenshot.as_deref(),
            Some("https://example.com/a.png")
        );
    }

    #[test]
    fn test_check_local_result() {
        let mut result = LocalResult::new();
        result.push(Category::Renderable, LocalOutput::new("ok", MediaType::Text, "x"));
        assert!(check_local_result(&result).is_ok());

        result.push(
            Category::Downloadable,
            LocalOutput::new("bad", MediaType::Png, "not bytes"),
        );
        let err = check_local_result(&result).unwrap_err();
        assert_eq!(err.path(), "downloadable[0].data");
        assert!(err.to_string().contains("PNG requires bytes data, got text"));
    }

    #[test]
    fn test_task_id() {
        assert!(task_id("3f1c2e9a-task").is_ok());
        assert!(task_id("").is_err());
        assert!(task_id("../escape").is_err());
        assert!(task_id("a\\b").is_err());
        assert!(task_id("..").is_err());
    }
}
