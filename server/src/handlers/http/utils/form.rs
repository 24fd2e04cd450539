use std::collections::HashMap;
use std::convert::Infallible;

use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::Request;
use hyper::body::Body;
use hyper::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::error::ApiError;

/// A file part from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Text fields plus any uploaded files, whatever encoding the client used.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Trimmed value of a text field; blank counts as absent.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Raw value of a text field, untrimmed. Used for passwords.
    pub fn raw_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Read the body (at most `max_bytes`) and decode it according to its
/// `Content-Type`: multipart, JSON object, or url-encoded (the fallback).
pub async fn parse_form<B>(req: Request<B>, max_bytes: usize) -> Result<FormData, ApiError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = Limited::new(req.into_body(), max_bytes)
        .collect()
        .await
        .map_err(|e| {
            warn!("Failed to read request body: {}", e);
            if e.is::<http_body_util::LengthLimitError>() {
                ApiError::validation("Request body too large")
            } else {
                ApiError::validation("Invalid request body")
            }
        })?
        .to_bytes();

    debug!("Parsing {} byte body as '{}'", body.len(), content_type);

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "multipart/form-data" => parse_multipart(&content_type, body).await,
        "application/json" => parse_json(&body),
        _ => Ok(parse_urlencoded(&body)),
    }
}

async fn parse_multipart(content_type: &str, body: Bytes) -> Result<FormData, ApiError> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|_| ApiError::validation("Invalid multipart boundary"))?;

    let stream = futures_util::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);
    let mut form = FormData::default();

    let malformed = |e: multer::Error| {
        warn!("Malformed multipart body: {}", e);
        ApiError::validation("Malformed multipart body")
    };

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field
                    .content_type()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field.bytes().await.map_err(malformed)?;

                // Browsers send an empty part when no file was chosen.
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }

                form.files.insert(
                    name,
                    UploadedFile {
                        filename,
                        content_type,
                        bytes,
                    },
                );
            }
            None => {
                let text = field.text().await.map_err(malformed)?;
                form.fields.insert(name, text);
            }
        }
    }

    Ok(form)
}

fn parse_json(body: &[u8]) -> Result<FormData, ApiError> {
    if body.is_empty() {
        return Ok(FormData::default());
    }

    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        warn!("Invalid JSON body: {}", e);
        ApiError::validation("Invalid JSON body")
    })?;

    let object = match value {
        serde_json::Value::Object(map) => map,
        _ => return Err(ApiError::validation("Expected a JSON object")),
    };

    let fields = object
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => return None,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect();

    Ok(FormData {
        fields,
        files: HashMap::new(),
    })
}

fn parse_urlencoded(body: &[u8]) -> FormData {
    FormData {
        fields: form_urlencoded::parse(body).into_owned().collect(),
        files: HashMap::new(),
    }
}
