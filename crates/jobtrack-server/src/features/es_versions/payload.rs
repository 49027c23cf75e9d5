//! Entry-sheet request bodies: JSON or `multipart/form-data`
//!
//! Multipart requests may carry the upload in a `file` part. Other parts are
//! text and are converted to JSON values before deserializing, so both
//! encodings share one command type.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AppError, FieldErrors};
use crate::storage::upload::UploadedFile;

const FILE_FIELD: &str = "file";
const NOT_A_FILE: &str = "The submitted data was not a file. Check the encoding type on the form.";

/// What the request asks to do with the attached file
#[derive(Debug, Clone, Default)]
pub enum FileChange {
    #[default]
    Keep,
    Clear,
    Replace(UploadedFile),
}

impl FileChange {
    pub fn into_upload(self) -> Option<UploadedFile> {
        match self {
            FileChange::Replace(file) => Some(file),
            FileChange::Keep | FileChange::Clear => None,
        }
    }
}

/// Deserialized fields plus the requested file change
#[derive(Debug)]
pub struct EsPayload<T> {
    pub fields: T,
    pub file: FileChange,
}

/// Text part to JSON value
///
/// `company` is an id; an empty `submitted_at` means no date.
fn form_value(name: &str, text: String) -> Value {
    match name {
        "company" => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(text)),
        "submitted_at" if text.is_empty() => Value::Null,
        _ => Value::String(text),
    }
}

fn bad_multipart(e: impl std::fmt::Display) -> AppError {
    AppError::BadRequest(format!("Malformed multipart body: {e}"))
}

async fn from_multipart(mut multipart: Multipart) -> Result<(Map<String, Value>, FileChange), AppError> {
    let mut fields = Map::new();
    let mut file = FileChange::Keep;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILE_FIELD {
            match field.file_name().map(str::to_string) {
                Some(file_name) if !file_name.is_empty() => {
                    let data = field.bytes().await.map_err(bad_multipart)?;
                    file = FileChange::Replace(UploadedFile::new(file_name, data));
                },
                _ => {
                    let text = field.text().await.map_err(bad_multipart)?;
                    if !text.is_empty() {
                        return Err(FieldErrors::single(FILE_FIELD, NOT_A_FILE).into());
                    }
                    file = FileChange::Clear;
                },
            }
            continue;
        }

        let text = field.text().await.map_err(bad_multipart)?;
        fields.insert(name.clone(), form_value(&name, text));
    }

    Ok((fields, file))
}

fn from_json(value: Value) -> Result<(Map<String, Value>, FileChange), AppError> {
    let Value::Object(mut fields) = value else {
        return Err(AppError::BadRequest(
            "Invalid data. Expected a dictionary.".to_string(),
        ));
    };

    let file = match fields.remove(FILE_FIELD) {
        None => FileChange::Keep,
        Some(Value::Null) => FileChange::Clear,
        Some(_) => return Err(FieldErrors::single(FILE_FIELD, NOT_A_FILE).into()),
    };

    Ok((fields, file))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

#[async_trait]
impl<S, T> FromRequest<S> for EsPayload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (fields, file) = if is_multipart(&request) {
            let multipart = Multipart::from_request(request, state)
                .await
                .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
            from_multipart(multipart).await?
        } else {
            let Json(value) = Json::<Value>::from_request(request, state).await?;
            from_json(value)?
        };

        let fields = serde_json::from_value(Value::Object(fields))
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;

        Ok(Self { fields, file })
    }
}
