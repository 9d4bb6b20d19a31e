//! Shopify Admin GraphQL asset host client

use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::AssetHostConfig;
use crate::error::{AppError, Result};
use crate::publish::traits::{
    AssetHostClient, PublishedAsset, UploadFile, UploadParameter, UploadTarget,
    UploadTargetRequest,
};

const STAGED_UPLOADS_CREATE: &str = r#"
mutation stagedUploadsCreate($input: [StagedUploadInput!]!) {
  stagedUploadsCreate(input: $input) {
    stagedTargets {
      url
      resourceUrl
      parameters {
        name
        value
      }
    }
    userErrors {
      field
      message
    }
  }
}
"#;

const FILE_CREATE: &str = r#"
mutation fileCreate($files: [FileCreateInput!]!) {
  fileCreate(files: $files) {
    files {
      fileStatus
      preview {
        image {
          url
        }
      }
      ... on MediaImage {
        image {
          url
        }
      }
      ... on GenericFile {
        url
      }
    }
    userErrors {
      field
      message
    }
  }
}
"#;

/// Asset host speaking the Shopify Admin GraphQL staged upload protocol
pub struct ShopifyClient {
    client: Client,
    endpoint: String,
    access_token: String,
    expected_upload_status: Option<u16>,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct UserError {
    #[serde(default)]
    field: Option<Vec<String>>,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedUploadsData {
    staged_uploads_create: Option<StagedUploadsPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedUploadsPayload {
    #[serde(default)]
    staged_targets: Vec<StagedTarget>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedTarget {
    url: Option<String>,
    resource_url: Option<String>,
    #[serde(default)]
    parameters: Vec<UploadParameter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileCreateData {
    file_create: Option<FileCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileCreatePayload {
    #[serde(default)]
    files: Vec<CreatedFile>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image: Option<ImageRef>,
    #[serde(default)]
    preview: Option<Preview>,
}

#[derive(Debug, Deserialize)]
struct Preview {
    #[serde(default)]
    image: Option<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    #[serde(default)]
    url: Option<String>,
}

impl CreatedFile {
    fn public_url(self) -> Option<String> {
        self.url
            .or_else(|| self.image.and_then(|image| image.url))
            .or_else(|| self.preview.and_then(|p| p.image).and_then(|image| image.url))
            .filter(|url| !url.is_empty())
    }
}

fn describe_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl ShopifyClient {
    /// Create a new client from configuration
    pub fn new(config: &AssetHostConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.graphql_endpoint(),
            access_token: config.access_token.clone(),
            expected_upload_status: config.expected_upload_status,
        })
    }

    /// Run a GraphQL operation. Errors are returned as plain messages so each
    /// phase can wrap them in its own variant.
    async fn graphql<T>(&self, query: &str, variables: Value) -> std::result::Result<T, String>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|e| e.without_url().to_string())?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| e.without_url().to_string())?;

        if !status.is_success() {
            return Err(format!("Asset host returned {}: {}", status, text));
        }

        let parsed: GraphQlResponse<T> = serde_json::from_str(&text)
            .map_err(|e| format!("Malformed GraphQL response: {}", e))?;

        if let Some(errors) = parsed.errors {
            return Err(format!("GraphQL errors: {}", errors));
        }

        parsed
            .data
            .ok_or_else(|| "GraphQL response has no data".to_string())
    }

    fn upload_succeeded(&self, status: StatusCode) -> bool {
        match self.expected_upload_status {
            Some(expected) => status.as_u16() == expected,
            None => status.is_success(),
        }
    }
}

#[async_trait]
impl AssetHostClient for ShopifyClient {
    async fn create_upload_target(&self, request: &UploadTargetRequest) -> Result<UploadTarget> {
        let variables = json!({
            "input": [{
                "filename": request.filename,
                "mimeType": request.mime_type,
                "resource": "FILE",
                "httpMethod": "POST",
                "fileSize": request.byte_length.to_string(),
            }]
        });

        let data: StagedUploadsData = self
            .graphql(STAGED_UPLOADS_CREATE, variables)
            .await
            .map_err(AppError::StagedUploadTarget)?;

        let payload = data.staged_uploads_create.ok_or_else(|| {
            AppError::StagedUploadTarget("stagedUploadsCreate returned no payload".to_string())
        })?;

        if !payload.user_errors.is_empty() {
            return Err(AppError::StagedUploadTarget(describe_user_errors(
                &payload.user_errors,
            )));
        }

        let target = payload.staged_targets.into_iter().next().ok_or_else(|| {
            AppError::StagedUploadTarget("stagedUploadsCreate returned no targets".to_string())
        })?;

        match (target.url, target.resource_url) {
            (Some(upload_url), Some(resource_url)) => Ok(UploadTarget {
                upload_url,
                resource_url,
                parameters: target.parameters,
                headers: Vec::new(),
            }),
            _ => Err(AppError::StagedUploadTarget(
                "Staged target is missing url or resourceUrl".to_string(),
            )),
        }
    }

    async fn upload_binary(&self, target: &UploadTarget, file: UploadFile) -> Result<()> {
        let filename = file.filename().to_string();
        let mime_type = file.mime_type().to_string();

        // Signed policies cover the field order; keep it exactly as issued.
        let mut form = multipart::Form::new();
        for parameter in &target.parameters {
            form = form.text(parameter.name.clone(), parameter.value.clone());
        }

        let part = multipart::Part::bytes(file.into_bytes())
            .file_name(filename)
            .mime_str(&mime_type)
            .map_err(|e| AppError::ObjectStoreUpload {
                status: None,
                body: format!("Invalid MIME type '{}': {}", mime_type, e),
            })?;
        form = form.part("file", part);

        let mut request = self.client.post(&target.upload_url).multipart(form);
        for (name, value) in &target.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| AppError::ObjectStoreUpload {
            status: None,
            body: e.without_url().to_string(),
        })?;

        let status = response.status();
        if !self.upload_succeeded(status) {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e.without_url()));
            return Err(AppError::ObjectStoreUpload {
                status: Some(status.as_u16()),
                body,
            });
        }

        debug!(status = %status, "Object store accepted upload");
        Ok(())
    }

    async fn register_asset(
        &self,
        resource_url: &str,
        alt_text: Option<&str>,
    ) -> Result<PublishedAsset> {
        let mut file = json!({
            "originalSource": resource_url,
            "contentType": "IMAGE",
        });
        if let Some(alt) = alt_text {
            file["alt"] = Value::String(alt.to_string());
        }

        let data: FileCreateData = self
            .graphql(FILE_CREATE, json!({ "files": [file] }))
            .await
            .map_err(AppError::AssetRegistration)?;

        let payload = data.file_create.ok_or_else(|| {
            AppError::AssetRegistration("fileCreate returned no payload".to_string())
        })?;

        if !payload.user_errors.is_empty() {
            return Err(AppError::AssetRegistration(describe_user_errors(
                &payload.user_errors,
            )));
        }

        payload
            .files
            .into_iter()
            .next()
            .and_then(CreatedFile::public_url)
            .map(|durable_url| PublishedAsset { durable_url })
            .ok_or_else(|| {
                AppError::AssetRegistration("fileCreate response has no asset URL".to_string())
            })
    }
}
