use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Removes one stored object. Callers treat failures as best-effort
    /// cleanup, so implementations only need to report them.
    async fn delete_object(&self, path: &str) -> Result<(), anyhow::Error>;
}

/// Thin client for the hosted upload bucket's HTTP API.
pub struct BucketClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl BucketClient {
    pub fn new(base_url: String, api_key: String, bucket: String) -> BucketClient {
        BucketClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            bucket,
        }
    }
}

#[async_trait]
impl ObjectStore for BucketClient {
    async fn delete_object(&self, path: &str) -> Result<(), anyhow::Error> {
        let url = format!(
            "{}/object/{}/{}",
            self.base_url,
            self.bucket,
            path.trim_start_matches('/')
        );

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Storage rejected deleting {path} with {status}");
        }

        Ok(())
    }
}
