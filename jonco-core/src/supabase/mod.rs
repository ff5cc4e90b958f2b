//! Clients for the hosted backend: row API and object storage.

pub mod postgrest;
pub mod site;
pub mod storage;

use std::sync::Arc;

use crate::config::BackendConfig;
use crate::media_store::MediaStore;
use crate::site::SiteRepository;

pub use postgrest::{PostgrestClient, Query};
pub use site::SupabaseSiteRepository;
pub use storage::SupabaseStorage;

/// Build the repository and, when the service-role key is present, the media store.
pub fn connect(config: &BackendConfig) -> (Arc<dyn SiteRepository>, Option<Arc<dyn MediaStore>>) {
    let client = reqwest::Client::new();
    let base_url = config.base_url();

    let public = PostgrestClient::new(client.clone(), &base_url, &config.anon_key);
    let privileged = config
        .service_role_key
        .as_deref()
        .map(|key| PostgrestClient::new(client.clone(), &base_url, key));
    let repository = SupabaseSiteRepository::new(public, privileged);

    let media_store = config.service_role_key.as_deref().map(|key| {
        Arc::new(SupabaseStorage::new(
            client.clone(),
            &base_url,
            key,
            &config.storage_bucket,
        )) as Arc<dyn MediaStore>
    });

    (Arc::new(repository), media_store)
}
