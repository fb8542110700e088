//! Table storage: object-store backends and date-partitioned parquet tables.

mod table;

pub use table::{group_by_partition, PartitionedTable, TableState};

use crate::config::LakeConfig;
use crate::{Result, StoreError};
use object_store::ObjectStore;
use std::sync::Arc;

/// Create the object store for a lake root.
///
/// `s3://bucket/...` roots use S3 (optionally against a custom endpoint for
/// MinIO-style storage); anything else is a local filesystem root, created
/// on demand.
pub fn create_object_store(config: &LakeConfig) -> Result<Arc<dyn ObjectStore>> {
    if config.root_path.starts_with("s3://") {
        create_s3_store(config)
    } else {
        create_local_store(config)
    }
}

fn create_s3_store(config: &LakeConfig) -> Result<Arc<dyn ObjectStore>> {
    use object_store::aws::AmazonS3Builder;

    let bucket = config
        .root_path
        .strip_prefix("s3://")
        .and_then(|s| s.split('/').next())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StoreError::List {
            prefix: config.root_path.clone(),
            message: "invalid S3 root".into(),
        })?;

    let mut builder = AmazonS3Builder::new().with_bucket_name(bucket);

    if let Some(ref region) = config.aws_region {
        builder = builder.with_region(region);
    }

    if let Some(ref access_key) = config.aws_access_key_id {
        builder = builder.with_access_key_id(access_key);
    }

    if let Some(ref secret_key) = config.aws_secret_access_key {
        builder = builder.with_secret_access_key(secret_key);
    }

    if let Some(ref endpoint) = config.s3_endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"));
    }

    let store = builder.build().map_err(|e| StoreError::List {
        prefix: config.root_path.clone(),
        message: e.to_string(),
    })?;

    Ok(Arc::new(store))
}

fn create_local_store(config: &LakeConfig) -> Result<Arc<dyn ObjectStore>> {
    use object_store::local::LocalFileSystem;

    let path = std::path::Path::new(&config.root_path);
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }

    let store = LocalFileSystem::new_with_prefix(path).map_err(|e| StoreError::List {
        prefix: config.root_path.clone(),
        message: e.to_string(),
    })?;

    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lake_config(root: &str) -> LakeConfig {
        LakeConfig {
            root_path: root.to_string(),
            bronze_table: "bronze/realestateapi".into(),
            silver_table: "silver/realestateapi".into(),
            aws_region: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            s3_endpoint: None,
        }
    }

    #[test]
    fn test_local_store_creates_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("datalake");
        let config = lake_config(root.to_str().unwrap());

        assert!(create_object_store(&config).is_ok());
        assert!(root.exists());
    }

    #[test]
    fn test_invalid_s3_root_rejected() {
        let config = lake_config("s3://");
        assert!(create_object_store(&config).is_err());
    }
}
