//! Cache protocol tests.
//!
//! The handoff is one-way and advisory:
//! - the returned Files need not contain the entrypoint
//! - restoration failures degrade to a cold build
//! - builders that skip the protocol return None

use std::sync::Arc;

use async_trait::async_trait;
use slipway_artifact::{File, FileBlob, Files};
use slipway_builder::{
    cache, BuildOptions, BuildResultV2, Builder, BuilderV2, PrepareCacheOptions,
};
use slipway_config::Config;

/// Echo builder that hands its dependency directory to the next build.
struct CachingBuilder;

#[async_trait]
impl BuilderV2 for CachingBuilder {
    async fn build(&self, options: &BuildOptions) -> anyhow::Result<BuildResultV2> {
        let file = options.entrypoint_file().clone();
        Ok(BuildResultV2::new().with_output(options.entrypoint.clone(), file))
    }

    async fn prepare_cache(
        &self,
        _options: &PrepareCacheOptions,
    ) -> anyhow::Result<Option<Files>> {
        // Build-tool state only; deliberately no source files.
        let mut cache = Files::default();
        cache.insert(
            "node_modules/left-pad/index.js".to_string(),
            File::from(FileBlob::new("module.exports = pad;")),
        );
        cache.insert(
            "node_modules/.package-lock.json".to_string(),
            File::from(FileBlob::new("{}")),
        );
        Ok(Some(cache))
    }
}

struct StatelessBuilder;

#[async_trait]
impl BuilderV2 for StatelessBuilder {
    async fn build(&self, options: &BuildOptions) -> anyhow::Result<BuildResultV2> {
        let file = options.entrypoint_file().clone();
        Ok(BuildResultV2::new().with_output(options.entrypoint.clone(), file))
    }
}

fn build_options(work_path: &std::path::Path) -> BuildOptions {
    let mut files = Files::default();
    files.insert(
        "index.js".to_string(),
        File::from(FileBlob::new("module.exports = 1;")),
    );
    BuildOptions::new(files, "index.js", work_path, Config::default()).unwrap()
}

#[tokio::test]
async fn cache_need_not_contain_the_entrypoint() {
    let temp = tempfile::tempdir().unwrap();
    let builder = Builder::V2(Arc::new(CachingBuilder));
    let options = build_options(temp.path());

    builder.build(&options).await.unwrap();

    let cache = cache::prepare_cache(&builder, &options.to_prepare_cache_options())
        .await
        .unwrap()
        .expect("builder participates in the cache protocol");

    assert!(!cache.contains_key("index.js"));
    assert!(cache.contains_key("node_modules/left-pad/index.js"));
}

#[tokio::test]
async fn restore_materializes_into_the_work_directory() {
    let temp = tempfile::tempdir().unwrap();
    let builder = Builder::V2(Arc::new(CachingBuilder));
    let options = build_options(temp.path());

    builder.build(&options).await.unwrap();
    let cache = cache::prepare_cache(&builder, &options.to_prepare_cache_options())
        .await
        .unwrap()
        .unwrap();

    assert!(cache::restore_cache(&cache, temp.path()).await);
    let restored = temp.path().join("node_modules/left-pad/index.js");
    assert_eq!(
        std::fs::read_to_string(restored).unwrap(),
        "module.exports = pad;"
    );
}

#[tokio::test]
async fn restore_failure_degrades_to_a_cold_build() {
    let temp = tempfile::tempdir().unwrap();

    let mut poisoned = Files::default();
    poisoned.insert(
        "../outside-the-workdir".to_string(),
        File::from(FileBlob::new("nope")),
    );

    // No error escapes; the caller simply proceeds cold.
    assert!(!cache::restore_cache(&poisoned, temp.path()).await);
}

#[tokio::test]
async fn builders_without_cache_support_return_none() {
    let temp = tempfile::tempdir().unwrap();
    let builder = Builder::V2(Arc::new(StatelessBuilder));
    let options = build_options(temp.path());

    builder.build(&options).await.unwrap();
    let cache = cache::prepare_cache(&builder, &options.to_prepare_cache_options())
        .await
        .unwrap();
    assert!(cache.is_none());
}
