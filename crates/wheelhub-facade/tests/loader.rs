//! Lazy client loading

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use wheelhub_facade::FacadeError;

use common::{emulator, CountingFactory, TestBackend};

#[tokio::test]
async fn test_nothing_loads_until_first_use() {
    let backend = TestBackend::cloud().await;
    assert!(!backend.facade.loader().is_loaded());
    assert_eq!(backend.factory.identity_loads(), 0);

    backend.facade.get_wheels().await.unwrap();
    assert!(backend.facade.loader().is_loaded());
    assert_eq!(backend.factory.identity_loads(), 1);
    assert_eq!(backend.factory.store_loads(), 1);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_initialization() {
    let factory = CountingFactory::new(emulator()).with_delay(Duration::from_millis(50));
    let backend = TestBackend::with_factory(factory).await;
    let loader = backend.facade.loader();

    let handles = join_all((0..16).map(|_| loader.ensure_loaded())).await;
    let handles: Vec<_> = handles.into_iter().map(Result::unwrap).collect();

    assert_eq!(backend.factory.identity_loads(), 1);
    assert_eq!(backend.factory.store_loads(), 1);
    assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
}

#[tokio::test]
async fn test_concurrent_operations_share_one_initialization() {
    let factory = CountingFactory::new(emulator()).with_delay(Duration::from_millis(20));
    let backend = TestBackend::with_factory(factory).await;
    let facade = &backend.facade;

    let (wheels, admins, words, loaded) = tokio::join!(
        facade.get_wheels(),
        facade.get_admins(),
        facade.get_dirty_words(),
        facade.load_libraries(),
    );
    wheels.unwrap();
    admins.unwrap();
    words.unwrap();
    loaded.unwrap();

    assert_eq!(backend.factory.identity_loads(), 1);
}

#[tokio::test]
async fn test_failed_initialization_is_not_cached() {
    let backend = TestBackend::with_factory(CountingFactory::new(emulator()).failing(1)).await;
    let facade = &backend.facade;

    let err = facade.get_wheels().await.unwrap_err();
    assert!(matches!(err, FacadeError::Initialization(_)));
    assert!(err.to_string().contains("auth module failed to download"));
    assert!(!facade.loader().is_loaded());

    facade.get_wheels().await.unwrap();
    assert!(facade.loader().is_loaded());
    assert_eq!(backend.factory.identity_loads(), 2);
    assert_eq!(backend.factory.store_loads(), 1);
}

#[tokio::test]
async fn test_offline_persistence_is_enabled_on_load() {
    let backend = TestBackend::cloud().await;
    backend.facade.load_libraries().await.unwrap();
    backend.facade.load_libraries().await.unwrap();

    let handle = backend.facade.loader().handle().unwrap();
    assert!(handle.persistence.succeeded());
    assert!(backend.factory.store().is_persistent());
    assert_eq!(backend.factory.identity_loads(), 1);
}
