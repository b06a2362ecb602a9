//! Instance registry with explicit create-or-reuse semantics.
//!
//! Gateways are cached per instance id. Re-registering an instance with the
//! same settings keeps the cached gateway; changed settings tear it down and
//! build a fresh one. Removal is explicit. The engine itself holds no
//! instance state.

use std::collections::HashMap;
use std::sync::Arc;

use keygrid_gateway_http::{GatewaySettings, HttpGateway};
use keygrid_query::{GatewayResult, KvGateway};
use tokio::sync::RwLock;
use tracing::debug;

/// Builds gateways from settings. Swappable so tests can inject doubles.
pub trait GatewayFactory: Send + Sync {
    fn create(&self, settings: &GatewaySettings) -> GatewayResult<Arc<dyn KvGateway>>;
}

/// Default factory producing HTTP gateways.
pub struct HttpGatewayFactory;

impl GatewayFactory for HttpGatewayFactory {
    fn create(&self, settings: &GatewaySettings) -> GatewayResult<Arc<dyn KvGateway>> {
        Ok(Arc::new(HttpGateway::new(settings)?))
    }
}

struct Instance {
    settings: GatewaySettings,
    gateway: Arc<dyn KvGateway>,
}

/// Registry of configured store instances, keyed by instance id.
pub struct InstanceRegistry {
    factory: Arc<dyn GatewayFactory>,
    instances: RwLock<HashMap<String, Instance>>,
}

impl InstanceRegistry {
    pub fn new(factory: Arc<dyn GatewayFactory>) -> Self {
        Self {
            factory,
            instances: RwLock::new(HashMap::new()),
        }
    }

    /// Registers or updates an instance. Identical settings keep the cached
    /// gateway; changed settings invalidate it and build a new one.
    pub async fn upsert(&self, uid: &str, settings: GatewaySettings) -> GatewayResult<()> {
        let mut instances = self.instances.write().await;

        if let Some(existing) = instances.get(uid) {
            if existing.settings == settings {
                debug!(uid, "instance settings unchanged, reusing gateway");
                return Ok(());
            }
            debug!(uid, "instance settings changed, rebuilding gateway");
        }

        let gateway = self.factory.create(&settings)?;
        instances.insert(uid.to_string(), Instance { settings, gateway });
        Ok(())
    }

    /// Gateway for a registered instance, if any.
    pub async fn gateway(&self, uid: &str) -> Option<Arc<dyn KvGateway>> {
        self.instances
            .read()
            .await
            .get(uid)
            .map(|instance| instance.gateway.clone())
    }

    /// Removes an instance and drops its gateway. Returns whether the
    /// instance existed.
    pub async fn remove(&self, uid: &str) -> bool {
        self.instances.write().await.remove(uid).is_some()
    }

    /// Ids of all registered instances.
    pub async fn list(&self) -> Vec<String> {
        self.instances.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygrid_query::MemoryGateway;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFactory {
        created: AtomicUsize,
    }

    impl CountingFactory {
        fn new() -> Self {
            Self {
                created: AtomicUsize::new(0),
            }
        }
    }

    impl GatewayFactory for CountingFactory {
        fn create(&self, _settings: &GatewaySettings) -> GatewayResult<Arc<dyn KvGateway>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MemoryGateway::new()))
        }
    }

    #[tokio::test]
    async fn upsert_reuses_gateway_for_identical_settings() {
        let factory = Arc::new(CountingFactory::new());
        let registry = InstanceRegistry::new(factory.clone());

        let settings = GatewaySettings::new("http://127.0.0.1:8500");
        registry.upsert("a", settings.clone()).await.unwrap();
        registry.upsert("a", settings).await.unwrap();

        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn upsert_rebuilds_gateway_on_settings_change() {
        let factory = Arc::new(CountingFactory::new());
        let registry = InstanceRegistry::new(factory.clone());

        registry
            .upsert("a", GatewaySettings::new("http://127.0.0.1:8500"))
            .await
            .unwrap();
        registry
            .upsert("a", GatewaySettings::new("http://127.0.0.1:8501"))
            .await
            .unwrap();

        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert_eq!(registry.list().await, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn remove_drops_the_instance() {
        let registry = InstanceRegistry::new(Arc::new(CountingFactory::new()));
        registry
            .upsert("a", GatewaySettings::new("http://127.0.0.1:8500"))
            .await
            .unwrap();

        assert!(registry.remove("a").await);
        assert!(!registry.remove("a").await);
        assert!(registry.gateway("a").await.is_none());
    }
}
