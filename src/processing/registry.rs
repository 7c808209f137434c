//! Algorithm providers and the processing registry
//!
//! Providers group algorithms under an id; the registry resolves
//! `provider:algorithm` ids. The plugin wires the UAV Preparer provider in
//! and out of a registry.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::algorithm::Algorithm;
use super::errors::{ProcessingError, ProcessingResult};
use super::height_stats::HeightStatsAlgorithm;

/// A named set of algorithms
pub trait AlgorithmProvider {
    /// Id used as the prefix of algorithm ids
    fn id(&self) -> &str;

    /// Name shown to users
    fn name(&self) -> &str;

    fn algorithms(&self) -> &[Box<dyn Algorithm>];
}

pub const PROVIDER_ID: &str = "uavpreparer";
pub const PROVIDER_NAME: &str = "UAV Preparer";

/// Provider of the UAV preparation algorithms
pub struct UavPreparerProvider {
    algorithms: Vec<Box<dyn Algorithm>>,
}

impl Default for UavPreparerProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl UavPreparerProvider {
    pub fn new() -> Self {
        UavPreparerProvider {
            algorithms: vec![Box::new(HeightStatsAlgorithm::new())],
        }
    }
}

impl AlgorithmProvider for UavPreparerProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn algorithms(&self) -> &[Box<dyn Algorithm>] {
        &self.algorithms
    }
}

/// Registry of algorithm providers
#[derive(Default)]
pub struct ProcessingRegistry {
    providers: BTreeMap<String, Box<dyn AlgorithmProvider>>,
}

impl ProcessingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider, refusing a second provider with the same id
    pub fn add_provider(&mut self, provider: Box<dyn AlgorithmProvider>) -> ProcessingResult<()> {
        let id = provider.id().to_string();
        if self.providers.contains_key(&id) {
            return Err(ProcessingError::Input(format!("Provider '{}' is already registered", id)));
        }

        info!("Registered provider {} ({} algorithms)", id, provider.algorithms().len());
        self.providers.insert(id, provider);
        Ok(())
    }

    /// Removes a provider, returning it if it was registered
    pub fn remove_provider(&mut self, id: &str) -> Option<Box<dyn AlgorithmProvider>> {
        let removed = self.providers.remove(id);
        match &removed {
            Some(_) => info!("Removed provider {}", id),
            None => warn!("Provider {} was not registered", id),
        }
        removed
    }

    pub fn provider(&self, id: &str) -> Option<&dyn AlgorithmProvider> {
        self.providers.get(id).map(|provider| provider.as_ref())
    }

    /// Looks up an algorithm by its `provider:name` id
    pub fn algorithm(&self, id: &str) -> Option<&dyn Algorithm> {
        let (provider_id, name) = id.split_once(':')?;
        debug!("Resolving algorithm {} in provider {}", name, provider_id);

        self.providers.get(provider_id)?
            .algorithms()
            .iter()
            .find(|algorithm| algorithm.name() == name)
            .map(|algorithm| algorithm.as_ref())
    }

    /// Ids of every registered algorithm, sorted
    pub fn algorithm_ids(&self) -> Vec<String> {
        self.providers.values()
            .flat_map(|provider| {
                provider.algorithms().iter().map(move |algorithm| format!("{}:{}", provider.id(), algorithm.name()))
            })
            .collect()
    }
}

/// Host plugin entry points
pub struct UavPreparerPlugin;

impl UavPreparerPlugin {
    /// Adds the UAV Preparer provider to `registry`
    pub fn register(registry: &mut ProcessingRegistry) -> ProcessingResult<()> {
        registry.add_provider(Box::new(UavPreparerProvider::new()))
    }

    /// Removes the provider again; a no-op if it was never added
    pub fn unregister(registry: &mut ProcessingRegistry) {
        registry.remove_provider(PROVIDER_ID);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_exposes_height_stats() {
        let mut registry = ProcessingRegistry::new();
        UavPreparerPlugin::register(&mut registry).unwrap();

        let algorithm = registry.algorithm("uavpreparer:heightstats").unwrap();
        assert_eq!(algorithm.display_name(), "UAV Preparer for Processing");
        assert_eq!(registry.algorithm_ids(), vec!["uavpreparer:heightstats".to_string()]);
        assert_eq!(registry.provider(PROVIDER_ID).map(|p| p.name()), Some("UAV Preparer"));
    }

    #[test]
    fn unregister_removes_provider() {
        let mut registry = ProcessingRegistry::new();
        UavPreparerPlugin::register(&mut registry).unwrap();
        UavPreparerPlugin::unregister(&mut registry);

        assert!(registry.algorithm("uavpreparer:heightstats").is_none());
        assert!(registry.algorithm_ids().is_empty());
    }

    #[test]
    fn duplicate_registration_is_refused() {
        let mut registry = ProcessingRegistry::new();
        UavPreparerPlugin::register(&mut registry).unwrap();
        assert!(UavPreparerPlugin::register(&mut registry).is_err());
    }

    #[test]
    fn malformed_ids_resolve_to_nothing() {
        let mut registry = ProcessingRegistry::new();
        UavPreparerPlugin::register(&mut registry).unwrap();
        assert!(registry.algorithm("heightstats").is_none());
        assert!(registry.algorithm("uavpreparer:other").is_none());
    }
}
