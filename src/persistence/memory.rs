use super::{PersistenceResult, PushDatabase};
use crate::error::PersistenceError;
use crate::model::{DeliveryPoint, PushServiceProvider};
use dashmap::DashMap;
use tracing::debug;

/// In-process push database backed by concurrent maps
#[derive(Debug, Default)]
pub struct InMemoryPushDatabase {
    /// service -> providers registered under it
    providers: DashMap<String, Vec<PushServiceProvider>>,
    /// (service, subscriber) -> subscribed delivery points
    subscriptions: DashMap<(String, String), Vec<DeliveryPoint>>,
}

impl InMemoryPushDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Providers registered under a service, in registration order
    pub fn providers(&self, service: &str) -> Vec<PushServiceProvider> {
        self.providers
            .get(service)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Delivery points a subscriber has under a service
    pub fn delivery_points(&self, service: &str, subscriber: &str) -> Vec<DeliveryPoint> {
        self.subscriptions
            .get(&(service.to_string(), subscriber.to_string()))
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn provider_for(
        &self,
        service: &str,
        delivery_point: &DeliveryPoint,
    ) -> PersistenceResult<PushServiceProvider> {
        let providers = self
            .providers
            .get(service)
            .ok_or_else(|| PersistenceError::UnknownService(service.to_string()))?;

        providers
            .iter()
            .find(|p| p.push_service_type() == delivery_point.push_service_type())
            .cloned()
            .ok_or_else(|| PersistenceError::NoMatchingProvider {
                service: service.to_string(),
                delivery_point: delivery_point.name().to_string(),
            })
    }
}

impl PushDatabase for InMemoryPushDatabase {
    fn add_push_service_provider_to_service(
        &self,
        service: &str,
        provider: &PushServiceProvider,
    ) -> PersistenceResult<()> {
        let mut providers = self.providers.entry(service.to_string()).or_default();
        match providers.iter().position(|p| p.name() == provider.name()) {
            Some(index) => providers[index] = provider.clone(),
            None => providers.push(provider.clone()),
        }
        debug!(service, provider = provider.name(), "Stored push service provider");
        Ok(())
    }

    fn remove_push_service_provider_from_service(
        &self,
        service: &str,
        provider: &PushServiceProvider,
    ) -> PersistenceResult<()> {
        let mut providers = self
            .providers
            .get_mut(service)
            .ok_or_else(|| PersistenceError::UnknownService(service.to_string()))?;

        let before = providers.len();
        providers.retain(|p| p.name() != provider.name());
        if providers.len() == before {
            return Err(PersistenceError::NotFound(format!(
                "push service provider {} in service {service}",
                provider.name()
            )));
        }
        Ok(())
    }

    fn add_delivery_point_to_service(
        &self,
        service: &str,
        subscriber: &str,
        delivery_point: &DeliveryPoint,
    ) -> PersistenceResult<Option<PushServiceProvider>> {
        // Resolve the provider before touching subscriptions so no two map
        // guards are held at once.
        let provider = self.provider_for(service, delivery_point)?;

        let mut points = self
            .subscriptions
            .entry((service.to_string(), subscriber.to_string()))
            .or_default();
        match points.iter().position(|dp| dp.name() == delivery_point.name()) {
            Some(index) => points[index] = delivery_point.clone(),
            None => points.push(delivery_point.clone()),
        }
        Ok(Some(provider))
    }

    fn remove_delivery_point_from_service(
        &self,
        service: &str,
        subscriber: &str,
        delivery_point: &DeliveryPoint,
    ) -> PersistenceResult<()> {
        let key = (service.to_string(), subscriber.to_string());
        let not_found = || {
            PersistenceError::NotFound(format!(
                "delivery point {} for subscriber {subscriber} in service {service}",
                delivery_point.name()
            ))
        };

        let now_empty = {
            let mut points = self.subscriptions.get_mut(&key).ok_or_else(not_found)?;
            let before = points.len();
            points.retain(|dp| dp.name() != delivery_point.name());
            if points.len() == before {
                return Err(not_found());
            }
            points.is_empty()
        };

        if now_empty {
            self.subscriptions.remove_if(&key, |_, points| points.is_empty());
        }
        Ok(())
    }
}
