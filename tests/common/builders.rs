//! Request builders shared by the integration tests.

use push_request_core::model::{DeliveryPoint, PushServiceProvider};
use push_request_core::request::{Action, Request, RequestBuilder};

pub fn apns_provider() -> PushServiceProvider {
    PushServiceProvider::new("apns:prod", "apns").with_data("cert", "/etc/push/prod.pem")
}

pub fn gcm_provider() -> PushServiceProvider {
    PushServiceProvider::new("gcm:project-1", "gcm").with_data("apikey", "secret")
}

pub fn iphone() -> DeliveryPoint {
    DeliveryPoint::new("apns:iphone", "apns").with_data("devtoken", "f00d")
}

pub fn android() -> DeliveryPoint {
    DeliveryPoint::new("gcm:pixel", "gcm").with_data("regid", "b33f")
}

pub fn add_provider(id: &str, service: &str, provider: PushServiceProvider) -> RequestBuilder {
    Request::builder(Action::AddPushServiceProvider)
        .id(id)
        .service(service)
        .push_service_provider(provider)
}

pub fn remove_provider(id: &str, service: &str, provider: PushServiceProvider) -> RequestBuilder {
    Request::builder(Action::RemovePushServiceProvider)
        .id(id)
        .service(service)
        .push_service_provider(provider)
}

pub fn subscribe(id: &str, service: &str, subscriber: &str, dp: DeliveryPoint) -> RequestBuilder {
    Request::builder(Action::Subscribe)
        .id(id)
        .service(service)
        .subscriber(subscriber)
        .delivery_point(dp)
}

pub fn unsubscribe(id: &str, service: &str, subscriber: &str, dp: DeliveryPoint) -> RequestBuilder {
    Request::builder(Action::Unsubscribe)
        .id(id)
        .service(service)
        .subscriber(subscriber)
        .delivery_point(dp)
}
