mod subscriptions;

pub use subscriptions::SubscriptionRepo;
