pub mod campaign_store;
pub use campaign_store::CampaignStore;
pub mod instance_store;
pub use instance_store::InstanceStore;
pub mod message_ledger;
pub use message_ledger::MessageLedger;
pub mod template_store;
pub use template_store::TemplateStore;
