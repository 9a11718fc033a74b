pub mod custom_capability;

pub use custom_capability::Entity as CustomCapability;
