// Domain Layer - Pipeline objects and the function wire format

pub mod collection;
pub mod config_map;
pub mod error;
pub mod object;
pub mod resource_list;
pub mod result;

// Re-exports
pub use collection::ObjectCollection;
pub use config_map::ConfigurationMap;
pub use error::DomainError;
pub use object::KubernetesObject;
pub use resource_list::ResourceList;
pub use result::{FunctionResult, Severity};
