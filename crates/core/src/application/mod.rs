// Application Layer - Adapter use cases

pub mod adapter;
pub mod arguments;
pub mod encoder;
pub mod inventory;
pub mod router;

// Re-exports
pub use adapter::{AdapterKind, AdapterOutcome, AdapterProfile, AdapterSettings, ExecAdapter};
pub use arguments::{ArgumentBuilder, ArgumentPlan, BuildOutcome, SkipReason, StreamPolicy};
pub use encoder::StreamFormat;
pub use inventory::{InventoryOutcome, InventoryRecord, InventorySynthesizer, INVENTORY_LABEL};
pub use router::OutputRouter;
