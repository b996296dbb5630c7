pub mod record_ctx;
pub mod validate_flow;

pub use record_ctx::RecordCtx;
pub use validate_flow::ValidateFlow;
