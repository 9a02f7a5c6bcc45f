/*!
 * Monitoring
 * Structured tracing for the handshake
 */

mod tracer;

pub use tracer::{generate_trace_id, init_tracing, WaitSpan};
