pub mod aggregate;
pub mod parsers;
pub mod patterns;
pub mod probes;
pub mod runner;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use aggregate::{build_snapshot, build_warnings, is_gpu_pinned, raw_report};
pub use probes::{ProbeCollection, Prober};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
