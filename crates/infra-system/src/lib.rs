// qthrottle Infrastructure - System Adapters
// Implements: QueueBackend (SGE), ScriptMaterializer (files), principal lookup

pub mod principal;
pub mod script_writer;
pub mod sge_backend;

pub use principal::current_principal;
pub use script_writer::FileScriptWriter;
pub use sge_backend::{SgeBackend, SgeCommands};
