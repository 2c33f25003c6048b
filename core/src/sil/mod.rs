//! Source IR model: the typed SSA module handed over by the compiler.

pub mod builder;
pub mod doc;
pub mod err;
pub mod ids;
pub mod kind;
pub mod loader;
pub mod module;
mod print;

pub use builder::{InstHandle, ModuleBuilder};
pub use err::ModuleLoadError;
pub use ids::{BlockId, FunctionId, InstId, ValueId};
pub use kind::{Category, InstKind, MemoryBehavior, ReleasingBehavior};
pub use loader::{build_module, load_module_str};
pub use module::{DebugLoc, Instruction, SilBlock, SilFunction, SilModule, ValueData, ValueOrigin};
