/*!
## Rust Machine Module

This Rust module is a bytecode compiler and time-sliced virtual machine
for line-numbered BASIC.

*/

pub type Address = usize;
pub type Slot = usize;

mod compile;
mod function;
mod host;
mod link;
mod namespace;
mod opcode;
mod operation;
mod program;
mod runtime;
mod stack;
mod val;
mod var;

pub use compile::compile;
pub use compile::Options;
pub use function::Builtin;
pub use function::Function;
pub use host::Continuation;
pub use host::Host;
pub use host::InputRequest;
pub use link::Link;
pub use namespace::Namespace;
pub use opcode::Opcode;
pub use operation::Operation;
pub use program::Program;
pub use runtime::Config;
pub use runtime::Runtime;
pub use runtime::DEFAULT_TIME_SLICE;
pub use stack::Stack;
pub use val::Val;
pub use var::Array;
pub use var::Var;
pub use var::Variables;
