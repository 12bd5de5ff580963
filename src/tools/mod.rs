/// Tool function synthesis
///
/// Turns declarative HTTP tool rows into callables the agent runtime can
/// register and invoke. Declarations are data, never source: every name,
/// annotation and default is validated up front.

// Argument declaration parsing and validation
pub mod args;

// Callable HTTP tool functions
pub mod function;

pub use args::{is_identifier, parse_args_info, ToolParam};
pub use function::{agent_tool_functions, make_tool_function, ToolFunction};
