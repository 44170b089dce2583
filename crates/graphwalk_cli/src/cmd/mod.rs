/// Mode listing command.
pub mod modes;
/// Operation mode command.
pub mod run;
/// Flattened-object rebuild command.
pub mod unflatten;

mod util;
