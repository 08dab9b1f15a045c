mod interaction;
mod system;
mod variable;

pub use interaction::{Interaction, Label};
pub(crate) use interaction::Key;
pub use system::System;
pub use variable::Variable;
