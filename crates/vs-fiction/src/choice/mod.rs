//! Options menus and the options they contain.

mod menu;
mod option;

pub use menu::{OptionsMenu, RenderedOption};
pub use option::{MenuOption, OptionState, Visibility};
