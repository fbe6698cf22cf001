//! Interactive widgets.
//!
//! - **text_field**: line editor with optional mask and validator
//! - **menu**: scrolling single-select list
//! - **validator**: `Validator` trait and the typed validators
//! - **prompts**: email/integer/float/password adapters over `TextField`

pub mod menu;
pub mod prompts;
pub mod text_field;
pub mod validator;

pub use menu::{fit_to_width, SelectionMenu, Viewport};
pub use prompts::Prompts;
pub use text_field::TextField;
pub use validator::{EmailValidator, FloatValidator, IntegerValidator, Validator};
