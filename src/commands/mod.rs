mod arrow;
mod backspace;
mod type_text;
mod wait;

pub use arrow::{ArrowLeft, ArrowRight};
pub use backspace::Backspace;
pub use type_text::TypeText;
pub use wait::Wait;
