//! Editors turning classified divergences into steps.
//!
//! Each editor appends its steps to the transform directly; a step that
//! fails to apply aborts reconstruction.

pub mod markup;
pub mod structural;
pub mod text_run;

pub use markup::MarkupEditor;
pub use structural::StructuralEditor;
pub use text_run::TextRunEditor;
