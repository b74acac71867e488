pub mod browser;
pub mod spinner;
pub mod text_field;
pub mod viewport;
