pub mod canvas;
pub mod geom;
pub mod input;
pub mod layout;
pub mod painter;
pub mod style;
