mod contabilidad;
mod documentos;
mod equipos;
mod faena;
mod instalaciones;
mod organizacion;
mod precios;

pub use contabilidad::*;
pub use documentos::*;
pub use equipos::*;
pub use faena::*;
pub use instalaciones::*;
pub use organizacion::*;
pub use precios::*;
