pub mod background;
pub(crate) mod blur;
pub mod boundary;
pub mod outline;
pub(crate) mod raster;
pub mod surface;
