pub(crate) mod cache;
pub(crate) mod composite;
pub(crate) mod raster;
