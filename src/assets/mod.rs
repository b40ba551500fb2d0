pub mod bitmap;
pub mod decode;
