pub mod cloudinary;

pub use cloudinary::CloudinaryAssetStore;
