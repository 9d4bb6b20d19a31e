//! Publish module - staged upload protocol and asset host clients

pub mod shopify;
pub mod staged;
pub mod traits;

pub use shopify::ShopifyClient;
pub use staged::{PublishOutcome, PublishState, StagedPublisher};
pub use traits::{
    AssetHostClient, PublishedAsset, UploadFile, UploadParameter, UploadTarget,
    UploadTargetRequest,
};
